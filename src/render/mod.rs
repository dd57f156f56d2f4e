pub mod compositor;
pub mod glyph;
pub mod hud;
pub mod quantize;
pub mod raster;
pub mod sampler;
pub mod surface;

use crossterm::style::Color;

pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + ((r as f32 - 8.0) / 247.0 * 24.0) as u8;
    }
    let ri = (r as f32 / 255.0 * 5.0 + 0.5) as u8;
    let gi = (g as f32 / 255.0 * 5.0 + 0.5) as u8;
    let bi = (b as f32 / 255.0 * 5.0 + 0.5) as u8;
    16 + 36 * ri + 6 * gi + bi
}

pub fn make_color(r: u8, g: u8, b: u8, use_truecolor: bool) -> Color {
    if use_truecolor {
        Color::Rgb { r, g, b }
    } else {
        Color::AnsiValue(rgb_to_ansi256(r, g, b))
    }
}

pub fn detect_truecolor() -> bool {
    match std::env::var("COLORTERM") {
        Ok(val) => !val.is_empty() && (val == "truecolor" || val == "24bit"),
        Err(_) => match std::env::var("TERM_PROGRAM") {
            Ok(prog) => prog != "Apple_Terminal",
            Err(_) => match std::env::var("TERM") {
                Ok(term) => {
                    term.contains("ghostty") || term.contains("kitty") || term.contains("wezterm")
                }
                Err(_) => false,
            },
        },
    }
}

/// Off-screen RGBA raster with a depth buffer; the 3D side of the pipeline
/// draws here, the sampler reads back from here. Contents are transient and
/// rebuilt every frame.
#[derive(Debug)]
pub struct RasterState {
    pub pixels: Vec<[u8; 4]>,
    pub depth: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl RasterState {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.saturating_mul(height);
        Self {
            pixels: vec![[0, 0, 0, 0]; len],
            depth: vec![f32::INFINITY; len],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = width.saturating_mul(height);
        self.pixels.resize(len, [0, 0, 0, 0]);
        self.depth.resize(len, f32::INFINITY);
    }

    pub fn clear(&mut self) {
        self.pixels.fill([0, 0, 0, 0]);
        self.depth.fill(f32::INFINITY);
    }
}

/// One drawn character cell: glyph, foreground, and the opacity the surface
/// emulates when compositing against the background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphCell {
    pub ch: char,
    pub fg: [u8; 3],
    pub opacity: f32,
}

/// A complete composed frame. `None` cells are background.
#[derive(Debug, Clone)]
pub struct TextFrame {
    pub cols: usize,
    pub rows: usize,
    cells: Vec<Option<GlyphCell>>,
}

impl TextFrame {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![None; cols.saturating_mul(rows)],
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<GlyphCell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, col: usize, row: usize, cell: GlyphCell) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = Some(cell);
        }
    }

    pub fn drawn_cells(&self) -> impl Iterator<Item = &GlyphCell> {
        self.cells.iter().flatten()
    }
}
