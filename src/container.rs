use crossterm::terminal;

// Fallback when the terminal size query fails or reports zero, so dimension
// math stays sane before the terminal settles.
pub const DEFAULT_TERM_COLS: u16 = 120;
pub const DEFAULT_TERM_ROWS: u16 = 40;

/// Named render target with virtual pixel dimensions. The terminal analog of
/// a host-page container element: the region is the whole terminal, and its
/// pixel size is the character grid scaled by the renderer's cell size.
#[derive(Debug, Clone)]
pub struct Container {
    id: String,
    width: u32,
    height: u32,
}

impl Container {
    pub fn from_terminal(id: &str, cell_size: u32) -> Self {
        let (cols, rows) = terminal::size().unwrap_or((DEFAULT_TERM_COLS, DEFAULT_TERM_ROWS));
        Self::from_cells(id, cols, rows, cell_size)
    }

    pub fn from_cells(id: &str, cols: u16, rows: u16, cell_size: u32) -> Self {
        let cols = if cols == 0 { DEFAULT_TERM_COLS } else { cols };
        let rows = if rows == 0 { DEFAULT_TERM_ROWS } else { rows };
        Self {
            id: id.to_string(),
            width: cols as u32 * cell_size.max(1),
            height: rows as u32 * cell_size.max(1),
        }
    }

    pub fn from_pixels(id: &str, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            width,
            height,
        }
    }

    /// Re-query the terminal after a resize event.
    pub fn refresh(&mut self, cell_size: u32) {
        let refreshed = Self::from_terminal(&self.id, cell_size);
        self.width = refreshed.width;
        self.height = refreshed.height;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
