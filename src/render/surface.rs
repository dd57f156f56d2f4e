use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

use crate::math::clamp_u8;

use super::{make_color, TextFrame};

/// Emulate glyph opacity on a surface that has none: blend the foreground
/// toward the configured background, or toward black when the background is
/// transparent (dark terminals are the expected default there).
pub fn composite_fg(fg: [u8; 3], opacity: f32, background: Option<[u8; 3]>) -> [u8; 3] {
    let bg = background.unwrap_or([0, 0, 0]);
    let a = opacity.clamp(0.0, 1.0);
    [
        clamp_u8(fg[0] as f32 * a + bg[0] as f32 * (1.0 - a)),
        clamp_u8(fg[1] as f32 * a + bg[1] as f32 * (1.0 - a)),
        clamp_u8(fg[2] as f32 * a + bg[2] as f32 * (1.0 - a)),
    ]
}

pub fn is_hud_overlay_row(show_hud: bool, row: usize, rows: usize) -> bool {
    show_hud && (row == 0 || row == rows.saturating_sub(1))
}

/// Terminal painter for composed frames. Tracks the last emitted colors so
/// unchanged runs cost no escape sequences.
#[derive(Debug)]
pub struct TermSurface {
    use_truecolor: bool,
    last_fg: Option<Color>,
    last_bg: Option<Color>,
}

impl TermSurface {
    pub fn new(use_truecolor: bool) -> Self {
        Self {
            use_truecolor,
            last_fg: None,
            last_bg: None,
        }
    }

    /// Forget cached colors, e.g. after something else wrote to the screen.
    pub fn invalidate(&mut self) {
        self.last_fg = None;
        self.last_bg = None;
    }

    pub fn clear(&mut self, stdout: &mut impl Write) -> io::Result<()> {
        self.invalidate();
        queue!(stdout, ResetColor, Clear(ClearType::All))
    }

    fn set_bg(&mut self, color: Color, stdout: &mut impl Write) -> io::Result<()> {
        if self.last_bg != Some(color) {
            queue!(stdout, SetBackgroundColor(color))?;
            self.last_bg = Some(color);
        }
        Ok(())
    }

    fn set_fg(&mut self, color: Color, stdout: &mut impl Write) -> io::Result<()> {
        if self.last_fg != Some(color) {
            queue!(stdout, SetForegroundColor(color))?;
            self.last_fg = Some(color);
        }
        Ok(())
    }

    /// Paint a full frame. Background cells print spaces in the frame's
    /// background color (terminal default when transparent); HUD overlay
    /// rows are left untouched for the HUD to draw over.
    pub fn draw_frame(
        &mut self,
        frame: &TextFrame,
        background: Option<[u8; 3]>,
        show_hud: bool,
        stdout: &mut impl Write,
    ) -> io::Result<()> {
        let bg_color = match background {
            Some([r, g, b]) => make_color(r, g, b, self.use_truecolor),
            None => Color::Reset,
        };

        for row in 0..frame.rows {
            if is_hud_overlay_row(show_hud, row, frame.rows) {
                self.invalidate();
                continue;
            }

            queue!(stdout, cursor::MoveTo(0, row as u16))?;
            for col in 0..frame.cols {
                self.set_bg(bg_color, stdout)?;
                match frame.get(col, row) {
                    Some(cell) => {
                        let [r, g, b] = composite_fg(cell.fg, cell.opacity, background);
                        self.set_fg(make_color(r, g, b, self.use_truecolor), stdout)?;
                        queue!(stdout, Print(cell.ch))?;
                    }
                    None => {
                        queue!(stdout, Print(' '))?;
                    }
                }
            }
        }

        Ok(())
    }
}
