use crossterm::{
    cursor, queue,
    style::{Print, SetBackgroundColor, SetForegroundColor},
};
use std::fmt::Write as _;
use std::io::{self, Write};

use crate::config::Theme;
use crate::registry::RendererRegistry;

use super::make_color;

fn truncate_and_pad_in_place(text: &mut String, width: usize) {
    if width == 0 {
        text.clear();
        return;
    }

    let mut seen_chars = 0usize;
    let mut truncate_byte = None;
    for (idx, _) in text.char_indices() {
        if seen_chars == width {
            truncate_byte = Some(idx);
            break;
        }
        seen_chars += 1;
    }

    if let Some(idx) = truncate_byte {
        text.truncate(idx);
    } else {
        for _ in seen_chars..width {
            text.push(' ');
        }
    }
}

pub fn draw_hud(
    registry: &RendererRegistry,
    theme: Theme,
    cols: u16,
    rows: u16,
    use_truecolor: bool,
    buf: &mut String,
    stdout: &mut impl Write,
) -> io::Result<()> {
    let width = cols as usize;

    buf.clear();
    if let Some(renderer) = registry.first() {
        let config = renderer.config();
        write!(
            buf,
            "FPS:{:>5.1}  Model:{}  Grid:{}x{}  Draw:{}{}  Style:{}  Ramp:{}  Speed:{:.4}  Theme:{}",
            renderer.fps(),
            renderer.model_name().unwrap_or("none"),
            renderer.cols(),
            renderer.rows(),
            if config.monochrome { "mono" } else { "color" },
            if config.halftone { "+halftone" } else { "" },
            renderer.style().name(),
            config.glyph_ramp.len(),
            config.rotation_speed,
            theme.name(),
        )
        .map_err(|_| io::Error::other("failed to format HUD"))?;
    } else {
        buf.push_str("no renderers registered");
    }
    truncate_and_pad_in_place(buf, width);

    queue!(
        stdout,
        cursor::MoveTo(0, 0),
        SetBackgroundColor(make_color(0, 0, 0, use_truecolor)),
        SetForegroundColor(make_color(245, 245, 245, use_truecolor)),
        Print(buf.as_str())
    )?;

    buf.clear();
    buf.push_str(
        "Space:Pause  M:Mono  T:Theme  H:Halftone  V:Wireframe  +/-:Speed  Tab:HUD  Q/Esc:Quit",
    );
    truncate_and_pad_in_place(buf, width);

    queue!(
        stdout,
        cursor::MoveTo(0, rows.saturating_sub(1)),
        SetBackgroundColor(make_color(0, 0, 0, use_truecolor)),
        SetForegroundColor(make_color(220, 220, 220, use_truecolor)),
        Print(buf.as_str())
    )?;

    Ok(())
}
