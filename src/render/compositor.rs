use crate::config::RenderConfig;
use crate::math::clamp_u8;

use super::glyph;
use super::quantize::quantize_rgb;
use super::sampler::SampleGrid;
use super::{GlyphCell, TextFrame};

/// Blocks whose average alpha (0..255 scale) falls at or below this are
/// background and draw nothing.
pub const MIN_VISIBLE_ALPHA: f32 = 0.5;

/// Compose one text frame from the sample grid. Pure: every frame is built
/// fresh, nothing carries over. Halftone mode averages blocks of
/// `halftone_cell_size` grid cells into a single glyph and quantizes their
/// color; otherwise every cell maps 1:1 with the quantizer bypassed.
pub fn compose(grid: &SampleGrid, config: &RenderConfig) -> TextFrame {
    let mut frame = TextFrame::new(grid.cols, grid.rows);
    if grid.cols == 0 || grid.rows == 0 {
        return frame;
    }

    let block = if config.halftone {
        config.halftone_cell_size.max(1) as usize
    } else {
        1
    };
    let blank = config.glyph_ramp[0];

    let mut y = 0;
    while y < grid.rows {
        let mut x = 0;
        while x < grid.cols {
            let y_end = (y + block).min(grid.rows);
            let x_end = (x + block).min(grid.cols);

            let mut acc = [0.0_f32; 4];
            for row in y..y_end {
                for col in x..x_end {
                    let s = grid.get(col, row);
                    acc[0] += s[0];
                    acc[1] += s[1];
                    acc[2] += s[2];
                    acc[3] += s[3];
                }
            }
            let count = ((y_end - y) * (x_end - x)) as f32;
            let avg_alpha = acc[3] / count;

            if avg_alpha > MIN_VISIBLE_ALPHA {
                let rgb = [
                    clamp_u8(acc[0] / count),
                    clamp_u8(acc[1] / count),
                    clamp_u8(acc[2] / count),
                ];
                let rgb = if config.halftone {
                    quantize_rgb(rgb, config.color_levels)
                } else {
                    rgb
                };
                let b = glyph::brightness(rgb);
                let ch = glyph::glyph_for(&config.glyph_ramp, config.ramp_polarity, b);

                if ch != blank {
                    let (fg, opacity) = if config.monochrome {
                        (config.tint_color, b)
                    } else {
                        (rgb, 1.0)
                    };
                    // Glyph sits in the center cell of its block.
                    let cx = (x + block / 2).min(grid.cols - 1);
                    let cy = (y + block / 2).min(grid.rows - 1);
                    frame.set(cx, cy, GlyphCell { ch, fg, opacity });
                }
            }

            x += block;
        }
        y += block;
    }

    frame
}
