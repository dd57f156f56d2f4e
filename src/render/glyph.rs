use crate::config::RampPolarity;

/// Mean luminance of an RGB sample, in [0, 1].
pub fn brightness(rgb: [u8; 3]) -> f32 {
    (rgb[0] as f32 + rgb[1] as f32 + rgb[2] as f32) / (3.0 * 255.0)
}

/// Ramp index for a brightness value. Standard polarity maps bright to
/// dense; Inverted maps bright to light (the halftone dot convention).
pub fn glyph_index(ramp_len: usize, polarity: RampPolarity, brightness: f32) -> usize {
    let max_idx = ramp_len.saturating_sub(1);
    let effective = match polarity {
        RampPolarity::Standard => brightness,
        RampPolarity::Inverted => 1.0 - brightness,
    };
    let idx = (effective * max_idx as f32).floor();
    (idx.max(0.0) as usize).min(max_idx)
}

pub fn glyph_for(ramp: &[char], polarity: RampPolarity, brightness: f32) -> char {
    ramp[glyph_index(ramp.len(), polarity, brightness)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

    #[test]
    fn index_stays_in_bounds_across_the_unit_interval() {
        for polarity in [RampPolarity::Standard, RampPolarity::Inverted] {
            for step in 0..=1000 {
                let b = step as f32 / 1000.0;
                let idx = glyph_index(RAMP.len(), polarity, b);
                assert!(idx < RAMP.len(), "b={b} idx={idx}");
            }
        }
    }

    #[test]
    fn extremes_map_to_extreme_indices() {
        assert_eq!(glyph_index(RAMP.len(), RampPolarity::Standard, 0.0), 0);
        assert_eq!(glyph_index(RAMP.len(), RampPolarity::Standard, 1.0), 9);
        assert_eq!(glyph_index(RAMP.len(), RampPolarity::Inverted, 0.0), 9);
        assert_eq!(glyph_index(RAMP.len(), RampPolarity::Inverted, 1.0), 0);
    }

    #[test]
    fn out_of_range_brightness_clamps() {
        assert_eq!(glyph_index(RAMP.len(), RampPolarity::Standard, -0.5), 0);
        assert_eq!(glyph_index(RAMP.len(), RampPolarity::Standard, 1.5), 9);
        assert_eq!(glyph_index(RAMP.len(), RampPolarity::Inverted, -0.5), 9);
    }

    #[test]
    fn single_entry_ramp_always_maps_to_it() {
        for step in 0..=10 {
            assert_eq!(glyph_index(1, RampPolarity::Standard, step as f32 / 10.0), 0);
        }
    }

    #[test]
    fn brightness_is_mean_luminance() {
        assert_eq!(brightness([0, 0, 0]), 0.0);
        assert_eq!(brightness([255, 255, 255]), 1.0);
        assert!((brightness([204, 204, 204]) - 0.8).abs() < 1e-6);
    }
}
