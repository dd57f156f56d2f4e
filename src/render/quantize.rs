/// Snap one channel to `levels` steps: round(round(v/255 * levels) / levels
/// * 255), clamped. Pure and idempotent; high level counts approach the
/// identity.
pub fn quantize_channel(value: u8, levels: u32) -> u8 {
    let levels = levels.max(1) as f32;
    let stepped = (value as f32 / 255.0 * levels).round() / levels * 255.0;
    stepped.round().clamp(0.0, 255.0) as u8
}

pub fn quantize_rgb(rgb: [u8; 3], levels: u32) -> [u8; 3] {
    [
        quantize_channel(rgb[0], levels),
        quantize_channel(rgb[1], levels),
        quantize_channel(rgb[2], levels),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [u32; 9] = [1, 2, 3, 4, 5, 8, 16, 64, 255];

    #[test]
    fn quantizing_twice_is_idempotent() {
        for levels in LEVELS {
            for v in 0..=255_u8 {
                let once = quantize_channel(v, levels);
                assert_eq!(
                    quantize_channel(once, levels),
                    once,
                    "levels={levels} v={v}"
                );
            }
        }
    }

    #[test]
    fn output_always_in_range_and_extremes_fixed() {
        for levels in LEVELS {
            assert_eq!(quantize_channel(0, levels), 0);
            assert_eq!(quantize_channel(255, levels), 255);
        }
    }

    #[test]
    fn max_levels_is_identity() {
        for v in 0..=255_u8 {
            assert_eq!(quantize_channel(v, 255), v);
        }
    }

    #[test]
    fn one_level_collapses_to_black_or_white() {
        for v in 0..=255_u8 {
            let q = quantize_channel(v, 1);
            assert!(q == 0 || q == 255, "v={v} q={q}");
        }
        assert_eq!(quantize_channel(100, 1), 0);
        assert_eq!(quantize_channel(200, 1), 255);
    }

    #[test]
    fn rgb_quantizes_per_channel() {
        assert_eq!(quantize_rgb([100, 200, 0], 1), [0, 255, 0]);
        assert_eq!(quantize_rgb([7, 120, 250], 255), [7, 120, 250]);
    }
}
