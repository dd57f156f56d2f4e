use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::AppResult;

/// Classic terminal ramp, visually light to dense.
pub const CLASSIC_RAMP: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Dot ramp for the halftone/bitmap look.
pub const HALFTONE_RAMP: &str = " \u{00B7}:\u{2219}\u{2022}oO0\u{25CF}\u{2588}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampPolarity {
    /// Brighter sample, denser glyph.
    Standard,
    /// Brighter sample, lighter glyph (halftone dot convention).
    Inverted,
}

impl RampPolarity {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::Standard),
            "inverted" => Some(Self::Inverted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStyle {
    /// Spin around Y only.
    Yaw,
    /// All three axes at 2:3:1 speed ratios.
    Tumble,
}

impl RotationStyle {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "yaw" => Some(Self::Yaw),
            "tumble" => Some(Self::Tumble),
            _ => None,
        }
    }
}

/// Per-renderer pipeline options. Immutable except through the explicit
/// setters on `Renderer` (tint, monochrome, halftone swap).
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Raster pixels per character cell; smaller means more detail and more cost.
    pub cell_size: u32,
    /// Glyph color in monochrome mode.
    pub tint_color: [u8; 3],
    /// None means transparent: the terminal's own background shows through.
    pub background_color: Option<[u8; 3]>,
    /// Light-to-dense glyph ramp; index 0 is the "nothing to draw" glyph.
    pub glyph_ramp: Vec<char>,
    pub ramp_polarity: RampPolarity,
    pub auto_rotate: bool,
    pub rotation_style: RotationStyle,
    /// Radians advanced per drawn frame.
    pub rotation_speed: f32,
    /// Upper bound on draw rate.
    pub target_fps: f32,
    pub halftone: bool,
    /// Sample-grid cells averaged into one glyph when halftone is on.
    pub halftone_cell_size: u32,
    /// Quantization levels per color channel.
    pub color_levels: u32,
    /// Tint-with-opacity draw vs full quantized-color draw.
    pub monochrome: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: 4,
            tint_color: [0, 255, 0],
            background_color: None,
            glyph_ramp: CLASSIC_RAMP.chars().collect(),
            ramp_polarity: RampPolarity::Inverted,
            auto_rotate: true,
            rotation_style: RotationStyle::Yaw,
            rotation_speed: 0.005,
            target_fps: 30.0,
            halftone: false,
            halftone_cell_size: 1,
            color_levels: 64,
            monochrome: true,
        }
    }
}

impl RenderConfig {
    /// The coarse dot-ramp variant.
    pub fn halftone_preset() -> Self {
        Self {
            glyph_ramp: HALFTONE_RAMP.chars().collect(),
            halftone: true,
            halftone_cell_size: 4,
            color_levels: 16,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.glyph_ramp.is_empty() {
            return Err("config error: glyph ramp must not be empty".into());
        }
        if self.cell_size == 0 {
            return Err("config error: cell size must be at least 1".into());
        }
        if self.halftone_cell_size == 0 {
            return Err("config error: halftone cell size must be at least 1".into());
        }
        if self.color_levels == 0 {
            return Err("config error: color levels must be at least 1".into());
        }
        if !(self.target_fps > 0.0) {
            return Err("config error: target fps must be positive".into());
        }
        Ok(())
    }

    pub fn min_frame_delta(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.target_fps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    /// Glyph tint for the current theme: white on dark, black on light.
    pub fn glyph_color(self) -> [u8; 3] {
        match self {
            Self::Dark => [255, 255, 255],
            Self::Light => [0, 0, 0],
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// "#rrggbb" or "rrggbb".
pub fn parse_hex_color(text: &str) -> Option<[u8; 3]> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

// ── TOML overlay ──
//
// Reads `glyphspin.toml` from the CWD or the executable's directory. Every
// field is optional; missing or incomplete files fall back to defaults.
// CLI flags take precedence over the file (merged in main).

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub cell_size: Option<u32>,
    pub fps: Option<f32>,
    pub glyph_ramp: Option<String>,
    pub polarity: Option<String>,
    pub auto_rotate: Option<bool>,
    pub rotation_speed: Option<f32>,
    pub rotation_style: Option<String>,
    pub halftone: Option<bool>,
    pub halftone_cell_size: Option<u32>,
    pub color_levels: Option<u32>,
    pub monochrome: Option<bool>,
    pub tint: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfigRoot {
    render: FileConfig,
}

fn default_config_path() -> Option<PathBuf> {
    let cwd_candidate = PathBuf::from("glyphspin.toml");
    if cwd_candidate.exists() {
        return Some(cwd_candidate);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let exe_candidate = exe_dir.join("glyphspin.toml");
            if exe_candidate.exists() {
                return Some(exe_candidate);
            }
        }
    }
    None
}

/// Load the file overlay. An explicitly given path must exist and parse;
/// the implicit `glyphspin.toml` search falls back to defaults silently.
pub fn load_file_config(explicit: Option<&Path>) -> AppResult<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => return Ok(FileConfig::default()),
        },
    };

    let text = fs::read_to_string(&path)
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    match toml::from_str::<FileConfigRoot>(&text) {
        Ok(root) => Ok(root.render),
        Err(err) if explicit.is_some() => {
            Err(format!("config parse error in '{}': {}", path.display(), err).into())
        }
        Err(_) => Ok(FileConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
        assert!(RenderConfig::halftone_preset().validate().is_ok());
    }

    #[test]
    fn validation_rejects_degenerate_fields() {
        let mut config = RenderConfig::default();
        config.glyph_ramp.clear();
        assert!(config.validate().is_err());

        let config = RenderConfig {
            color_levels: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            halftone_cell_size: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            target_fps: 0.0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn hex_color_parsing() {
        assert_eq!(parse_hex_color("#00ff00"), Some([0, 255, 0]));
        assert_eq!(parse_hex_color("FFFFFF"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("#123"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn file_overlay_parses_partial_tables() {
        let text = "[render]\ncell_size = 6\npolarity = \"standard\"\n";
        let root: FileConfigRoot = toml::from_str(text).expect("parse");
        assert_eq!(root.render.cell_size, Some(6));
        assert_eq!(root.render.polarity.as_deref(), Some("standard"));
        assert_eq!(root.render.fps, None);
    }

    #[test]
    fn explicit_missing_config_path_errors() {
        let missing = Path::new("/nonexistent/glyphspin.toml");
        assert!(load_file_config(Some(missing)).is_err());
    }

    #[test]
    fn theme_colors_match_polarity_of_background() {
        assert_eq!(Theme::Dark.glyph_color(), [255, 255, 255]);
        assert_eq!(Theme::Light.glyph_color(), [0, 0, 0]);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
