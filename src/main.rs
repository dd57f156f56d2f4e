use clap::Parser;
use crossterm::{
    cursor,
    event::EnableFocusChange,
    execute,
    terminal::{self, ClearType, EnterAlternateScreen},
};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod app;
mod camera;
mod config;
mod container;
mod demo;
mod input;
mod math;
mod mesh;
mod parser;
mod registry;
mod render;
mod renderer;
mod scene;
mod terminal_setup;

use app::App;
use config::{parse_hex_color, FileConfig, RampPolarity, RenderConfig, RotationStyle, Theme};
use container::Container;
use demo::DemoKind;
use renderer::Renderer;
use scene::RenderStyle;
use terminal_setup::{cleanup_terminal, install_panic_hook};

pub type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(
    name = "glyphspin",
    version,
    about = "Terminal-native 3D model viewer with ASCII/halftone rendering"
)]
struct Cli {
    /// Path to a Wavefront .obj model (renders the demo cube if omitted)
    input: Option<PathBuf>,
    #[arg(long, value_enum, conflicts_with = "input", help = "Render a built-in demo mesh")]
    demo: Option<DemoKind>,
    #[arg(long, value_name = "PX", help = "Raster pixels per character cell")]
    cell_size: Option<u32>,
    #[arg(long, help = "Target frames per second")]
    fps: Option<f32>,
    #[arg(long, help = "Start in full-color mode instead of monochrome")]
    color: bool,
    #[arg(long, help = "Start with the halftone dot ramp")]
    halftone: bool,
    #[arg(long, help = "Draw the mesh as wireframe edges")]
    wireframe: bool,
    #[arg(long, help = "Disable auto-rotation")]
    no_rotate: bool,
    #[arg(long, help = "Tumble on all three axes instead of yaw only")]
    tumble: bool,
    #[arg(long, value_name = "RAD", help = "Rotation speed in radians per frame")]
    speed: Option<f32>,
    #[arg(long, value_name = "HEX", help = "Monochrome tint color, e.g. '#00ff00'")]
    tint: Option<String>,
    #[arg(long, value_name = "HEX", help = "Background fill color (default transparent)")]
    background: Option<String>,
    #[arg(long, help = "Start with the light theme (black glyphs)")]
    light: bool,
    #[arg(long, value_name = "PATH", help = "Path to a glyphspin.toml config file")]
    config: Option<PathBuf>,
}

/// Merge precedence: CLI flag > config file > theme tint > built-in default.
fn build_config(cli: &Cli, file: &FileConfig, theme: Theme) -> AppResult<RenderConfig> {
    let halftone = cli.halftone || file.halftone.unwrap_or(false);
    let mut config = if halftone {
        RenderConfig::halftone_preset()
    } else {
        RenderConfig::default()
    };

    if let Some(ramp) = &file.glyph_ramp {
        config.glyph_ramp = ramp.chars().collect();
    }
    if let Some(polarity) = &file.polarity {
        config.ramp_polarity = RampPolarity::parse(polarity)
            .ok_or_else(|| format!("config error: unknown polarity '{polarity}'"))?;
    }
    if let Some(style) = &file.rotation_style {
        config.rotation_style = RotationStyle::parse(style)
            .ok_or_else(|| format!("config error: unknown rotation style '{style}'"))?;
    }
    if let Some(cell_size) = file.cell_size {
        config.cell_size = cell_size;
    }
    if let Some(fps) = file.fps {
        config.target_fps = fps;
    }
    if let Some(auto_rotate) = file.auto_rotate {
        config.auto_rotate = auto_rotate;
    }
    if let Some(speed) = file.rotation_speed {
        config.rotation_speed = speed;
    }
    if let Some(size) = file.halftone_cell_size {
        config.halftone_cell_size = size;
    }
    if let Some(levels) = file.color_levels {
        config.color_levels = levels;
    }
    if let Some(monochrome) = file.monochrome {
        config.monochrome = monochrome;
    }

    if let Some(cell_size) = cli.cell_size {
        config.cell_size = cell_size;
    }
    if let Some(fps) = cli.fps {
        config.target_fps = fps;
    }
    if cli.color {
        config.monochrome = false;
    }
    if cli.no_rotate {
        config.auto_rotate = false;
    }
    if cli.tumble {
        config.rotation_style = RotationStyle::Tumble;
    }
    if let Some(speed) = cli.speed {
        config.rotation_speed = speed;
    }

    let tint_text = cli.tint.as_deref().or(file.tint.as_deref());
    config.tint_color = match tint_text {
        Some(text) => parse_hex_color(text)
            .ok_or_else(|| format!("config error: invalid tint color '{text}'"))?,
        None => theme.glyph_color(),
    };

    let background_text = cli.background.as_deref().or(file.background.as_deref());
    if let Some(text) = background_text {
        if text == "transparent" {
            config.background_color = None;
        } else {
            config.background_color = Some(
                parse_hex_color(text)
                    .ok_or_else(|| format!("config error: invalid background color '{text}'"))?,
            );
        }
    }

    Ok(config)
}

fn main() -> AppResult<()> {
    install_panic_hook();
    let cli = Cli::parse();

    let theme = if cli.light { Theme::Light } else { Theme::Dark };
    let file = config::load_file_config(cli.config.as_deref())?;
    let config = build_config(&cli, &file, theme)?;

    let container = Container::from_terminal("main", config.cell_size);
    let mut renderer = Renderer::new(&container, config)?;
    if cli.wireframe {
        renderer.set_style(RenderStyle::Wireframe);
    }

    match (&cli.input, cli.demo) {
        (Some(path), _) => {
            let path_str = path.to_str().ok_or_else(|| {
                format!("input path contains non-UTF-8 characters: {}", path.display())
            })?;
            renderer.load_model(path_str)?;
        }
        (None, kind) => renderer.load_demo(kind.unwrap_or(DemoKind::Cube)),
    }

    renderer.set_visible(true);
    renderer.start();

    let mut app = App::new(container, theme);
    app.registry.register(renderer);

    terminal::enable_raw_mode()?;
    let input_rx = input::spawn_input_thread();
    let mut stdout = BufWriter::with_capacity(1024 * 1024, io::stdout());

    execute!(
        stdout,
        EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(ClearType::All)
    )?;
    // Focus reporting drives the visibility gating; not every terminal
    // supports it, so failure is fine.
    let _ = execute!(stdout, EnableFocusChange);
    stdout.flush()?;

    let run_result = app.run(&input_rx, &mut stdout);
    let cleanup_result = cleanup_terminal(&mut stdout);

    run_result?;
    cleanup_result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli::parse_from(["glyphspin"])
    }

    #[test]
    fn defaults_take_the_dark_theme_tint() {
        let config =
            build_config(&base_cli(), &FileConfig::default(), Theme::Dark).expect("build");
        assert_eq!(config.tint_color, [255, 255, 255]);
        assert!(config.monochrome);
        assert!(!config.halftone);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let mut cli = base_cli();
        cli.cell_size = Some(2);
        cli.fps = Some(60.0);
        cli.color = true;
        cli.tint = Some("#112233".to_string());
        let file = FileConfig {
            cell_size: Some(8),
            fps: Some(15.0),
            tint: Some("#445566".to_string()),
            ..FileConfig::default()
        };
        let config = build_config(&cli, &file, Theme::Dark).expect("build");
        assert_eq!(config.cell_size, 2);
        assert_eq!(config.target_fps, 60.0);
        assert!(!config.monochrome);
        assert_eq!(config.tint_color, [0x11, 0x22, 0x33]);
    }

    #[test]
    fn file_values_apply_when_cli_is_silent() {
        let file = FileConfig {
            halftone: Some(true),
            polarity: Some("standard".to_string()),
            rotation_style: Some("tumble".to_string()),
            background: Some("#000000".to_string()),
            ..FileConfig::default()
        };
        let config = build_config(&base_cli(), &file, Theme::Dark).expect("build");
        assert!(config.halftone);
        assert_eq!(config.ramp_polarity, RampPolarity::Standard);
        assert_eq!(config.rotation_style, RotationStyle::Tumble);
        assert_eq!(config.background_color, Some([0, 0, 0]));
    }

    #[test]
    fn bad_color_and_polarity_are_rejected() {
        let mut cli = base_cli();
        cli.tint = Some("not-a-color".to_string());
        assert!(build_config(&cli, &FileConfig::default(), Theme::Dark).is_err());

        let file = FileConfig {
            polarity: Some("diagonal".to_string()),
            ..FileConfig::default()
        };
        assert!(build_config(&base_cli(), &file, Theme::Dark).is_err());
    }
}
