use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::config::Theme;
use crate::container::Container;
use crate::input::{self, InputReceiver};
use crate::registry::RendererRegistry;
use crate::render::hud;
use crate::render::surface::TermSurface;

use crate::AppResult;

/// Loop granularity. Finer than any sane target FPS; the per-renderer
/// frame gate decides what actually draws.
pub const SCHED_TICK: Duration = Duration::from_millis(4);

/// Page-level controller: owns the registry, the container, and the theme,
/// and drives the frame loop. Renderers never reach outward; theme changes
/// and visibility flow inward through explicit calls.
#[derive(Debug)]
pub struct App {
    pub registry: RendererRegistry,
    pub container: Container,
    pub theme: Theme,
    pub show_hud: bool,
    pub quit: bool,
    needs_clear: bool,
    hud_buf: String,
}

impl App {
    pub fn new(container: Container, theme: Theme) -> Self {
        Self {
            registry: RendererRegistry::new(),
            container,
            theme,
            show_hud: true,
            quit: false,
            needs_clear: true,
            hud_buf: String::with_capacity(256),
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.registry.broadcast_color(self.theme.glyph_color());
    }

    pub fn toggle_monochrome(&mut self) -> bool {
        self.registry.toggle_all_monochrome()
    }

    pub fn toggle_halftone(&mut self) {
        for renderer in self.registry.iter_mut() {
            renderer.toggle_halftone();
        }
        self.needs_clear = true;
    }

    pub fn toggle_style(&mut self) {
        for renderer in self.registry.iter_mut() {
            renderer.toggle_style();
        }
    }

    pub fn toggle_hud(&mut self) {
        self.show_hud = !self.show_hud;
        self.needs_clear = true;
    }

    /// Pause/resume: stop everything if anything runs, else start everything.
    pub fn toggle_running(&mut self) {
        let any_running = self.registry.iter().any(|r| r.is_running());
        for renderer in self.registry.iter_mut() {
            if any_running {
                renderer.stop();
            } else {
                renderer.start();
            }
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        for renderer in self.registry.iter_mut() {
            renderer.set_visible(visible);
        }
    }

    pub fn adjust_speed(&mut self, factor: f32) {
        for renderer in self.registry.iter_mut() {
            renderer.adjust_rotation_speed(factor);
        }
    }

    /// Re-derive container pixel size from the terminal and push the new
    /// dimensions into every renderer.
    pub fn refresh_dimensions(&mut self) {
        for renderer in self.registry.iter_mut() {
            self.container.refresh(renderer.config().cell_size);
            renderer.update_dimensions(&self.container);
        }
        self.needs_clear = true;
    }

    pub fn run(
        &mut self,
        input_rx: &InputReceiver,
        stdout: &mut io::BufWriter<io::Stdout>,
    ) -> AppResult<()> {
        let use_truecolor = crate::render::detect_truecolor();
        let mut surface = TermSurface::new(use_truecolor);

        loop {
            let loop_start = Instant::now();

            if input::drain_input_events(self, input_rx)? {
                break;
            }

            if self.needs_clear {
                surface.clear(stdout)?;
                self.needs_clear = false;
            }

            let now = Instant::now();
            let mut drew = false;
            for renderer in self.registry.iter_mut() {
                if let Some(frame) = renderer.tick(now) {
                    surface.draw_frame(
                        &frame,
                        renderer.config().background_color,
                        self.show_hud,
                        stdout,
                    )?;
                    drew = true;
                }
            }

            if drew && self.show_hud {
                let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
                hud::draw_hud(
                    &self.registry,
                    self.theme,
                    cols,
                    rows,
                    use_truecolor,
                    &mut self.hud_buf,
                    stdout,
                )?;
                surface.invalidate();
            }

            if drew {
                stdout.flush()?;
            }

            let spent = loop_start.elapsed();
            if spent < SCHED_TICK {
                std::thread::sleep(SCHED_TICK - spent);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::renderer::Renderer;

    fn make_app() -> App {
        let container = Container::from_pixels("hero", 160, 80);
        let renderer = Renderer::new(&container, RenderConfig::default()).expect("construct");
        let mut app = App::new(container, Theme::Dark);
        app.registry.register(renderer);
        app
    }

    #[test]
    fn theme_toggle_broadcasts_the_matching_tint() {
        let mut app = make_app();
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
        let tint = app.registry.first().expect("renderer").config().tint_color;
        assert_eq!(tint, [0, 0, 0]);
        app.toggle_theme();
        let tint = app.registry.first().expect("renderer").config().tint_color;
        assert_eq!(tint, [255, 255, 255]);
    }

    #[test]
    fn pause_toggle_flips_all_run_states() {
        let mut app = make_app();
        app.registry.get_mut("hero").expect("hero").start();
        app.toggle_running();
        assert!(!app.registry.first().expect("renderer").is_running());
        app.toggle_running();
        assert!(app.registry.first().expect("renderer").is_running());
    }

    #[test]
    fn speed_adjustment_stays_in_bounds() {
        let mut app = make_app();
        for _ in 0..100 {
            app.adjust_speed(1.25);
        }
        let speed = app.registry.first().expect("renderer").config().rotation_speed;
        assert!(speed <= 0.2);
        for _ in 0..100 {
            app.adjust_speed(1.0 / 1.25);
        }
        let speed = app.registry.first().expect("renderer").config().rotation_speed;
        assert!(speed >= 0.0005);
    }
}
