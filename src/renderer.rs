use std::path::Path;
use std::time::Instant;

use crate::config::RenderConfig;
use crate::container::Container;
use crate::demo::{self, DemoKind};
use crate::parser::obj;
use crate::render::compositor;
use crate::render::raster::render_scene;
use crate::render::sampler::{downsample, SampleGrid};
use crate::render::{RasterState, TextFrame};
use crate::scene::{RenderStyle, Scene, MODEL_EXTENT};

use crate::AppResult;

/// Terminal character cells are roughly twice as tall as wide.
const TERMINAL_PIXEL_ASPECT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Terminal state; nothing restarts a destroyed renderer.
    Destroyed,
}

/// One complete rendering pipeline bound to a container: 3D scene, scratch
/// raster, staging sample grid, and scheduling state. Instances never share
/// anything; a registry may broadcast calls across them.
#[derive(Debug)]
pub struct Renderer {
    container_id: String,
    config: RenderConfig,
    scene: Scene,
    raster: RasterState,
    grid: SampleGrid,
    width: u32,
    height: u32,
    cols: usize,
    rows: usize,
    state: RunState,
    visible: bool,
    last_frame: Option<Instant>,
    frame_count: u64,
    fps: f32,
}

impl Renderer {
    /// Fails fast on an invalid config; the container must already exist.
    pub fn new(container: &Container, config: RenderConfig) -> AppResult<Self> {
        config.validate()?;
        let mut renderer = Self {
            container_id: container.id().to_string(),
            config,
            scene: Scene::new(TERMINAL_PIXEL_ASPECT),
            raster: RasterState::new(0, 0),
            grid: SampleGrid::default(),
            width: 0,
            height: 0,
            cols: 0,
            rows: 0,
            state: RunState::Idle,
            visible: true,
            last_frame: None,
            frame_count: 0,
            fps: 0.0,
        };
        renderer.update_dimensions(container);
        Ok(renderer)
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn model_name(&self) -> Option<&str> {
        self.scene.model_name()
    }

    pub fn style(&self) -> RenderStyle {
        self.scene.style
    }

    pub fn set_style(&mut self, style: RenderStyle) {
        self.scene.style = style;
    }

    pub fn toggle_style(&mut self) -> RenderStyle {
        self.scene.style = self.scene.style.toggled();
        self.scene.style
    }

    /// Load an OBJ model, replacing any resident one. The prior model is
    /// removed first, so a failed load leaves the scene empty and the
    /// renderer keeps drawing background frames.
    pub fn load_model(&mut self, path: &str) -> AppResult<()> {
        self.scene.clear_model();
        let mut mesh = obj::load_obj_file(path)?;
        mesh.normalize_to_extent(MODEL_EXTENT);
        let name = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model");
        self.scene.set_model(name, mesh);
        Ok(())
    }

    /// Install a built-in procedural mesh.
    pub fn load_demo(&mut self, kind: DemoKind) {
        self.scene.clear_model();
        let mut mesh = demo::generate(kind);
        mesh.normalize_to_extent(MODEL_EXTENT);
        self.scene.set_model(kind.name(), mesh);
    }

    /// Idempotent; a no-op once destroyed.
    pub fn start(&mut self) {
        if self.state == RunState::Idle {
            self.state = RunState::Running;
        }
    }

    /// Idempotent; guarantees no further frame is drawn until `start`.
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Idle;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == RunState::Destroyed
    }

    /// Stop the loop, drop the scene's model, release the buffers, and
    /// detach from visibility events. Irreversible; safe to call twice.
    pub fn destroy(&mut self) {
        if self.state == RunState::Destroyed {
            return;
        }
        self.stop();
        self.scene.clear_model();
        self.raster.resize(0, 0);
        self.grid.resize(0, 0);
        self.cols = 0;
        self.rows = 0;
        self.visible = false;
        self.state = RunState::Destroyed;
    }

    /// Visibility-observer hook: the loop runs only while the container is
    /// on screen.
    pub fn set_visible(&mut self, visible: bool) {
        if self.state == RunState::Destroyed {
            return;
        }
        self.visible = visible;
        if visible {
            self.start();
        } else {
            self.stop();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Recompute the character grid from the container's current pixel
    /// dimensions and resize both surfaces. Safe before any model is loaded
    /// and before layout settles; zero-sized results make ticks no-op.
    pub fn update_dimensions(&mut self, container: &Container) {
        if self.state == RunState::Destroyed {
            return;
        }
        self.width = container.width();
        self.height = container.height();
        let cell = self.config.cell_size.max(1);
        self.cols = (self.width / cell) as usize;
        self.rows = (self.height / cell) as usize;
        self.raster.resize(self.width as usize, self.height as usize);
        self.grid.resize(self.cols, self.rows);
    }

    /// Re-tint monochrome output, e.g. when the page theme flips.
    pub fn update_color(&mut self, color: [u8; 3]) {
        self.config.tint_color = color;
    }

    pub fn toggle_monochrome(&mut self) -> bool {
        self.config.monochrome = !self.config.monochrome;
        self.config.monochrome
    }

    pub fn set_monochrome(&mut self, enabled: bool) {
        self.config.monochrome = enabled;
    }

    /// Swap between the classic ramp and the halftone dot preset, keeping
    /// the instance-specific fields (tint, background, pacing, rotation).
    pub fn toggle_halftone(&mut self) -> bool {
        let preset = if self.config.halftone {
            RenderConfig::default()
        } else {
            RenderConfig::halftone_preset()
        };
        self.config.glyph_ramp = preset.glyph_ramp;
        self.config.ramp_polarity = preset.ramp_polarity;
        self.config.halftone = preset.halftone;
        self.config.halftone_cell_size = preset.halftone_cell_size;
        self.config.color_levels = preset.color_levels;
        self.config.halftone
    }

    pub fn adjust_rotation_speed(&mut self, factor: f32) {
        self.config.rotation_speed = (self.config.rotation_speed * factor).clamp(0.0005, 0.2);
    }

    /// One scheduler tick. Draws at most one frame, honoring the FPS gate,
    /// visibility, and the run state; a gated or degenerate tick mutates
    /// nothing and returns None.
    pub fn tick(&mut self, now: Instant) -> Option<TextFrame> {
        if self.state != RunState::Running || !self.visible {
            return None;
        }
        if let Some(last) = self.last_frame {
            if now.duration_since(last) < self.config.min_frame_delta() {
                return None;
            }
        }
        if self.cols == 0 || self.rows == 0 {
            return None;
        }

        if let Some(last) = self.last_frame {
            let delta = now.duration_since(last).as_secs_f32().max(1e-6);
            let instant_fps = 1.0 / delta;
            self.fps = if self.fps <= 0.01 {
                instant_fps
            } else {
                0.90 * self.fps + 0.10 * instant_fps
            };
        }
        self.last_frame = Some(now);
        self.frame_count += 1;

        if self.config.auto_rotate {
            self.scene
                .advance_rotation(self.config.rotation_style, self.config.rotation_speed);
        }

        render_scene(&self.scene, &mut self.raster);
        downsample(&self.raster, &mut self.grid);
        Some(compositor::compose(&self.grid, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ten_glyph_config() -> RenderConfig {
        RenderConfig {
            cell_size: 4,
            glyph_ramp: " .:-=+*#%@".chars().collect(),
            target_fps: 30.0,
            halftone: false,
            ..RenderConfig::default()
        }
    }

    fn make_renderer(width: u32, height: u32, config: RenderConfig) -> Renderer {
        let container = Container::from_pixels("hero", width, height);
        Renderer::new(&container, config).expect("construct")
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let container = Container::from_pixels("hero", 400, 320);
        let mut config = RenderConfig::default();
        config.glyph_ramp.clear();
        assert!(Renderer::new(&container, config).is_err());
    }

    #[test]
    fn grid_dimensions_floor_pixel_size_over_cell_size() {
        let config = RenderConfig {
            cell_size: 8,
            ..ten_glyph_config()
        };
        let renderer = make_renderer(400, 320, config);
        assert_eq!(renderer.cols(), 50);
        assert_eq!(renderer.rows(), 40);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut renderer = make_renderer(400, 320, ten_glyph_config());
        assert!(!renderer.is_running());
        renderer.start();
        renderer.start();
        assert!(renderer.is_running());
        renderer.stop();
        renderer.stop();
        assert!(!renderer.is_running());
    }

    #[test]
    fn frame_rate_gate_executes_one_of_two_close_draws() {
        let mut renderer = make_renderer(400, 320, ten_glyph_config());
        renderer.load_demo(DemoKind::Cube);
        renderer.start();

        let t0 = Instant::now();
        let first = renderer.tick(t0);
        assert!(first.is_some());
        // 10ms later with a ~33.3ms budget: gated, nothing mutated.
        let count_before = renderer.frame_count();
        let second = renderer.tick(t0 + Duration::from_millis(10));
        assert!(second.is_none());
        assert_eq!(renderer.frame_count(), count_before);
        // Past the budget the next draw executes.
        let third = renderer.tick(t0 + Duration::from_millis(40));
        assert!(third.is_some());
    }

    #[test]
    fn end_to_end_first_frame_matches_the_configured_grid_and_ramp() {
        let config = ten_glyph_config();
        let ramp = config.glyph_ramp.clone();
        let mut renderer = make_renderer(400, 320, config);
        renderer.load_demo(DemoKind::Cube);
        renderer.set_visible(true);
        renderer.start();

        let frame = renderer.tick(Instant::now()).expect("first frame");
        assert_eq!(renderer.cols(), 100);
        assert_eq!(renderer.rows(), 80);
        assert_eq!((frame.cols, frame.rows), (100, 80));
        assert!(frame.drawn_cells().count() > 0, "cube should be visible");
        for cell in frame.drawn_cells() {
            assert!(ramp.contains(&cell.ch));
        }
    }

    #[test]
    fn hidden_renderer_draws_nothing() {
        let mut renderer = make_renderer(400, 320, ten_glyph_config());
        renderer.load_demo(DemoKind::Cube);
        renderer.start();
        renderer.set_visible(false);
        assert!(!renderer.is_visible());
        assert!(!renderer.is_running());
        assert!(renderer.tick(Instant::now()).is_none());
        renderer.set_visible(true);
        assert!(renderer.is_visible());
        assert!(renderer.is_running());
        assert!(renderer.tick(Instant::now()).is_some());
    }

    #[test]
    fn zero_sized_container_ticks_safely() {
        let mut renderer = make_renderer(0, 0, ten_glyph_config());
        renderer.load_demo(DemoKind::Cube);
        renderer.start();
        assert_eq!(renderer.cols(), 0);
        assert!(renderer.tick(Instant::now()).is_none());

        // Dimensions arriving later unblock drawing.
        let container = Container::from_pixels("hero", 400, 320);
        renderer.update_dimensions(&container);
        assert!(renderer.tick(Instant::now()).is_some());
    }

    #[test]
    fn modelless_renderer_keeps_running_with_empty_frames() {
        let mut renderer = make_renderer(400, 320, ten_glyph_config());
        assert!(renderer.load_model("/nonexistent/model.obj").is_err());
        renderer.start();
        let frame = renderer.tick(Instant::now()).expect("still draws");
        assert_eq!(frame.drawn_cells().count(), 0);
        assert!(renderer.is_running());
    }

    #[test]
    fn destroy_is_terminal_and_inert() {
        let mut renderer = make_renderer(400, 320, ten_glyph_config());
        renderer.load_demo(DemoKind::Cube);
        renderer.start();
        renderer.destroy();
        assert!(renderer.is_destroyed());
        assert!(renderer.tick(Instant::now()).is_none());

        // Neither the observer nor start() revives it.
        renderer.set_visible(true);
        renderer.start();
        assert!(!renderer.is_running());
        assert!(renderer.tick(Instant::now()).is_none());

        renderer.destroy();
        assert!(renderer.is_destroyed());
    }

    #[test]
    fn monochrome_toggle_round_trips() {
        let mut renderer = make_renderer(400, 320, ten_glyph_config());
        let initial = renderer.config().monochrome;
        assert_eq!(renderer.toggle_monochrome(), !initial);
        assert_eq!(renderer.toggle_monochrome(), initial);
        renderer.set_monochrome(false);
        assert!(!renderer.config().monochrome);
    }

    #[test]
    fn halftone_toggle_swaps_ramp_and_quantization() {
        let mut renderer = make_renderer(400, 320, ten_glyph_config());
        renderer.update_color([10, 20, 30]);
        assert!(renderer.toggle_halftone());
        assert!(renderer.config().halftone);
        assert_eq!(renderer.config().halftone_cell_size, 4);
        // Instance tint survives the preset swap.
        assert_eq!(renderer.config().tint_color, [10, 20, 30]);
        assert!(!renderer.toggle_halftone());
        assert!(!renderer.config().halftone);
    }
}
