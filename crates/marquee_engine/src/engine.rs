//! Core engine implementation
//!
//! The engine owns the scene state (camera, orbit controls, lights, text
//! layout, floor, settings panel) and the CPU render backend. [`Engine::run`]
//! adds a GLFW window and a Vulkan presenter around it; without them the same
//! engine renders headlessly.

use crate::application::Application;
use crate::capture::{self, CaptureError};
use crate::config::MarqueeConfig;
use crate::foundation::color::Color;
use crate::foundation::math::Vec3;
use crate::foundation::time::Timer;
use crate::input::{InputEvent, MouseButton, OrbitControls, OrbitLimits};
use crate::render::api::{BackendConfig, DrawItem, FloorItem, MeshHandle, RenderBackend, RenderFrameData};
use crate::render::lighting::LightingEnvironment;
use crate::render::material::StandardMaterial;
use crate::render::primitives::{clamp_fov, Camera};
use crate::render::software::{Framebuffer, SoftwareRenderer};
use crate::render::vulkan::{PresentOutcome, Presenter, VulkanError};
use crate::render::window::{Window, WindowError};
use crate::render::RenderError;
use crate::scene::{LayoutChanges, LayoutError, ReflectiveFloor, SceneDescription, TextLayout};
use crate::text::{load_typeface, GlyphSource, TextGeometryOptions, TypefaceError};
use crate::ui::{ControlPanel, ControlValues, PanelEvent};
use std::path::PathBuf;
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine setup failed
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Window creation or surface failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Presenter failure
    #[error("Presentation error: {0}")]
    Presentation(#[from] VulkanError),

    /// Render backend failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Text layout precondition failed
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// The configured typeface could not be loaded
    #[error("Typeface error: {0}")]
    Typeface(#[from] TypefaceError),

    /// Screenshot failed
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Error raised by the application callbacks
    #[error("Application error: {0}")]
    ApplicationError(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Scene host and render loop
pub struct Engine {
    config: MarqueeConfig,
    backend: SoftwareRenderer,
    glyphs: Box<dyn GlyphSource>,
    layout: TextLayout,
    line_meshes: Vec<MeshHandle>,
    floor: ReflectiveFloor,
    floor_mesh: MeshHandle,
    text_material: StandardMaterial,
    text_casts_shadow: bool,
    text_receives_shadow: bool,
    controls: ControlValues,
    panel: ControlPanel,
    camera: Camera,
    orbit: OrbitControls,
    lighting: LightingEnvironment,
    timer: Timer,
    last_screenshot: Option<PathBuf>,
    running: bool,
}

impl Engine {
    /// Build the scene from `config` with a `width`×`height` colour target
    pub fn new(config: MarqueeConfig, width: u32, height: u32) -> EngineResult<Self> {
        log::info!("Initializing engine ({}x{})...", width, height);
        let (width, height) = (width.max(1), height.max(1));

        let controls = ControlValues::from(&config.controls);
        let scene = SceneDescription::from_controls(&controls);
        if log::log_enabled!(log::Level::Trace) {
            match scene.to_json() {
                Ok(json) => log::trace!("Scene description:\n{}", json),
                Err(err) => log::warn!("Scene description could not be dumped: {}", err),
            }
        }

        let mut camera = Camera::perspective(
            scene.camera.position,
            scene.camera.fov,
            width as f32 / height as f32,
            scene.camera.near,
            scene.camera.far,
        );
        camera.look_at(scene.camera.target, Vec3::y());
        let mut orbit = OrbitControls::from_camera(&camera, OrbitLimits::default());
        orbit.set_viewport_height(height as f32);

        let backend_config = BackendConfig::from_config(config.window.title.clone(), &config.renderer);
        let mut backend = SoftwareRenderer::new(backend_config, width, height)?;

        let floor = ReflectiveFloor::new(scene.floor.clone());
        let floor_mesh = backend.create_mesh_resource(floor.mesh())?;

        let glyphs = load_typeface(config.controls.font_path.as_deref())?;
        let layout = TextLayout::new(TextGeometryOptions {
            size: scene.text.size,
            depth: scene.text.depth,
            curve_segments: scene.text.curve_segments,
        });
        let panel = ControlPanel::new(&controls, width as f32, height as f32);

        let mut engine = Self {
            config,
            backend,
            glyphs,
            layout,
            line_meshes: Vec::new(),
            floor,
            floor_mesh,
            text_material: scene.text.material,
            text_casts_shadow: scene.text.cast_shadow,
            text_receives_shadow: scene.text.receive_shadow,
            controls,
            panel,
            camera,
            orbit,
            lighting: scene.lighting,
            timer: Timer::new(),
            last_screenshot: None,
            running: true,
        };
        engine.sync_text()?;
        Ok(engine)
    }

    /// Open the window and run until it closes
    pub fn run<T: Application>(config: MarqueeConfig, app: &mut T) -> EngineResult<()> {
        let mut window = Window::new(&config.window)?;
        let backend_config = BackendConfig::from_config(config.window.title.clone(), &config.renderer);
        let mut presenter = Presenter::new(&mut window, &backend_config)?;

        let (width, height) = window.get_framebuffer_size();
        let mut engine = Self::new(config, width, height)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;

        log::info!("Starting main loop...");
        while engine.running && !window.should_close() {
            engine.timer.update();

            for event in window.poll_events() {
                if matches!(event, InputEvent::Resized { .. }) {
                    presenter.request_recreate();
                }
                app.handle_event(&mut engine, &event)
                    .map_err(|e| EngineError::ApplicationError(format!("App event: {}", e)))?;
            }

            let delta_time = engine.timer.delta_time();
            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;
            app.render(&mut engine)
                .map_err(|e| EngineError::ApplicationError(format!("App render: {}", e)))?;

            if presenter.present(engine.backend.presentation(), window.get_framebuffer_size())? == PresentOutcome::Presented {
                engine.frame_presented();
            }
        }

        app.cleanup(&mut engine);
        window.set_should_close(true);
        drop(presenter);

        log::info!(
            "Engine shutdown complete ({} frames, {:.1} fps average)",
            engine.timer.frame_count(),
            engine.timer.average_fps()
        );
        Ok(())
    }

    /// Route one input event
    ///
    /// The panel sees every event first. Presses it does not claim start an
    /// orbit drag; cursor motion, releases and resizes always reach the orbit
    /// controls so drags end cleanly.
    pub fn handle_input(&mut self, event: &InputEvent) -> EngineResult<()> {
        match *event {
            InputEvent::CloseRequested => {
                self.quit();
                return Ok(());
            }
            InputEvent::Resized { width, height } => self.resize(width, height),
            _ => {}
        }

        let response = self.panel.handle_event(event);
        for panel_event in response.events {
            self.apply_panel_event(panel_event)?;
        }

        if *event == InputEvent::MouseDown(MouseButton::Left) && !response.consumed {
            self.orbit.begin_drag();
        }
        let always = matches!(
            event,
            InputEvent::CursorMoved { .. } | InputEvent::MouseUp(_) | InputEvent::Resized { .. }
        );
        if (always || !response.consumed) && self.orbit.handle_event(event) {
            self.orbit.apply(&mut self.camera);
        }
        Ok(())
    }

    /// Apply a value change or action coming from the panel
    pub fn apply_panel_event(&mut self, event: PanelEvent) -> EngineResult<()> {
        match event {
            PanelEvent::TextChanged(text) => {
                log::debug!("Text changed to {:?}", text);
                self.controls.text = text;
            }
            PanelEvent::FovChanged(fov) => {
                self.controls.fov = clamp_fov(fov);
                self.camera.set_fov_degrees(fov);
            }
            PanelEvent::FloorColorChanged(color) => {
                self.controls.floor_color = color;
                self.floor.set_color(color);
            }
            PanelEvent::TextColorChanged(color) => {
                self.controls.text_color = color;
                self.text_material = self.text_material.clone().with_color(color);
            }
            PanelEvent::ScreenshotRequested => match self.screenshot() {
                Ok(path) => self.last_screenshot = Some(path),
                Err(err) => log::error!("Screenshot failed: {}", err),
            },
        }
        Ok(())
    }

    /// Bring the text meshes up to date and draw one frame into the colour target
    pub fn render_frame(&mut self) -> EngineResult<()> {
        self.sync_text()?;

        let ui = self.panel.to_render_data();
        let items: Vec<DrawItem<'_>> = self
            .line_meshes
            .iter()
            .map(|&mesh| DrawItem {
                mesh,
                material: &self.text_material,
                cast_shadow: self.text_casts_shadow,
                receive_shadow: self.text_receives_shadow,
            })
            .collect();
        let frame = RenderFrameData {
            camera: &self.camera,
            lighting: &self.lighting,
            background: self.background(),
            items: &items,
            floor: Some(FloorItem {
                mesh: self.floor_mesh,
                config: self.floor.config(),
            }),
            ui: &ui,
        };
        self.backend.render_frame(&frame)?;
        Ok(())
    }

    /// Record that the last frame reached the screen
    pub fn frame_presented(&mut self) {
        self.backend.framebuffer_mut().mark_presented();
    }

    /// Write the current colour target to the configured screenshot file
    pub fn screenshot(&self) -> Result<PathBuf, CaptureError> {
        capture::export(self.backend.framebuffer(), &self.config.capture)
    }

    /// Resize the colour target and everything that depends on its size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        if self.backend.get_extent() == (width, height) {
            return;
        }
        self.backend.resize(width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        self.orbit.set_viewport_height(height as f32);
        self.panel.set_screen_size(width as f32, height as f32);
    }

    /// Stop the loop after the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Configuration the engine was built from
    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    /// Current control values
    pub fn controls(&self) -> &ControlValues {
        &self.controls
    }

    /// The settings panel
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    /// Mutable access to the settings panel
    pub fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    /// The camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The orbit controls
    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    /// The text layout
    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    /// The reflective floor
    pub fn floor(&self) -> &ReflectiveFloor {
        &self.floor
    }

    /// The render backend
    pub fn backend(&self) -> &SoftwareRenderer {
        &self.backend
    }

    /// The scene colour target, without the panel; screenshots read this
    pub fn framebuffer(&self) -> &Framebuffer {
        self.backend.framebuffer()
    }

    /// The last frame as shown on screen, panel included
    pub fn presentation(&self) -> &Framebuffer {
        self.backend.presentation()
    }

    /// Path of the last successful screenshot
    pub fn last_screenshot(&self) -> Option<&PathBuf> {
        self.last_screenshot.as_ref()
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    fn background(&self) -> Color {
        self.backend.config().clear_color
    }

    fn sync_text(&mut self) -> EngineResult<()> {
        let changes = self.layout.sync(self.glyphs.as_ref(), &self.controls.text, self.controls.text_color)?;
        if changes.intersects(LayoutChanges::GEOMETRY | LayoutChanges::PLACEMENT | LayoutChanges::REMOVED) {
            self.upload_lines()?;
        }
        Ok(())
    }

    /// Mirror the layout's line meshes into backend resources, reusing handles
    fn upload_lines(&mut self) -> EngineResult<()> {
        let lines = self.layout.lines();
        for (slot, line) in lines.iter().enumerate() {
            let mesh = line.geometry().map_err(LayoutError::from)?;
            match self.line_meshes.get(slot) {
                Some(&handle) => self.backend.update_mesh_resource(handle, mesh)?,
                None => {
                    let handle = self.backend.create_mesh_resource(mesh)?;
                    self.line_meshes.push(handle);
                }
            }
        }
        for handle in self.line_meshes.split_off(lines.len()) {
            self.backend.destroy_mesh_resource(handle)?;
        }
        log::debug!("Uploaded {} line mesh(es)", self.line_meshes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PanelRow;
    use approx::assert_relative_eq;

    fn engine() -> Engine {
        Engine::new(MarqueeConfig::default(), 640, 480).unwrap()
    }

    #[test]
    fn test_default_text_has_two_line_meshes() {
        let engine = engine();
        assert_eq!(engine.layout().lines().len(), 2);
        assert_eq!(engine.line_meshes.len(), 2);
        assert_relative_eq!(engine.camera().fov_degrees(), 45.0, epsilon = 1e-4);
    }

    #[test]
    fn test_text_change_reuses_and_releases_handles() {
        let mut engine = engine();
        let first = engine.line_meshes[0];
        engine.apply_panel_event(PanelEvent::TextChanged("ONE\nTWO\nTHREE".to_string())).unwrap();
        engine.render_frame().unwrap();
        assert_eq!(engine.line_meshes.len(), 3);
        assert_eq!(engine.line_meshes[0], first);

        engine.apply_panel_event(PanelEvent::TextChanged("ONE".to_string())).unwrap();
        engine.render_frame().unwrap();
        assert_eq!(engine.line_meshes.len(), 1);
        assert!(engine.backend().mesh(first).is_some());
    }

    #[test]
    fn test_fov_event_is_clamped() {
        let mut engine = engine();
        engine.apply_panel_event(PanelEvent::FovChanged(150.0)).unwrap();
        assert_relative_eq!(engine.controls().fov, 100.0);
        assert_relative_eq!(engine.camera().fov_degrees(), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_drag_outside_panel_orbits_camera() {
        let mut engine = engine();
        let before = engine.camera().position;
        for event in [
            InputEvent::CursorMoved { x: 20.0, y: 200.0 },
            InputEvent::MouseDown(MouseButton::Left),
            InputEvent::CursorMoved { x: 60.0, y: 190.0 },
            InputEvent::MouseUp(MouseButton::Left),
        ] {
            engine.handle_input(&event).unwrap();
        }
        assert!((engine.camera().position - before).norm() > 1e-3);
        assert_relative_eq!(
            (engine.camera().position - engine.orbit().target()).norm(),
            engine.orbit().distance(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_drag_on_panel_does_not_orbit() {
        let mut engine = engine();
        let before = engine.camera().position;
        let row = engine.panel().row_rect(PanelRow::FloorColor);
        let (x, y) = (row.x + row.width - 4.0, row.y + row.height / 2.0);
        for event in [
            InputEvent::CursorMoved { x, y },
            InputEvent::MouseDown(MouseButton::Left),
            InputEvent::CursorMoved { x: x - 80.0, y: y + 40.0 },
            InputEvent::MouseUp(MouseButton::Left),
        ] {
            engine.handle_input(&event).unwrap();
        }
        assert_eq!(engine.camera().position, before);
    }

    #[test]
    fn test_typing_into_focused_text_row_updates_layout() {
        let mut engine = engine();
        let row = engine.panel().row_rect(PanelRow::Text);
        engine.handle_input(&InputEvent::CursorMoved { x: row.x + row.width - 4.0, y: row.y + 4.0 }).unwrap();
        engine.handle_input(&InputEvent::MouseDown(MouseButton::Left)).unwrap();
        engine.handle_input(&InputEvent::MouseUp(MouseButton::Left)).unwrap();
        engine.handle_input(&InputEvent::KeyPressed(crate::input::Key::Enter)).unwrap();
        engine.handle_input(&InputEvent::Char('x')).unwrap();
        engine.render_frame().unwrap();

        assert!(engine.controls().text.ends_with("\nx"));
        assert_eq!(engine.layout().lines().len(), 3);
        assert_eq!(engine.layout().lines()[0].display_text(), "X");
    }

    #[test]
    fn test_close_request_stops_loop() {
        let mut engine = engine();
        engine.handle_input(&InputEvent::CloseRequested).unwrap();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_resize_updates_target_and_aspect() {
        let mut engine = engine();
        engine.handle_input(&InputEvent::Resized { width: 400, height: 200 }).unwrap();
        assert_eq!(engine.framebuffer().width(), 400);
        assert_relative_eq!(engine.camera().aspect, 2.0);
        engine.handle_input(&InputEvent::Resized { width: 0, height: 0 }).unwrap();
        assert_eq!(engine.framebuffer().width(), 400);
    }
}
