//! Marquee viewer
//!
//! Opens the window with the settings from `marquee.toml` / `marquee.ron` in
//! the working directory, or the defaults.

use marquee_engine::prelude::*;

/// Thin application layer: Escape quits when the panel has no focus
struct Viewer;

impl Application for Viewer {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let controls = engine.controls();
        log::info!(
            "Showing {} line(s), fov {:.0}, floor {}, text {}",
            engine.layout().lines().len(),
            controls.fov,
            controls.floor_color,
            controls.text_color
        );
        Ok(())
    }

    fn handle_event(&mut self, engine: &mut Engine, event: &InputEvent) -> Result<(), AppError> {
        if *event == InputEvent::KeyPressed(Key::Escape) && engine.panel().focus().is_none() {
            engine.quit();
            return Ok(());
        }
        engine.handle_input(event).map_err(AppError::from)
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        if let Some(path) = engine.last_screenshot() {
            log::info!("Last screenshot: {}", path.display());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    marquee_engine::foundation::logging::init();

    let config = MarqueeConfig::load_or_default(".")
        .map_err(|e| AppError::Config(e.to_string()))?;
    Engine::run(config, &mut Viewer)?;
    Ok(())
}
