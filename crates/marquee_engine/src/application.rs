//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::input::InputEvent;
use thiserror::Error;

/// Application lifecycle trait
///
/// The engine drives the scene on its own; implementors hook into the loop
/// to react to input or add per-frame behaviour.
pub trait Application {
    /// Called once after the engine and window are up
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Called every frame before rendering
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        Ok(())
    }

    /// Render the frame; the default draws the scene
    fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        engine.render_frame().map_err(AppError::from)
    }

    /// Handle one input event; the default routes it to the panel and the orbit controls
    fn handle_event(&mut self, engine: &mut Engine, event: &InputEvent) -> Result<(), AppError> {
        engine.handle_input(event).map_err(AppError::from)
    }

    /// Called once when the loop ends
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
