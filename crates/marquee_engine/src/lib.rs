//! # Marquee Engine
//!
//! Multi-line extruded 3D text floating over a reflective floor, with orbit
//! camera controls and a settings panel.
//!
//! ## Features
//!
//! - **Text extrusion**: glyph outlines flattened, tessellated with lyon and extruded on the CPU
//! - **Software rendering**: shadow maps, blurred planar reflection and standard shading
//! - **Vulkan presentation**: finished frames are copied into a GLFW window's swapchain
//! - **Settings panel**: text, field of view, floor and text colour, screenshot export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marquee_engine::prelude::*;
//!
//! struct Viewer;
//!
//! impl Application for Viewer {
//!     fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MarqueeConfig::load_or_default(".")?;
//!     Engine::run(config, &mut Viewer)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod capture;
pub mod config;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;
pub mod text;
pub mod ui;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError, EngineResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, Application, Engine, EngineError,
        capture::{capture_png, export, to_data_url, CaptureError},
        config::{Config, ConfigError, MarqueeConfig},
        foundation::{
            color::Color,
            math::{Mat4, Vec3},
            time::Timer,
        },
        input::{InputEvent, Key, MouseButton},
        render::{Camera, Framebuffer, Mesh, RenderBackend, SoftwareRenderer},
        scene::{SceneDescription, TextLayout},
        ui::{ControlValues, PanelEvent},
    };
}
