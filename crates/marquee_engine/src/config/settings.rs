//! Application configuration structures
//!
//! Every section carries `#[serde(default)]` so a config file only needs to
//! mention the values it overrides.

use super::{Config, ConfigError};
use crate::foundation::color::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names tried by [`MarqueeConfig::load_or_default`], in order
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["marquee.toml", "marquee.ron"];

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Render backend settings
    pub renderer: RendererConfig,
    /// Initial values of the settings panel
    pub controls: ControlDefaults,
    /// Screenshot output
    pub capture: CaptureConfig,
}

impl Config for MarqueeConfig {}

impl MarqueeConfig {
    /// Load the first default config file found in `dir`, or fall back to defaults
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        for name in DEFAULT_CONFIG_FILES {
            let path = dir.join(name);
            if path.is_file() {
                log::info!("Loading configuration from {}", path.display());
                return Self::load_from_file(&path);
            }
        }
        log::info!("No configuration file found in {}, using defaults", dir.display());
        Ok(Self::default())
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in pixels
    pub width: u32,
    /// Initial height in pixels
    pub height: u32,
    /// Whether the window can be resized
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Marquee".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

/// Render backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Background clear colour
    pub clear_color: Color,
    /// Keep the colour target readable after presentation (needed for screenshots)
    pub preserve_drawing_buffer: bool,
    /// Whether to enable Vulkan validation layers (`None` = debug builds only)
    pub enable_validation: Option<bool>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            preserve_drawing_buffer: true,
            enable_validation: None,
        }
    }
}

/// Initial values of the settings panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlDefaults {
    /// Multi-line text, lines separated by `\n`
    pub text: String,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Floor colour
    pub floor_color: Color,
    /// Text colour
    pub text_color: Color,
    /// Optional JSON typeface; the built-in block typeface is used otherwise
    pub font_path: Option<PathBuf>,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        Self {
            text: "BIG TEXT\nIS FUNNY".to_string(),
            fov: 45.0,
            floor_color: Color::from_rgb8(0x15, 0x15, 0x15),
            text_color: Color::WHITE,
            font_path: None,
        }
    }
}

/// Screenshot output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Directory the screenshot is written to
    pub output_dir: PathBuf,
    /// Screenshot file name
    pub file_name: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_name: "canvas.png".to_string(),
        }
    }
}
