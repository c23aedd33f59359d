//! Renderer configuration
//!
//! Builder-style settings handed to the backend and the presenter, derived
//! from the application's [`RendererConfig`] section.

use crate::config::RendererConfig;
use crate::foundation::color::Color;

/// Configuration for the render backend and Vulkan presenter
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Application name for Vulkan instance creation
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Background clear colour
    pub clear_color: Color,
    /// Keep the colour target readable after presentation
    pub preserve_drawing_buffer: bool,
    /// Whether to enable Vulkan validation layers (`None` = debug builds only)
    pub enable_validation: Option<bool>,
}

impl BackendConfig {
    /// Create a new renderer configuration
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            application_version: (0, 1, 0),
            clear_color: Color::BLACK,
            preserve_drawing_buffer: true,
            enable_validation: None,
        }
    }

    /// Set application version
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Set background clear colour
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Keep or discard the colour target after presentation
    pub fn with_preserve_drawing_buffer(mut self, preserve: bool) -> Self {
        self.preserve_drawing_buffer = preserve;
        self
    }

    /// Enable or disable Vulkan validation layers
    pub fn with_validation(mut self, enable: bool) -> Self {
        self.enable_validation = Some(enable);
        self
    }

    /// Resolve the validation flag against the build profile
    pub fn validation_enabled(&self) -> bool {
        self.enable_validation.unwrap_or(cfg!(debug_assertions))
    }

    /// Settings from the configuration file section
    pub fn from_config(app_name: impl Into<String>, config: &RendererConfig) -> Self {
        let mut backend = Self::new(app_name)
            .with_clear_color(config.clear_color)
            .with_preserve_drawing_buffer(config.preserve_drawing_buffer);
        backend.enable_validation = config.enable_validation;
        backend
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new("Marquee")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let section = RendererConfig {
            preserve_drawing_buffer: false,
            enable_validation: Some(true),
            ..RendererConfig::default()
        };
        let config = BackendConfig::from_config("Marquee", &section);
        assert!(!config.preserve_drawing_buffer);
        assert!(config.validation_enabled());
        assert_eq!(config.clear_color, Color::BLACK);
    }
}
