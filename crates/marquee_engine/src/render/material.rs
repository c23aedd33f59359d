//! Material system for rendering

use crate::foundation::color::Color;
use serde::{Deserialize, Serialize};

/// Metal/rough surface description used for the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardMaterial {
    /// Base color
    pub color: Color,

    /// Metallic factor (0.0 = dielectric, 1.0 = metallic)
    pub metalness: f32,

    /// Roughness factor (0.0 = mirror, 1.0 = completely rough)
    pub roughness: f32,
}

impl StandardMaterial {
    /// Create a new material with default properties
    pub fn new() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 0.5,
        }
    }

    /// Set the base color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the metallic factor
    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    /// Set the roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Brushed metal used for the extruded text
    pub fn text(color: Color) -> Self {
        Self::new().with_color(color).with_metalness(1.0).with_roughness(0.3)
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new()
    }
}
