//! Reflective floor
//!
//! A 50×50 plane laid flat at `y = 0`. Everything about its reflection is
//! fixed except the colour, which follows the settings panel.

use crate::foundation::color::Color;
use crate::foundation::math::{constants::HALF_PI, Mat4, Mat4Ext};
use crate::render::primitives::Mesh;
use serde::{Deserialize, Serialize};

/// Side length of the floor plane
pub const FLOOR_SIZE: f32 = 50.0;

/// Parameters of the blurred planar reflection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectorSettings {
    /// Blur size, horizontal then vertical; blur offsets are whole multiples of `1 / blur` in texture space
    pub blur: [u32; 2],
    /// Longest side of the reflection target in pixels
    pub resolution: u32,
    /// How much the blurred reflection replaces the sharp one
    pub mix_blur: f32,
    /// Reflection brightness multiplier
    pub mix_strength: f32,
    /// Scale of the depth fade
    pub depth_scale: f32,
    /// Depth below which reflections fade out
    pub min_depth_threshold: f32,
    /// Surface metalness
    pub metalness: f32,
    /// Surface roughness
    pub roughness: f32,
}

impl Default for ReflectorSettings {
    fn default() -> Self {
        Self {
            blur: [400, 100],
            resolution: 1024,
            mix_blur: 1.0,
            mix_strength: 15.0,
            depth_scale: 1.0,
            min_depth_threshold: 0.85,
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

/// Floor colour plus its fixed reflection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorConfig {
    /// Base colour
    pub color: Color,
    /// Reflection parameters
    pub reflector: ReflectorSettings,
}

impl FloorConfig {
    /// Default reflection settings with the given colour
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            reflector: ReflectorSettings::default(),
        }
    }
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self::with_color(Color::from_rgb8(0x15, 0x15, 0x15))
    }
}

/// The floor mesh and its material
#[derive(Debug, Clone)]
pub struct ReflectiveFloor {
    mesh: Mesh,
    config: FloorConfig,
}

impl ReflectiveFloor {
    /// Build the floor plane and rotate it flat
    pub fn new(config: FloorConfig) -> Self {
        let mut mesh = Mesh::plane(FLOOR_SIZE, FLOOR_SIZE);
        mesh.apply_matrix(&Mat4::rotation_x(-HALF_PI));
        mesh.compute_bounding_box();
        Self { mesh, config }
    }

    /// Floor geometry
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Material settings
    pub fn config(&self) -> &FloorConfig {
        &self.config
    }

    /// Current colour
    pub fn color(&self) -> Color {
        self.config.color
    }

    /// Change the colour; returns true when it actually changed
    pub fn set_color(&mut self, color: Color) -> bool {
        if self.config.color == color {
            return false;
        }
        log::debug!("Floor colour set to {}", color);
        self.config.color = color;
        true
    }
}

impl Default for ReflectiveFloor {
    fn default() -> Self {
        Self::new(FloorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_floor_lies_flat() {
        let floor = ReflectiveFloor::default();
        let bounds = floor.mesh().bounding_box().unwrap();
        assert_relative_eq!(bounds.size(), Vec3::new(50.0, 0.0, 50.0), epsilon = 1e-3);
        assert_relative_eq!(bounds.center(), Vec3::zeros(), epsilon = 1e-4);
        for v in &floor.mesh().vertices {
            assert_relative_eq!(v.norm(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_only_colour_changes() {
        let mut floor = ReflectiveFloor::default();
        assert_eq!(floor.color().to_hex(), "#151515");
        assert!(!floor.set_color(Color::from_hex("#151515").unwrap()));
        assert!(floor.set_color(Color::WHITE));
        assert_eq!(floor.config().reflector, ReflectorSettings::default());
    }
}
