//! Lighting system
//!
//! Directional lights with orthographic shadow frusta plus an ambient term.
//! A directional light shines from `position` towards `target`; its shadow
//! camera sits at `position` and looks at `target`.

use crate::foundation::color::Color;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use serde::{Deserialize, Serialize};

/// Shadow map settings for a directional light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Shadow map resolution (square)
    pub map_size: u32,
    /// Left edge of the orthographic shadow frustum
    pub left: f32,
    /// Right edge of the orthographic shadow frustum
    pub right: f32,
    /// Top edge of the orthographic shadow frustum
    pub top: f32,
    /// Bottom edge of the orthographic shadow frustum
    pub bottom: f32,
    /// Near plane distance from the light
    pub near: f32,
    /// Far plane distance from the light
    pub far: f32,
    /// Depth bias applied when comparing against the shadow map
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 1024,
            left: -20.0,
            right: 20.0,
            top: 20.0,
            bottom: -20.0,
            near: 0.5,
            far: 500.0,
            bias: 0.0005,
        }
    }
}

/// Directional light (like sunlight)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Light position; together with `target` it defines the direction
    pub position: Vec3,
    /// Point the light shines at
    pub target: Vec3,
    /// Light color
    pub color: Color,
    /// Light intensity
    pub intensity: f32,
    /// Whether the light renders a shadow map
    pub cast_shadow: bool,
    /// Shadow map settings
    pub shadow: ShadowConfig,
}

impl DirectionalLight {
    /// Create a white shadow-casting light aimed at the origin
    pub fn new(position: Vec3, intensity: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            color: Color::WHITE,
            intensity,
            cast_shadow: true,
            shadow: ShadowConfig::default(),
        }
    }

    /// Unit vector pointing from the surface towards the light
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::y)
    }

    /// View-projection matrix of the shadow camera
    pub fn shadow_view_projection(&self) -> Mat4 {
        let forward = -self.to_light();
        // Avoid a degenerate basis when the light points straight down
        let up = if forward.cross(&Vec3::y()).norm() < 1e-4 { Vec3::z() } else { Vec3::y() };
        let s = &self.shadow;
        Mat4::orthographic(s.left, s.right, s.bottom, s.top, s.near, s.far)
            * Mat4::vulkan_coordinate_transform()
            * Mat4::look_at(self.position, self.target, up)
    }
}

/// Lighting environment containing multiple lights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingEnvironment {
    /// Directional lights in the scene
    pub directional: Vec<DirectionalLight>,
    /// Ambient light color
    pub ambient_color: Color,
    /// Ambient light intensity
    pub ambient_intensity: f32,
}

impl LightingEnvironment {
    /// Create a new empty lighting environment
    pub fn new() -> Self {
        Self {
            directional: Vec::new(),
            ambient_color: Color::WHITE,
            ambient_intensity: 0.1,
        }
    }

    /// Add a light to the environment
    pub fn add_light(mut self, light: DirectionalLight) -> Self {
        self.directional.push(light);
        self
    }

    /// Set ambient lighting
    pub fn with_ambient(mut self, color: Color, intensity: f32) -> Self {
        self.ambient_color = color;
        self.ambient_intensity = intensity;
        self
    }

    /// The stage rig: soft ambient fill plus a key and a side light, both casting shadows
    pub fn stage() -> Self {
        Self::new()
            .with_ambient(Color::WHITE, 0.25)
            .add_light(DirectionalLight::new(Vec3::new(0.2, 1.3, 3.7), 2.0))
            .add_light(DirectionalLight::new(Vec3::new(-27.7, 7.9, 4.5), 2.0))
    }

    /// Ambient radiance
    pub fn ambient(&self) -> Vec3 {
        self.ambient_color.to_vec3() * self.ambient_intensity
    }
}

impl Default for LightingEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_stage_rig() {
        let rig = LightingEnvironment::stage();
        assert_eq!(rig.directional.len(), 2);
        assert!(rig.directional.iter().all(|l| l.cast_shadow && l.shadow.map_size == 1024));
        assert_relative_eq!(rig.ambient_intensity, 0.25);
    }

    #[test]
    fn test_shadow_camera_sees_target() {
        let light = DirectionalLight::new(Vec3::new(0.2, 1.3, 3.7), 2.0);
        let clip = light.shadow_view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_overhead_light_has_valid_basis() {
        let light = DirectionalLight::new(Vec3::new(0.0, 10.0, 0.0), 1.0);
        let m = light.shadow_view_projection();
        assert!(m.iter().all(|v| v.is_finite()));
    }
}
