//! Declarative scene tree
//!
//! Built from the panel's control values and nothing else; it holds no
//! mutable state and can be dumped with serde for inspection.

use super::floor::FloorConfig;
use super::text_layout::TextBlock;
use crate::foundation::color::Color;
use crate::foundation::math::Vec3;
use crate::render::lighting::LightingEnvironment;
use crate::render::material::StandardMaterial;
use crate::render::primitives::{clamp_fov, Camera};
use crate::text::TextGeometryOptions;
use crate::ui::ControlValues;
use serde::{Deserialize, Serialize};

/// Camera parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraNode {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Start position
    pub position: Vec3,
    /// Orbit target
    pub target: Vec3,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

/// Extruded text parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    /// Lines as extruded, bottom line first
    pub lines: Vec<String>,
    /// Em size
    pub size: f32,
    /// Extrusion depth
    pub depth: f32,
    /// Segments per curve
    pub curve_segments: u32,
    /// Surface material
    pub material: StandardMaterial,
    /// Whether the text casts shadows
    pub cast_shadow: bool,
    /// Whether the text receives shadows
    pub receive_shadow: bool,
}

/// The whole scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Clear colour
    pub background: Color,
    /// Camera
    pub camera: CameraNode,
    /// Lights
    pub lighting: LightingEnvironment,
    /// Text block
    pub text: TextNode,
    /// Floor
    pub floor: FloorConfig,
}

impl SceneDescription {
    /// Describe the scene for a set of control values
    pub fn from_controls(controls: &ControlValues) -> Self {
        let start = Camera::default();
        let options = TextGeometryOptions::default();
        let block = TextBlock::new(&controls.text, controls.text_color);

        Self {
            background: Color::BLACK,
            camera: CameraNode {
                fov: clamp_fov(controls.fov),
                position: start.position,
                target: start.target,
                near: start.near,
                far: start.far,
            },
            lighting: LightingEnvironment::stage(),
            text: TextNode {
                lines: block.lines().map(|(_, line)| line.to_uppercase()).collect(),
                size: options.size,
                depth: options.depth,
                curve_segments: options.curve_segments,
                material: StandardMaterial::text(controls.text_color),
                cast_shadow: true,
                receive_shadow: true,
            },
            floor: FloorConfig::with_color(controls.floor_color),
        }
    }

    /// Pretty JSON dump, for debugging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene() {
        let scene = SceneDescription::from_controls(&ControlValues::default());
        assert_eq!(scene.background, Color::BLACK);
        assert_eq!(scene.camera.fov, 45.0);
        assert_eq!(scene.camera.position, Vec3::new(-4.5, 1.2, 5.7));
        assert_eq!(scene.camera.target, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(scene.text.lines, vec!["IS FUNNY".to_string(), "BIG TEXT".to_string()]);
        assert_eq!(scene.text.material.metalness, 1.0);
        assert_eq!(scene.floor.color.to_hex(), "#151515");
        assert_eq!(scene.lighting.directional.len(), 2);
    }

    #[test]
    fn test_fov_is_clamped() {
        let controls = ControlValues { fov: 150.0, ..ControlValues::default() };
        assert_eq!(SceneDescription::from_controls(&controls).camera.fov, 100.0);
    }

    #[test]
    fn test_json_dump_uses_hex_colours() {
        let json = SceneDescription::from_controls(&ControlValues::default()).to_json().unwrap();
        assert!(json.contains("\"#151515\""));
        assert!(json.contains("\"#ffffff\""));
    }
}
