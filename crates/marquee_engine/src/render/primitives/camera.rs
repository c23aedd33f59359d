//! # 3D Camera System
//!
//! Provides the perspective camera used by the render loop host.
//!
//! ## Design Principles
//! - **Library-agnostic**: No backend dependencies in camera math
//! - **Immutable operation**: Methods don't modify camera state unexpectedly
//! - **Vulkan clip conventions**: `P × X × V`, Y down and depth in `[0, 1]`

use crate::foundation::math::{Vec3, Mat4, Mat4Ext, utils};

/// Lower bound of the adjustable field of view, in degrees
pub const MIN_FOV_DEGREES: f32 = 20.0;

/// Upper bound of the adjustable field of view, in degrees
pub const MAX_FOV_DEGREES: f32 = 100.0;

/// Clamp a requested field of view to the supported range
pub fn clamp_fov(fov_degrees: f32) -> f32 {
    if fov_degrees.is_nan() {
        return MIN_FOV_DEGREES;
    }
    fov_degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
}

/// 3D perspective camera
///
/// Uses a right-handed Y-up world. The Vulkan coordinate transformation is
/// applied separately so view space keeps standard conventions.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Field of view angle in radians
    pub fov: f32,

    /// Aspect ratio (width / height) for projection calculations
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera with standard Y-up orientation
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Field of view in degrees, clamped to `[20, 100]`
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(clamp_fov(fov_degrees)),
            aspect,
            near,
            far,
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Configure camera to look at a specific point with custom up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Set the field of view in degrees; values outside `[20, 100]` are clamped
    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        let clamped = clamp_fov(fov_degrees);
        if (clamped - fov_degrees).abs() > f32::EPSILON {
            log::debug!("Field of view {:.1} clamped to {:.1}", fov_degrees, clamped);
        }
        self.fov = utils::deg_to_rad(clamped);
    }

    /// Field of view in degrees
    pub fn fov_degrees(&self) -> f32 {
        utils::rad_to_deg(self.fov)
    }

    /// Update camera aspect ratio for viewport changes
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World-to-view matrix
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Perspective projection matrix
    pub fn get_projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined `P × X × V` view-projection matrix
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * Mat4::vulkan_coordinate_transform() * self.get_view_matrix()
    }
}

impl Default for Camera {
    /// The scene's starting camera: 45° FOV at `(-4.5, 1.2, 5.7)` looking at `(0, 2, 0)`
    fn default() -> Self {
        let mut camera = Self::perspective(Vec3::new(-4.5, 1.2, 5.7), 45.0, 16.0 / 9.0, 0.1, 1000.0);
        camera.target = Vec3::new(0.0, 2.0, 0.0);
        camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_fov_clamped_to_range() {
        let mut camera = Camera::default();
        camera.set_fov_degrees(5.0);
        assert_relative_eq!(camera.fov_degrees(), 20.0, epsilon = 1e-4);
        camera.set_fov_degrees(170.0);
        assert_relative_eq!(camera.fov_degrees(), 100.0, epsilon = 1e-4);
        camera.set_fov_degrees(60.0);
        assert_relative_eq!(camera.fov_degrees(), 60.0, epsilon = 1e-4);
        assert_eq!(clamp_fov(f32::NAN), MIN_FOV_DEGREES);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::default();
        let clip = camera.get_view_projection_matrix() * camera.target.push(1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn test_higher_point_is_higher_on_screen() {
        let camera = Camera::default();
        let vp = camera.get_view_projection_matrix();
        let low = vp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let high = vp * Vec4::new(0.0, 4.0, 0.0, 1.0);
        // Vulkan NDC Y grows downwards
        assert!(high.y / high.w < low.y / low.w);
    }
}
