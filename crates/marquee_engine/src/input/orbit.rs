//! Orbit camera controls
//!
//! The camera circles a fixed target on a sphere. Left-drag rotates, the
//! scroll wheel dollies in and out. There is no damping: every event moves
//! the camera immediately.

use super::{InputEvent, MouseButton};
use crate::foundation::math::{constants::TAU, Vec3};
use crate::render::primitives::Camera;

/// Polar angle stays this far from the poles so the view never flips
const POLE_EPSILON: f32 = 1e-3;

/// Distance limits of the orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    /// Closest allowed distance to the target
    pub min_distance: f32,
    /// Farthest allowed distance to the target
    pub max_distance: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 100.0,
        }
    }
}

/// Orbit controller around a fixed target
#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    radius: f32,
    /// Azimuth around +Y, 0 looking down -Z
    theta: f32,
    /// Angle from +Y
    phi: f32,
    limits: OrbitLimits,
    rotate_speed: f32,
    zoom_speed: f32,
    dragging: bool,
    last_cursor: Option<(f32, f32)>,
    viewport_height: f32,
}

impl OrbitControls {
    /// Controls starting from the camera's current position and target
    pub fn from_camera(camera: &Camera, limits: OrbitLimits) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.norm().clamp(limits.min_distance, limits.max_distance);
        let theta = offset.x.atan2(offset.z);
        let phi = if offset.norm() > f32::EPSILON {
            (offset.y / offset.norm()).clamp(-1.0, 1.0).acos()
        } else {
            std::f32::consts::FRAC_PI_2
        };
        Self {
            target: camera.target,
            radius,
            theta,
            phi: phi.clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON),
            limits,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            dragging: false,
            last_cursor: None,
            viewport_height: 720.0,
        }
    }

    /// Orbit target
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Current distance to the target
    pub fn distance(&self) -> f32 {
        self.radius
    }

    /// Whether a rotation drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Height used to convert pixel drags into angles
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(1.0);
    }

    /// Camera position implied by the current orbit
    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + Vec3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    /// Start a drag; callers skip this when the press landed on the panel
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Feed an event; returns true when the camera moved
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::MouseUp(MouseButton::Left) => {
                self.dragging = false;
                false
            }
            InputEvent::CursorMoved { x, y } => {
                let previous = self.last_cursor.replace((x, y));
                match previous {
                    Some((px, py)) if self.dragging => self.rotate(x - px, y - py),
                    _ => false,
                }
            }
            InputEvent::Scroll { dy } => self.zoom(dy),
            InputEvent::Resized { height, .. } => {
                self.set_viewport_height(height as f32);
                false
            }
            _ => false,
        }
    }

    /// Rotate by a cursor delta in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let scale = TAU * self.rotate_speed / self.viewport_height;
        self.theta -= dx * scale;
        self.phi = (self.phi - dy * scale).clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);
        true
    }

    /// Dolly by scroll amount; scrolling away from the user moves closer
    pub fn zoom(&mut self, dy: f32) -> bool {
        if dy == 0.0 {
            return false;
        }
        let step = 0.95_f32.powf(self.zoom_speed * dy.abs());
        let radius = if dy > 0.0 { self.radius * step } else { self.radius / step };
        let radius = radius.clamp(self.limits.min_distance, self.limits.max_distance);
        let moved = (radius - self.radius).abs() > f32::EPSILON;
        self.radius = radius;
        moved
    }

    /// Write the orbit into a camera
    pub fn apply(&self, camera: &mut Camera) {
        camera.set_position(self.position());
        camera.look_at(self.target, Vec3::y());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controls() -> OrbitControls {
        OrbitControls::from_camera(&Camera::default(), OrbitLimits::default())
    }

    #[test]
    fn test_starts_at_camera_position() {
        let camera = Camera::default();
        let orbit = controls();
        assert_relative_eq!(orbit.position(), camera.position, epsilon = 1e-4);
        assert_eq!(orbit.target(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_drag_rotates_around_fixed_target() {
        let mut orbit = controls();
        let distance = orbit.distance();
        let start = orbit.position();

        orbit.handle_event(&InputEvent::CursorMoved { x: 100.0, y: 100.0 });
        orbit.begin_drag();
        assert!(orbit.handle_event(&InputEvent::CursorMoved { x: 180.0, y: 60.0 }));
        orbit.handle_event(&InputEvent::MouseUp(MouseButton::Left));

        assert!((orbit.position() - start).norm() > 0.1);
        assert_relative_eq!((orbit.position() - orbit.target()).norm(), distance, epsilon = 1e-3);
        assert_eq!(orbit.target(), Vec3::new(0.0, 2.0, 0.0));

        // Released: moving no longer rotates
        assert!(!orbit.handle_event(&InputEvent::CursorMoved { x: 300.0, y: 300.0 }));
    }

    #[test]
    fn test_cursor_motion_without_drag_is_ignored() {
        let mut orbit = controls();
        orbit.handle_event(&InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        assert!(!orbit.handle_event(&InputEvent::CursorMoved { x: 50.0, y: 0.0 }));
    }

    #[test]
    fn test_zoom_stays_within_limits() {
        let mut orbit = controls();
        let start = orbit.distance();
        orbit.handle_event(&InputEvent::Scroll { dy: 1.0 });
        assert!(orbit.distance() < start);

        for _ in 0..500 {
            orbit.zoom(1.0);
        }
        assert_relative_eq!(orbit.distance(), 1.0);
        for _ in 0..500 {
            orbit.zoom(-1.0);
        }
        assert_relative_eq!(orbit.distance(), 100.0);
    }

    #[test]
    fn test_vertical_drag_never_passes_the_pole() {
        let mut orbit = controls();
        orbit.rotate(0.0, 100_000.0);
        let offset = orbit.position() - orbit.target();
        assert!(offset.y > 0.0);
        assert!(offset.x.abs() + offset.z.abs() > 0.0);
    }

    #[test]
    fn test_apply_moves_camera() {
        let mut orbit = controls();
        let mut camera = Camera::default();
        orbit.rotate(40.0, 0.0);
        orbit.apply(&mut camera);
        assert_relative_eq!(camera.position, orbit.position());
        assert_eq!(camera.target, orbit.target());
    }
}
