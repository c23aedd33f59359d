//! Rendering primitives
//!
//! Core geometric and camera primitives for 3D rendering.

pub mod bounds;
pub mod camera;
pub mod mesh;

pub use bounds::BoundingBox;
pub use camera::{clamp_fov, Camera, MAX_FOV_DEGREES, MIN_FOV_DEGREES};
pub use mesh::{GeometryError, Mesh, Vertex};
