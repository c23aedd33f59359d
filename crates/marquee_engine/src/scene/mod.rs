//! Scene content
//!
//! The declarative scene tree, the multi-line text layout and the reflective
//! floor.

mod description;
mod floor;
mod text_layout;

pub use description::{CameraNode, SceneDescription, TextNode};
pub use floor::{FloorConfig, ReflectiveFloor, ReflectorSettings, FLOOR_SIZE};
pub use text_layout::{LayoutChanges, LayoutError, LineMesh, TextBlock, TextLayout};
