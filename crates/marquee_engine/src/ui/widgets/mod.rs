//! UI widgets module
//!
//! Widget state types; layout and drawing live in the control panel.

pub mod button;
pub mod core;
pub mod slider;
pub mod text_input;

pub use button::{ButtonState, UIButton};
pub use core::{Anchor, Rect, UIElement};
pub use slider::UISlider;
pub use text_input::{UIColorField, UITextArea};
