//! UI System Module
//!
//! Architecture:
//! - controls: the settings panel, its values and the events it emits
//! - widgets/: widget state (button, slider, text and colour entry)
//! - rendering: backend-agnostic quads and text consumed by the overlay pass

pub mod controls;
pub mod rendering;
pub mod widgets;

pub use controls::{ControlPanel, ControlValues, PanelEvent, PanelResponse, PanelRow};
pub use rendering::{RenderQuad, RenderText, UIRenderData};
pub use widgets::{Anchor, ButtonState, Rect, UIButton, UIColorField, UIElement, UISlider, UITextArea};
