//! Button widget - interactive clickable buttons

use crate::foundation::math::Vec4;

/// Button state for visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Normal resting state
    Normal,
    /// Mouse is hovering over button
    Hovered,
    /// Button is being pressed
    Pressed,
}

/// UI button component
#[derive(Debug, Clone)]
pub struct UIButton {
    /// Button label text
    pub label: String,

    /// Current button state
    pub state: ButtonState,

    /// Colors for different states
    pub normal_color: Vec4,
    /// Hover state color
    pub hover_color: Vec4,
    /// Pressed state color
    pub pressed_color: Vec4,

    /// Label color
    pub text_color: Vec4,
}

impl Default for UIButton {
    fn default() -> Self {
        Self {
            label: String::new(),
            state: ButtonState::Normal,
            normal_color: Vec4::new(0.3, 0.3, 0.3, 0.9),
            hover_color: Vec4::new(0.4, 0.4, 0.5, 1.0),
            pressed_color: Vec4::new(0.5, 0.5, 0.6, 1.0),
            text_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

impl UIButton {
    /// Button with a label and default colours
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Get the current color based on button state
    pub fn get_current_color(&self) -> Vec4 {
        match self.state {
            ButtonState::Normal => self.normal_color,
            ButtonState::Hovered => self.hover_color,
            ButtonState::Pressed => self.pressed_color,
        }
    }

    /// Update hover state from the cursor; a pressed button stays pressed
    pub fn set_hovered(&mut self, hovered: bool) {
        if self.state == ButtonState::Pressed {
            return;
        }
        self.state = if hovered { ButtonState::Hovered } else { ButtonState::Normal };
    }

    /// Mouse went down on the button
    pub fn press(&mut self) {
        self.state = ButtonState::Pressed;
    }

    /// Mouse went up; returns true when this completes a click
    pub fn release(&mut self, over_button: bool) -> bool {
        let clicked = self.state == ButtonState::Pressed && over_button;
        self.state = if over_button { ButtonState::Hovered } else { ButtonState::Normal };
        clicked
    }
}
