//! Backend-agnostic input
//!
//! The window layer translates GLFW events into [`InputEvent`]s; the control
//! panel and the orbit controls consume them without knowing about GLFW.

pub mod orbit;

pub use orbit::{OrbitControls, OrbitLimits};

/// Mouse button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Keys the application reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Tab
    Tab,
    /// Enter or keypad enter
    Enter,
    /// Backspace
    Backspace,
    /// Space bar
    Space,
    /// Escape
    Escape,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
}

/// A single input event, in window pixel coordinates (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to a new position
    CursorMoved {
        /// Horizontal position
        x: f32,
        /// Vertical position
        y: f32,
    },
    /// Mouse button pressed
    MouseDown(MouseButton),
    /// Mouse button released
    MouseUp(MouseButton),
    /// Scroll wheel; positive `dy` scrolls away from the user
    Scroll {
        /// Vertical scroll amount
        dy: f32,
    },
    /// A printable character was typed
    Char(char),
    /// A key was pressed or repeated
    KeyPressed(Key),
    /// Framebuffer size changed
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// The user asked to close the window
    CloseRequested,
}

/// Tracks cursor position and held buttons between events
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    position: (f32, f32),
    left_down: bool,
}

impl PointerState {
    /// Fold an event into the state
    pub fn update(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::CursorMoved { x, y } => self.position = (x, y),
            InputEvent::MouseDown(MouseButton::Left) => self.left_down = true,
            InputEvent::MouseUp(MouseButton::Left) => self.left_down = false,
            _ => {}
        }
    }

    /// Last known cursor position
    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    /// Whether the left button is held
    pub fn left_down(&self) -> bool {
        self.left_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_tracks_position_and_button() {
        let mut pointer = PointerState::default();
        pointer.update(&InputEvent::CursorMoved { x: 10.0, y: 20.0 });
        pointer.update(&InputEvent::MouseDown(MouseButton::Left));
        assert_eq!(pointer.position(), (10.0, 20.0));
        assert!(pointer.left_down());

        pointer.update(&InputEvent::MouseUp(MouseButton::Right));
        assert!(pointer.left_down());
        pointer.update(&InputEvent::MouseUp(MouseButton::Left));
        assert!(!pointer.left_down());
    }
}
