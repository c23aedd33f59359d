//! Core UI widget primitives
//!
//! Shared types used by all widgets and by the panel layout.

use crate::foundation::math::Vec2;

/// Anchor point for UI positioning
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Top-left corner (0, 0) in screen space
    TopLeft,
    /// Top-right corner
    TopRight,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom-right corner
    BottomRight,
}

impl Anchor {
    /// Get the normalized anchor position (0.0 to 1.0)
    pub fn to_normalized(&self) -> (f32, f32) {
        match self {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::BottomRight => (1.0, 1.0),
        }
    }
}

/// Axis-aligned screen rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Rectangle from its top-left corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the point lies inside, edges included
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Top-left corner
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Shrunk by `amount` on every side
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }
}

/// Base UI element properties
#[derive(Debug, Clone)]
pub struct UIElement {
    /// Offset from the anchor point, pointing into the screen
    pub position: (f32, f32),

    /// Size in pixels (width, height)
    pub size: (f32, f32),

    /// Anchor point for positioning
    pub anchor: Anchor,

    /// Whether this element is visible
    pub visible: bool,
}

impl Default for UIElement {
    fn default() -> Self {
        Self {
            position: (0.0, 0.0),
            size: (100.0, 50.0),
            anchor: Anchor::TopLeft,
            visible: true,
        }
    }
}

impl UIElement {
    /// Resolve to a screen rectangle for a screen of the given size
    pub fn screen_rect(&self, screen_width: f32, screen_height: f32) -> Rect {
        let (ax, ay) = self.anchor.to_normalized();
        // Offsets point away from the anchored edge
        let x = ax * (screen_width - self.size.0) + (1.0 - 2.0 * ax) * self.position.0;
        let y = ay * (screen_height - self.size.1) + (1.0 - 2.0 * ay) * self.position.1;
        Rect::new(x, y, self.size.0, self.size.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_right_anchor() {
        let element = UIElement {
            position: (12.0, 12.0),
            size: (300.0, 200.0),
            anchor: Anchor::TopRight,
            visible: true,
        };
        let rect = element.screen_rect(1280.0, 720.0);
        assert_eq!(rect, Rect::new(1280.0 - 300.0 - 12.0, 12.0, 300.0, 200.0));
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(rect.contains(10.0, 15.0));
        assert!(!rect.contains(31.0, 12.0));
        assert_eq!(rect.inset(2.0), Rect::new(12.0, 12.0, 16.0, 1.0));
    }
}
