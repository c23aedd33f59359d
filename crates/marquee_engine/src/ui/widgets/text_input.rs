//! Text entry widgets

use crate::foundation::color::Color;

/// Multi-line free text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UITextArea {
    text: String,
}

impl UITextArea {
    /// Area holding `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Current contents
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines shown
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Append a character; control characters are ignored
    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.text.push(ch);
        true
    }

    /// Start a new line
    pub fn newline(&mut self) {
        self.text.push('\n');
    }

    /// Remove the last character; returns false when already empty
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }
}

/// Hex colour entry
///
/// Typed digits collect in a pending buffer; the colour only changes once six
/// digits have been entered.
#[derive(Debug, Clone, PartialEq)]
pub struct UIColorField {
    value: Color,
    pending: String,
}

impl UIColorField {
    /// Field showing `value`
    pub fn new(value: Color) -> Self {
        Self { value, pending: String::new() }
    }

    /// Committed colour
    pub fn value(&self) -> Color {
        self.value
    }

    /// Whether digits are being typed
    pub fn is_editing(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Text to show: the pending digits while editing, the committed hex otherwise
    pub fn display(&self) -> String {
        if self.is_editing() {
            format!("#{}", self.pending)
        } else {
            self.value.to_hex()
        }
    }

    /// Feed a typed character; returns the new colour when it commits
    pub fn push_char(&mut self, ch: char) -> Option<Color> {
        if ch == '#' {
            self.pending.clear();
            return None;
        }
        if !ch.is_ascii_hexdigit() {
            return None;
        }
        self.pending.push(ch.to_ascii_lowercase());
        if self.pending.len() < 6 {
            return None;
        }
        let parsed = Color::from_hex(&format!("#{}", self.pending));
        self.pending.clear();
        match parsed {
            Ok(color) => {
                self.value = color;
                Some(color)
            }
            Err(e) => {
                log::warn!("Rejected colour entry: {}", e);
                None
            }
        }
    }

    /// Drop the last pending digit
    pub fn backspace(&mut self) -> bool {
        self.pending.pop().is_some()
    }

    /// Abandon pending digits
    pub fn cancel(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_area_editing() {
        let mut area = UITextArea::new("AB");
        area.newline();
        assert!(area.insert_char('c'));
        assert!(!area.insert_char('\u{7}'));
        assert_eq!(area.text(), "AB\nc");
        assert_eq!(area.line_count(), 2);
        assert!(area.backspace());
        assert!(area.backspace());
        assert_eq!(area.text(), "AB");

        let mut empty = UITextArea::default();
        assert!(!empty.backspace());
    }

    #[test]
    fn test_color_commits_after_six_digits() {
        let mut field = UIColorField::new(Color::WHITE);
        for ch in "#ff00f".chars() {
            assert_eq!(field.push_char(ch), None);
        }
        assert_eq!(field.display(), "#ff00f");
        assert_eq!(field.value(), Color::WHITE);

        let committed = field.push_char('F').unwrap();
        assert_eq!(committed.to_hex(), "#ff00ff");
        assert!(!field.is_editing());
        assert_eq!(field.display(), "#ff00ff");
    }

    #[test]
    fn test_color_ignores_non_hex_and_backspaces() {
        let mut field = UIColorField::new(Color::BLACK);
        field.push_char('1');
        field.push_char('z');
        field.push_char('2');
        assert_eq!(field.display(), "#12");
        assert!(field.backspace());
        assert_eq!(field.display(), "#1");
        field.cancel();
        assert_eq!(field.display(), "#000000");
    }
}
