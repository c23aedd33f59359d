//! Settings panel
//!
//! Floats in the top-right corner and edits the four scene parameters. The
//! panel's widgets are the single source of truth for the values; every edit
//! is reported as a [`PanelEvent`] for the host to apply.

use super::rendering::{line_advance, measure_text, RenderQuad, RenderText, UIRenderData};
use super::widgets::{Anchor, ButtonState, Rect, UIButton, UIColorField, UIElement, UISlider, UITextArea};
use crate::config::ControlDefaults;
use crate::foundation::color::Color;
use crate::foundation::math::{Vec2, Vec4};
use crate::input::{InputEvent, Key, MouseButton, PointerState};
use crate::render::primitives::{MAX_FOV_DEGREES, MIN_FOV_DEGREES};

const FONT_SIZE: f32 = 14.0;
const ROW_HEIGHT: f32 = 28.0;
const PANEL_WIDTH: f32 = 320.0;
const MARGIN: f32 = 12.0;
const PADDING: f32 = 10.0;
const LABEL_WIDTH: f32 = 96.0;
const ROW_GAP: f32 = 6.0;
/// Lines the text row always leaves room for
const MIN_TEXT_LINES: usize = 2;

const PANEL_COLOR: Vec4 = Vec4::new(0.09, 0.09, 0.11, 0.88);
const FIELD_COLOR: Vec4 = Vec4::new(0.16, 0.16, 0.19, 1.0);
const FOCUS_COLOR: Vec4 = Vec4::new(0.22, 0.22, 0.30, 1.0);
const ACCENT_COLOR: Vec4 = Vec4::new(0.35, 0.45, 0.95, 1.0);
const LABEL_COLOR: Vec4 = Vec4::new(0.65, 0.65, 0.70, 1.0);
const VALUE_COLOR: Vec4 = Vec4::new(0.95, 0.95, 0.95, 1.0);

/// Current scene parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ControlValues {
    /// Multi-line text
    pub text: String,
    /// Field of view in degrees
    pub fov: f32,
    /// Floor colour
    pub floor_color: Color,
    /// Text colour
    pub text_color: Color,
}

impl From<&ControlDefaults> for ControlValues {
    fn from(defaults: &ControlDefaults) -> Self {
        Self {
            text: defaults.text.clone(),
            fov: defaults.fov,
            floor_color: defaults.floor_color,
            text_color: defaults.text_color,
        }
    }
}

impl Default for ControlValues {
    fn default() -> Self {
        Self::from(&ControlDefaults::default())
    }
}

/// A change made through the panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// The text now reads this
    TextChanged(String),
    /// New field of view in degrees
    FovChanged(f32),
    /// New floor colour
    FloorColorChanged(Color),
    /// New text colour
    TextColorChanged(Color),
    /// Export the current frame
    ScreenshotRequested,
}

/// Rows of the panel, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRow {
    /// Free text
    Text,
    /// Field of view slider
    Fov,
    /// Floor colour
    FloorColor,
    /// Text colour
    TextColor,
    /// Screenshot button
    Screenshot,
}

impl PanelRow {
    const ORDER: [PanelRow; 5] = [
        PanelRow::Text,
        PanelRow::Fov,
        PanelRow::FloorColor,
        PanelRow::TextColor,
        PanelRow::Screenshot,
    ];

    fn label(self) -> &'static str {
        match self {
            PanelRow::Text => "TEXT",
            PanelRow::Fov => "FOV",
            PanelRow::FloorColor => "FLOOR",
            PanelRow::TextColor => "COLOR",
            PanelRow::Screenshot => "",
        }
    }

    fn next(self) -> Self {
        let index = Self::ORDER.iter().position(|&row| row == self).unwrap_or(0);
        Self::ORDER[(index + 1) % Self::ORDER.len()]
    }
}

/// What the panel did with an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelResponse {
    /// The event was meant for the panel; the camera should ignore it
    pub consumed: bool,
    /// Value changes and actions, in order
    pub events: Vec<PanelEvent>,
}

/// The settings panel
#[derive(Debug, Clone)]
pub struct ControlPanel {
    element: UIElement,
    screen: (f32, f32),
    text: UITextArea,
    fov: UISlider,
    floor_color: UIColorField,
    text_color: UIColorField,
    screenshot: UIButton,
    focus: Option<PanelRow>,
    pointer: PointerState,
    dragging_slider: bool,
}

impl ControlPanel {
    /// Panel holding `values`, laid out for a screen of the given size
    pub fn new(values: &ControlValues, screen_width: f32, screen_height: f32) -> Self {
        let mut panel = Self {
            element: UIElement {
                position: (MARGIN, MARGIN),
                size: (PANEL_WIDTH, 0.0),
                anchor: Anchor::TopRight,
                visible: true,
            },
            screen: (screen_width, screen_height),
            text: UITextArea::new(values.text.clone()),
            fov: UISlider::new(MIN_FOV_DEGREES, MAX_FOV_DEGREES, values.fov),
            floor_color: UIColorField::new(values.floor_color),
            text_color: UIColorField::new(values.text_color),
            screenshot: UIButton::new("SCREENSHOT"),
            focus: None,
            pointer: PointerState::default(),
            dragging_slider: false,
        };
        panel.refresh_size();
        panel
    }

    /// Current values of every control
    pub fn values(&self) -> ControlValues {
        ControlValues {
            text: self.text.text().to_string(),
            fov: self.fov.value(),
            floor_color: self.floor_color.value(),
            text_color: self.text_color.value(),
        }
    }

    /// Focused row, if any
    pub fn focus(&self) -> Option<PanelRow> {
        self.focus
    }

    /// Show or hide the panel; a hidden panel ignores input
    pub fn set_visible(&mut self, visible: bool) {
        self.element.visible = visible;
        if !visible {
            self.set_focus(None);
        }
    }

    /// Whether the panel is drawn and takes input
    pub fn is_visible(&self) -> bool {
        self.element.visible
    }

    /// Re-anchor after a resize
    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen = (width, height);
    }

    /// Screen rectangle of the whole panel
    pub fn bounds(&self) -> Rect {
        self.element.screen_rect(self.screen.0, self.screen.1)
    }

    /// Whether a screen point lies on the panel
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.element.visible && self.bounds().contains(x, y)
    }

    /// Interactive area of a row
    pub fn row_rect(&self, row: PanelRow) -> Rect {
        self.row_rects()
            .into_iter()
            .find(|(r, _)| *r == row)
            .map(|(_, rect)| rect)
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    fn text_row_height(&self) -> f32 {
        let lines = self.text.line_count().max(MIN_TEXT_LINES);
        (lines - 1) as f32 * line_advance(FONT_SIZE) + ROW_HEIGHT
    }

    fn refresh_size(&mut self) {
        let rows: f32 = self.text_row_height() + 4.0 * ROW_HEIGHT;
        self.element.size = (PANEL_WIDTH, rows + 4.0 * ROW_GAP + 2.0 * PADDING);
    }

    fn row_rects(&self) -> [(PanelRow, Rect); 5] {
        let panel = self.bounds();
        let field_x = panel.x + PADDING + LABEL_WIDTH;
        let field_width = PANEL_WIDTH - 2.0 * PADDING - LABEL_WIDTH;
        let mut y = panel.y + PADDING;
        PanelRow::ORDER.map(|row| {
            let rect = match row {
                PanelRow::Text => Rect::new(field_x, y, field_width, self.text_row_height()),
                PanelRow::Screenshot => Rect::new(panel.x + PADDING, y, PANEL_WIDTH - 2.0 * PADDING, ROW_HEIGHT),
                _ => Rect::new(field_x, y, field_width, ROW_HEIGHT),
            };
            y += rect.height + ROW_GAP;
            (row, rect)
        })
    }

    fn row_at(&self, x: f32, y: f32) -> Option<PanelRow> {
        self.row_rects()
            .into_iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(row, _)| row)
    }

    fn set_focus(&mut self, focus: Option<PanelRow>) {
        if focus != self.focus {
            self.floor_color.cancel();
            self.text_color.cancel();
            log::trace!("Panel focus {:?} -> {:?}", self.focus, focus);
        }
        self.focus = focus;
    }

    /// Feed an input event
    pub fn handle_event(&mut self, event: &InputEvent) -> PanelResponse {
        self.pointer.update(event);
        let mut response = PanelResponse::default();
        if !self.element.visible {
            return response;
        }

        match *event {
            InputEvent::CursorMoved { x, y } => {
                self.screenshot.set_hovered(self.row_at(x, y) == Some(PanelRow::Screenshot));
                if self.dragging_slider {
                    response.consumed = true;
                    self.drag_slider(x, &mut response);
                }
            }
            InputEvent::MouseDown(MouseButton::Left) => {
                let (x, y) = self.pointer.position();
                if !self.contains(x, y) {
                    self.set_focus(None);
                    return response;
                }
                response.consumed = true;
                let row = self.row_at(x, y);
                self.set_focus(row);
                match row {
                    Some(PanelRow::Fov) => {
                        self.dragging_slider = true;
                        self.drag_slider(x, &mut response);
                    }
                    Some(PanelRow::Screenshot) => self.screenshot.press(),
                    _ => {}
                }
            }
            InputEvent::MouseUp(MouseButton::Left) => {
                let (x, y) = self.pointer.position();
                if self.dragging_slider {
                    self.dragging_slider = false;
                    response.consumed = true;
                }
                if self.screenshot.state == ButtonState::Pressed {
                    response.consumed = true;
                    if self.screenshot.release(self.row_at(x, y) == Some(PanelRow::Screenshot)) {
                        response.events.push(PanelEvent::ScreenshotRequested);
                    }
                }
            }
            InputEvent::Scroll { .. } => {
                let (x, y) = self.pointer.position();
                response.consumed = self.contains(x, y);
            }
            InputEvent::Char(ch) => {
                if let Some(row) = self.focus {
                    response.consumed = true;
                    self.type_char(row, ch, &mut response);
                }
            }
            InputEvent::KeyPressed(Key::Tab) => {
                response.consumed = true;
                self.set_focus(Some(self.focus.map_or(PanelRow::Text, PanelRow::next)));
            }
            InputEvent::KeyPressed(key) => {
                if let Some(row) = self.focus {
                    response.consumed = true;
                    self.press_key(row, key, &mut response);
                }
            }
            InputEvent::Resized { width, height } => self.set_screen_size(width as f32, height as f32),
            _ => {}
        }
        response
    }

    fn drag_slider(&mut self, x: f32, response: &mut PanelResponse) {
        let track = self.row_rect(PanelRow::Fov);
        if track.width <= 0.0 {
            return;
        }
        if self.fov.set_fraction((x - track.x) / track.width) {
            response.events.push(PanelEvent::FovChanged(self.fov.value()));
        }
    }

    fn text_changed(&mut self, response: &mut PanelResponse) {
        self.refresh_size();
        response.events.push(PanelEvent::TextChanged(self.text.text().to_string()));
    }

    fn type_char(&mut self, row: PanelRow, ch: char, response: &mut PanelResponse) {
        match row {
            PanelRow::Text => {
                if self.text.insert_char(ch) {
                    self.text_changed(response);
                }
            }
            PanelRow::FloorColor => {
                if let Some(color) = self.floor_color.push_char(ch) {
                    response.events.push(PanelEvent::FloorColorChanged(color));
                }
            }
            PanelRow::TextColor => {
                if let Some(color) = self.text_color.push_char(ch) {
                    response.events.push(PanelEvent::TextColorChanged(color));
                }
            }
            PanelRow::Fov | PanelRow::Screenshot => {}
        }
    }

    fn press_key(&mut self, row: PanelRow, key: Key, response: &mut PanelResponse) {
        if key == Key::Escape {
            self.set_focus(None);
            return;
        }
        match (row, key) {
            (PanelRow::Text, Key::Enter) => {
                self.text.newline();
                self.text_changed(response);
            }
            (PanelRow::Text, Key::Backspace) => {
                if self.text.backspace() {
                    self.text_changed(response);
                }
            }
            (PanelRow::Fov, Key::Left | Key::Down | Key::Right | Key::Up) => {
                let steps = if matches!(key, Key::Left | Key::Down) { -1 } else { 1 };
                if self.fov.nudge(steps) {
                    response.events.push(PanelEvent::FovChanged(self.fov.value()));
                }
            }
            (PanelRow::FloorColor, Key::Backspace) => {
                self.floor_color.backspace();
            }
            (PanelRow::TextColor, Key::Backspace) => {
                self.text_color.backspace();
            }
            (PanelRow::Screenshot, Key::Enter | Key::Space) => {
                response.events.push(PanelEvent::ScreenshotRequested);
            }
            _ => {}
        }
    }

    /// Quads and text runs for the overlay pass
    pub fn to_render_data(&self) -> UIRenderData {
        let mut data = UIRenderData::empty();
        if !self.element.visible {
            return data;
        }

        let panel = self.bounds();
        data.quads.push(RenderQuad {
            position: panel.origin(),
            size: panel.size(),
            color: PANEL_COLOR,
            depth: 0.0,
        });

        let text_inset = (ROW_HEIGHT - FONT_SIZE) * 0.5;
        for (row, rect) in self.row_rects() {
            let focused = self.focus == Some(row);
            let label = row.label();
            if !label.is_empty() {
                push_text(&mut data, label, Vec2::new(panel.x + PADDING, rect.y + text_inset), LABEL_COLOR);
            }

            let content = Vec2::new(rect.x + text_inset, rect.y + text_inset);
            match row {
                PanelRow::Text => {
                    push_quad(&mut data, rect, if focused { FOCUS_COLOR } else { FIELD_COLOR });
                    let mut text = self.text.text().to_string();
                    if focused {
                        text.push('_');
                    }
                    push_text(&mut data, &text, content, VALUE_COLOR);
                }
                PanelRow::Fov => {
                    push_quad(&mut data, rect, if focused { FOCUS_COLOR } else { FIELD_COLOR });
                    let fill = Rect::new(rect.x, rect.y, rect.width * self.fov.fraction(), rect.height);
                    push_quad(&mut data, fill, ACCENT_COLOR);
                    let value = format!("{:.0}", self.fov.value());
                    push_text(&mut data, &value, content, VALUE_COLOR);
                }
                PanelRow::FloorColor | PanelRow::TextColor => {
                    let field = if row == PanelRow::FloorColor { &self.floor_color } else { &self.text_color };
                    push_quad(&mut data, rect, if focused { FOCUS_COLOR } else { FIELD_COLOR });
                    let swatch = Rect::new(rect.x, rect.y, rect.height, rect.height).inset(4.0);
                    let c = field.value();
                    push_quad(&mut data, swatch, Vec4::new(c.r, c.g, c.b, 1.0));
                    let hex = Vec2::new(rect.x + rect.height + text_inset, content.y);
                    push_text(&mut data, &field.display(), hex, VALUE_COLOR);
                }
                PanelRow::Screenshot => {
                    let color = if focused && self.screenshot.state == ButtonState::Normal {
                        self.screenshot.hover_color
                    } else {
                        self.screenshot.get_current_color()
                    };
                    push_quad(&mut data, rect, color);
                    let extent = measure_text(&self.screenshot.label, FONT_SIZE);
                    let origin = Vec2::new(
                        rect.x + (rect.width - extent.x) * 0.5,
                        rect.y + (rect.height - extent.y) * 0.5,
                    );
                    push_text(&mut data, &self.screenshot.label, origin, self.screenshot.text_color);
                }
            }
        }
        data
    }
}

fn push_quad(data: &mut UIRenderData, rect: Rect, color: Vec4) {
    data.quads.push(RenderQuad {
        position: rect.origin(),
        size: rect.size(),
        color,
        depth: 1.0,
    });
}

fn push_text(data: &mut UIRenderData, text: &str, position: Vec2, color: Vec4) {
    data.texts.push(RenderText {
        position,
        text: text.to_string(),
        color,
        size: FONT_SIZE,
        depth: 2.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> ControlPanel {
        ControlPanel::new(&ControlValues::default(), 1280.0, 720.0)
    }

    fn center(rect: Rect) -> (f32, f32) {
        (rect.x + rect.width * 0.5, rect.y + rect.height * 0.5)
    }

    fn click(panel: &mut ControlPanel, (x, y): (f32, f32)) -> Vec<PanelEvent> {
        let mut events = panel.handle_event(&InputEvent::CursorMoved { x, y }).events;
        events.extend(panel.handle_event(&InputEvent::MouseDown(MouseButton::Left)).events);
        events.extend(panel.handle_event(&InputEvent::MouseUp(MouseButton::Left)).events);
        events
    }

    fn key(panel: &mut ControlPanel, key: Key) -> PanelResponse {
        panel.handle_event(&InputEvent::KeyPressed(key))
    }

    #[test]
    fn test_defaults() {
        let values = panel().values();
        assert_eq!(values.text, "BIG TEXT\nIS FUNNY");
        assert_eq!(values.fov, 45.0);
        assert_eq!(values.floor_color.to_hex(), "#151515");
        assert_eq!(values.text_color.to_hex(), "#ffffff");
    }

    #[test]
    fn test_panel_sits_top_right() {
        let panel = panel();
        let bounds = panel.bounds();
        assert_eq!(bounds.x + bounds.width, 1280.0 - MARGIN);
        assert_eq!(bounds.y, MARGIN);
        assert!(panel.contains(1200.0, 30.0));
        assert!(!panel.contains(100.0, 600.0));
    }

    #[test]
    fn test_typing_edits_focused_text() {
        let mut panel = panel();
        let at = center(panel.row_rect(PanelRow::Text));
        click(&mut panel, at);
        assert_eq!(panel.focus(), Some(PanelRow::Text));

        let response = panel.handle_event(&InputEvent::Char('!'));
        assert!(response.consumed);
        assert_eq!(response.events, vec![PanelEvent::TextChanged("BIG TEXT\nIS FUNNY!".into())]);

        let height = panel.bounds().height;
        key(&mut panel, Key::Enter);
        panel.handle_event(&InputEvent::Char('x'));
        assert_eq!(panel.values().text, "BIG TEXT\nIS FUNNY!\nx");
        assert!(panel.bounds().height > height);

        key(&mut panel, Key::Backspace);
        key(&mut panel, Key::Backspace);
        assert_eq!(panel.values().text, "BIG TEXT\nIS FUNNY!");
    }

    #[test]
    fn test_keys_without_focus_pass_through() {
        let mut panel = panel();
        let response = panel.handle_event(&InputEvent::Char('a'));
        assert!(!response.consumed);
        assert!(response.events.is_empty());
        assert_eq!(panel.values(), ControlValues::default());
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut panel = panel();
        let mut seen = Vec::new();
        for _ in 0..6 {
            key(&mut panel, Key::Tab);
            seen.push(panel.focus());
        }
        assert_eq!(seen[0], Some(PanelRow::Text));
        assert_eq!(seen[4], Some(PanelRow::Screenshot));
        assert_eq!(seen[5], Some(PanelRow::Text));
        key(&mut panel, Key::Escape);
        assert_eq!(panel.focus(), None);
    }

    #[test]
    fn test_fov_arrows_clamp() {
        let mut panel = panel();
        key(&mut panel, Key::Tab);
        key(&mut panel, Key::Tab);
        assert_eq!(panel.focus(), Some(PanelRow::Fov));

        let response = key(&mut panel, Key::Right);
        assert_eq!(response.events, vec![PanelEvent::FovChanged(46.0)]);
        for _ in 0..200 {
            key(&mut panel, Key::Up);
        }
        assert_eq!(panel.values().fov, 100.0);
        assert!(key(&mut panel, Key::Right).events.is_empty());
        for _ in 0..200 {
            key(&mut panel, Key::Down);
        }
        assert_eq!(panel.values().fov, 20.0);
    }

    #[test]
    fn test_fov_drag() {
        let mut panel = panel();
        let track = panel.row_rect(PanelRow::Fov);
        let y = track.y + track.height * 0.5;
        panel.handle_event(&InputEvent::CursorMoved { x: track.x, y });
        let response = panel.handle_event(&InputEvent::MouseDown(MouseButton::Left));
        assert!(response.consumed);
        assert_eq!(response.events, vec![PanelEvent::FovChanged(20.0)]);

        // Dragging past the end keeps the value clamped
        let response = panel.handle_event(&InputEvent::CursorMoved { x: track.x + track.width + 50.0, y });
        assert!(response.consumed);
        assert_eq!(response.events, vec![PanelEvent::FovChanged(100.0)]);
        panel.handle_event(&InputEvent::MouseUp(MouseButton::Left));

        let response = panel.handle_event(&InputEvent::CursorMoved { x: track.x, y });
        assert!(response.events.is_empty());
    }

    #[test]
    fn test_color_entry() {
        let mut panel = panel();
        let at = center(panel.row_rect(PanelRow::FloorColor));
        click(&mut panel, at);
        let mut events = Vec::new();
        for ch in "#3366ff".chars() {
            events.extend(panel.handle_event(&InputEvent::Char(ch)).events);
        }
        assert_eq!(events, vec![PanelEvent::FloorColorChanged(Color::from_hex("#3366ff").unwrap())]);
        assert_eq!(panel.values().floor_color.to_hex(), "#3366ff");
        assert_eq!(panel.values().text_color.to_hex(), "#ffffff");
    }

    #[test]
    fn test_screenshot_button() {
        let mut panel = panel();
        let at = center(panel.row_rect(PanelRow::Screenshot));
        let events = click(&mut panel, at);
        assert_eq!(events, vec![PanelEvent::ScreenshotRequested]);

        assert_eq!(panel.focus(), Some(PanelRow::Screenshot));
        assert_eq!(key(&mut panel, Key::Space).events, vec![PanelEvent::ScreenshotRequested]);
        assert_eq!(key(&mut panel, Key::Enter).events, vec![PanelEvent::ScreenshotRequested]);
    }

    #[test]
    fn test_click_outside_is_not_consumed() {
        let mut panel = panel();
        let at = center(panel.row_rect(PanelRow::Text));
        click(&mut panel, at);
        panel.handle_event(&InputEvent::CursorMoved { x: 50.0, y: 500.0 });
        let response = panel.handle_event(&InputEvent::MouseDown(MouseButton::Left));
        assert!(!response.consumed);
        assert_eq!(panel.focus(), None);
    }

    #[test]
    fn test_render_data_lists_rows() {
        let data = panel().to_render_data();
        assert!(!data.is_empty());
        let texts: Vec<&str> = data.texts.iter().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"FOV"));
        assert!(texts.contains(&"45"));
        assert!(texts.contains(&"#151515"));
        assert!(texts.contains(&"SCREENSHOT"));
    }

    #[test]
    fn test_hidden_panel_ignores_input() {
        let mut panel = panel();
        panel.set_visible(false);
        let response = key(&mut panel, Key::Tab);
        assert!(!response.consumed);
        assert!(panel.to_render_data().is_empty());
    }
}
