//! Normalized input events.
//!
//! Mouse, pen and touch input are folded into the same [`PointerEvent`] before
//! they reach the state machine, so no handler special-cases its source.
//! Positions are always in screen space.

use crate::geometry::Point;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl From<slint::platform::PointerEventButton> for PointerButton {
    fn from(button: slint::platform::PointerEventButton) -> Self {
        match button {
            slint::platform::PointerEventButton::Middle => PointerButton::Middle,
            slint::platform::PointerEventButton::Right => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        meta: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn control() -> Self {
        Modifiers {
            control: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Modifiers {
            meta: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.control || self.meta
    }

    /// Modifier that toggles a node's membership in the selection.
    pub fn multi_select(&self) -> bool {
        self.command() || self.shift
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub click_count: u8,
    pub source: PointerSource,
}

impl PointerEvent {
    /// Primary-button mouse event at a screen position.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            click_count: 1,
            source: PointerSource::Mouse,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_click_count(mut self, count: u8) -> Self {
        self.click_count = count;
        self
    }

    pub fn from_touch(touch: &TouchPoint) -> Self {
        Self {
            position: touch.position,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            click_count: 1,
            source: PointerSource::Touch,
        }
    }

    pub fn is_double_click(&self) -> bool {
        self.click_count >= 2
    }
}

/// Scroll or trackpad event. Trackpad pinch arrives as a ctrl+wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub position: Point,
    pub delta: Point,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// One touch frame: the fingers still down, the ones that changed, and a
/// monotonic timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchEvent {
    pub touches: Vec<TouchPoint>,
    pub changed_touches: Vec<TouchPoint>,
    pub time: Duration,
}

impl TouchEvent {
    pub fn new(touches: Vec<TouchPoint>, changed_touches: Vec<TouchPoint>, time: Duration) -> Self {
        Self {
            touches,
            changed_touches,
            time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Tab,
    Enter,
    Character(char),
}

impl Key {
    /// Parse the text of a toolkit key event (control characters for special keys).
    pub fn from_text(text: &str) -> Option<Key> {
        let mut chars = text.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Some(match c {
            '\u{1b}' => Key::Escape,
            '\u{7f}' => Key::Delete,
            '\u{8}' => Key::Backspace,
            '\t' => Key::Tab,
            '\n' | '\r' => Key::Enter,
            other => Key::Character(other),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_select_modifiers() {
        assert!(Modifiers::shift().multi_select());
        assert!(Modifiers::control().multi_select());
        assert!(Modifiers::meta().multi_select());
        assert!(!Modifiers::NONE.multi_select());
        assert!(!Modifiers::shift().command());
    }

    #[test]
    fn test_key_from_text() {
        assert_eq!(Key::from_text("\u{1b}"), Some(Key::Escape));
        assert_eq!(Key::from_text("\u{7f}"), Some(Key::Delete));
        assert_eq!(Key::from_text("\t"), Some(Key::Tab));
        assert_eq!(Key::from_text("\n"), Some(Key::Enter));
        assert_eq!(Key::from_text("z"), Some(Key::Character('z')));
        assert_eq!(Key::from_text(""), None);
        assert_eq!(Key::from_text("ab"), None);
    }

    #[test]
    fn test_pointer_from_touch_is_primary() {
        let event = PointerEvent::from_touch(&TouchPoint::new(7, 10.0, 20.0));
        assert_eq!(event.button, PointerButton::Primary);
        assert_eq!(event.source, PointerSource::Touch);
        assert_eq!(event.position, Point::new(10.0, 20.0));
    }
}
