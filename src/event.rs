//! Toolkit independent input events delivered to the application.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventType {
    Motion,
    Press,
    DblPress,
    Release,
    ScrollVert,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

/// One pointer occurrence in window-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventType,
    pub x: f64,
    pub y: f64,
    pub button: MouseButton,
    pub shift_down: bool,
    pub control_down: bool,
    /// `+1` or `-1` for [`MouseEventType::ScrollVert`], zero otherwise.
    pub scroll_delta: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardEventType {
    Press,
    Release,
}

/// Key identity: a lower-cased character or a 1-based function key number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Character(char),
    Function(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyboardEvent {
    pub kind: KeyboardEventType,
    pub key: Key,
    pub shift_down: bool,
    pub control_down: bool,
}

impl KeyboardEvent {
    /// A key press of `chr`, typically used to describe an accelerator.
    pub fn character(chr: char) -> Self {
        Self {
            kind: KeyboardEventType::Press,
            key: Key::Character(chr),
            shift_down: false,
            control_down: false,
        }
    }

    /// A key press of function key `num` (F1 is 1).
    pub fn function(num: u32) -> Self {
        Self {
            kind: KeyboardEventType::Press,
            key: Key::Function(num),
            shift_down: false,
            control_down: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_down = true;
        self
    }

    pub fn with_control(mut self) -> Self {
        self.control_down = true;
        self
    }

    /// Same key and modifiers, regardless of press or release.
    pub fn same_chord(&self, other: &KeyboardEvent) -> bool {
        self.key == other.key
            && self.shift_down == other.shift_down
            && self.control_down == other.control_down
    }
}

/// Renders the chord the way menus show accelerators, e.g. `Ctrl+Shift+A`.
impl fmt::Display for KeyboardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.control_down {
            f.write_str("Ctrl+")?;
        }
        if self.shift_down {
            f.write_str("Shift+")?;
        }
        match self.key {
            Key::Function(num) => write!(f, "F{num}"),
            Key::Character('\t') => f.write_str("Tab"),
            Key::Character('\x1b') => f.write_str("Esc"),
            Key::Character('\x7f') => f.write_str("Del"),
            Key::Character(' ') => f.write_str("Space"),
            Key::Character('\r') | Key::Character('\n') => f.write_str("Enter"),
            Key::Character('\x08') => f.write_str("Backspace"),
            Key::Character(chr) => write!(f, "{}", chr.to_uppercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SixDofEventType {
    Motion,
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SixDofButton {
    Fit,
}

/// Input from a six-degree-of-freedom device such as a space mouse.
///
/// Motion events carry translation and rotation; rotation is already scaled
/// and every Z component is expressed in the application's left-handed
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SixDofMotion {
    pub translation_x: f64,
    pub translation_y: f64,
    pub translation_z: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SixDofEvent {
    pub kind: SixDofEventType,
    pub motion: SixDofMotion,
    pub button: Option<SixDofButton>,
    pub shift_down: bool,
    pub control_down: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accelerator_labels() {
        assert_eq!(KeyboardEvent::character('a').with_control().to_string(), "Ctrl+A");
        assert_eq!(
            KeyboardEvent::character('s').with_shift().with_control().to_string(),
            "Ctrl+Shift+S"
        );
        assert_eq!(KeyboardEvent::function(5).to_string(), "F5");
        assert_eq!(KeyboardEvent::character('\t').to_string(), "Tab");
        assert_eq!(KeyboardEvent::character('\x7f').to_string(), "Del");
    }

    #[test]
    fn chord_ignores_press_or_release() {
        let press = KeyboardEvent::character('q').with_control();
        let release = KeyboardEvent {
            kind: KeyboardEventType::Release,
            ..press
        };
        assert!(press.same_chord(&release));
        assert!(!press.same_chord(&KeyboardEvent::character('q')));
    }
}
