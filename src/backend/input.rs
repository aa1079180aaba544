//! Conversion of egui input into native payloads.

use crate::event::{KeyboardEventType, MouseEventType};
use crate::native::{
    keysym, ButtonPressKind, KeyPayload, Keysym, ModifierMask, PointerPayload, ScrollDirection,
    ScrollPayload,
};
use eframe::egui::{self, Event, Key, Modifiers, PointerButton, Pos2, Vec2};

/// Longest gap between two presses of a double click, in seconds.
const DOUBLE_CLICK_DELAY: f64 = 0.3;
/// Farthest the pointer may travel between the presses of a double click.
const DOUBLE_CLICK_DISTANCE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NativeInput {
    Pointer(MouseEventType, PointerPayload),
    Press(ButtonPressKind, PointerPayload),
    Key(KeyboardEventType, KeyPayload),
}

/// The keysym egui's logical key stands for.
pub(crate) fn keysym_for(key: Key, shift: bool) -> Option<Keysym> {
    let letter = |lower: u8| {
        let chr = if shift { lower.to_ascii_uppercase() } else { lower };
        Some(Keysym::from(chr))
    };
    let sym = match key {
        Key::A => return letter(b'a'),
        Key::B => return letter(b'b'),
        Key::C => return letter(b'c'),
        Key::D => return letter(b'd'),
        Key::E => return letter(b'e'),
        Key::F => return letter(b'f'),
        Key::G => return letter(b'g'),
        Key::H => return letter(b'h'),
        Key::I => return letter(b'i'),
        Key::J => return letter(b'j'),
        Key::K => return letter(b'k'),
        Key::L => return letter(b'l'),
        Key::M => return letter(b'm'),
        Key::N => return letter(b'n'),
        Key::O => return letter(b'o'),
        Key::P => return letter(b'p'),
        Key::Q => return letter(b'q'),
        Key::R => return letter(b'r'),
        Key::S => return letter(b's'),
        Key::T => return letter(b't'),
        Key::U => return letter(b'u'),
        Key::V => return letter(b'v'),
        Key::W => return letter(b'w'),
        Key::X => return letter(b'x'),
        Key::Y => return letter(b'y'),
        Key::Z => return letter(b'z'),
        Key::Num0 => '0' as Keysym,
        Key::Num1 => '1' as Keysym,
        Key::Num2 => '2' as Keysym,
        Key::Num3 => '3' as Keysym,
        Key::Num4 => '4' as Keysym,
        Key::Num5 => '5' as Keysym,
        Key::Num6 => '6' as Keysym,
        Key::Num7 => '7' as Keysym,
        Key::Num8 => '8' as Keysym,
        Key::Num9 => '9' as Keysym,
        Key::Minus => '-' as Keysym,
        Key::Plus => '+' as Keysym,
        Key::Equals => '=' as Keysym,
        Key::Comma => ',' as Keysym,
        Key::Period => '.' as Keysym,
        Key::Slash => '/' as Keysym,
        Key::Backslash => '\\' as Keysym,
        Key::Semicolon => ';' as Keysym,
        Key::Backtick => '`' as Keysym,
        Key::OpenBracket => '[' as Keysym,
        Key::CloseBracket => ']' as Keysym,
        Key::Space => keysym::SPACE,
        Key::Tab => keysym::TAB,
        Key::Enter => keysym::RETURN,
        Key::Escape => keysym::ESCAPE,
        Key::Backspace => keysym::BACKSPACE,
        Key::Delete => keysym::DELETE,
        Key::Insert => keysym::INSERT,
        Key::Home => keysym::HOME,
        Key::End => keysym::END,
        Key::PageUp => keysym::PAGE_UP,
        Key::PageDown => keysym::PAGE_DOWN,
        Key::ArrowLeft => keysym::LEFT,
        Key::ArrowUp => keysym::UP,
        Key::ArrowRight => keysym::RIGHT,
        Key::ArrowDown => keysym::DOWN,
        Key::F1 => keysym::F1,
        Key::F2 => keysym::F1 + 1,
        Key::F3 => keysym::F1 + 2,
        Key::F4 => keysym::F1 + 3,
        Key::F5 => keysym::F1 + 4,
        Key::F6 => keysym::F1 + 5,
        Key::F7 => keysym::F1 + 6,
        Key::F8 => keysym::F1 + 7,
        Key::F9 => keysym::F1 + 8,
        Key::F10 => keysym::F1 + 9,
        Key::F11 => keysym::F1 + 10,
        Key::F12 => keysym::F12,
        _ => return None,
    };
    Some(sym)
}

pub(crate) fn modifier_mask(modifiers: Modifiers) -> ModifierMask {
    let mut mask = ModifierMask::NONE;
    if modifiers.shift {
        mask |= ModifierMask::SHIFT;
    }
    if modifiers.ctrl {
        mask |= ModifierMask::CONTROL;
    }
    if modifiers.alt {
        mask |= ModifierMask::MOD1;
    }
    if modifiers.mac_cmd {
        mask |= ModifierMask::META;
    }
    mask
}

/// X11 button number: 1 left, 2 middle, 3 right.
pub(crate) fn button_number(button: PointerButton) -> u32 {
    match button {
        PointerButton::Primary => 1,
        PointerButton::Middle => 2,
        PointerButton::Secondary => 3,
        PointerButton::Extra1 => 8,
        PointerButton::Extra2 => 9,
    }
}

pub(crate) fn held_buttons(pointer: &egui::PointerState) -> ModifierMask {
    let mut mask = ModifierMask::NONE;
    if pointer.button_down(PointerButton::Primary) {
        mask |= ModifierMask::BUTTON1;
    }
    if pointer.button_down(PointerButton::Middle) {
        mask |= ModifierMask::BUTTON2;
    }
    if pointer.button_down(PointerButton::Secondary) {
        mask |= ModifierMask::BUTTON3;
    }
    mask
}

/// Vertical wheel movement of one frame. egui counts toward the top of the
/// screen as positive, the native payload as negative.
pub(crate) fn scroll_payload(pos: Pos2, delta: Vec2, state: ModifierMask) -> Option<ScrollPayload> {
    if delta.y == 0.0 {
        return None;
    }
    Some(ScrollPayload {
        x: f64::from(pos.x),
        y: f64::from(pos.y),
        state,
        direction: ScrollDirection::Smooth,
        delta_y: -f64::from(delta.y),
    })
}

#[derive(Debug, Default)]
struct ClickTracker {
    last: Option<(u32, f64, Pos2)>,
}

impl ClickTracker {
    /// Record a press; returns whether it completes a double click.
    fn press(&mut self, button: u32, time: f64, pos: Pos2) -> bool {
        let double = self.last.is_some_and(|(last_button, last_time, last_pos)| {
            last_button == button
                && time - last_time <= DOUBLE_CLICK_DELAY
                && last_pos.distance(pos) <= DOUBLE_CLICK_DISTANCE
        });
        // A third press starts a new sequence instead of another double.
        self.last = if double { None } else { Some((button, time, pos)) };
        double
    }
}

/// Turns the egui event stream of one viewport into native payloads with
/// positions relative to the drawing surface.
#[derive(Debug, Default)]
pub(crate) struct InputConverter {
    clicks: ClickTracker,
    last_pos: Pos2,
}

impl InputConverter {
    pub(crate) fn convert(
        &mut self,
        event: &Event,
        origin: Pos2,
        frame_modifiers: Modifiers,
        held: ModifierMask,
        time: f64,
    ) -> Vec<NativeInput> {
        let payload = |pos: Pos2, state: ModifierMask, button: u32| PointerPayload {
            x: f64::from(pos.x - origin.x),
            y: f64::from(pos.y - origin.y),
            state,
            button,
        };

        match event {
            Event::PointerMoved(pos) => {
                self.last_pos = *pos;
                let state = modifier_mask(frame_modifiers) | held;
                vec![NativeInput::Pointer(
                    MouseEventType::Motion,
                    payload(*pos, state, 0),
                )]
            }
            Event::PointerButton {
                pos,
                button,
                pressed,
                modifiers,
            } => {
                self.last_pos = *pos;
                let number = button_number(*button);
                let state = modifier_mask(*modifiers) | held;
                let event = payload(*pos, state, number);
                if !*pressed {
                    return vec![NativeInput::Pointer(MouseEventType::Release, event)];
                }
                let mut out = vec![NativeInput::Press(ButtonPressKind::Single, event)];
                if self.clicks.press(number, time, *pos) {
                    out.push(NativeInput::Press(ButtonPressKind::Double, event));
                }
                out
            }
            Event::PointerGone => {
                let state = modifier_mask(frame_modifiers) | held;
                vec![NativeInput::Pointer(
                    MouseEventType::Leave,
                    payload(self.last_pos, state, 0),
                )]
            }
            Event::Key {
                key,
                pressed,
                modifiers,
                ..
            } => {
                let Some(keysym) = keysym_for(*key, modifiers.shift) else {
                    tracing::trace!(?key, "key without keysym");
                    return Vec::new();
                };
                let kind = if *pressed {
                    KeyboardEventType::Press
                } else {
                    KeyboardEventType::Release
                };
                vec![NativeInput::Key(
                    kind,
                    KeyPayload {
                        keysym,
                        state: modifier_mask(*modifiers),
                    },
                )]
            }
            _ => Vec::new(),
        }
    }
}
