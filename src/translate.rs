//! Pure mapping from native input records to neutral events.
//!
//! Every function returns at most one event. `None` means the input is not
//! translatable and must be left to the toolkit's default handling.

use crate::event::{
    Key, KeyboardEvent, KeyboardEventType, MouseButton, MouseEvent, MouseEventType, SixDofButton,
    SixDofEvent, SixDofEventType, SixDofMotion,
};
use crate::native::{
    keysym, keysym_to_lower, keysym_to_unicode, ButtonPressKind, KeyPayload, ModifierMask,
    PointerPayload, ScrollDirection, ScrollPayload, SpnavPayload,
};

/// Scale applied to raw space mouse rotation.
pub const SIX_DOF_ROTATION_SCALE: f64 = 0.001;

fn resolve_button(button: u32, state: ModifierMask) -> MouseButton {
    match button {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        _ if state.contains(ModifierMask::BUTTON1) => MouseButton::Left,
        _ if state.contains(ModifierMask::BUTTON2) => MouseButton::Middle,
        _ if state.contains(ModifierMask::BUTTON3) => MouseButton::Right,
        _ => MouseButton::None,
    }
}

fn pointer_event(
    kind: MouseEventType,
    x: f64,
    y: f64,
    state: ModifierMask,
    button: u32,
    scroll_delta: i32,
) -> MouseEvent {
    MouseEvent {
        kind,
        x,
        y,
        button: resolve_button(button, state),
        shift_down: state.contains(ModifierMask::SHIFT),
        control_down: state.contains(ModifierMask::CONTROL),
        scroll_delta,
    }
}

/// Motion, release and leave events. Motion and crossing events carry no
/// button of their own; the held button comes from the state mask.
pub fn translate_pointer(kind: MouseEventType, payload: &PointerPayload) -> MouseEvent {
    pointer_event(kind, payload.x, payload.y, payload.state, payload.button, 0)
}

/// Button presses. Presses beyond a double click are not translatable.
pub fn translate_button_press(press: ButtonPressKind, payload: &PointerPayload) -> Option<MouseEvent> {
    let kind = match press {
        ButtonPressKind::Single => MouseEventType::Press,
        ButtonPressKind::Double => MouseEventType::DblPress,
        ButtonPressKind::Triple => return None,
    };
    Some(translate_pointer(kind, payload))
}

/// Vertical scrolling. Scrolling toward the top yields `+1`.
pub fn translate_scroll(payload: &ScrollPayload) -> Option<MouseEvent> {
    let delta = if payload.delta_y < 0.0 || payload.direction == ScrollDirection::Up {
        1
    } else if payload.delta_y > 0.0 || payload.direction == ScrollDirection::Down {
        -1
    } else {
        return None;
    };
    Some(pointer_event(
        MouseEventType::ScrollVert,
        payload.x,
        payload.y,
        payload.state,
        0,
        delta,
    ))
}

/// Key presses and releases.
///
/// Only Shift and Control may be held; combinations with any other modifier
/// are left to the toolkit's accelerator handling.
pub fn translate_key(kind: KeyboardEventType, payload: &KeyPayload) -> Option<KeyboardEvent> {
    let allowed = ModifierMask::SHIFT | ModifierMask::CONTROL;
    if !payload.state.difference(allowed).is_empty() {
        return None;
    }

    let key = match keysym_to_unicode(keysym_to_lower(payload.keysym)) {
        Some(chr) => Key::Character(chr),
        None if (keysym::F1..=keysym::F12).contains(&payload.keysym) => {
            Key::Function(payload.keysym - keysym::F1 + 1)
        }
        None => return None,
    };

    Some(KeyboardEvent {
        kind,
        key,
        shift_down: payload.state.contains(ModifierMask::SHIFT),
        control_down: payload.state.contains(ModifierMask::CONTROL),
    })
}

/// Space mouse packets.
///
/// The device is right-handed and the application left-handed, so both Z
/// components flip sign. Only button 0 has a meaning (fit view); other
/// buttons are swallowed.
pub fn translate_six_dof(payload: &SpnavPayload, state: ModifierMask) -> Option<SixDofEvent> {
    let shift_down = state.contains(ModifierMask::SHIFT);
    let control_down = state.contains(ModifierMask::CONTROL);

    match *payload {
        SpnavPayload::Motion {
            x,
            y,
            z,
            rx,
            ry,
            rz,
            ..
        } => Some(SixDofEvent {
            kind: SixDofEventType::Motion,
            motion: SixDofMotion {
                translation_x: f64::from(x),
                translation_y: f64::from(y),
                translation_z: f64::from(z) * -1.0,
                rotation_x: f64::from(rx) * SIX_DOF_ROTATION_SCALE,
                rotation_y: f64::from(ry) * SIX_DOF_ROTATION_SCALE,
                rotation_z: f64::from(rz) * -SIX_DOF_ROTATION_SCALE,
            },
            button: None,
            shift_down,
            control_down,
        }),
        SpnavPayload::Button { press, bnum } => {
            let button = match bnum {
                0 => SixDofButton::Fit,
                _ => return None,
            };
            Some(SixDofEvent {
                kind: if press {
                    SixDofEventType::Press
                } else {
                    SixDofEventType::Release
                },
                motion: SixDofMotion::default(),
                button: Some(button),
                shift_down,
                control_down,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(keysym: u32, state: ModifierMask) -> KeyPayload {
        KeyPayload { keysym, state }
    }

    fn scroll(direction: ScrollDirection, delta_y: f64) -> ScrollPayload {
        ScrollPayload {
            x: 10.0,
            y: 20.0,
            state: ModifierMask::NONE,
            direction,
            delta_y,
        }
    }

    #[test]
    fn shifted_letter_is_lower_cased() {
        let event =
            translate_key(KeyboardEventType::Press, &key('A' as u32, ModifierMask::SHIFT)).unwrap();
        assert_eq!(event.key, Key::Character('a'));
        assert!(event.shift_down);
        assert!(!event.control_down);
        assert_eq!(event.kind, KeyboardEventType::Press);
    }

    #[test]
    fn alt_or_meta_is_not_translatable() {
        assert_eq!(
            translate_key(KeyboardEventType::Press, &key('a' as u32, ModifierMask::MOD1)),
            None
        );
        assert_eq!(
            translate_key(
                KeyboardEventType::Press,
                &key('a' as u32, ModifierMask::META | ModifierMask::SHIFT)
            ),
            None
        );
        assert_eq!(
            translate_key(KeyboardEventType::Press, &key('a' as u32, ModifierMask::SUPER)),
            None
        );
    }

    #[test]
    fn function_keys_become_ordinals() {
        let event = translate_key(
            KeyboardEventType::Release,
            &key(keysym::F1 + 4, ModifierMask::CONTROL),
        )
        .unwrap();
        assert_eq!(event.key, Key::Function(5));
        assert!(event.control_down);
        assert_eq!(event.kind, KeyboardEventType::Release);
    }

    #[test]
    fn keys_without_character_or_function_are_dropped() {
        assert_eq!(
            translate_key(KeyboardEventType::Press, &key(keysym::SHIFT_L, ModifierMask::SHIFT)),
            None
        );
        assert_eq!(
            translate_key(KeyboardEventType::Press, &key(keysym::UP, ModifierMask::NONE)),
            None
        );
    }

    #[test]
    fn escape_and_delete_are_characters() {
        let esc = translate_key(KeyboardEventType::Press, &key(keysym::ESCAPE, ModifierMask::NONE));
        assert_eq!(esc.unwrap().key, Key::Character('\x1b'));
        let del = translate_key(KeyboardEventType::Press, &key(keysym::DELETE, ModifierMask::NONE));
        assert_eq!(del.unwrap().key, Key::Character('\x7f'));
    }

    #[test]
    fn scroll_sign_follows_native_delta() {
        assert_eq!(translate_scroll(&scroll(ScrollDirection::Smooth, -1.0)).unwrap().scroll_delta, 1);
        assert_eq!(translate_scroll(&scroll(ScrollDirection::Smooth, 1.0)).unwrap().scroll_delta, -1);
        assert_eq!(translate_scroll(&scroll(ScrollDirection::Up, 0.0)).unwrap().scroll_delta, 1);
        assert_eq!(translate_scroll(&scroll(ScrollDirection::Down, 0.0)).unwrap().scroll_delta, -1);
        assert_eq!(translate_scroll(&scroll(ScrollDirection::Smooth, 0.0)), None);
        assert_eq!(translate_scroll(&scroll(ScrollDirection::Left, 0.0)), None);
    }

    #[test]
    fn scroll_event_keeps_position() {
        let event = translate_scroll(&scroll(ScrollDirection::Up, 0.0)).unwrap();
        assert_eq!(event.kind, MouseEventType::ScrollVert);
        assert_eq!((event.x, event.y), (10.0, 20.0));
        assert_eq!(event.button, MouseButton::None);
    }

    #[test]
    fn explicit_button_wins_over_state() {
        let payload = PointerPayload {
            x: 1.0,
            y: 2.0,
            state: ModifierMask::BUTTON1,
            button: 3,
        };
        assert_eq!(translate_pointer(MouseEventType::Release, &payload).button, MouseButton::Right);

        let payload = PointerPayload {
            button: 0,
            ..payload
        };
        assert_eq!(translate_pointer(MouseEventType::Release, &payload).button, MouseButton::Left);
    }

    #[test]
    fn motion_button_comes_from_state() {
        let payload = PointerPayload {
            x: 5.0,
            y: 6.0,
            state: ModifierMask::BUTTON2 | ModifierMask::SHIFT,
            button: 0,
        };
        let event = translate_pointer(MouseEventType::Motion, &payload);
        assert_eq!(event.button, MouseButton::Middle);
        assert!(event.shift_down);
        assert!(!event.control_down);
        assert_eq!(event.scroll_delta, 0);
    }

    #[test]
    fn triple_press_is_not_translatable() {
        let payload = PointerPayload::default();
        assert_eq!(translate_button_press(ButtonPressKind::Triple, &payload), None);
        assert_eq!(
            translate_button_press(ButtonPressKind::Double, &payload).unwrap().kind,
            MouseEventType::DblPress
        );
    }

    #[test]
    fn six_dof_motion_is_scaled_and_flipped() {
        let payload = SpnavPayload::Motion {
            x: 10,
            y: -20,
            z: 30,
            rx: 100,
            ry: -200,
            rz: 300,
            period: 16,
        };
        let event = translate_six_dof(&payload, ModifierMask::CONTROL).unwrap();
        assert_eq!(event.kind, SixDofEventType::Motion);
        assert_eq!(event.motion.translation_x, 10.0);
        assert_eq!(event.motion.translation_y, -20.0);
        assert_eq!(event.motion.translation_z, -30.0);
        assert!((event.motion.rotation_x - 0.1).abs() < 1e-12);
        assert!((event.motion.rotation_y + 0.2).abs() < 1e-12);
        assert!((event.motion.rotation_z + 0.3).abs() < 1e-12);
        assert!(event.control_down);
        assert_eq!(event.button, None);
    }

    #[test]
    fn only_the_fit_button_is_recognised() {
        let press = translate_six_dof(&SpnavPayload::Button { press: true, bnum: 0 }, ModifierMask::NONE)
            .unwrap();
        assert_eq!(press.kind, SixDofEventType::Press);
        assert_eq!(press.button, Some(SixDofButton::Fit));

        let release =
            translate_six_dof(&SpnavPayload::Button { press: false, bnum: 0 }, ModifierMask::NONE)
                .unwrap();
        assert_eq!(release.kind, SixDofEventType::Release);

        assert_eq!(
            translate_six_dof(&SpnavPayload::Button { press: true, bnum: 1 }, ModifierMask::NONE),
            None
        );
    }
}
