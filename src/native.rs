//! Raw native input records.
//!
//! The backend fills these from whatever the toolkit reports; the
//! translator turns them into neutral events. Key identities use X11
//! keysyms and modifier state uses the X11 state bitmask, since both are
//! stable, well documented and independent of any widget library.

use crate::event::{Key, KeyboardEvent};
use std::ops::{BitOr, BitOrAssign};

/// Modifier and pointer-button state accompanying a native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierMask(u32);

impl ModifierMask {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const LOCK: Self = Self(1 << 1);
    pub const CONTROL: Self = Self(1 << 2);
    /// Usually Alt.
    pub const MOD1: Self = Self(1 << 3);
    /// Usually Num Lock.
    pub const MOD2: Self = Self(1 << 4);
    pub const MOD3: Self = Self(1 << 5);
    pub const MOD4: Self = Self(1 << 6);
    pub const MOD5: Self = Self(1 << 7);
    pub const BUTTON1: Self = Self(1 << 8);
    pub const BUTTON2: Self = Self(1 << 9);
    pub const BUTTON3: Self = Self(1 << 10);
    pub const BUTTON4: Self = Self(1 << 11);
    pub const BUTTON5: Self = Self(1 << 12);
    pub const SUPER: Self = Self(1 << 26);
    pub const HYPER: Self = Self(1 << 27);
    pub const META: Self = Self(1 << 28);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl BitOr for ModifierMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

pub type Keysym = u32;

pub mod keysym {
    use super::Keysym;

    pub const SPACE: Keysym = 0x0020;
    pub const BACKSPACE: Keysym = 0xff08;
    pub const TAB: Keysym = 0xff09;
    pub const LINEFEED: Keysym = 0xff0a;
    pub const CLEAR: Keysym = 0xff0b;
    pub const RETURN: Keysym = 0xff0d;
    pub const ESCAPE: Keysym = 0xff1b;
    pub const HOME: Keysym = 0xff50;
    pub const LEFT: Keysym = 0xff51;
    pub const UP: Keysym = 0xff52;
    pub const RIGHT: Keysym = 0xff53;
    pub const DOWN: Keysym = 0xff54;
    pub const PAGE_UP: Keysym = 0xff55;
    pub const PAGE_DOWN: Keysym = 0xff56;
    pub const END: Keysym = 0xff57;
    pub const INSERT: Keysym = 0xff63;
    pub const KP_SPACE: Keysym = 0xff80;
    pub const KP_TAB: Keysym = 0xff89;
    pub const KP_ENTER: Keysym = 0xff8d;
    pub const KP_MULTIPLY: Keysym = 0xffaa;
    pub const KP_DIVIDE: Keysym = 0xffaf;
    pub const KP_0: Keysym = 0xffb0;
    pub const KP_9: Keysym = 0xffb9;
    pub const KP_EQUAL: Keysym = 0xffbd;
    pub const F1: Keysym = 0xffbe;
    pub const F12: Keysym = 0xffc9;
    pub const SHIFT_L: Keysym = 0xffe1;
    pub const DELETE: Keysym = 0xffff;
    /// Keysyms at or above this value encode a Unicode code point directly.
    pub const UNICODE_OFFSET: Keysym = 0x0100_0000;
}

/// Lower-case a keysym, leaving everything without a case alone.
pub fn keysym_to_lower(sym: Keysym) -> Keysym {
    match sym {
        0x41..=0x5a => sym + 0x20,
        // Latin-1 upper case letters, except the multiplication sign.
        0xc0..=0xde if sym != 0xd7 => sym + 0x20,
        _ if sym >= keysym::UNICODE_OFFSET => {
            let lowered = char::from_u32(sym - keysym::UNICODE_OFFSET).and_then(|chr| {
                let mut lower = chr.to_lowercase();
                match (lower.next(), lower.next()) {
                    (Some(single), None) => Some(single),
                    _ => None,
                }
            });
            lowered.map_or(sym, unicode_to_keysym)
        }
        _ => sym,
    }
}

/// The character a keysym produces, if any.
pub fn keysym_to_unicode(sym: Keysym) -> Option<char> {
    let code = match sym {
        0x20..=0x7e | 0xa0..=0xff => sym,
        keysym::BACKSPACE => 0x08,
        keysym::TAB | keysym::KP_TAB => 0x09,
        keysym::LINEFEED => 0x0a,
        keysym::CLEAR => 0x0b,
        keysym::RETURN | keysym::KP_ENTER => 0x0d,
        keysym::ESCAPE => 0x1b,
        keysym::DELETE => 0x7f,
        keysym::KP_SPACE => 0x20,
        keysym::KP_EQUAL => '=' as u32,
        // `*` `+` `,` `-` `.` `/` follow the keypad keysyms in ASCII order.
        keysym::KP_MULTIPLY..=keysym::KP_DIVIDE => '*' as u32 + (sym - keysym::KP_MULTIPLY),
        keysym::KP_0..=keysym::KP_9 => '0' as u32 + (sym - keysym::KP_0),
        _ if sym >= keysym::UNICODE_OFFSET => sym - keysym::UNICODE_OFFSET,
        _ => return None,
    };
    char::from_u32(code)
}

pub fn unicode_to_keysym(chr: char) -> Keysym {
    let code = chr as u32;
    match code {
        0x20..=0x7e | 0xa0..=0xff => code,
        _ => keysym::UNICODE_OFFSET + code,
    }
}

/// The keysym a menu accelerator is bound to.
pub fn keysym_for_accelerator(accel: &KeyboardEvent) -> Keysym {
    match accel.key {
        Key::Character('\t') => keysym::TAB,
        Key::Character('\x1b') => keysym::ESCAPE,
        Key::Character('\x7f') => keysym::DELETE,
        Key::Character(chr) => unicode_to_keysym(chr),
        Key::Function(num) => keysym::F1 + num.saturating_sub(1),
    }
}

/// Pointer motion, button or crossing event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPayload {
    pub x: f64,
    pub y: f64,
    pub state: ModifierMask,
    /// Button number as reported by the toolkit, `0` when the event does not
    /// carry one.
    pub button: u32,
}

/// How many presses in quick succession a button press belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPressKind {
    Single,
    Double,
    Triple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
    Smooth,
}

/// Scroll event. `delta_y` is negative toward the top of the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPayload {
    pub x: f64,
    pub y: f64,
    pub state: ModifierMask,
    pub direction: ScrollDirection,
    pub delta_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPayload {
    pub keysym: Keysym,
    pub state: ModifierMask,
}

/// One packet from the space mouse daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpnavPayload {
    Motion {
        x: i32,
        y: i32,
        z: i32,
        rx: i32,
        ry: i32,
        rz: i32,
        period: u32,
    },
    Button {
        press: bool,
        bnum: i32,
    },
}
