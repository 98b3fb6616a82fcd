//! Packed keyboard state.
//!
//! All mode and flag fields live in a single `u64`. [`KeyboardState`] is the
//! plain value type (cheap to copy, compare and hash); [`StateRegister`] is the
//! live, observable register the session mutates.

mod register;


use std::fmt;

use serde::{Deserialize, Serialize};

pub use register::{ObserverId, StateRegister};

// ---------------------------------------------------------------------------
// Bit layout
// ---------------------------------------------------------------------------

pub const M_KEYBOARD_MODE: u64 = 0x0F;
pub const O_KEYBOARD_MODE: u32 = 0;
pub const M_KEY_VARIATION: u64 = 0x0F;
pub const O_KEY_VARIATION: u32 = 4;
pub const M_INPUT_SHIFT_STATE: u64 = 0x03;
pub const O_INPUT_SHIFT_STATE: u32 = 8;
pub const M_IME_UI_MODE: u64 = 0x07;
pub const O_IME_UI_MODE: u32 = 24;

pub const F_IS_SELECTION_MODE: u64 = 0x0000_0400;
pub const F_IS_MANUAL_SELECTION_MODE: u64 = 0x0000_0800;
pub const F_IS_MANUAL_SELECTION_MODE_START: u64 = 0x0000_1000;
pub const F_IS_MANUAL_SELECTION_MODE_END: u64 = 0x0000_2000;
pub const F_IS_PRIVATE_MODE: u64 = 0x0000_8000;
pub const F_IS_QUICK_ACTIONS_VISIBLE: u64 = 0x0001_0000;
pub const F_IS_SHOWING_INLINE_SUGGESTIONS: u64 = 0x0002_0000;
pub const F_IS_COMPOSING_ENABLED: u64 = 0x0004_0000;
pub const F_IS_CHAR_HALF_WIDTH: u64 = 0x0020_0000;
pub const F_IS_KANA_KATA: u64 = 0x0040_0000;
pub const F_IS_KANA_SMALL: u64 = 0x0080_0000;
pub const F_IS_RTL_LAYOUT_DIRECTION: u64 = 0x0800_0000;
pub const F_DEBUG_SHOW_TOUCH_BOUNDARIES: u64 = 0x1000_0000;
pub const F_DEBUG_SHOW_DRAG_AND_DROP_HELPERS: u64 = 0x2000_0000;

// ---------------------------------------------------------------------------
// Region enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardMode {
    #[default]
    Characters,
    Editing,
    Symbols,
    Symbols2,
    Numeric,
    NumericAdvanced,
    Phone,
    Phone2,
    SmartbarClipboardCursorRow,
    SmartbarNumberRow,
}

impl KeyboardMode {
    pub const ALL: [KeyboardMode; 10] = [
        Self::Characters,
        Self::Editing,
        Self::Symbols,
        Self::Symbols2,
        Self::Numeric,
        Self::NumericAdvanced,
        Self::Phone,
        Self::Phone2,
        Self::SmartbarClipboardCursorRow,
        Self::SmartbarNumberRow,
    ];

    pub fn to_bits(self) -> u64 {
        match self {
            Self::Characters => 0,
            Self::Editing => 1,
            Self::Symbols => 2,
            Self::Symbols2 => 3,
            Self::Numeric => 4,
            Self::NumericAdvanced => 5,
            Self::Phone => 6,
            Self::Phone2 => 7,
            Self::SmartbarClipboardCursorRow => 8,
            Self::SmartbarNumberRow => 9,
        }
    }

    /// Unknown values decode to `Characters`.
    pub fn from_bits(bits: u64) -> Self {
        Self::ALL
            .into_iter()
            .find(|m| m.to_bits() == bits)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyVariation {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "email")]
    EmailAddress,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "uri")]
    Uri,
}

impl KeyVariation {
    pub fn to_bits(self) -> u64 {
        match self {
            Self::All => 0,
            Self::EmailAddress => 1,
            Self::Normal => 2,
            Self::Password => 3,
            Self::Uri => 4,
        }
    }

    pub fn from_bits(bits: u64) -> Self {
        match bits {
            1 => Self::EmailAddress,
            2 => Self::Normal,
            3 => Self::Password,
            4 => Self::Uri,
            _ => Self::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShiftState {
    #[default]
    Unshifted,
    ShiftedManual,
    ShiftedAutomatic,
    CapsLock,
}

impl InputShiftState {
    pub fn to_bits(self) -> u64 {
        match self {
            Self::Unshifted => 0,
            Self::ShiftedManual => 1,
            Self::ShiftedAutomatic => 2,
            Self::CapsLock => 3,
        }
    }

    pub fn from_bits(bits: u64) -> Self {
        match bits {
            1 => Self::ShiftedManual,
            2 => Self::ShiftedAutomatic,
            3 => Self::CapsLock,
            _ => Self::Unshifted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImeUiMode {
    #[default]
    Text,
    Media,
    Clipboard,
}

impl ImeUiMode {
    pub fn to_bits(self) -> u64 {
        match self {
            Self::Text => 0,
            Self::Media => 1,
            Self::Clipboard => 2,
        }
    }

    pub fn from_bits(bits: u64) -> Self {
        match bits {
            1 => Self::Media,
            2 => Self::Clipboard,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

// ---------------------------------------------------------------------------
// KeyboardState
// ---------------------------------------------------------------------------

/// Immutable-by-default view of the packed register.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyboardState {
    raw: u64,
}

macro_rules! flag_accessors {
    ($($get:ident, $set:ident => $flag:ident;)*) => {
        $(
            pub fn $get(&self) -> bool {
                self.get_flag($flag)
            }

            pub fn $set(&mut self, v: bool) {
                self.set_flag($flag, v);
            }
        )*
    };
}

impl KeyboardState {
    pub const fn new(raw: u64) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn get_flag(&self, flag: u64) -> bool {
        self.raw & flag != 0
    }

    pub fn set_flag(&mut self, flag: u64, v: bool) {
        if v {
            self.raw |= flag;
        } else {
            self.raw &= !flag;
        }
    }

    pub fn get_region(&self, mask: u64, offset: u32) -> u64 {
        (self.raw >> offset) & mask
    }

    pub fn set_region(&mut self, mask: u64, offset: u32, v: u64) {
        self.raw = (self.raw & !(mask << offset)) | ((v & mask) << offset);
    }

    pub fn keyboard_mode(&self) -> KeyboardMode {
        KeyboardMode::from_bits(self.get_region(M_KEYBOARD_MODE, O_KEYBOARD_MODE))
    }

    pub fn set_keyboard_mode(&mut self, v: KeyboardMode) {
        self.set_region(M_KEYBOARD_MODE, O_KEYBOARD_MODE, v.to_bits());
    }

    pub fn key_variation(&self) -> KeyVariation {
        KeyVariation::from_bits(self.get_region(M_KEY_VARIATION, O_KEY_VARIATION))
    }

    pub fn set_key_variation(&mut self, v: KeyVariation) {
        self.set_region(M_KEY_VARIATION, O_KEY_VARIATION, v.to_bits());
    }

    pub fn input_shift_state(&self) -> InputShiftState {
        InputShiftState::from_bits(self.get_region(M_INPUT_SHIFT_STATE, O_INPUT_SHIFT_STATE))
    }

    pub fn set_input_shift_state(&mut self, v: InputShiftState) {
        self.set_region(M_INPUT_SHIFT_STATE, O_INPUT_SHIFT_STATE, v.to_bits());
    }

    pub fn ime_ui_mode(&self) -> ImeUiMode {
        ImeUiMode::from_bits(self.get_region(M_IME_UI_MODE, O_IME_UI_MODE))
    }

    pub fn set_ime_ui_mode(&mut self, v: ImeUiMode) {
        self.set_region(M_IME_UI_MODE, O_IME_UI_MODE, v.to_bits());
    }

    pub fn layout_direction(&self) -> LayoutDirection {
        if self.is_rtl_layout_direction() {
            LayoutDirection::Rtl
        } else {
            LayoutDirection::Ltr
        }
    }

    pub fn is_uppercase(&self) -> bool {
        self.input_shift_state() != InputShiftState::Unshifted
    }

    pub fn is_lowercase(&self) -> bool {
        !self.is_uppercase()
    }

    flag_accessors! {
        is_selection_mode, set_selection_mode => F_IS_SELECTION_MODE;
        is_manual_selection_mode, set_manual_selection_mode => F_IS_MANUAL_SELECTION_MODE;
        is_manual_selection_mode_start, set_manual_selection_mode_start => F_IS_MANUAL_SELECTION_MODE_START;
        is_manual_selection_mode_end, set_manual_selection_mode_end => F_IS_MANUAL_SELECTION_MODE_END;
        is_private_mode, set_private_mode => F_IS_PRIVATE_MODE;
        is_quick_actions_visible, set_quick_actions_visible => F_IS_QUICK_ACTIONS_VISIBLE;
        is_showing_inline_suggestions, set_showing_inline_suggestions => F_IS_SHOWING_INLINE_SUGGESTIONS;
        is_composing_enabled, set_composing_enabled => F_IS_COMPOSING_ENABLED;
        is_char_half_width, set_char_half_width => F_IS_CHAR_HALF_WIDTH;
        is_kana_kata, set_kana_kata => F_IS_KANA_KATA;
        is_kana_small, set_kana_small => F_IS_KANA_SMALL;
        is_rtl_layout_direction, set_rtl_layout_direction => F_IS_RTL_LAYOUT_DIRECTION;
        debug_show_touch_boundaries, set_debug_show_touch_boundaries => F_DEBUG_SHOW_TOUCH_BOUNDARIES;
        debug_show_drag_and_drop_helpers, set_debug_show_drag_and_drop_helpers => F_DEBUG_SHOW_DRAG_AND_DROP_HELPERS;
    }
}

impl fmt::Debug for KeyboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyboardState(0x{:016x})", self.raw)
    }
}
