//! Key codes. Non-negative codes are Unicode code points; negative codes are
//! internal actions.

pub const UNSPECIFIED: i32 = 0;

pub const TAB: i32 = 9;
pub const ENTER: i32 = 10;
pub const ESCAPE: i32 = 27;
pub const SPACE: i32 = 32;
pub const PHONE_PAUSE: i32 = 44;
pub const PHONE_WAIT: i32 = 59;
pub const KESHIDA: i32 = 0x0640;
pub const HALF_SPACE: i32 = 0x200C;
pub const CJK_SPACE: i32 = 0x3000;

pub const CTRL: i32 = -1;
pub const CTRL_LOCK: i32 = -2;
pub const ALT: i32 = -3;
pub const ALT_LOCK: i32 = -4;
pub const FN: i32 = -5;
pub const FN_LOCK: i32 = -6;
pub const DELETE: i32 = -7;
pub const DELETE_WORD: i32 = -8;
pub const FORWARD_DELETE: i32 = -9;
pub const FORWARD_DELETE_WORD: i32 = -10;
pub const SHIFT: i32 = -11;
pub const CAPS_LOCK: i32 = -13;

pub const ARROW_LEFT: i32 = -21;
pub const ARROW_RIGHT: i32 = -22;
pub const ARROW_UP: i32 = -23;
pub const ARROW_DOWN: i32 = -24;
pub const MOVE_START_OF_PAGE: i32 = -25;
pub const MOVE_END_OF_PAGE: i32 = -26;
pub const MOVE_START_OF_LINE: i32 = -27;
pub const MOVE_END_OF_LINE: i32 = -28;

pub const CLIPBOARD_COPY: i32 = -31;
pub const CLIPBOARD_CUT: i32 = -32;
pub const CLIPBOARD_PASTE: i32 = -33;
pub const CLIPBOARD_SELECT: i32 = -34;
pub const CLIPBOARD_SELECT_ALL: i32 = -35;
pub const CLIPBOARD_CLEAR_HISTORY: i32 = -36;
pub const CLIPBOARD_CLEAR_FULL_HISTORY: i32 = -37;
pub const CLIPBOARD_CLEAR_PRIMARY_CLIP: i32 = -38;

pub const COMPACT_LAYOUT_TO_LEFT: i32 = -111;
pub const COMPACT_LAYOUT_TO_RIGHT: i32 = -112;

pub const UNDO: i32 = -131;
pub const REDO: i32 = -132;

pub const VIEW_CHARACTERS: i32 = -201;
pub const VIEW_SYMBOLS: i32 = -202;
pub const VIEW_SYMBOLS2: i32 = -203;
pub const VIEW_NUMERIC: i32 = -204;
pub const VIEW_NUMERIC_ADVANCED: i32 = -205;
pub const VIEW_PHONE: i32 = -206;
pub const VIEW_PHONE2: i32 = -207;

pub const IME_UI_MODE_TEXT: i32 = -211;
pub const IME_UI_MODE_MEDIA: i32 = -212;
pub const IME_UI_MODE_CLIPBOARD: i32 = -213;

pub const SYSTEM_INPUT_METHOD_PICKER: i32 = -221;
pub const SYSTEM_PREV_INPUT_METHOD: i32 = -222;
pub const SYSTEM_NEXT_INPUT_METHOD: i32 = -223;
pub const IME_SUBTYPE_PICKER: i32 = -224;
pub const IME_PREV_SUBTYPE: i32 = -225;
pub const IME_NEXT_SUBTYPE: i32 = -226;
pub const LANGUAGE_SWITCH: i32 = -227;
pub const IME_SHOW_UI: i32 = -231;
pub const IME_HIDE_UI: i32 = -232;

pub const URI_COMPONENT_TLD: i32 = -255;

pub const SETTINGS: i32 = -301;

pub const CURRENCY_SLOT_1: i32 = -801;
pub const CURRENCY_SLOT_2: i32 = -802;
pub const CURRENCY_SLOT_3: i32 = -803;
pub const CURRENCY_SLOT_4: i32 = -804;
pub const CURRENCY_SLOT_5: i32 = -805;
pub const CURRENCY_SLOT_6: i32 = -806;

pub const MULTIPLE_CODE_POINTS: i32 = -902;

pub const KANA_SMALL: i32 = -9700;
pub const CHAR_WIDTH_SWITCHER: i32 = -9701;
pub const CHAR_WIDTH_FULL: i32 = -9702;
pub const CHAR_WIDTH_HALF: i32 = -9703;
pub const KANA_SWITCHER: i32 = -9710;
pub const KANA_HIRA: i32 = -9711;
pub const KANA_KATA: i32 = -9712;

pub fn is_currency_slot(code: i32) -> bool {
    (CURRENCY_SLOT_6..=CURRENCY_SLOT_1).contains(&code)
}

/// Zero-based slot index for a currency slot code.
pub fn currency_slot_index(code: i32) -> Option<usize> {
    is_currency_slot(code).then(|| (CURRENCY_SLOT_1 - code) as usize)
}

pub fn is_space_like(code: i32) -> bool {
    matches!(code, SPACE | CJK_SPACE | HALF_SPACE)
}

pub fn is_view_switch(code: i32) -> bool {
    (VIEW_PHONE2..=VIEW_CHARACTERS).contains(&code)
}
