//! Labels and icons shown on keys.

use serde::Serialize;

use crate::editor::ImeAction;
use crate::evaluator::ComputingEvaluator;
use crate::key::{code, KeyData, KeyType};
use crate::state::KeyboardMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyIcon {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    ContentCopy,
    ContentCut,
    ContentPaste,
    SelectAll,
    DeleteSweep,
    CompactLayout,
    Backspace,
    KeyboardReturn,
    Done,
    ArrowRightAlt,
    Search,
    Send,
    SentimentSatisfied,
    Assignment,
    Language,
    Settings,
    CapsLock,
    ShiftUp,
    SpaceBar,
    Undo,
    Redo,
    KanaSwitcherKata,
    KanaSwitcherHira,
    CharWidthSwitcherFull,
    CharWidthSwitcherHalf,
}

impl KeyIcon {
    pub fn name(self) -> &'static str {
        match self {
            Self::ArrowLeft => "arrow_left",
            Self::ArrowRight => "arrow_right",
            Self::ArrowUp => "arrow_up",
            Self::ArrowDown => "arrow_down",
            Self::ContentCopy => "content_copy",
            Self::ContentCut => "content_cut",
            Self::ContentPaste => "content_paste",
            Self::SelectAll => "select_all",
            Self::DeleteSweep => "delete_sweep",
            Self::CompactLayout => "compact_layout",
            Self::Backspace => "backspace",
            Self::KeyboardReturn => "keyboard_return",
            Self::Done => "done",
            Self::ArrowRightAlt => "arrow_right_alt",
            Self::Search => "search",
            Self::Send => "send",
            Self::SentimentSatisfied => "sentiment_satisfied",
            Self::Assignment => "assignment",
            Self::Language => "language",
            Self::Settings => "settings",
            Self::CapsLock => "capslock",
            Self::ShiftUp => "shift_up",
            Self::SpaceBar => "space_bar",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::KanaSwitcherKata => "kana_switcher_kata",
            Self::KanaSwitcherHira => "kana_switcher_hira",
            Self::CharWidthSwitcherFull => "char_width_switcher_full",
            Self::CharWidthSwitcherHalf => "char_width_switcher_half",
        }
    }
}

pub fn compute_label(evaluator: &dyn ComputingEvaluator, data: &KeyData) -> Option<String> {
    let is_text = data.key_type == KeyType::Character
        && !matches!(
            data.code,
            code::SPACE | code::CJK_SPACE | code::HALF_SPACE | code::KESHIDA
        );
    if is_text || data.key_type == KeyType::Numeric {
        return Some(data.as_string(true));
    }
    let label = match data.code {
        code::PHONE_PAUSE => "Pause",
        code::PHONE_WAIT => "Wait",
        code::SPACE | code::CJK_SPACE => {
            return match evaluator.keyboard().mode {
                KeyboardMode::Characters => Some(evaluator.active_subtype().primary_locale.clone()),
                _ => None,
            };
        }
        code::IME_UI_MODE_TEXT | code::VIEW_CHARACTERS => "ABC",
        code::VIEW_NUMERIC | code::VIEW_NUMERIC_ADVANCED => "?123",
        code::VIEW_PHONE => "123",
        code::VIEW_PHONE2 => "*#(",
        code::VIEW_SYMBOLS => "?123",
        code::VIEW_SYMBOLS2 => "=\\<",
        code::HALF_SPACE => "ZWNJ",
        code::KESHIDA => "Keshida",
        _ => return None,
    };
    Some(label.to_string())
}

pub fn compute_icon(evaluator: &dyn ComputingEvaluator, data: &KeyData) -> Option<KeyIcon> {
    let icon = match data.code {
        code::ARROW_LEFT => KeyIcon::ArrowLeft,
        code::ARROW_RIGHT => KeyIcon::ArrowRight,
        code::ARROW_UP => KeyIcon::ArrowUp,
        code::ARROW_DOWN => KeyIcon::ArrowDown,
        code::CLIPBOARD_COPY => KeyIcon::ContentCopy,
        code::CLIPBOARD_CUT => KeyIcon::ContentCut,
        code::CLIPBOARD_PASTE => KeyIcon::ContentPaste,
        code::CLIPBOARD_SELECT_ALL => KeyIcon::SelectAll,
        code::CLIPBOARD_CLEAR_PRIMARY_CLIP => KeyIcon::DeleteSweep,
        code::COMPACT_LAYOUT_TO_LEFT | code::COMPACT_LAYOUT_TO_RIGHT => KeyIcon::CompactLayout,
        code::DELETE => KeyIcon::Backspace,
        code::ENTER => {
            let info = evaluator.active_editor_info();
            if info.flag_no_enter_action || info.flag_multi_line {
                KeyIcon::KeyboardReturn
            } else {
                match info.ime_action {
                    ImeAction::Done => KeyIcon::Done,
                    ImeAction::Go | ImeAction::Next | ImeAction::Previous => KeyIcon::ArrowRightAlt,
                    ImeAction::Search => KeyIcon::Search,
                    ImeAction::Send => KeyIcon::Send,
                    ImeAction::None | ImeAction::Unspecified => KeyIcon::KeyboardReturn,
                }
            }
        }
        code::IME_UI_MODE_MEDIA => KeyIcon::SentimentSatisfied,
        code::IME_UI_MODE_CLIPBOARD => KeyIcon::Assignment,
        code::LANGUAGE_SWITCH => KeyIcon::Language,
        code::SETTINGS => KeyIcon::Settings,
        code::SHIFT => {
            if evaluator.active_state().is_uppercase() {
                KeyIcon::CapsLock
            } else {
                KeyIcon::ShiftUp
            }
        }
        code::SPACE | code::CJK_SPACE => match evaluator.keyboard().mode {
            KeyboardMode::Numeric
            | KeyboardMode::NumericAdvanced
            | KeyboardMode::Phone
            | KeyboardMode::Phone2 => KeyIcon::SpaceBar,
            _ => return None,
        },
        code::UNDO => KeyIcon::Undo,
        code::REDO => KeyIcon::Redo,
        code::KANA_SWITCHER => {
            if evaluator.active_state().is_kana_kata() {
                KeyIcon::KanaSwitcherKata
            } else {
                KeyIcon::KanaSwitcherHira
            }
        }
        code::CHAR_WIDTH_SWITCHER => {
            if evaluator.active_state().is_char_half_width() {
                KeyIcon::CharWidthSwitcherFull
            } else {
                KeyIcon::CharWidthSwitcherHalf
            }
        }
        code::CHAR_WIDTH_FULL => KeyIcon::CharWidthSwitcherFull,
        code::CHAR_WIDTH_HALF => KeyIcon::CharWidthSwitcherHalf,
        _ => return None,
    };
    Some(icon)
}

/// Letters printed under the digits of a phone pad.
pub fn phone_hint_label(code: i32) -> Option<&'static str> {
    let digit = u32::try_from(code).ok().and_then(char::from_u32)?;
    let label = match digit {
        '0' => "+",
        '1' => "",
        '2' => "ABC",
        '3' => "DEF",
        '4' => "GHI",
        '5' => "JKL",
        '6' => "MNO",
        '7' => "PQRS",
        '8' => "TUV",
        '9' => "WXYZ",
        _ => return None,
    };
    Some(label)
}
