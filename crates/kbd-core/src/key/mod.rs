//! Key data model: resolved [`KeyData`] and the selector tree
//! ([`AbstractKeyData`]) that layouts are written in.

pub mod code;
mod data;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::popup::PopupSet;

pub use data::{
    AbstractKeyData, CaseSelector, CharWidthSelector, KanaSelector, LayoutDirectionSelector,
    ShiftStateSelector, VariationSelector,
};

pub const GROUP_DEFAULT: i32 = 0;
pub const GROUP_LEFT: i32 = 1;
pub const GROUP_RIGHT: i32 = 2;
pub const GROUP_ENTER: i32 = 3;
pub const GROUP_KANA: i32 = 97;

/// Popup-mapping label used to look up the shared popup of a key group.
pub fn group_popup_label(group_id: i32) -> Option<&'static str> {
    match group_id {
        GROUP_LEFT => Some("~left"),
        GROUP_RIGHT => Some("~right"),
        GROUP_ENTER => Some("~enter"),
        GROUP_KANA => Some("~kana"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    #[default]
    Character,
    EnterEditing,
    Function,
    Lock,
    Modifier,
    Navigation,
    SystemGui,
    Numeric,
    Placeholder,
    Unspecified,
}

/// A fully resolved key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawKeyData")]
pub struct KeyData {
    pub key_type: KeyType,
    pub code: i32,
    pub label: String,
    pub group_id: i32,
    pub popup: Option<Arc<PopupSet>>,
    /// Emitted text for [`code::MULTIPLE_CODE_POINTS`] keys.
    pub code_points: Vec<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKeyData {
    #[serde(default, rename = "type")]
    key_type: KeyType,
    #[serde(default)]
    code: i32,
    #[serde(default)]
    label: String,
    #[serde(default)]
    group_id: i32,
    #[serde(default)]
    popup: Option<PopupSet>,
    #[serde(default)]
    code_points: Vec<i32>,
}

impl From<RawKeyData> for KeyData {
    fn from(raw: RawKeyData) -> Self {
        Self {
            key_type: raw.key_type,
            code: raw.code,
            label: raw.label,
            group_id: raw.group_id,
            popup: raw.popup.map(Arc::new),
            code_points: raw.code_points,
        }
    }
}

impl KeyData {
    pub fn new(key_type: KeyType, code: i32, label: impl Into<String>) -> Self {
        Self {
            key_type,
            code,
            label: label.into(),
            group_id: GROUP_DEFAULT,
            popup: None,
            code_points: Vec::new(),
        }
    }

    pub fn character(ch: char) -> Self {
        Self::new(KeyType::Character, ch as i32, ch.to_string())
    }

    /// The invisible key used when a key resolves to nothing.
    pub fn unspecified() -> Self {
        Self::new(KeyType::Unspecified, code::UNSPECIFIED, "")
    }

    pub fn with_group(mut self, group_id: i32) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn with_popup(mut self, popup: PopupSet) -> Self {
        self.popup = Some(Arc::new(popup));
        self
    }

    pub fn is_space_key(&self) -> bool {
        self.key_type == KeyType::Character && matches!(self.code, code::SPACE | code::CJK_SPACE)
    }

    /// Text this key stands for. Display strings use the label for action
    /// keys and prefix lone combining marks with a dotted circle.
    pub fn as_string(&self, for_display: bool) -> String {
        if self.code == code::MULTIPLE_CODE_POINTS {
            if for_display {
                return self.label.clone();
            }
            return self
                .code_points
                .iter()
                .filter_map(|&cp| u32::try_from(cp).ok().and_then(char::from_u32))
                .collect();
        }
        if for_display || self.code == code::URI_COMPONENT_TLD || self.code < code::SPACE {
            let mut out = String::new();
            if is_non_spacing_mark(self.code) && !self.label.starts_with('\u{25CC}') {
                out.push('\u{25CC}');
            }
            out.push_str(&self.label);
            out
        } else {
            u32::try_from(self.code)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        }
    }

    pub fn to_uppercase(&self) -> Self {
        Self {
            code: map_single_char(self.code, char::to_uppercase),
            label: self.label.to_uppercase(),
            ..self.clone()
        }
    }

    pub fn to_lowercase(&self) -> Self {
        Self {
            code: map_single_char(self.code, char::to_lowercase),
            label: self.label.to_lowercase(),
            ..self.clone()
        }
    }
}

fn map_single_char<I>(code: i32, f: impl Fn(char) -> I) -> i32
where
    I: Iterator<Item = char>,
{
    let Some(ch) = u32::try_from(code).ok().and_then(char::from_u32) else {
        return code;
    };
    let mut mapped = f(ch);
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => m as i32,
        _ => code,
    }
}

fn is_non_spacing_mark(code: i32) -> bool {
    matches!(
        code,
        0x0300..=0x036F
            | 0x0483..=0x0487
            | 0x0591..=0x05BD
            | 0x064B..=0x065F
            | 0x0670
            | 0x0E31
            | 0x0E34..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x20D0..=0x20FF
            | 0x3099..=0x309A
            | 0xFE20..=0xFE2F
    )
}
