use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::KeyDataError;
use crate::evaluator::ComputingEvaluator;
use crate::state::{InputShiftState, KeyVariation, LayoutDirection};

use super::{KeyData, KeyType};

/// A key as written in a layout: either a concrete leaf or a selector that
/// picks a child from the live state.
///
/// In JSON the variant is named by the `"$"` field; an object without one is
/// a `text_key`. A text key with `"type": "placeholder"` decodes to
/// [`AbstractKeyData::Placeholder`].
#[derive(Debug, Clone, PartialEq)]
pub enum AbstractKeyData {
    Text(KeyData),
    AutoText(KeyData),
    MultiText(KeyData),
    Placeholder,
    Case(CaseSelector),
    ShiftState(ShiftStateSelector),
    Variation(VariationSelector),
    LayoutDirection(LayoutDirectionSelector),
    CharWidth(CharWidthSelector),
    Kana(KanaSelector),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseSelector {
    pub lower: Box<AbstractKeyData>,
    pub upper: Box<AbstractKeyData>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShiftStateSelector {
    pub default: Option<Box<AbstractKeyData>>,
    pub unshifted: Option<Box<AbstractKeyData>>,
    pub shifted: Option<Box<AbstractKeyData>>,
    pub shifted_manual: Option<Box<AbstractKeyData>>,
    pub shifted_automatic: Option<Box<AbstractKeyData>>,
    pub caps_lock: Option<Box<AbstractKeyData>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct VariationSelector {
    pub default: Option<Box<AbstractKeyData>>,
    pub email: Option<Box<AbstractKeyData>>,
    pub normal: Option<Box<AbstractKeyData>>,
    pub password: Option<Box<AbstractKeyData>>,
    pub uri: Option<Box<AbstractKeyData>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutDirectionSelector {
    pub ltr: Box<AbstractKeyData>,
    pub rtl: Box<AbstractKeyData>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CharWidthSelector {
    pub full: Option<Box<AbstractKeyData>>,
    pub half: Option<Box<AbstractKeyData>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KanaSelector {
    pub hira: Box<AbstractKeyData>,
    pub kata: Box<AbstractKeyData>,
}

impl ShiftStateSelector {
    pub fn select(&self, shift: InputShiftState) -> Option<&AbstractKeyData> {
        let picked = match shift {
            InputShiftState::Unshifted => self.unshifted.as_ref(),
            InputShiftState::ShiftedManual => {
                self.shifted_manual.as_ref().or(self.shifted.as_ref())
            }
            InputShiftState::ShiftedAutomatic => {
                self.shifted_automatic.as_ref().or(self.shifted.as_ref())
            }
            InputShiftState::CapsLock => self.caps_lock.as_ref(),
        };
        picked.or(self.default.as_ref()).map(Box::as_ref)
    }
}

impl VariationSelector {
    pub fn select(&self, variation: KeyVariation) -> Option<&AbstractKeyData> {
        let picked = match variation {
            KeyVariation::All => None,
            KeyVariation::EmailAddress => self.email.as_ref(),
            KeyVariation::Normal => self.normal.as_ref(),
            KeyVariation::Password => self.password.as_ref(),
            KeyVariation::Uri => self.uri.as_ref(),
        };
        picked.or(self.default.as_ref()).map(Box::as_ref)
    }
}

impl AbstractKeyData {
    pub fn text(data: KeyData) -> Self {
        if data.key_type == KeyType::Placeholder {
            Self::Placeholder
        } else {
            Self::Text(data)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Resolve against the evaluator's live state. `None` means the key is
    /// absent for this state.
    pub fn compute(&self, evaluator: &dyn ComputingEvaluator) -> Option<KeyData> {
        match self {
            Self::Text(data) => data.compute(evaluator),
            Self::AutoText(data) => {
                if evaluator.is_slot(data) {
                    data.compute(evaluator)
                } else if evaluator.active_state().is_uppercase() {
                    Some(data.to_uppercase())
                } else {
                    Some(data.to_lowercase())
                }
            }
            Self::MultiText(data) => Some(data.clone()),
            Self::Placeholder => None,
            Self::Case(sel) => {
                let child = if evaluator.active_state().is_uppercase() {
                    &sel.upper
                } else {
                    &sel.lower
                };
                child.compute(evaluator)
            }
            Self::ShiftState(sel) => sel
                .select(evaluator.active_state().input_shift_state())
                .and_then(|child| child.compute(evaluator)),
            Self::Variation(sel) => sel
                .select(evaluator.active_state().key_variation())
                .and_then(|child| child.compute(evaluator)),
            Self::LayoutDirection(sel) => {
                let child = match evaluator.active_state().layout_direction() {
                    LayoutDirection::Ltr => &sel.ltr,
                    LayoutDirection::Rtl => &sel.rtl,
                };
                child.compute(evaluator)
            }
            Self::CharWidth(sel) => {
                let child = if evaluator.active_state().is_char_half_width() {
                    sel.half.as_ref()
                } else {
                    sel.full.as_ref()
                };
                child.and_then(|c| c.compute(evaluator))
            }
            Self::Kana(sel) => {
                let child = if evaluator.active_state().is_kana_kata() {
                    &sel.kata
                } else {
                    &sel.hira
                };
                child.compute(evaluator)
            }
        }
    }
}

impl KeyData {
    /// Resolve as a text key: slot keys take the slot's type, code and label
    /// but keep their own group and popup.
    pub fn compute(&self, evaluator: &dyn ComputingEvaluator) -> Option<KeyData> {
        if !evaluator.is_slot(self) {
            return Some(self.clone());
        }
        evaluator.slot_data(self).map(|slot| KeyData {
            key_type: slot.key_type,
            code: slot.code,
            label: slot.label,
            group_id: self.group_id,
            popup: self.popup.clone(),
            code_points: slot.code_points,
        })
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

const KNOWN_TAGS: [&str; 10] = [
    "text_key",
    "auto_text_key",
    "multi_text_key",
    "placeholder",
    "case_selector",
    "shift_state_selector",
    "variation_selector",
    "layout_direction_selector",
    "char_width_selector",
    "kana_selector",
];

#[derive(Deserialize)]
#[serde(tag = "$")]
enum Tagged {
    #[serde(rename = "text_key")]
    Text(KeyData),
    #[serde(rename = "auto_text_key")]
    AutoText(KeyData),
    #[serde(rename = "multi_text_key")]
    MultiText(KeyData),
    #[serde(rename = "placeholder")]
    Placeholder,
    #[serde(rename = "case_selector")]
    Case(CaseSelector),
    #[serde(rename = "shift_state_selector")]
    ShiftState(ShiftStateSelector),
    #[serde(rename = "variation_selector")]
    Variation(VariationSelector),
    #[serde(rename = "layout_direction_selector")]
    LayoutDirection(LayoutDirectionSelector),
    #[serde(rename = "char_width_selector")]
    CharWidth(CharWidthSelector),
    #[serde(rename = "kana_selector")]
    Kana(KanaSelector),
}

impl<'de> Deserialize<'de> for AbstractKeyData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        let serde_json::Value::Object(map) = &mut value else {
            return Err(D::Error::custom(KeyDataError::NotAnObject(value.to_string())));
        };
        let tag = map
            .entry("$")
            .or_insert_with(|| serde_json::Value::String("text_key".into()));
        match tag.as_str() {
            Some(t) if KNOWN_TAGS.contains(&t) => {}
            _ => {
                return Err(D::Error::custom(KeyDataError::UnknownDiscriminator(
                    tag.to_string(),
                )))
            }
        }
        let tagged = Tagged::deserialize(value).map_err(D::Error::custom)?;
        Ok(match tagged {
            Tagged::Text(data) => Self::text(data),
            Tagged::AutoText(data) => Self::AutoText(data),
            Tagged::MultiText(mut data) => {
                data.code = super::code::MULTIPLE_CODE_POINTS;
                Self::MultiText(data)
            }
            Tagged::Placeholder => Self::Placeholder,
            Tagged::Case(sel) => Self::Case(sel),
            Tagged::ShiftState(sel) => Self::ShiftState(sel),
            Tagged::Variation(sel) => Self::Variation(sel),
            Tagged::LayoutDirection(sel) => Self::LayoutDirection(sel),
            Tagged::CharWidth(sel) => Self::CharWidth(sel),
            Tagged::Kana(sel) => Self::Kana(sel),
        })
    }
}
