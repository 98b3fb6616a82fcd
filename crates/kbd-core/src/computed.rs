//! Per-key resolution of a merged keyboard into what gets drawn.

use std::sync::Arc;

use crate::display::{compute_icon, compute_label, phone_hint_label, KeyIcon};
use crate::evaluator::ComputingEvaluator;
use crate::key::{code, group_popup_label, AbstractKeyData, KeyData, KeyType};
use crate::layout::{TextKey, TextKeyboard};
use crate::popup::{ComputedPopups, KeyHintConfiguration, PopupSet};
use crate::state::{KeyVariation, KeyboardMode};

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedKey {
    pub data: Arc<AbstractKeyData>,
    pub computed: KeyData,
    pub popups: ComputedPopups,
    pub label: Option<String>,
    pub hinted_label: Option<String>,
    pub hint_data: Option<KeyData>,
    pub icon: Option<KeyIcon>,
    pub is_enabled: bool,
    pub is_visible: bool,
    pub is_pressed: bool,
    pub shrink: f32,
    pub grow: f32,
    pub width_factor: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedKeyboard {
    pub mode: KeyboardMode,
    pub rows: Vec<Vec<ComputedKey>>,
}

impl ComputedKeyboard {
    pub fn empty(mode: KeyboardMode) -> Self {
        Self {
            mode,
            rows: Vec::new(),
        }
    }

    /// Resolve every key of the evaluator's keyboard.
    pub fn compute(evaluator: &dyn ComputingEvaluator, hints: &KeyHintConfiguration) -> Self {
        let keyboard = evaluator.keyboard();
        Self {
            mode: keyboard.mode,
            rows: keyboard
                .arrangement
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|key| ComputedKey::compute(key, evaluator, hints))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &ComputedKey> {
        self.rows.iter().flatten()
    }

    pub fn visible_keys(&self) -> impl Iterator<Item = &ComputedKey> {
        self.keys().filter(|k| k.is_visible)
    }
}

fn lookup<'a>(keyboard: &'a TextKeyboard, variation: KeyVariation, label: &str) -> Option<&'a PopupSet> {
    keyboard
        .popup_mapping
        .as_ref()
        .and_then(|m| m.get(variation, label))
        .or_else(|| {
            keyboard
                .popup_mapping_default
                .as_ref()
                .and_then(|m| m.get(variation, label))
        })
}

impl ComputedKey {
    pub fn compute(
        key: &TextKey,
        evaluator: &dyn ComputingEvaluator,
        hints: &KeyHintConfiguration,
    ) -> Self {
        let keyboard = evaluator.keyboard();
        let mode = keyboard.mode;

        let resolved = key
            .data
            .compute(evaluator)
            .filter(|d| evaluator.evaluate_visible(d));
        let Some(computed) = resolved else {
            return Self::invisible(key);
        };

        let mut popups = ComputedPopups::default();
        if let Some(own) = &computed.popup {
            popups.merge(own, evaluator);
        }
        if matches!(
            mode,
            KeyboardMode::Characters
                | KeyboardMode::NumericAdvanced
                | KeyboardMode::Symbols
                | KeyboardMode::Symbols2
        ) {
            merge_mapped_popups(&mut popups, keyboard, &computed, evaluator);
            if computed.key_type == KeyType::Character {
                add_hints(&mut popups, key, keyboard, &computed, evaluator);
            }
        }

        let (shrink, grow, width_factor) = sizing(mode, &computed);
        let mut out = Self {
            data: Arc::clone(&key.data),
            label: None,
            hinted_label: None,
            hint_data: None,
            icon: None,
            is_enabled: evaluator.evaluate_enabled(&computed),
            is_visible: true,
            is_pressed: false,
            shrink,
            grow,
            width_factor,
            popups,
            computed,
        };
        out.compute_labels(evaluator, hints);
        out
    }

    fn invisible(key: &TextKey) -> Self {
        Self {
            data: Arc::clone(&key.data),
            computed: KeyData::unspecified(),
            popups: ComputedPopups::default(),
            label: None,
            hinted_label: None,
            hint_data: None,
            icon: None,
            is_enabled: false,
            is_visible: false,
            is_pressed: false,
            shrink: 0.0,
            grow: 0.0,
            width_factor: 0.0,
        }
    }

    fn compute_labels(&mut self, evaluator: &dyn ComputingEvaluator, hints: &KeyHintConfiguration) {
        self.label = compute_label(evaluator, &self.computed);
        self.icon = compute_icon(evaluator, &self.computed);

        let data = &self.computed;
        if data.key_type == KeyType::Numeric && evaluator.keyboard().mode == KeyboardMode::Phone {
            self.hinted_label = phone_hint_label(data.code).map(str::to_string);
        } else if !data.is_space_key() || data.key_type == KeyType::Numeric {
            match self.popups.popup_keys(hints).hint {
                Some(hint) if !hint.is_space_key() => {
                    self.hinted_label = Some(hint.as_string(true));
                    self.hint_data = Some(hint);
                }
                _ => {
                    self.hinted_label = None;
                    self.hint_data = None;
                }
            }
        }
    }
}

fn merge_mapped_popups(
    popups: &mut ComputedPopups,
    keyboard: &TextKeyboard,
    computed: &KeyData,
    evaluator: &dyn ComputingEvaluator,
) {
    let computed_label = computed.label.to_lowercase();
    let ext_label = group_popup_label(computed.group_id).unwrap_or(&computed_label);

    let variation = evaluator.active_state().key_variation();
    let mut popup_set = None;
    if variation == KeyVariation::Password {
        popup_set = lookup(keyboard, KeyVariation::Password, ext_label);
    }
    if popup_set.is_none() && matches!(variation, KeyVariation::Normal | KeyVariation::Password) {
        popup_set = lookup(keyboard, KeyVariation::Normal, ext_label);
    }
    if popup_set.is_none() && variation == KeyVariation::EmailAddress {
        popup_set = lookup(keyboard, KeyVariation::EmailAddress, ext_label);
    }
    if popup_set.is_none() && matches!(variation, KeyVariation::EmailAddress | KeyVariation::Uri) {
        popup_set = lookup(keyboard, KeyVariation::Uri, ext_label);
    }
    if popup_set.is_none() {
        popup_set = lookup(keyboard, KeyVariation::All, ext_label);
    }

    let key_specific = if ext_label != computed_label {
        lookup(keyboard, KeyVariation::All, &computed_label)
    } else {
        None
    };
    if let Some(set) = key_specific {
        popups.merge(set, evaluator);
    }
    if let Some(set) = popup_set {
        popups.merge(set, evaluator);
    }
}

fn add_hints(
    popups: &mut ComputedPopups,
    key: &TextKey,
    keyboard: &TextKeyboard,
    computed: &KeyData,
    evaluator: &dyn ComputingEvaluator,
) {
    if let Some(hint) = key.symbol_hint.as_ref().filter(|h| h.code != computed.code) {
        let evaluated = hint.compute(evaluator);
        if let Some(own) = evaluated.as_ref().and_then(|e| e.popup.as_ref()) {
            popups.merge_symbol_hint(own, evaluator);
        }
        popups.symbol_hint = evaluated;
        if let Some(set) = lookup(keyboard, KeyVariation::All, &hint.label) {
            popups.merge_symbol_hint(set, evaluator);
        }
    }
    if let Some(hint) = key.number_hint.as_ref().filter(|h| h.code != computed.code) {
        let evaluated = hint.compute(evaluator);
        if let Some(own) = evaluated.as_ref().and_then(|e| e.popup.as_ref()) {
            popups.merge_number_hint(own, evaluator);
        }
        popups.number_hint = evaluated;
        if let Some(set) = lookup(keyboard, KeyVariation::All, &hint.label) {
            popups.merge_number_hint(set, evaluator);
        }
    }
}

/// `(shrink, grow, width_factor)` for a visible key.
fn sizing(mode: KeyboardMode, data: &KeyData) -> (f32, f32, f32) {
    let shrink = match mode {
        KeyboardMode::Numeric
        | KeyboardMode::NumericAdvanced
        | KeyboardMode::Phone
        | KeyboardMode::Phone2 => 1.0,
        _ => match data.code {
            code::SHIFT | code::DELETE => 1.5,
            code::VIEW_CHARACTERS | code::VIEW_SYMBOLS | code::VIEW_SYMBOLS2 | code::ENTER => 0.0,
            _ => 1.0,
        },
    };
    let grow = match mode {
        KeyboardMode::Numeric | KeyboardMode::Phone | KeyboardMode::Phone2 => 0.0,
        KeyboardMode::NumericAdvanced => {
            if data.key_type == KeyType::Numeric {
                1.0
            } else {
                0.0
            }
        }
        _ => match data.code {
            code::SPACE | code::CJK_SPACE => 1.0,
            _ => 0.0,
        },
    };
    let width_factor = match mode {
        KeyboardMode::Numeric | KeyboardMode::Phone | KeyboardMode::Phone2 => 2.68,
        KeyboardMode::NumericAdvanced => match data.code {
            44 | 46 => 1.0,
            code::VIEW_SYMBOLS | 61 => 1.26,
            _ => 1.56,
        },
        _ => match data.code {
            code::SHIFT
            | code::DELETE
            | code::VIEW_CHARACTERS
            | code::VIEW_SYMBOLS
            | code::VIEW_SYMBOLS2
            | code::ENTER => 1.56,
            _ => 1.0,
        },
    };
    (shrink, grow, width_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorInfo;
    use crate::popup::{KeyHintMode, PopupMapping};
    use crate::state::KeyboardState;
    use crate::subtype::Subtype;

    struct Fixture {
        keyboard: TextKeyboard,
        editor: EditorInfo,
        state: KeyboardState,
        hidden_code: Option<i32>,
    }

    impl ComputingEvaluator for Fixture {
        fn version(&self) -> u64 {
            3
        }
        fn keyboard(&self) -> &TextKeyboard {
            &self.keyboard
        }
        fn active_editor_info(&self) -> &EditorInfo {
            &self.editor
        }
        fn active_state(&self) -> KeyboardState {
            self.state
        }
        fn active_subtype(&self) -> &Subtype {
            Subtype::default_ref()
        }
        fn evaluate_enabled(&self, data: &KeyData) -> bool {
            data.code != code::CLIPBOARD_PASTE
        }
        fn evaluate_visible(&self, data: &KeyData) -> bool {
            Some(data.code) != self.hidden_code
        }
        fn is_slot(&self, _data: &KeyData) -> bool {
            false
        }
        fn slot_data(&self, _data: &KeyData) -> Option<KeyData> {
            None
        }
    }

    fn text(data: KeyData) -> TextKey {
        TextKey::new(Arc::new(AbstractKeyData::Text(data)))
    }

    fn keyboard(mode: KeyboardMode, rows: Vec<Vec<TextKey>>, mapping: Option<&str>) -> TextKeyboard {
        TextKeyboard {
            arrangement: rows,
            mode,
            popup_mapping: mapping.map(|json| Arc::new(serde_json::from_str::<PopupMapping>(json).unwrap())),
            popup_mapping_default: None,
        }
    }

    fn hints() -> KeyHintConfiguration {
        KeyHintConfiguration {
            symbol_hint_mode: KeyHintMode::SmartPriority,
            number_hint_mode: KeyHintMode::SmartPriority,
            merge_hint_popups: true,
        }
    }

    #[test]
    fn hidden_key_is_zero_sized() {
        let fixture = Fixture {
            keyboard: keyboard(
                KeyboardMode::Characters,
                vec![vec![text(KeyData::new(KeyType::SystemGui, code::LANGUAGE_SWITCH, "lang"))]],
                None,
            ),
            editor: EditorInfo::default(),
            state: KeyboardState::default(),
            hidden_code: Some(code::LANGUAGE_SWITCH),
        };
        let computed = ComputedKeyboard::compute(&fixture, &hints());
        let key = &computed.rows[0][0];
        assert!(!key.is_visible);
        assert!(!key.is_enabled);
        assert_eq!(key.computed, KeyData::unspecified());
        assert_eq!((key.shrink, key.grow, key.width_factor), (0.0, 0.0, 0.0));
        assert_eq!(computed.visible_keys().count(), 0);
    }

    #[test]
    fn placeholder_resolves_to_invisible() {
        let fixture = Fixture {
            keyboard: keyboard(
                KeyboardMode::Characters,
                vec![vec![TextKey::new(Arc::new(AbstractKeyData::Placeholder))]],
                None,
            ),
            editor: EditorInfo::default(),
            state: KeyboardState::default(),
            hidden_code: None,
        };
        let computed = ComputedKeyboard::compute(&fixture, &hints());
        assert!(!computed.rows[0][0].is_visible);
    }

    #[test]
    fn sizing_by_mode() {
        let shift = KeyData::new(KeyType::Modifier, code::SHIFT, "shift");
        let space = KeyData::new(KeyType::Character, code::SPACE, " ");
        assert_eq!(sizing(KeyboardMode::Characters, &shift), (1.5, 0.0, 1.56));
        assert_eq!(sizing(KeyboardMode::Characters, &space), (1.0, 1.0, 1.0));
        assert_eq!(sizing(KeyboardMode::Phone, &space), (1.0, 0.0, 2.68));
        let digit = KeyData::new(KeyType::Numeric, '5' as i32, "5");
        assert_eq!(sizing(KeyboardMode::NumericAdvanced, &digit), (1.0, 1.0, 1.56));
        let comma = KeyData::new(KeyType::Character, 44, ",");
        assert_eq!(sizing(KeyboardMode::NumericAdvanced, &comma).2, 1.0);
    }

    #[test]
    fn mapped_popups_follow_variation_priority() {
        let mapping = r#"{
            "all": { "a": { "main": { "code": 224, "label": "à" } } },
            "password": { "a": { "relevant": [ { "code": 64, "label": "@" } ] } },
            "normal": { "a": { "main": { "code": 225, "label": "á" } } }
        }"#;
        let row = vec![text(KeyData::character('a'))];
        let mut state = KeyboardState::default();
        state.set_key_variation(KeyVariation::Password);
        let fixture = Fixture {
            keyboard: keyboard(KeyboardMode::Characters, vec![row], Some(mapping)),
            editor: EditorInfo::default(),
            state,
            hidden_code: None,
        };
        let key = &ComputedKeyboard::compute(&fixture, &hints()).rows[0][0];
        assert!(key.popups.main.is_none());
        assert_eq!(key.popups.relevant.len(), 1);
        assert_eq!(key.popups.relevant[0].label, "@");

        let mut fixture = fixture;
        fixture.state.set_key_variation(KeyVariation::All);
        let key = &ComputedKeyboard::compute(&fixture, &hints()).rows[0][0];
        assert_eq!(key.popups.main.as_ref().map(|m| m.label.as_str()), Some("à"));
    }

    #[test]
    fn group_popups_use_group_label() {
        let mapping = r#"{ "all": { "~right": { "main": { "code": 33, "label": "!" } } } }"#;
        let row = vec![text(KeyData::character('.').with_group(crate::key::GROUP_RIGHT))];
        let fixture = Fixture {
            keyboard: keyboard(KeyboardMode::Characters, vec![row], Some(mapping)),
            editor: EditorInfo::default(),
            state: KeyboardState::default(),
            hidden_code: None,
        };
        let key = &ComputedKeyboard::compute(&fixture, &hints()).rows[0][0];
        assert_eq!(key.popups.main.as_ref().map(|m| m.label.as_str()), Some("!"));
    }

    #[test]
    fn no_mapped_popups_outside_text_modes() {
        let mapping = r#"{ "all": { "1": { "main": { "code": 185, "label": "¹" } } } }"#;
        let row = vec![text(KeyData::new(KeyType::Numeric, '1' as i32, "1"))];
        let fixture = Fixture {
            keyboard: keyboard(KeyboardMode::Numeric, vec![row], Some(mapping)),
            editor: EditorInfo::default(),
            state: KeyboardState::default(),
            hidden_code: None,
        };
        let key = &ComputedKeyboard::compute(&fixture, &hints()).rows[0][0];
        assert!(key.popups.main.is_none());
    }

    #[test]
    fn symbol_hint_becomes_hinted_label() {
        let mut key = text(KeyData::character('q'));
        key.symbol_hint = Some(KeyData::character('%'));
        key.number_hint = Some(KeyData::new(KeyType::Numeric, '1' as i32, "1"));
        let fixture = Fixture {
            keyboard: keyboard(KeyboardMode::Characters, vec![vec![key]], None),
            editor: EditorInfo::default(),
            state: KeyboardState::default(),
            hidden_code: None,
        };
        let mut config = hints();
        let computed = ComputedKeyboard::compute(&fixture, &config);
        assert_eq!(computed.rows[0][0].hinted_label.as_deref(), Some("%"));

        config.symbol_hint_mode = KeyHintMode::Disabled;
        let computed = ComputedKeyboard::compute(&fixture, &config);
        assert_eq!(computed.rows[0][0].hinted_label.as_deref(), Some("1"));
    }

    #[test]
    fn phone_pad_hinted_labels() {
        let row = vec![
            text(KeyData::new(KeyType::Numeric, '2' as i32, "2")),
            text(KeyData::new(KeyType::Numeric, '0' as i32, "0")),
        ];
        let fixture = Fixture {
            keyboard: keyboard(KeyboardMode::Phone, vec![row], None),
            editor: EditorInfo::default(),
            state: KeyboardState::default(),
            hidden_code: None,
        };
        let computed = ComputedKeyboard::compute(&fixture, &hints());
        assert_eq!(computed.rows[0][0].hinted_label.as_deref(), Some("ABC"));
        assert_eq!(computed.rows[0][1].hinted_label.as_deref(), Some("+"));
        assert_eq!(computed.rows[0][0].label.as_deref(), Some("2"));
    }

    #[test]
    fn labels_and_icons() {
        let row = vec![
            text(KeyData::new(KeyType::Character, code::SPACE, " ")),
            text(KeyData::new(KeyType::SystemGui, code::VIEW_SYMBOLS, "")),
            text(KeyData::new(KeyType::Modifier, code::SHIFT, "")),
            text(KeyData::new(KeyType::Function, code::CLIPBOARD_PASTE, "")),
        ];
        let mut state = KeyboardState::default();
        state.set_input_shift_state(crate::state::InputShiftState::CapsLock);
        let fixture = Fixture {
            keyboard: keyboard(KeyboardMode::Characters, vec![row], None),
            editor: EditorInfo::default(),
            state,
            hidden_code: None,
        };
        let computed = ComputedKeyboard::compute(&fixture, &hints());
        let keys = &computed.rows[0];
        assert_eq!(keys[0].label.as_deref(), Some("en-US"));
        assert_eq!(keys[0].icon, None);
        assert_eq!(keys[1].label.as_deref(), Some("?123"));
        assert_eq!(keys[2].icon, Some(KeyIcon::CapsLock));
        assert!(!keys[3].is_enabled);
        assert!(keys.iter().all(|k| !k.is_pressed));
    }
}
