use proptest::prelude::*;

use super::*;
use crate::editor::EditorInfo;
use crate::evaluator::{ComputingEvaluator, DefaultComputingEvaluator};
use crate::layout::TextKeyboard;
use crate::popup::PopupSet;
use crate::state::{InputShiftState, KeyVariation, KeyboardState};
use crate::subtype::Subtype;

/// Evaluator with a chosen state and an optional currency slot table.
struct StateEvaluator {
    editor: EditorInfo,
    state: KeyboardState,
    slots: Vec<KeyData>,
}

impl StateEvaluator {
    fn new(state: KeyboardState) -> Self {
        Self {
            editor: EditorInfo::default(),
            state,
            slots: Vec::new(),
        }
    }
}

impl ComputingEvaluator for StateEvaluator {
    fn version(&self) -> u64 {
        1
    }
    fn keyboard(&self) -> &TextKeyboard {
        TextKeyboard::placeholder()
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
    fn evaluate_enabled(&self, _data: &KeyData) -> bool {
        true
    }
    fn evaluate_visible(&self, _data: &KeyData) -> bool {
        true
    }
    fn is_slot(&self, data: &KeyData) -> bool {
        code::is_currency_slot(data.code)
    }
    fn slot_data(&self, data: &KeyData) -> Option<KeyData> {
        code::currency_slot_index(data.code).and_then(|i| self.slots.get(i).cloned())
    }
}

fn shifted(shift: InputShiftState) -> KeyboardState {
    let mut s = KeyboardState::default();
    s.set_input_shift_state(shift);
    s
}

fn decode(json: &str) -> AbstractKeyData {
    serde_json::from_str(json).unwrap()
}

fn label_under(key: &AbstractKeyData, state: KeyboardState) -> Option<String> {
    key.compute(&StateEvaluator::new(state)).map(|d| d.label)
}

#[test]
fn missing_discriminator_is_text_key() {
    let key = decode(r#"{ "code": 97, "label": "a", "groupId": 2 }"#);
    match key {
        AbstractKeyData::Text(d) => {
            assert_eq!(d.code, 97);
            assert_eq!(d.group_id, GROUP_RIGHT);
            assert_eq!(d.key_type, KeyType::Character);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_discriminator_is_rejected() {
    let err = serde_json::from_str::<AbstractKeyData>(r#"{ "$": "mystery_key" }"#).unwrap_err();
    assert!(err.to_string().contains("mystery_key"));
    assert!(serde_json::from_str::<AbstractKeyData>("42").is_err());
}

#[test]
fn case_selector_picks_by_uppercase() {
    let key = decode(
        r#"{ "$": "case_selector",
             "lower": { "code": 97, "label": "a" },
             "upper": { "code": 65, "label": "A" } }"#,
    );
    assert_eq!(label_under(&key, KeyboardState::default()).as_deref(), Some("a"));
    assert_eq!(
        label_under(&key, shifted(InputShiftState::ShiftedAutomatic)).as_deref(),
        Some("A")
    );
}

#[test]
fn shift_state_selector_fallbacks() {
    let key = decode(
        r#"{ "$": "shift_state_selector",
             "shifted": { "code": 83, "label": "S" },
             "capsLock": { "code": 67, "label": "C" },
             "default": { "code": 100, "label": "d" } }"#,
    );
    let at = |s| label_under(&key, shifted(s));
    assert_eq!(at(InputShiftState::Unshifted).as_deref(), Some("d"));
    assert_eq!(at(InputShiftState::ShiftedManual).as_deref(), Some("S"));
    assert_eq!(at(InputShiftState::ShiftedAutomatic).as_deref(), Some("S"));
    assert_eq!(at(InputShiftState::CapsLock).as_deref(), Some("C"));
}

#[test]
fn shift_state_selector_without_default_resolves_to_nothing() {
    let key = decode(r#"{ "$": "shift_state_selector", "capsLock": { "code": 67, "label": "C" } }"#);
    assert_eq!(label_under(&key, KeyboardState::default()), None);
}

#[test]
fn variation_selector_all_uses_default() {
    let key = decode(
        r#"{ "$": "variation_selector",
             "default": { "code": 44, "label": "," },
             "email": { "code": 64, "label": "@" },
             "uri": { "code": 47, "label": "/" } }"#,
    );
    let at = |v: KeyVariation| {
        let mut s = KeyboardState::default();
        s.set_key_variation(v);
        label_under(&key, s)
    };
    assert_eq!(at(KeyVariation::All).as_deref(), Some(","));
    assert_eq!(at(KeyVariation::EmailAddress).as_deref(), Some("@"));
    assert_eq!(at(KeyVariation::Uri).as_deref(), Some("/"));
    assert_eq!(at(KeyVariation::Password).as_deref(), Some(","));
}

#[test]
fn layout_direction_kana_and_char_width() {
    let dir = decode(
        r#"{ "$": "layout_direction_selector",
             "ltr": { "code": 40, "label": "(" },
             "rtl": { "code": 41, "label": ")" } }"#,
    );
    let mut rtl = KeyboardState::default();
    rtl.set_rtl_layout_direction(true);
    assert_eq!(label_under(&dir, rtl).as_deref(), Some(")"));

    let kana = decode(
        r#"{ "$": "kana_selector",
             "hira": { "code": 12354, "label": "あ" },
             "kata": { "code": 12450, "label": "ア" } }"#,
    );
    let mut kata = KeyboardState::default();
    kata.set_kana_kata(true);
    assert_eq!(label_under(&kana, kata).as_deref(), Some("ア"));

    let width = decode(r#"{ "$": "char_width_selector", "full": { "code": 65313, "label": "Ａ" } }"#);
    let mut half = KeyboardState::default();
    half.set_char_half_width(true);
    assert_eq!(label_under(&width, half), None);
    assert_eq!(label_under(&width, KeyboardState::default()).as_deref(), Some("Ａ"));
}

#[test]
fn auto_text_key_follows_case() {
    let key = decode(r#"{ "$": "auto_text_key", "code": 228, "label": "ä" }"#);
    let upper = key
        .compute(&StateEvaluator::new(shifted(InputShiftState::CapsLock)))
        .unwrap();
    assert_eq!(upper.code, 'Ä' as i32);
    assert_eq!(upper.label, "Ä");
    let lower = key.compute(&StateEvaluator::new(KeyboardState::default())).unwrap();
    assert_eq!(lower.label, "ä");
}

#[test]
fn multi_text_key_keeps_code_points() {
    let key = decode(r#"{ "$": "multi_text_key", "codePoints": [2325, 2381, 2359], "label": "क्ष" }"#);
    let data = key.compute(&DefaultComputingEvaluator).unwrap();
    assert_eq!(data.code, code::MULTIPLE_CODE_POINTS);
    assert_eq!(data.as_string(false), "क्ष");
    assert_eq!(data.as_string(true), "क्ष");
}

#[test]
fn currency_slot_keeps_group_and_popup() {
    let popup = PopupSet {
        main: Some(AbstractKeyData::Text(KeyData::character('¢'))),
        relevant: Vec::new(),
    };
    let slot_key = KeyData::new(KeyType::Character, code::CURRENCY_SLOT_1, "$")
        .with_group(GROUP_LEFT)
        .with_popup(popup);
    let evaluator = StateEvaluator {
        editor: EditorInfo::default(),
        state: KeyboardState::default(),
        slots: vec![KeyData::character('€'), KeyData::character('£')],
    };
    let resolved = AbstractKeyData::Text(slot_key.clone()).compute(&evaluator).unwrap();
    assert_eq!(resolved.label, "€");
    assert_eq!(resolved.code, '€' as i32);
    assert_eq!(resolved.group_id, GROUP_LEFT);
    assert_eq!(resolved.popup, slot_key.popup);

    let missing = KeyData::new(KeyType::Character, code::CURRENCY_SLOT_6, "$");
    assert_eq!(AbstractKeyData::Text(missing).compute(&evaluator), None);
}

#[test]
fn auto_text_currency_slot_keeps_group_and_popup() {
    let popup = PopupSet {
        main: Some(AbstractKeyData::Text(KeyData::character('¢'))),
        relevant: Vec::new(),
    };
    let slot_key = KeyData::new(KeyType::Character, code::CURRENCY_SLOT_2, "$")
        .with_group(GROUP_LEFT)
        .with_popup(popup);
    let evaluator = StateEvaluator {
        editor: EditorInfo::default(),
        state: shifted(InputShiftState::CapsLock),
        slots: vec![KeyData::character('€'), KeyData::character('£')],
    };
    let resolved = AbstractKeyData::AutoText(slot_key.clone()).compute(&evaluator).unwrap();
    assert_eq!(resolved.label, "£");
    assert_eq!(resolved.code, '£' as i32);
    assert_eq!(resolved.group_id, GROUP_LEFT);
    assert_eq!(resolved.popup, slot_key.popup);
}

#[test]
fn as_string_for_display_and_commit() {
    let shift = KeyData::new(KeyType::Modifier, code::SHIFT, "shift");
    assert_eq!(shift.as_string(false), "shift");
    let a = KeyData::character('a');
    assert_eq!(a.as_string(false), "a");
    let acute = KeyData::new(KeyType::Character, 0x0301, "\u{0301}");
    assert_eq!(acute.as_string(true), "\u{25CC}\u{0301}");
    assert_eq!(acute.as_string(false), "\u{0301}");
}

#[test]
fn currency_slot_index_range() {
    assert_eq!(code::currency_slot_index(code::CURRENCY_SLOT_1), Some(0));
    assert_eq!(code::currency_slot_index(code::CURRENCY_SLOT_6), Some(5));
    assert_eq!(code::currency_slot_index(-807), None);
    assert_eq!(code::currency_slot_index(-800), None);
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

fn arb_char() -> impl Strategy<Value = char> {
    proptest::char::range('a', 'z')
}

fn arb_leaf() -> impl Strategy<Value = AbstractKeyData> {
    prop_oneof![
        arb_char().prop_map(|c| AbstractKeyData::Text(KeyData::character(c))),
        arb_char().prop_map(|c| AbstractKeyData::AutoText(KeyData::character(c))),
    ]
}

fn arb_key() -> impl Strategy<Value = AbstractKeyData> {
    arb_leaf().prop_recursive(3, 24, 6, |inner| {
        let boxed = inner.clone().prop_map(Box::new);
        let opt = proptest::option::of(inner.clone().prop_map(Box::new));
        prop_oneof![
            (boxed.clone(), boxed.clone())
                .prop_map(|(lower, upper)| AbstractKeyData::Case(CaseSelector { lower, upper })),
            (opt.clone(), opt.clone(), opt.clone(), opt.clone(), opt.clone(), opt.clone()).prop_map(
                |(default, unshifted, shifted, shifted_manual, shifted_automatic, caps_lock)| {
                    AbstractKeyData::ShiftState(ShiftStateSelector {
                        default,
                        unshifted,
                        shifted,
                        shifted_manual,
                        shifted_automatic,
                        caps_lock,
                    })
                }
            ),
            (opt.clone(), opt.clone(), opt.clone(), opt.clone(), opt.clone()).prop_map(
                |(default, email, normal, password, uri)| {
                    AbstractKeyData::Variation(VariationSelector {
                        default,
                        email,
                        normal,
                        password,
                        uri,
                    })
                }
            ),
            (boxed.clone(), boxed.clone())
                .prop_map(|(ltr, rtl)| AbstractKeyData::LayoutDirection(LayoutDirectionSelector { ltr, rtl })),
            (opt.clone(), opt)
                .prop_map(|(full, half)| AbstractKeyData::CharWidth(CharWidthSelector { full, half })),
            (boxed.clone(), boxed)
                .prop_map(|(hira, kata)| AbstractKeyData::Kana(KanaSelector { hira, kata })),
        ]
    })
}

proptest! {
    #[test]
    fn resolution_is_deterministic(key in arb_key(), raw in any::<u64>()) {
        let first = StateEvaluator::new(KeyboardState::new(raw));
        let second = StateEvaluator::new(KeyboardState::new(raw));
        prop_assert_eq!(key.compute(&first), key.compute(&second));
    }

    #[test]
    fn case_selector_matches_uppercase_flag(lower in arb_char(), raw in any::<u64>()) {
        let upper = lower.to_ascii_uppercase();
        let key = AbstractKeyData::Case(CaseSelector {
            lower: Box::new(AbstractKeyData::Text(KeyData::character(lower))),
            upper: Box::new(AbstractKeyData::Text(KeyData::character(upper))),
        });
        let state = KeyboardState::new(raw);
        let expected = if state.is_uppercase() { upper } else { lower };
        let got = key.compute(&StateEvaluator::new(state)).map(|d| d.code);
        prop_assert_eq!(got, Some(expected as i32));
    }
}
