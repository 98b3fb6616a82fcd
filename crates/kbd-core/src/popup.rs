//! Popup sets, popup mappings and the hint-aware popup ordering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::evaluator::ComputingEvaluator;
use crate::key::{AbstractKeyData, KeyData};
use crate::state::KeyVariation;

/// Popup declaration attached to a key or a mapping entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PopupSet {
    pub main: Option<AbstractKeyData>,
    pub relevant: Vec<AbstractKeyData>,
}

/// Label-keyed popups per key variation, as loaded from a popup mapping asset.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct PopupMapping(HashMap<KeyVariation, HashMap<String, PopupSet>>);

impl PopupMapping {
    pub fn get(&self, variation: KeyVariation, label: &str) -> Option<&PopupSet> {
        self.0.get(&variation).and_then(|m| m.get(label))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(HashMap::is_empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyHintMode {
    Disabled,
    AccentPriority,
    HintPriority,
    #[default]
    SmartPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeyHintConfiguration {
    pub symbol_hint_mode: KeyHintMode,
    pub number_hint_mode: KeyHintMode,
    pub merge_hint_popups: bool,
}

/// Ordered popup keys. `prioritized` fills the first popup positions,
/// `other` the rest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopupKeys {
    pub hint: Option<KeyData>,
    pub prioritized: Vec<KeyData>,
    pub other: Vec<KeyData>,
}

impl PopupKeys {
    pub fn len(&self) -> usize {
        self.prioritized.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prioritized.is_empty() && self.other.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyData> {
        self.prioritized.iter().chain(self.other.iter())
    }
}

/// Popups of one key after resolution, including symbol and number hints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedPopups {
    pub main: Option<KeyData>,
    pub relevant: Vec<KeyData>,
    pub symbol_hint: Option<KeyData>,
    pub number_hint: Option<KeyData>,
    symbol_popups: Vec<KeyData>,
    number_popups: Vec<KeyData>,
}

enum MergeTarget {
    Relevant,
    Symbol,
    Number,
}

impl ComputedPopups {
    pub fn merge(&mut self, other: &PopupSet, evaluator: &dyn ComputingEvaluator) {
        self.merge_into(other, evaluator, MergeTarget::Relevant);
    }

    pub fn merge_symbol_hint(&mut self, other: &PopupSet, evaluator: &dyn ComputingEvaluator) {
        self.merge_into(other, evaluator, MergeTarget::Symbol);
    }

    pub fn merge_number_hint(&mut self, other: &PopupSet, evaluator: &dyn ComputingEvaluator) {
        self.merge_into(other, evaluator, MergeTarget::Number);
    }

    fn merge_into(
        &mut self,
        other: &PopupSet,
        evaluator: &dyn ComputingEvaluator,
        target: MergeTarget,
    ) {
        let computed: Vec<KeyData> = other
            .relevant
            .iter()
            .filter_map(|k| k.compute(evaluator))
            .collect();
        let main = other.main.as_ref().and_then(|k| k.compute(evaluator));
        let list = match target {
            MergeTarget::Relevant => &mut self.relevant,
            MergeTarget::Symbol => &mut self.symbol_popups,
            MergeTarget::Number => &mut self.number_popups,
        };
        list.extend(computed);
        if let Some(main) = main {
            if matches!(target, MergeTarget::Relevant) && self.main.is_none() {
                self.main = Some(main);
            } else {
                list.push(main);
            }
        }
    }

    /// Order the popups for the given hint configuration.
    pub fn popup_keys(&self, config: &KeyHintConfiguration) -> PopupKeys {
        use KeyHintMode::*;

        let main = self.main.clone();
        let relevant = &self.relevant;
        let symbol = self
            .symbol_hint
            .clone()
            .filter(|_| config.symbol_hint_mode != Disabled);
        let number = self
            .number_hint
            .clone()
            .filter(|_| config.number_hint_mode != Disabled);

        let keys = |hint: &KeyData, prioritized: Vec<Option<KeyData>>, extra: &[KeyData]| {
            PopupKeys {
                hint: Some(hint.clone()),
                prioritized: prioritized.into_iter().flatten().collect(),
                other: relevant.iter().chain(extra).cloned().collect(),
            }
        };
        // Accent priority keeps a non-hint key in the first slot when one exists.
        let accent_first = |hint: &KeyData, hints: Vec<Option<KeyData>>, extra: &[KeyData]| {
            if let Some(m) = &main {
                let mut prioritized = vec![Some(m.clone())];
                prioritized.extend(hints);
                keys(hint, prioritized, extra)
            } else if let Some((first, rest)) = relevant.split_first() {
                let mut prioritized = vec![first.clone()];
                prioritized.extend(hints.into_iter().flatten());
                PopupKeys {
                    hint: Some(hint.clone()),
                    prioritized,
                    other: rest.iter().chain(extra).cloned().collect(),
                }
            } else {
                PopupKeys {
                    hint: Some(hint.clone()),
                    prioritized: hints.into_iter().flatten().collect(),
                    other: extra.to_vec(),
                }
            }
        };

        match (symbol, number) {
            (Some(sym), Some(num)) => {
                let extra: Vec<KeyData> = if config.merge_hint_popups {
                    self.symbol_popups
                        .iter()
                        .chain(&self.number_popups)
                        .cloned()
                        .collect()
                } else {
                    Vec::new()
                };
                let (s, n) = (Some(sym.clone()), Some(num.clone()));
                match (config.symbol_hint_mode, config.number_hint_mode) {
                    (AccentPriority, AccentPriority) => accent_first(&sym, vec![s, n], &extra),
                    (AccentPriority, HintPriority) => {
                        keys(&sym, vec![n, main.clone(), s], &extra)
                    }
                    (AccentPriority, _) => keys(&sym, vec![main.clone(), n, s], &extra),
                    (HintPriority, HintPriority) => {
                        keys(&sym, vec![s, n, main.clone()], &extra)
                    }
                    (HintPriority, _) => keys(&sym, vec![s, main.clone(), n], &extra),
                    (_, HintPriority) => keys(&sym, vec![n, main.clone(), s], &extra),
                    (_, _) => keys(&sym, vec![main.clone(), s, n], &extra),
                }
            }
            (Some(sym), None) => {
                let extra: &[KeyData] = if config.merge_hint_popups {
                    &self.symbol_popups
                } else {
                    &[]
                };
                Self::single_hint(
                    config.symbol_hint_mode,
                    &sym,
                    main.clone(),
                    extra,
                    &keys,
                    &accent_first,
                )
            }
            (None, Some(num)) => {
                let extra: &[KeyData] = if config.merge_hint_popups {
                    &self.number_popups
                } else {
                    &[]
                };
                Self::single_hint(
                    config.number_hint_mode,
                    &num,
                    main.clone(),
                    extra,
                    &keys,
                    &accent_first,
                )
            }
            (None, None) => PopupKeys {
                hint: None,
                prioritized: main.clone().into_iter().collect(),
                other: relevant.clone(),
            },
        }
    }

    fn single_hint(
        mode: KeyHintMode,
        hint: &KeyData,
        main: Option<KeyData>,
        extra: &[KeyData],
        keys: impl Fn(&KeyData, Vec<Option<KeyData>>, &[KeyData]) -> PopupKeys,
        accent_first: impl Fn(&KeyData, Vec<Option<KeyData>>, &[KeyData]) -> PopupKeys,
    ) -> PopupKeys {
        let h = Some(hint.clone());
        match mode {
            KeyHintMode::AccentPriority => accent_first(hint, vec![h], extra),
            KeyHintMode::HintPriority => keys(hint, vec![h, main], extra),
            _ => keys(hint, vec![main, h], extra),
        }
    }
}
