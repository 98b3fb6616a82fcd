//! The context a key is resolved against.

use std::sync::OnceLock;

use crate::editor::EditorInfo;
use crate::key::KeyData;
use crate::layout::TextKeyboard;
use crate::state::KeyboardState;
use crate::subtype::Subtype;

/// Read-only view of everything key resolution may depend on.
pub trait ComputingEvaluator: Send + Sync {
    fn version(&self) -> u64;
    fn keyboard(&self) -> &TextKeyboard;
    fn active_editor_info(&self) -> &EditorInfo;
    fn active_state(&self) -> KeyboardState;
    fn active_subtype(&self) -> &Subtype;
    fn evaluate_enabled(&self, data: &KeyData) -> bool;
    fn evaluate_visible(&self, data: &KeyData) -> bool;
    fn is_slot(&self, data: &KeyData) -> bool;
    fn slot_data(&self, data: &KeyData) -> Option<KeyData>;
}

/// Neutral evaluator: default state, default subtype, everything enabled
/// and visible, no slots.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultComputingEvaluator;

impl ComputingEvaluator for DefaultComputingEvaluator {
    fn version(&self) -> u64 {
        0
    }

    fn keyboard(&self) -> &TextKeyboard {
        TextKeyboard::placeholder()
    }

    fn active_editor_info(&self) -> &EditorInfo {
        static EDITOR_INFO: OnceLock<EditorInfo> = OnceLock::new();
        EDITOR_INFO.get_or_init(EditorInfo::default)
    }

    fn active_state(&self) -> KeyboardState {
        KeyboardState::default()
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

    fn is_slot(&self, _data: &KeyData) -> bool {
        false
    }

    fn slot_data(&self, _data: &KeyData) -> Option<KeyData> {
        None
    }
}
