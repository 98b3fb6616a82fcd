use std::sync::Arc;

use kbd_core::editor::EditorInfo;
use kbd_core::key::code;
use kbd_core::prefs::{Prefs, UtilityKeyAction};
use kbd_core::resources::CurrencySet;
use kbd_core::{ComputingEvaluator, KeyData, KeyboardState, Subtype, TextKeyboard};

/// Evaluator bound to one recomputation: a state snapshot, the editor and
/// subtype at that time, and the keyboard it resolves.
#[derive(Debug, Clone)]
pub struct SessionEvaluator {
    pub(crate) version: u64,
    pub(crate) keyboard: Arc<TextKeyboard>,
    pub(crate) editor_info: EditorInfo,
    pub(crate) state: KeyboardState,
    pub(crate) subtype: Subtype,
    pub(crate) subtype_count: usize,
    pub(crate) utility_key_action: UtilityKeyAction,
    pub(crate) has_primary_clip: bool,
    pub(crate) currency_set: Option<Arc<CurrencySet>>,
}

impl SessionEvaluator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u64,
        keyboard: Arc<TextKeyboard>,
        editor_info: EditorInfo,
        state: KeyboardState,
        subtype: Subtype,
        subtype_count: usize,
        prefs: &Prefs,
        has_primary_clip: bool,
        currency_set: Option<Arc<CurrencySet>>,
    ) -> Self {
        let utility_key_action = if prefs.keyboard.utility_key_enabled {
            prefs.keyboard.utility_key_action
        } else {
            UtilityKeyAction::Disabled
        };
        Self {
            version,
            keyboard,
            editor_info,
            state,
            subtype,
            subtype_count,
            utility_key_action,
            has_primary_clip,
            currency_set,
        }
    }

    pub fn keyboard_arc(&self) -> &Arc<TextKeyboard> {
        &self.keyboard
    }

    fn shows_language_switch(&self) -> bool {
        self.subtype_count > 1
    }
}

impl ComputingEvaluator for SessionEvaluator {
    fn version(&self) -> u64 {
        self.version
    }

    fn keyboard(&self) -> &TextKeyboard {
        &self.keyboard
    }

    fn active_editor_info(&self) -> &EditorInfo {
        &self.editor_info
    }

    fn active_state(&self) -> KeyboardState {
        self.state
    }

    fn active_subtype(&self) -> &Subtype {
        &self.subtype
    }

    fn evaluate_enabled(&self, data: &KeyData) -> bool {
        match data.code {
            code::CLIPBOARD_COPY | code::CLIPBOARD_CUT => {
                self.state.is_selection_mode() && self.editor_info.is_rich_input_editor
            }
            code::CLIPBOARD_PASTE | code::CLIPBOARD_CLEAR_PRIMARY_CLIP => self.has_primary_clip,
            code::CLIPBOARD_SELECT_ALL => self.editor_info.is_rich_input_editor,
            _ => true,
        }
    }

    fn evaluate_visible(&self, data: &KeyData) -> bool {
        let action = self.utility_key_action;
        match data.code {
            code::IME_UI_MODE_TEXT | code::IME_UI_MODE_MEDIA => {
                action == UtilityKeyAction::SwitchToEmojis
                    || (action == UtilityKeyAction::DynamicSwitchLanguageEmojis
                        && !self.shows_language_switch())
            }
            code::LANGUAGE_SWITCH => {
                matches!(
                    action,
                    UtilityKeyAction::SwitchLanguage | UtilityKeyAction::SwitchKeyboardApp
                ) || (action == UtilityKeyAction::DynamicSwitchLanguageEmojis
                    && self.shows_language_switch())
            }
            _ => true,
        }
    }

    fn is_slot(&self, data: &KeyData) -> bool {
        code::is_currency_slot(data.code)
    }

    fn slot_data(&self, data: &KeyData) -> Option<KeyData> {
        let index = code::currency_slot_index(data.code)?;
        self.currency_set.as_ref()?.slot(index).cloned()
    }
}
