//! Keyboard preferences loaded from TOML.
//!
//! - Default values are embedded via `include_str!("default_prefs.toml")`
//! - `parse_prefs_toml` validates a full document
//! - The session layer owns the live value; this module only parses and
//!   derives configuration from it

use serde::{Deserialize, Serialize};

use crate::popup::{KeyHintConfiguration, KeyHintMode};

pub const DEFAULT_PREFS_TOML: &str = include_str!("default_prefs.toml");

/// Returns the embedded default prefs TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_PREFS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// What the utility key next to space does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityKeyAction {
    Disabled,
    SwitchLanguage,
    SwitchKeyboardApp,
    SwitchToEmojis,
    #[default]
    DynamicSwitchLanguageEmojis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    pub keyboard: KeyboardPrefs,
    pub suggestion: SuggestionPrefs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardPrefs {
    pub number_row: bool,
    pub hinted_number_row_enabled: bool,
    pub hinted_symbols_enabled: bool,
    pub utility_key_enabled: bool,
    pub utility_key_action: UtilityKeyAction,
    pub key_hint: KeyHintPrefs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyHintPrefs {
    pub symbol_hint_mode: KeyHintMode,
    pub number_hint_mode: KeyHintMode,
    pub merge_hint_popups: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPrefs {
    pub enabled: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        parse_prefs_toml(DEFAULT_PREFS_TOML).expect("default prefs TOML must be valid")
    }
}

impl Prefs {
    /// Hint configuration in effect, with disabled hint rows switching their
    /// hint mode off.
    pub fn key_hint_configuration(&self) -> KeyHintConfiguration {
        let kb = &self.keyboard;
        KeyHintConfiguration {
            symbol_hint_mode: if kb.hinted_symbols_enabled {
                kb.key_hint.symbol_hint_mode
            } else {
                KeyHintMode::Disabled
            },
            number_hint_mode: if kb.hinted_number_row_enabled {
                kb.key_hint.number_hint_mode
            } else {
                KeyHintMode::Disabled
            },
            merge_hint_popups: kb.key_hint.merge_hint_popups,
        }
    }

    /// Whether a change to `other` invalidates cached CHARACTERS keyboards.
    pub fn characters_layout_changed(&self, other: &Prefs) -> bool {
        self.keyboard.number_row != other.keyboard.number_row
            || self.keyboard.hinted_number_row_enabled != other.keyboard.hinted_number_row_enabled
    }

    pub fn to_toml(&self) -> Result<String, PrefsError> {
        toml::to_string_pretty(self).map_err(|e| PrefsError::Parse(e.to_string()))
    }
}

pub fn parse_prefs_toml(toml_str: &str) -> Result<Prefs, PrefsError> {
    let prefs: Prefs = toml::from_str(toml_str).map_err(|e| PrefsError::Parse(e.to_string()))?;
    validate(&prefs)?;
    Ok(prefs)
}

fn validate(p: &Prefs) -> Result<(), PrefsError> {
    if p.keyboard.utility_key_enabled && p.keyboard.utility_key_action == UtilityKeyAction::Disabled {
        return Err(PrefsError::InvalidValue {
            field: "keyboard.utility_key_action".to_string(),
            reason: "must not be disabled while utility_key_enabled is set".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let p = parse_prefs_toml(DEFAULT_PREFS_TOML).unwrap();
        assert!(!p.keyboard.number_row);
        assert!(p.keyboard.hinted_number_row_enabled);
        assert!(p.keyboard.hinted_symbols_enabled);
        assert_eq!(
            p.keyboard.utility_key_action,
            UtilityKeyAction::DynamicSwitchLanguageEmojis
        );
        assert_eq!(p.keyboard.key_hint.symbol_hint_mode, KeyHintMode::SmartPriority);
        assert!(p.keyboard.key_hint.merge_hint_popups);
        assert!(p.suggestion.enabled);
        assert_eq!(p, Prefs::default());
    }

    #[test]
    fn parse_custom_toml() {
        let toml = r#"
[keyboard]
number_row = true
hinted_number_row_enabled = false
hinted_symbols_enabled = true
utility_key_enabled = false
utility_key_action = "disabled"

[keyboard.key_hint]
symbol_hint_mode = "hint_priority"
number_hint_mode = "accent_priority"
merge_hint_popups = false

[suggestion]
enabled = false
"#;
        let p = parse_prefs_toml(toml).unwrap();
        assert!(p.keyboard.number_row);
        let cfg = p.key_hint_configuration();
        assert_eq!(cfg.symbol_hint_mode, KeyHintMode::HintPriority);
        assert_eq!(cfg.number_hint_mode, KeyHintMode::Disabled);
        assert!(!cfg.merge_hint_popups);
    }

    #[test]
    fn error_enabled_utility_key_without_action() {
        let toml = DEFAULT_PREFS_TOML.replace(
            "utility_key_action = \"dynamic_switch_language_emojis\"",
            "utility_key_action = \"disabled\"",
        );
        let err = parse_prefs_toml(&toml).unwrap_err();
        assert!(matches!(err, PrefsError::InvalidValue { .. }));
        assert!(err.to_string().contains("keyboard.utility_key_action"));
    }

    #[test]
    fn error_unknown_hint_mode() {
        let toml = DEFAULT_PREFS_TOML.replace(
            "symbol_hint_mode = \"smart_priority\"",
            "symbol_hint_mode = \"loudest\"",
        );
        let err = parse_prefs_toml(&toml).unwrap_err();
        assert!(matches!(err, PrefsError::Parse(_)));
    }

    #[test]
    fn error_missing_section() {
        let err = parse_prefs_toml("[suggestion]\nenabled = true\n").unwrap_err();
        assert!(matches!(err, PrefsError::Parse(_)));
    }

    #[test]
    fn export_parses_back() {
        let mut p = Prefs::default();
        p.keyboard.number_row = true;
        let exported = p.to_toml().unwrap();
        assert_eq!(parse_prefs_toml(&exported).unwrap(), p);
    }

    #[test]
    fn characters_change_detection() {
        let base = Prefs::default();
        let mut other = base.clone();
        other.suggestion.enabled = false;
        assert!(!base.characters_layout_changed(&other));
        other.keyboard.hinted_number_row_enabled = false;
        assert!(base.characters_layout_changed(&other));
    }
}
