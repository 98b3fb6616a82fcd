//! Description of the text field the keyboard is attached to.

use serde::{Deserialize, Serialize};

use crate::state::{KeyVariation, KeyboardMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputClass {
    Null,
    Datetime,
    Number,
    Phone,
    #[default]
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextVariation {
    #[default]
    Normal,
    EmailAddress,
    WebEmailAddress,
    Password,
    VisiblePassword,
    WebPassword,
    Uri,
    PersonName,
    PostalAddress,
    ShortMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImeAction {
    #[default]
    Unspecified,
    None,
    Go,
    Search,
    Send,
    Next,
    Done,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorInfo {
    pub input_class: InputClass,
    pub text_variation: TextVariation,
    pub ime_action: ImeAction,
    pub flag_no_enter_action: bool,
    pub flag_multi_line: bool,
    /// The editor supports selection and rich clipboard operations.
    pub is_rich_input_editor: bool,
    pub package_name: Option<String>,
}

impl EditorInfo {
    /// Keyboard mode and key variation to start with for this editor.
    pub fn keyboard_setup(&self) -> (KeyboardMode, KeyVariation) {
        match self.input_class {
            InputClass::Number => (KeyboardMode::Numeric, KeyVariation::Normal),
            InputClass::Phone => (KeyboardMode::Phone, KeyVariation::Normal),
            InputClass::Text => {
                let variation = match self.text_variation {
                    TextVariation::EmailAddress | TextVariation::WebEmailAddress => {
                        KeyVariation::EmailAddress
                    }
                    TextVariation::Password
                    | TextVariation::VisiblePassword
                    | TextVariation::WebPassword => KeyVariation::Password,
                    TextVariation::Uri => KeyVariation::Uri,
                    _ => KeyVariation::Normal,
                };
                (KeyboardMode::Characters, variation)
            }
            _ => (KeyboardMode::Characters, KeyVariation::Normal),
        }
    }

    /// Whether an enter key should insert a line break instead of acting.
    pub fn enter_inserts_newline(&self) -> bool {
        self.flag_no_enter_action
            || self.flag_multi_line
            || matches!(self.ime_action, ImeAction::Unspecified | ImeAction::None)
    }
}
