use kbd_core::display::KeyIcon;
use kbd_core::editor::{EditorInfo, ImeAction, InputClass, TextVariation};
use kbd_core::state::InputShiftState;
use kbd_core::subtype::SubtypeLayoutMap;
use kbd_core::{ComponentName, ComputedKey, ComputedKeyboard, KeyType, KeyboardMode, Subtype};
use kbd_session::RenderInfo;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum KbdError {
    #[error("IO error: {msg}")]
    Io { msg: String },
    #[error("invalid data: {msg}")]
    InvalidData { msg: String },
    #[error("internal error: {msg}")]
    Internal { msg: String },
}

impl From<kbd_core::prefs::PrefsError> for KbdError {
    fn from(e: kbd_core::prefs::PrefsError) -> Self {
        Self::InvalidData { msg: e.to_string() }
    }
}

impl From<kbd_core::ResourceError> for KbdError {
    fn from(e: kbd_core::ResourceError) -> Self {
        match e {
            kbd_core::ResourceError::Io(e) => Self::Io { msg: e.to_string() },
            other => Self::InvalidData {
                msg: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, uniffi::Record)]
pub struct KbdKey {
    pub code: i32,
    pub key_type: KbdKeyType,
    pub label: Option<String>,
    pub hinted_label: Option<String>,
    /// Icon name, e.g. `backspace` or `shift_up`.
    pub icon: Option<String>,
    pub is_enabled: bool,
    pub is_visible: bool,
    pub shrink: f32,
    pub grow: f32,
    pub width_factor: f32,
    /// Popup keys in display order for the active hint configuration.
    pub popups: Vec<String>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct KbdRow {
    pub keys: Vec<KbdKey>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct KbdKeyboard {
    pub version: u64,
    pub mode: KbdMode,
    pub rows: Vec<KbdRow>,
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct KbdLayoutMap {
    pub characters: String,
    pub symbols: String,
    pub symbols2: String,
    pub numeric: String,
    pub numeric_advanced: String,
    pub numeric_row: String,
    pub phone: String,
    pub phone2: String,
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct KbdSubtype {
    pub id: i64,
    pub primary_locale: String,
    pub secondary_locales: Vec<String>,
    pub currency_set: String,
    pub popup_mapping: Option<String>,
    pub layouts: KbdLayoutMap,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct KbdEditorInfo {
    pub input_class: KbdInputClass,
    pub text_variation: KbdTextVariation,
    pub ime_action: KbdImeAction,
    pub no_enter_action: bool,
    pub multi_line: bool,
    pub rich_input: bool,
    pub package_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum KbdMode {
    Characters,
    Editing,
    Symbols,
    Symbols2,
    Numeric,
    NumericAdvanced,
    Phone,
    Phone2,
    SmartbarClipboardCursorRow,
    SmartbarNumberRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum KbdShiftState {
    Unshifted,
    ShiftedManual,
    ShiftedAutomatic,
    CapsLock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum KbdKeyType {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum KbdInputClass {
    Null,
    Datetime,
    Number,
    Phone,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum KbdTextVariation {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum KbdImeAction {
    Unspecified,
    None,
    Go,
    Search,
    Send,
    Next,
    Done,
    Previous,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<KbdMode> for KeyboardMode {
    fn from(mode: KbdMode) -> Self {
        match mode {
            KbdMode::Characters => Self::Characters,
            KbdMode::Editing => Self::Editing,
            KbdMode::Symbols => Self::Symbols,
            KbdMode::Symbols2 => Self::Symbols2,
            KbdMode::Numeric => Self::Numeric,
            KbdMode::NumericAdvanced => Self::NumericAdvanced,
            KbdMode::Phone => Self::Phone,
            KbdMode::Phone2 => Self::Phone2,
            KbdMode::SmartbarClipboardCursorRow => Self::SmartbarClipboardCursorRow,
            KbdMode::SmartbarNumberRow => Self::SmartbarNumberRow,
        }
    }
}

impl From<KeyboardMode> for KbdMode {
    fn from(mode: KeyboardMode) -> Self {
        match mode {
            KeyboardMode::Characters => Self::Characters,
            KeyboardMode::Editing => Self::Editing,
            KeyboardMode::Symbols => Self::Symbols,
            KeyboardMode::Symbols2 => Self::Symbols2,
            KeyboardMode::Numeric => Self::Numeric,
            KeyboardMode::NumericAdvanced => Self::NumericAdvanced,
            KeyboardMode::Phone => Self::Phone,
            KeyboardMode::Phone2 => Self::Phone2,
            KeyboardMode::SmartbarClipboardCursorRow => Self::SmartbarClipboardCursorRow,
            KeyboardMode::SmartbarNumberRow => Self::SmartbarNumberRow,
        }
    }
}

impl From<KbdShiftState> for InputShiftState {
    fn from(state: KbdShiftState) -> Self {
        match state {
            KbdShiftState::Unshifted => Self::Unshifted,
            KbdShiftState::ShiftedManual => Self::ShiftedManual,
            KbdShiftState::ShiftedAutomatic => Self::ShiftedAutomatic,
            KbdShiftState::CapsLock => Self::CapsLock,
        }
    }
}

impl From<KeyType> for KbdKeyType {
    fn from(t: KeyType) -> Self {
        match t {
            KeyType::Character => Self::Character,
            KeyType::EnterEditing => Self::EnterEditing,
            KeyType::Function => Self::Function,
            KeyType::Lock => Self::Lock,
            KeyType::Modifier => Self::Modifier,
            KeyType::Navigation => Self::Navigation,
            KeyType::SystemGui => Self::SystemGui,
            KeyType::Numeric => Self::Numeric,
            KeyType::Placeholder => Self::Placeholder,
            KeyType::Unspecified => Self::Unspecified,
        }
    }
}

impl From<KbdEditorInfo> for EditorInfo {
    fn from(info: KbdEditorInfo) -> Self {
        Self {
            input_class: match info.input_class {
                KbdInputClass::Null => InputClass::Null,
                KbdInputClass::Datetime => InputClass::Datetime,
                KbdInputClass::Number => InputClass::Number,
                KbdInputClass::Phone => InputClass::Phone,
                KbdInputClass::Text => InputClass::Text,
            },
            text_variation: match info.text_variation {
                KbdTextVariation::Normal => TextVariation::Normal,
                KbdTextVariation::EmailAddress => TextVariation::EmailAddress,
                KbdTextVariation::WebEmailAddress => TextVariation::WebEmailAddress,
                KbdTextVariation::Password => TextVariation::Password,
                KbdTextVariation::VisiblePassword => TextVariation::VisiblePassword,
                KbdTextVariation::WebPassword => TextVariation::WebPassword,
                KbdTextVariation::Uri => TextVariation::Uri,
                KbdTextVariation::PersonName => TextVariation::PersonName,
                KbdTextVariation::PostalAddress => TextVariation::PostalAddress,
                KbdTextVariation::ShortMessage => TextVariation::ShortMessage,
            },
            ime_action: match info.ime_action {
                KbdImeAction::Unspecified => ImeAction::Unspecified,
                KbdImeAction::None => ImeAction::None,
                KbdImeAction::Go => ImeAction::Go,
                KbdImeAction::Search => ImeAction::Search,
                KbdImeAction::Send => ImeAction::Send,
                KbdImeAction::Next => ImeAction::Next,
                KbdImeAction::Done => ImeAction::Done,
                KbdImeAction::Previous => ImeAction::Previous,
            },
            flag_no_enter_action: info.no_enter_action,
            flag_multi_line: info.multi_line,
            is_rich_input_editor: info.rich_input,
            package_name: info.package_name,
        }
    }
}

fn component(name: &str) -> Result<ComponentName, KbdError> {
    Ok(name.parse::<ComponentName>()?)
}

impl TryFrom<KbdSubtype> for Subtype {
    type Error = KbdError;

    fn try_from(s: KbdSubtype) -> Result<Self, KbdError> {
        let l = &s.layouts;
        Ok(Subtype {
            id: s.id,
            primary_locale: s.primary_locale,
            secondary_locales: s.secondary_locales,
            currency_set: component(&s.currency_set)?,
            popup_mapping: s.popup_mapping.as_deref().map(component).transpose()?,
            layout_map: SubtypeLayoutMap {
                characters: component(&l.characters)?,
                symbols: component(&l.symbols)?,
                symbols2: component(&l.symbols2)?,
                numeric: component(&l.numeric)?,
                numeric_advanced: component(&l.numeric_advanced)?,
                numeric_row: component(&l.numeric_row)?,
                phone: component(&l.phone)?,
                phone2: component(&l.phone2)?,
            },
        })
    }
}

impl From<&Subtype> for KbdSubtype {
    fn from(s: &Subtype) -> Self {
        let l = &s.layout_map;
        Self {
            id: s.id,
            primary_locale: s.primary_locale.clone(),
            secondary_locales: s.secondary_locales.clone(),
            currency_set: s.currency_set.to_string(),
            popup_mapping: s.popup_mapping.as_ref().map(ToString::to_string),
            layouts: KbdLayoutMap {
                characters: l.characters.to_string(),
                symbols: l.symbols.to_string(),
                symbols2: l.symbols2.to_string(),
                numeric: l.numeric.to_string(),
                numeric_advanced: l.numeric_advanced.to_string(),
                numeric_row: l.numeric_row.to_string(),
                phone: l.phone.to_string(),
                phone2: l.phone2.to_string(),
            },
        }
    }
}

fn convert_key(key: &ComputedKey, hints: &kbd_core::popup::KeyHintConfiguration) -> KbdKey {
    KbdKey {
        code: key.computed.code,
        key_type: key.computed.key_type.into(),
        label: key.label.clone(),
        hinted_label: key.hinted_label.clone(),
        icon: key.icon.map(KeyIcon::name).map(str::to_string),
        is_enabled: key.is_enabled,
        is_visible: key.is_visible,
        shrink: key.shrink,
        grow: key.grow,
        width_factor: key.width_factor,
        popups: key
            .popups
            .popup_keys(hints)
            .iter()
            .map(|k| k.label.clone())
            .collect(),
    }
}

pub(super) fn convert_keyboard(
    version: u64,
    keyboard: &ComputedKeyboard,
    hints: &kbd_core::popup::KeyHintConfiguration,
) -> KbdKeyboard {
    KbdKeyboard {
        version,
        mode: keyboard.mode.into(),
        rows: keyboard
            .rows
            .iter()
            .map(|row| KbdRow {
                keys: row.iter().map(|k| convert_key(k, hints)).collect(),
            })
            .collect(),
    }
}

pub(super) fn convert_render_info(info: &RenderInfo, hints: &kbd_core::popup::KeyHintConfiguration) -> KbdKeyboard {
    convert_keyboard(info.version, &info.keyboard, hints)
}
