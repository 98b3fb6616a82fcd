//! Layout types, arrangements and the merged text keyboard.

mod merge;


use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::key::{AbstractKeyData, KeyData};
use crate::popup::PopupMapping;
use crate::state::{KeyboardMode, LayoutDirection};
use crate::subtype::ComponentName;

pub use merge::{add_row_hints, apply_hints, merge_arrangements};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayoutType {
    Characters,
    CharactersMod,
    Extension,
    Numeric,
    NumericAdvanced,
    NumericRow,
    Phone,
    Phone2,
    Symbols,
    SymbolsMod,
    Symbols2,
    Symbols2Mod,
}

impl LayoutType {
    pub const ALL: [LayoutType; 12] = [
        Self::Characters,
        Self::CharactersMod,
        Self::Extension,
        Self::Numeric,
        Self::NumericAdvanced,
        Self::NumericRow,
        Self::Phone,
        Self::Phone2,
        Self::Symbols,
        Self::SymbolsMod,
        Self::Symbols2,
        Self::Symbols2Mod,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::CharactersMod => "characters/mod",
            Self::Extension => "extension",
            Self::Numeric => "numeric",
            Self::NumericAdvanced => "numericAdvanced",
            Self::NumericRow => "numericRow",
            Self::Phone => "phone",
            Self::Phone2 => "phone2",
            Self::Symbols => "symbols",
            Self::SymbolsMod => "symbols/mod",
            Self::Symbols2 => "symbols2",
            Self::Symbols2Mod => "symbols2/mod",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    /// Modifier layer type that pairs with this main layout type.
    pub fn modifier_type(self) -> LayoutType {
        match self {
            Self::Symbols => Self::SymbolsMod,
            Self::Symbols2 => Self::Symbols2Mod,
            _ => Self::CharactersMod,
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for LayoutType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for LayoutType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Self::from_id(&id)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown layout type: {id}")))
    }
}

/// Layout type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ltn {
    pub layout_type: LayoutType,
    pub name: ComponentName,
}

impl Ltn {
    pub fn new(layout_type: LayoutType, name: ComponentName) -> Self {
        Self { layout_type, name }
    }
}

impl fmt::Display for Ltn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layout_type, self.name)
    }
}

/// Rows of keys as written in a layout asset.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct LayoutArrangement {
    pub rows: Vec<Vec<Arc<AbstractKeyData>>>,
}

impl LayoutArrangement {
    pub fn new(rows: Vec<Vec<AbstractKeyData>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Arc::new).collect())
                .collect(),
        }
    }
}

/// Index metadata of a layout inside an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutArrangementComponent {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub direction: LayoutDirection,
    /// Overrides the modifier layer this layout is merged with.
    #[serde(default)]
    pub modifier: Option<ComponentName>,
    #[serde(default)]
    pub arrangement_file: Option<String>,
}

impl LayoutArrangementComponent {
    pub fn arrangement_file(&self, layout_type: LayoutType) -> String {
        self.arrangement_file
            .clone()
            .unwrap_or_else(|| format!("layouts/{}/{}.json", layout_type.id(), self.id))
    }
}

/// A loaded layout layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedLayout {
    pub layout_type: LayoutType,
    pub name: ComponentName,
    pub meta: LayoutArrangementComponent,
    pub arrangement: LayoutArrangement,
}

/// A key of a merged keyboard plus the hints attached during merging.
#[derive(Debug, Clone, PartialEq)]
pub struct TextKey {
    pub data: Arc<AbstractKeyData>,
    pub symbol_hint: Option<KeyData>,
    pub number_hint: Option<KeyData>,
}

impl TextKey {
    pub fn new(data: Arc<AbstractKeyData>) -> Self {
        Self {
            data,
            symbol_hint: None,
            number_hint: None,
        }
    }
}

/// Merged arrangement for one keyboard mode, with the popup mappings it
/// resolves popups against.
#[derive(Debug, Clone, PartialEq)]
pub struct TextKeyboard {
    pub arrangement: Vec<Vec<TextKey>>,
    pub mode: KeyboardMode,
    pub popup_mapping: Option<Arc<PopupMapping>>,
    pub popup_mapping_default: Option<Arc<PopupMapping>>,
}

impl TextKeyboard {
    pub fn empty(mode: KeyboardMode) -> Self {
        Self {
            arrangement: Vec::new(),
            mode,
            popup_mapping: None,
            popup_mapping_default: None,
        }
    }

    /// Shown while nothing has been computed yet.
    pub fn placeholder() -> &'static TextKeyboard {
        static PLACEHOLDER: OnceLock<TextKeyboard> = OnceLock::new();
        PLACEHOLDER.get_or_init(|| Self::empty(KeyboardMode::Characters))
    }

    pub fn row_count(&self) -> usize {
        self.arrangement.len()
    }

    pub fn key_count(&self) -> usize {
        self.arrangement.iter().map(Vec::len).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TextKey> {
        self.arrangement.iter().flatten()
    }
}
