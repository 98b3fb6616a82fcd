//! Subtypes: a language plus the layouts, popups and currency set it uses.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;
use crate::layout::LayoutType;

pub const EXT_CORE_LAYOUTS: &str = "org.kbd.layouts";
pub const EXT_CORE_LOCALIZATION: &str = "org.kbd.localization";
pub const EXT_CORE_CURRENCY_SETS: &str = "org.kbd.currencysets";

/// `extension_id:component_id` reference to a component inside an extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentName {
    pub extension_id: String,
    pub component_id: String,
}

impl ComponentName {
    pub fn new(extension_id: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            component_id: component_id.into(),
        }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.extension_id, self.component_id)
    }
}

impl FromStr for ComponentName {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((ext, comp)) if !ext.is_empty() && !comp.is_empty() => Ok(Self::new(ext, comp)),
            _ => Err(ResourceError::InvalidComponentName(s.to_string())),
        }
    }
}

impl TryFrom<String> for ComponentName {
    type Error = ResourceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ComponentName> for String {
    fn from(name: ComponentName) -> Self {
        name.to_string()
    }
}

pub fn ext_core_layout(id: &str) -> ComponentName {
    ComponentName::new(EXT_CORE_LAYOUTS, id)
}

pub fn ext_core_popup_mapping(id: &str) -> ComponentName {
    ComponentName::new(EXT_CORE_LOCALIZATION, id)
}

pub fn ext_core_currency_set(id: &str) -> ComponentName {
    ComponentName::new(EXT_CORE_CURRENCY_SETS, id)
}

/// Layout chosen for each main/extension layout type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubtypeLayoutMap {
    pub characters: ComponentName,
    pub symbols: ComponentName,
    pub symbols2: ComponentName,
    pub numeric: ComponentName,
    pub numeric_advanced: ComponentName,
    pub numeric_row: ComponentName,
    pub phone: ComponentName,
    pub phone2: ComponentName,
}

impl Default for SubtypeLayoutMap {
    fn default() -> Self {
        Self {
            characters: ext_core_layout("qwerty"),
            symbols: ext_core_layout("western"),
            symbols2: ext_core_layout("western"),
            numeric: ext_core_layout("western_arabic"),
            numeric_advanced: ext_core_layout("western_arabic"),
            numeric_row: ext_core_layout("western_arabic"),
            phone: ext_core_layout("telpad"),
            phone2: ext_core_layout("telpad"),
        }
    }
}

impl SubtypeLayoutMap {
    pub fn get(&self, layout_type: LayoutType) -> Option<&ComponentName> {
        match layout_type {
            LayoutType::Characters => Some(&self.characters),
            LayoutType::Symbols => Some(&self.symbols),
            LayoutType::Symbols2 => Some(&self.symbols2),
            LayoutType::Numeric => Some(&self.numeric),
            LayoutType::NumericAdvanced => Some(&self.numeric_advanced),
            LayoutType::NumericRow => Some(&self.numeric_row),
            LayoutType::Phone => Some(&self.phone),
            LayoutType::Phone2 => Some(&self.phone2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtype {
    pub id: i64,
    /// BCP 47 language tag.
    pub primary_locale: String,
    #[serde(default)]
    pub secondary_locales: Vec<String>,
    pub currency_set: ComponentName,
    #[serde(default)]
    pub popup_mapping: Option<ComponentName>,
    #[serde(default)]
    pub layout_map: SubtypeLayoutMap,
}

impl Subtype {
    pub fn default_subtype() -> Self {
        Self {
            id: -1,
            primary_locale: "en-US".to_string(),
            secondary_locales: Vec::new(),
            currency_set: ext_core_currency_set("dollar"),
            popup_mapping: Some(ext_core_popup_mapping("en")),
            layout_map: SubtypeLayoutMap::default(),
        }
    }

    pub fn default_ref() -> &'static Subtype {
        static DEFAULT: OnceLock<Subtype> = OnceLock::new();
        DEFAULT.get_or_init(Self::default_subtype)
    }

    pub fn short_label(&self) -> String {
        format!("{} ({})", self.primary_locale, self.layout_map.characters.component_id)
    }
}

impl Default for Subtype {
    fn default() -> Self {
        Self::default_subtype()
    }
}

/// Subtype template shipped by an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtypePreset {
    pub language_tag: String,
    #[serde(default)]
    pub preferred: SubtypeLayoutMap,
    #[serde(default)]
    pub popup_mapping: Option<ComponentName>,
    #[serde(default = "default_currency_set")]
    pub currency_set: ComponentName,
}

fn default_currency_set() -> ComponentName {
    ext_core_currency_set("dollar")
}

impl SubtypePreset {
    pub fn to_subtype(&self, id: i64) -> Subtype {
        Subtype {
            id,
            primary_locale: self.language_tag.clone(),
            secondary_locales: Vec::new(),
            currency_set: self.currency_set.clone(),
            popup_mapping: self.popup_mapping.clone(),
            layout_map: self.preferred.clone(),
        }
    }
}
