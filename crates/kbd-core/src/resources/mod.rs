//! Resource index: extension manifests, the layouts and popup mappings they
//! declare, currency sets, and the packages their assets are read from.

mod package;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ResourceError;
use crate::key::KeyData;
use crate::layout::{LayoutArrangementComponent, LayoutType};
use crate::subtype::{ComponentName, SubtypePreset};

pub use package::{DirPackage, ExtensionStore, MemoryPackage, ZipPackage, MANIFEST_FILE};

/// Lookup from component names to the metadata of what they name.
pub trait ResourceIndex: Send + Sync {
    fn layout(&self, layout_type: LayoutType, name: &ComponentName) -> Option<LayoutArrangementComponent>;
    fn popup_mapping(&self, name: &ComponentName) -> Option<PopupMappingComponent>;
    fn currency_set(&self, name: &ComponentName) -> Option<Arc<CurrencySet>>;
}

/// Byte access to the assets of one extension.
pub trait Package: Send + Sync {
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError>;

    fn read_to_string(&self, path: &str) -> Result<String, ResourceError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| {
            ResourceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

/// Resolves an extension id to the package holding its assets.
pub trait PackageResolver: Send + Sync {
    fn package(&self, extension_id: &str) -> Option<Arc<dyn Package>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMeta {
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupMappingComponent {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub mapping_file: Option<String>,
}

impl PopupMappingComponent {
    pub fn mapping_file(&self) -> String {
        self.mapping_file
            .clone()
            .unwrap_or_else(|| format!("popup/{}.json", self.id))
    }
}

/// The keys that fill currency slots 1..6 for a locale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencySet {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub slots: Vec<KeyData>,
}

impl CurrencySet {
    pub fn slot(&self, index: usize) -> Option<&KeyData> {
        self.slots.get(index)
    }
}

/// Contents of an extension's `extension.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardExtension {
    pub meta: ExtensionMeta,
    /// Layout metadata keyed by layout type id.
    #[serde(default)]
    pub layouts: HashMap<String, Vec<LayoutArrangementComponent>>,
    #[serde(default)]
    pub popup_mappings: Vec<PopupMappingComponent>,
    #[serde(default)]
    pub currency_sets: Vec<CurrencySet>,
    #[serde(default)]
    pub subtype_presets: Vec<SubtypePreset>,
}

impl KeyboardExtension {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ResourceError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Everything the installed extensions declare, indexed by component name.
#[derive(Debug, Clone, Default)]
pub struct KeyboardResources {
    layouts: HashMap<LayoutType, HashMap<ComponentName, LayoutArrangementComponent>>,
    popup_mappings: HashMap<ComponentName, PopupMappingComponent>,
    currency_sets: HashMap<ComponentName, Arc<CurrencySet>>,
    subtype_presets: Vec<SubtypePreset>,
}

impl KeyboardResources {
    /// Later extensions win when two declare the same component name.
    pub fn from_extensions<'a>(extensions: impl IntoIterator<Item = &'a KeyboardExtension>) -> Self {
        let mut res = Self::default();
        for ext in extensions {
            let ext_id = &ext.meta.id;
            for (type_id, components) in &ext.layouts {
                let Some(layout_type) = LayoutType::from_id(type_id) else {
                    warn!(extension = %ext_id, layout_type = %type_id, "skipping unknown layout type");
                    continue;
                };
                let by_name = res.layouts.entry(layout_type).or_default();
                for component in components {
                    by_name.insert(ComponentName::new(ext_id, &component.id), component.clone());
                }
            }
            for mapping in &ext.popup_mappings {
                res.popup_mappings
                    .insert(ComponentName::new(ext_id, &mapping.id), mapping.clone());
            }
            for set in &ext.currency_sets {
                res.currency_sets
                    .insert(ComponentName::new(ext_id, &set.id), Arc::new(set.clone()));
            }
            res.subtype_presets.extend(ext.subtype_presets.iter().cloned());
            debug!(extension = %ext_id, "indexed extension");
        }
        res
    }

    pub fn subtype_presets(&self) -> &[SubtypePreset] {
        &self.subtype_presets
    }

    /// Every indexed layout of one type, sorted by name.
    pub fn layouts_of(&self, layout_type: LayoutType) -> Vec<(&ComponentName, &LayoutArrangementComponent)> {
        let mut out: Vec<_> = self
            .layouts
            .get(&layout_type)
            .map(|m| m.iter().collect())
            .unwrap_or_default();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn popup_mapping_names(&self) -> Vec<&ComponentName> {
        let mut out: Vec<_> = self.popup_mappings.keys().collect();
        out.sort();
        out
    }

    pub fn currency_set_names(&self) -> Vec<&ComponentName> {
        let mut out: Vec<_> = self.currency_sets.keys().collect();
        out.sort();
        out
    }
}

impl ResourceIndex for KeyboardResources {
    fn layout(&self, layout_type: LayoutType, name: &ComponentName) -> Option<LayoutArrangementComponent> {
        self.layouts.get(&layout_type)?.get(name).cloned()
    }

    fn popup_mapping(&self, name: &ComponentName) -> Option<PopupMappingComponent> {
        self.popup_mappings.get(name).cloned()
    }

    fn currency_set(&self, name: &ComponentName) -> Option<Arc<CurrencySet>> {
        self.currency_sets.get(name).cloned()
    }
}
