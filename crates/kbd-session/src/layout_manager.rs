//! Memoized loading of layout layers and popup mappings, and assembly of
//! merged keyboards from them.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use tokio::sync::{watch, OnceCell};
use tracing::{debug, warn};

use kbd_core::layout::{apply_hints, merge_arrangements, TextKey};
use kbd_core::popup::PopupMapping;
use kbd_core::prefs::Prefs;
use kbd_core::resources::{Package, PackageResolver, ResourceIndex};
use kbd_core::subtype::{ext_core_layout, ext_core_popup_mapping, ComponentName};
use kbd_core::{CachedLayout, KeyboardMode, LayoutArrangement, LayoutType, LoadError, Ltn, Subtype, TextKeyboard};

pub type LoadResult<T> = Result<Arc<T>, LoadError>;

type LoadCell<T> = Arc<OnceCell<LoadResult<T>>>;

/// Raw results of the three layer loads behind the last keyboard merged for
/// its own mode. Symbol hint merges and smartbar rows are not reported.
/// `None` means the mode does not use that layer.
#[derive(Debug, Clone, Default)]
pub struct DebugLayoutResults {
    pub mode: KeyboardMode,
    pub main: Option<LoadResult<CachedLayout>>,
    pub modifier: Option<LoadResult<CachedLayout>>,
    pub extension: Option<LoadResult<CachedLayout>>,
}

/// The layers one keyboard mode is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerRequest {
    pub main: Option<Ltn>,
    pub modifier: Option<Ltn>,
    pub extension: Option<Ltn>,
}

impl LayerRequest {
    /// Layers for `mode`, before any modifier override from the main layout.
    /// Returns `None` for modes without a declarative layout.
    pub fn for_mode(mode: KeyboardMode, subtype: &Subtype, prefs: &Prefs) -> Option<Self> {
        let map = &subtype.layout_map;
        let ltn = |t: LayoutType, name: &ComponentName| Some(Ltn::new(t, name.clone()));
        let default_mod = |t: LayoutType| Some(Ltn::new(t, ext_core_layout("default")));
        let request = match mode {
            KeyboardMode::Characters => Self {
                extension: if prefs.keyboard.number_row {
                    ltn(LayoutType::NumericRow, &map.numeric_row)
                } else {
                    None
                },
                main: ltn(LayoutType::Characters, &map.characters),
                modifier: default_mod(LayoutType::CharactersMod),
            },
            KeyboardMode::Editing => return None,
            KeyboardMode::Numeric => Self {
                main: ltn(LayoutType::Numeric, &map.numeric),
                ..Self::default()
            },
            KeyboardMode::NumericAdvanced => Self {
                main: ltn(LayoutType::NumericAdvanced, &map.numeric_advanced),
                ..Self::default()
            },
            KeyboardMode::Phone => Self {
                main: ltn(LayoutType::Phone, &map.phone),
                ..Self::default()
            },
            KeyboardMode::Phone2 => Self {
                main: ltn(LayoutType::Phone2, &map.phone2),
                ..Self::default()
            },
            KeyboardMode::Symbols => Self {
                extension: ltn(LayoutType::NumericRow, &map.numeric_row),
                main: ltn(LayoutType::Symbols, &map.symbols),
                modifier: default_mod(LayoutType::SymbolsMod),
            },
            KeyboardMode::Symbols2 => Self {
                main: ltn(LayoutType::Symbols2, &map.symbols2),
                modifier: default_mod(LayoutType::Symbols2Mod),
                ..Self::default()
            },
            KeyboardMode::SmartbarClipboardCursorRow => Self {
                extension: ltn(LayoutType::Extension, &ext_core_layout("clipboard_cursor_row")),
                ..Self::default()
            },
            KeyboardMode::SmartbarNumberRow => Self {
                extension: ltn(LayoutType::NumericRow, &map.numeric_row),
                ..Self::default()
            },
        };
        Some(request)
    }

    /// Modifier layer to load once `main` has been attempted: the main
    /// layout's own modifier when it loaded and names one, otherwise the
    /// default.
    pub fn modifier_for(&self, main: Option<&LoadResult<CachedLayout>>) -> Option<Ltn> {
        match main {
            Some(Ok(layout)) => match &layout.meta.modifier {
                Some(name) => Some(Ltn::new(layout.layout_type.modifier_type(), name.clone())),
                None => self.modifier.clone(),
            },
            _ => self.modifier.clone(),
        }
    }
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Single-flight memo: one load per key, failures included.
struct MemoCache<K, T> {
    cells: Mutex<HashMap<K, LoadCell<T>>>,
}

impl<K: Eq + Hash + Clone + std::fmt::Display, T> MemoCache<K, T> {
    fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Only the check-or-insert runs under the lock.
    fn cell(&self, key: &K) -> LoadCell<T> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cell) = cells.get(key) {
            debug!(key = %key, "using cache");
            return Arc::clone(cell);
        }
        debug!(key = %key, "loading");
        let cell = Arc::new(OnceCell::new());
        cells.insert(key.clone(), Arc::clone(&cell));
        cell
    }

    fn clear(&self) {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn len(&self) -> usize {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Loads layout layers and popup mappings through the resource index and
/// merges them into [`TextKeyboard`]s.
pub struct LayoutManager {
    index: RwLock<Arc<dyn ResourceIndex>>,
    packages: RwLock<Arc<dyn PackageResolver>>,
    layouts: MemoCache<Ltn, CachedLayout>,
    popup_mappings: MemoCache<ComponentName, PopupMapping>,
    shutdown: watch::Sender<bool>,
    debug_results: watch::Sender<DebugLayoutResults>,
}

impl LayoutManager {
    pub fn new(index: Arc<dyn ResourceIndex>, packages: Arc<dyn PackageResolver>) -> Self {
        Self {
            index: RwLock::new(index),
            packages: RwLock::new(packages),
            layouts: MemoCache::new(),
            popup_mappings: MemoCache::new(),
            shutdown: watch::channel(false).0,
            debug_results: watch::channel(DebugLayoutResults::default()).0,
        }
    }

    pub fn index(&self) -> Arc<dyn ResourceIndex> {
        Arc::clone(&self.index.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn packages(&self) -> Arc<dyn PackageResolver> {
        Arc::clone(&self.packages.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap the resource sources and forget everything loaded from the old
    /// ones. Loads already in flight finish against the old sources.
    pub fn replace_sources(&self, index: Arc<dyn ResourceIndex>, packages: Arc<dyn PackageResolver>) {
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = index;
        *self.packages.write().unwrap_or_else(PoisonError::into_inner) = packages;
        self.clear_caches();
    }

    pub fn clear_caches(&self) {
        self.layouts.clear();
        self.popup_mappings.clear();
    }

    /// Number of memoized layout entries, failed ones included.
    pub fn cached_layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Cancels every load in flight and every load started afterwards.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub fn subscribe_debug_results(&self) -> watch::Receiver<DebugLayoutResults> {
        self.debug_results.subscribe()
    }

    pub async fn load_layout(&self, ltn: &Ltn) -> LoadResult<CachedLayout> {
        let cell = self.layouts.cell(ltn);
        cell.get_or_init(|| self.read_layout(ltn)).await.clone()
    }

    /// Popup mapping named by the subtype, or the default mapping when the
    /// subtype names none.
    pub async fn load_popup_mapping(&self, subtype: Option<&Subtype>) -> LoadResult<PopupMapping> {
        let name = subtype
            .and_then(|s| s.popup_mapping.clone())
            .unwrap_or_else(|| ext_core_popup_mapping("default"));
        let cell = self.popup_mappings.cell(&name);
        cell.get_or_init(|| self.read_popup_mapping(&name)).await.clone()
    }

    async fn read_layout(&self, ltn: &Ltn) -> LoadResult<CachedLayout> {
        let meta = self
            .index()
            .layout(ltn.layout_type, &ltn.name)
            .ok_or_else(|| LoadError::NoIndexEntry(ltn.to_string()))?;
        let package = self.package_for(&ltn.name)?;
        let arrangement: LayoutArrangement = self
            .read_json(package, meta.arrangement_file(ltn.layout_type))
            .await?;
        Ok(Arc::new(CachedLayout {
            layout_type: ltn.layout_type,
            name: ltn.name.clone(),
            meta,
            arrangement,
        }))
    }

    async fn read_popup_mapping(&self, name: &ComponentName) -> LoadResult<PopupMapping> {
        let meta = self
            .index()
            .popup_mapping(name)
            .ok_or_else(|| LoadError::NoIndexEntry(name.to_string()))?;
        let package = self.package_for(name)?;
        let mapping: PopupMapping = self.read_json(package, meta.mapping_file()).await?;
        Ok(Arc::new(mapping))
    }

    fn package_for(&self, name: &ComponentName) -> Result<Arc<dyn Package>, LoadError> {
        self.packages()
            .package(&name.extension_id)
            .ok_or_else(|| LoadError::ExtensionNotFound(name.extension_id.clone()))
    }

    /// Read and decode off the async threads; gives up on shutdown.
    async fn read_json<T>(&self, package: Arc<dyn Package>, path: String) -> Result<T, LoadError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return Err(LoadError::Cancelled);
        }
        let task = tokio::task::spawn_blocking(move || {
            let bytes = package.read(&path).map_err(|e| LoadError::Resource {
                path: path.clone(),
                source: Arc::new(e),
            })?;
            serde_json::from_slice::<T>(&bytes).map_err(|e| LoadError::Decode {
                path,
                source: Arc::new(e),
            })
        });
        tokio::select! {
            joined = task => joined.unwrap_or_else(|e| {
                warn!(error = %e, "asset read task failed");
                Err(LoadError::Cancelled)
            }),
            _ = wait_for_shutdown(shutdown) => Err(LoadError::Cancelled),
        }
    }

    async fn load_optional(&self, ltn: Option<&Ltn>) -> Option<LoadResult<CachedLayout>> {
        match ltn {
            Some(ltn) => Some(self.load_layout(ltn).await),
            None => None,
        }
    }

    /// Load the requested layers and merge them. A main layout that names its
    /// own modifier replaces the default modifier layer, but only once it has
    /// loaded.
    async fn merged_rows(&self, mode: KeyboardMode, request: &LayerRequest) -> (Vec<Vec<TextKey>>, DebugLayoutResults) {
        let (main, extension) = tokio::join!(
            self.load_optional(request.main.as_ref()),
            self.load_optional(request.extension.as_ref()),
        );
        let modifier_ltn = request.modifier_for(main.as_ref());
        let modifier = self.load_optional(modifier_ltn.as_ref()).await;

        for (layer, result) in [("main", &main), ("modifier", &modifier), ("extension", &extension)] {
            if let Some(Err(e)) = result {
                warn!(?mode, layer, error = %e, "layout layer unavailable");
            }
        }

        let arrangement = |r: &Option<LoadResult<CachedLayout>>| {
            r.as_ref()
                .and_then(|r| r.as_ref().ok())
                .cloned()
        };
        let (m, md, ext) = (arrangement(&main), arrangement(&modifier), arrangement(&extension));
        let rows = merge_arrangements(
            m.as_deref().map(|c| &c.arrangement),
            md.as_deref().map(|c| &c.arrangement),
            ext.as_deref().map(|c| &c.arrangement),
        );
        let results = DebugLayoutResults {
            mode,
            main,
            modifier,
            extension,
        };
        (rows, results)
    }

    async fn optional_mapping(&self, subtype: Option<&Subtype>) -> Option<Arc<PopupMapping>> {
        match self.load_popup_mapping(subtype).await {
            Ok(mapping) => Some(mapping),
            Err(e) => {
                warn!(error = %e, "popup mapping unavailable");
                None
            }
        }
    }

    /// Merged keyboard for `mode`. CHARACTERS keys also get hints from the
    /// SYMBOLS grid of the same subtype.
    pub async fn compute_keyboard(&self, mode: KeyboardMode, subtype: &Subtype, prefs: &Prefs) -> TextKeyboard {
        let Some(request) = LayerRequest::for_mode(mode, subtype, prefs) else {
            return TextKeyboard::empty(mode);
        };

        let ((mut rows, results), popup_mapping, popup_mapping_default) = tokio::join!(
            self.merged_rows(mode, &request),
            self.optional_mapping(Some(subtype)),
            self.optional_mapping(None),
        );
        if !matches!(
            mode,
            KeyboardMode::SmartbarClipboardCursorRow | KeyboardMode::SmartbarNumberRow
        ) {
            self.debug_results.send_replace(results);
        }

        if mode == KeyboardMode::Characters && !rows.is_empty() {
            if let Some(symbols) = LayerRequest::for_mode(KeyboardMode::Symbols, subtype, prefs) {
                let (symbol_rows, _) = self.merged_rows(KeyboardMode::Symbols, &symbols).await;
                apply_hints(&mut rows, &symbol_rows, prefs.keyboard.hinted_number_row_enabled);
            }
        }

        TextKeyboard {
            arrangement: rows,
            mode,
            popup_mapping,
            popup_mapping_default,
        }
    }
}
