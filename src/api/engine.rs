use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use kbd_core::prefs::parse_prefs_toml;
use kbd_core::resources::{ExtensionStore, KeyboardResources};
use kbd_core::Subtype;
use kbd_session::{KeyboardManager, RenderInfo};
use tokio::runtime::Runtime;
use tracing::info;

use super::types::convert_render_info;
use super::{KbdEditorInfo, KbdError, KbdKeyboard, KbdMode, KbdShiftState, KbdSubtype};

fn open_extensions(dir: &Path) -> Result<(Arc<KeyboardResources>, Arc<ExtensionStore>), KbdError> {
    let store = ExtensionStore::open_dir(dir).map_err(|e| KbdError::Io {
        msg: format!("{}: {e}", dir.display()),
    })?;
    Ok((Arc::new(store.resources()), Arc::new(store)))
}

/// A keyboard session bound to one directory of installed extensions.
///
/// Every mutating call waits for the resulting recomputation and returns the
/// keyboard that was published for it.
#[derive(uniffi::Object)]
pub struct KbdEngine {
    // Declared before `runtime` so the manager shuts down first on drop.
    manager: KeyboardManager,
    resources: RwLock<Arc<KeyboardResources>>,
    extensions_dir: PathBuf,
    runtime: Runtime,
}

impl KbdEngine {
    fn render(&self, info: &RenderInfo) -> KbdKeyboard {
        convert_render_info(info, &self.manager.prefs().key_hint_configuration())
    }

    fn refresh(&self) -> KbdKeyboard {
        let info = self.runtime.block_on(self.manager.refresh());
        self.render(&info)
    }
}

#[uniffi::export]
impl KbdEngine {
    #[uniffi::constructor]
    pub fn new(extensions_dir: String, prefs_toml: Option<String>) -> Result<Arc<Self>, KbdError> {
        let prefs = match prefs_toml {
            Some(content) => parse_prefs_toml(&content)?,
            None => Default::default(),
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("kbd-engine")
            .enable_all()
            .build()
            .map_err(|e| KbdError::Internal { msg: e.to_string() })?;
        let extensions_dir = PathBuf::from(extensions_dir);
        let (resources, store) = open_extensions(&extensions_dir)?;
        info!(dir = %extensions_dir.display(), extensions = store.extensions().len(), "engine opened");

        let manager = KeyboardManager::new(runtime.handle().clone(), resources.clone(), store, prefs);
        Ok(Arc::new(Self {
            manager,
            resources: RwLock::new(resources),
            extensions_dir,
            runtime,
        }))
    }

    /// Rescans the extensions directory and recomputes from scratch.
    pub fn reload_extensions(&self) -> Result<KbdKeyboard, KbdError> {
        let (resources, store) = open_extensions(&self.extensions_dir)?;
        *self.resources.write().unwrap_or_else(PoisonError::into_inner) = resources.clone();
        let info = self
            .runtime
            .block_on(self.manager.on_resources_changed(resources, store));
        Ok(self.render(&info))
    }

    pub fn set_prefs(&self, prefs_toml: String) -> Result<KbdKeyboard, KbdError> {
        let prefs = parse_prefs_toml(&prefs_toml)?;
        let info = self.runtime.block_on(self.manager.set_prefs(prefs));
        Ok(self.render(&info))
    }

    /// Subtypes offered by the installed extensions, numbered from 1 in
    /// index order.
    pub fn subtype_presets(&self) -> Vec<KbdSubtype> {
        let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        resources
            .subtype_presets()
            .iter()
            .zip(1..)
            .map(|(preset, id)| KbdSubtype::from(&preset.to_subtype(id)))
            .collect()
    }

    pub fn set_subtypes(&self, subtypes: Vec<KbdSubtype>) -> Result<KbdKeyboard, KbdError> {
        let list = subtypes
            .into_iter()
            .map(Subtype::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let info = self.runtime.block_on(self.manager.set_subtypes(list));
        Ok(self.render(&info))
    }

    pub fn set_active_subtype(&self, subtype: KbdSubtype) -> Result<KbdKeyboard, KbdError> {
        let subtype = Subtype::try_from(subtype)?;
        let info = self.runtime.block_on(self.manager.set_active_subtype(subtype));
        Ok(self.render(&info))
    }

    pub fn active_subtype(&self) -> KbdSubtype {
        KbdSubtype::from(&self.manager.active_subtype())
    }

    pub fn start_input_view(&self, editor_info: KbdEditorInfo) -> KbdKeyboard {
        let info = self
            .runtime
            .block_on(self.manager.start_input_view(editor_info.into()));
        self.render(&info)
    }

    pub fn set_keyboard_mode(&self, mode: KbdMode) -> KbdKeyboard {
        self.manager.state().set_keyboard_mode(mode.into());
        self.refresh()
    }

    pub fn set_shift_state(&self, shift: KbdShiftState) -> KbdKeyboard {
        self.manager.state().set_input_shift_state(shift.into());
        self.refresh()
    }

    pub fn set_primary_clip(&self, has_clip: bool) -> KbdKeyboard {
        let info = self
            .runtime
            .block_on(self.manager.on_primary_clip_changed(has_clip));
        self.render(&info)
    }

    /// Last published main keyboard, without recomputing.
    pub fn keyboard(&self) -> KbdKeyboard {
        self.render(&self.manager.render_info())
    }

    pub fn smartbar_keyboard(&self) -> KbdKeyboard {
        let info = self.manager.subscribe_smartbar_render_info().borrow().clone();
        self.render(&info)
    }

    /// Last keyboard published while in characters mode.
    pub fn last_characters_keyboard(&self) -> KbdKeyboard {
        let info = self
            .manager
            .subscribe_last_characters_render_info()
            .borrow()
            .clone();
        self.render(&info)
    }

    pub fn shutdown(&self) {
        self.manager.shutdown();
    }
}
