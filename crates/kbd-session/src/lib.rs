//! Live keyboard session: loads and merges layouts, keeps the keyboard cache,
//! and republishes a resolved keyboard whenever its inputs change.
//!
//! `KeyboardManager` owns the state register and serializes every
//! recomputation behind one async mutex, so a published [`RenderInfo`]
//! always pairs a keyboard with the evaluator it was resolved against.

mod evaluator;
mod keyboard_cache;
mod layout_manager;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex};
use tracing::{debug, debug_span, Instrument};

use kbd_core::editor::{EditorInfo, InputClass};
use kbd_core::resources::{PackageResolver, ResourceIndex};
use kbd_core::state::{InputShiftState, KeyVariation, ObserverId};
use kbd_core::{ComputedKeyboard, KeyboardMode, KeyboardState, Prefs, StateRegister, Subtype, TextKeyboard};

pub use evaluator::SessionEvaluator;
pub use keyboard_cache::TextKeyboardCache;
pub use layout_manager::{DebugLayoutResults, LayerRequest, LayoutManager, LoadResult};

/// A resolved keyboard and the evaluator it was resolved against.
#[derive(Debug, Clone)]
pub struct RenderInfo {
    pub version: u64,
    pub evaluator: Arc<SessionEvaluator>,
    pub keyboard: Arc<ComputedKeyboard>,
}

impl RenderInfo {
    fn initial(mode: KeyboardMode) -> Self {
        let evaluator = SessionEvaluator::new(
            0,
            Arc::new(TextKeyboard::empty(mode)),
            EditorInfo::default(),
            KeyboardState::default(),
            Subtype::default_subtype(),
            0,
            &Prefs::default(),
            false,
            None,
        );
        Self {
            version: 0,
            evaluator: Arc::new(evaluator),
            keyboard: Arc::new(ComputedKeyboard::empty(mode)),
        }
    }
}

/// Cache mutation applied at the start of the next recomputation, inside
/// the critical section.
pub enum PendingAction {
    ReplaceSources {
        index: Arc<dyn ResourceIndex>,
        packages: Arc<dyn PackageResolver>,
    },
    ClearKeyboardCache,
    ClearKeyboardMode(KeyboardMode),
}

#[derive(Debug, Clone)]
struct Subtypes {
    list: Vec<Subtype>,
    active: Subtype,
}

struct Inner {
    runtime: Handle,
    layouts: LayoutManager,
    keyboards: TextKeyboardCache,
    state: StateRegister,
    /// Version of the last published render info.
    update_guard: Mutex<u64>,
    editor_info: RwLock<EditorInfo>,
    subtypes: RwLock<Subtypes>,
    prefs: RwLock<Arc<Prefs>>,
    has_primary_clip: AtomicBool,
    render_info: watch::Sender<RenderInfo>,
    smartbar_render_info: watch::Sender<RenderInfo>,
    last_characters_render_info: watch::Sender<RenderInfo>,
    active_subtype: watch::Sender<Subtype>,
}

impl Inner {
    fn editor_info(&self) -> EditorInfo {
        self.editor_info.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn subtypes(&self) -> Subtypes {
        self.subtypes.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn prefs(&self) -> Arc<Prefs> {
        Arc::clone(&self.prefs.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn apply(&self, action: PendingAction) {
        match action {
            PendingAction::ReplaceSources { index, packages } => {
                self.layouts.replace_sources(index, packages);
                self.keyboards.clear();
            }
            PendingAction::ClearKeyboardCache => self.keyboards.clear(),
            PendingAction::ClearKeyboardMode(mode) => self.keyboards.clear_mode(mode),
        }
    }

    async fn keyboard(&self, mode: KeyboardMode, subtype: &Subtype, prefs: &Prefs) -> Arc<TextKeyboard> {
        self.keyboards
            .get_or_else(mode, subtype, || self.layouts.compute_keyboard(mode, subtype, prefs))
            .await
    }

    async fn update_render_info(&self, action: Option<PendingAction>) -> RenderInfo {
        let mut last_version = self.update_guard.lock().await;
        if let Some(action) = action {
            self.apply(action);
        }

        let editor_info = self.editor_info();
        let mut state = self.state.snapshot();
        let mode = state.keyboard_mode();
        if mode != KeyboardMode::Characters {
            state.set_input_shift_state(InputShiftState::Unshifted);
        }
        // Claimed before awaiting; a cancelled run must not hand its
        // version to the next one.
        *last_version += 1;
        let version = *last_version;

        self.recompute(version, editor_info, state)
            .instrument(debug_span!("update_render_info", version, ?mode))
            .await
    }

    async fn recompute(&self, version: u64, editor_info: EditorInfo, state: KeyboardState) -> RenderInfo {
        let mode = state.keyboard_mode();
        let Subtypes { list, active } = self.subtypes();
        let prefs = self.prefs();
        let has_clip = self.has_primary_clip.load(Ordering::SeqCst);
        let hints = prefs.key_hint_configuration();

        let keyboard = self.keyboard(mode, &active, &prefs).await;
        let currency_set = self.layouts.index().currency_set(&active.currency_set);
        let evaluator = Arc::new(SessionEvaluator::new(
            version,
            keyboard,
            editor_info.clone(),
            state,
            active,
            list.len(),
            &prefs,
            has_clip,
            currency_set.clone(),
        ));
        let computed = ComputedKeyboard::compute(evaluator.as_ref(), &hints);
        let info = RenderInfo {
            version,
            evaluator,
            keyboard: Arc::new(computed),
        };
        self.render_info.send_replace(info.clone());
        if mode == KeyboardMode::Characters {
            self.last_characters_render_info.send_replace(info.clone());
        }

        let smartbar_mode = KeyboardMode::SmartbarClipboardCursorRow;
        let smartbar_subtype = Subtype::default_subtype();
        let smartbar_keyboard = self.keyboard(smartbar_mode, &smartbar_subtype, &prefs).await;
        let smartbar_evaluator = Arc::new(SessionEvaluator::new(
            version,
            smartbar_keyboard,
            editor_info,
            state,
            smartbar_subtype,
            list.len(),
            &prefs,
            has_clip,
            currency_set,
        ));
        let smartbar_computed = ComputedKeyboard::compute(smartbar_evaluator.as_ref(), &hints);
        self.smartbar_render_info.send_replace(RenderInfo {
            version,
            evaluator: smartbar_evaluator,
            keyboard: Arc::new(smartbar_computed),
        });

        debug!(rows = info.keyboard.rows.len(), "published render info");
        info
    }
}

/// Keeps the published keyboard in sync with state, subtype, preference,
/// resource and clipboard changes.
pub struct KeyboardManager {
    inner: Arc<Inner>,
    observer: ObserverId,
}

impl KeyboardManager {
    /// Register changes recompute on `runtime`.
    pub fn new(
        runtime: Handle,
        index: Arc<dyn ResourceIndex>,
        packages: Arc<dyn PackageResolver>,
        prefs: Prefs,
    ) -> Self {
        let initial = RenderInfo::initial(KeyboardMode::Characters);
        let default_subtype = Subtype::default_subtype();
        let inner = Arc::new(Inner {
            runtime,
            layouts: LayoutManager::new(index, packages),
            keyboards: TextKeyboardCache::new(),
            state: StateRegister::default(),
            update_guard: Mutex::new(0),
            editor_info: RwLock::new(EditorInfo::default()),
            subtypes: RwLock::new(Subtypes {
                list: Vec::new(),
                active: default_subtype.clone(),
            }),
            prefs: RwLock::new(Arc::new(prefs)),
            has_primary_clip: AtomicBool::new(false),
            render_info: watch::channel(initial.clone()).0,
            smartbar_render_info: watch::channel(RenderInfo::initial(KeyboardMode::SmartbarClipboardCursorRow)).0,
            last_characters_render_info: watch::channel(initial).0,
            active_subtype: watch::channel(default_subtype).0,
        });

        let weak = Arc::downgrade(&inner);
        let observer = inner.state.observe(move |_| {
            if let Some(inner) = weak.upgrade() {
                let handle = inner.runtime.clone();
                handle.spawn(async move {
                    inner.update_render_info(None).await;
                });
            }
        });

        Self { inner, observer }
    }

    pub fn state(&self) -> &StateRegister {
        &self.inner.state
    }

    pub fn layouts(&self) -> &LayoutManager {
        &self.inner.layouts
    }

    pub fn keyboard_cache(&self) -> &TextKeyboardCache {
        &self.inner.keyboards
    }

    pub fn prefs(&self) -> Arc<Prefs> {
        self.inner.prefs()
    }

    pub fn active_subtype(&self) -> Subtype {
        self.inner.subtypes().active
    }

    pub fn subtypes(&self) -> Vec<Subtype> {
        self.inner.subtypes().list
    }

    pub fn render_info(&self) -> RenderInfo {
        self.inner.render_info.borrow().clone()
    }

    pub fn subscribe_render_info(&self) -> watch::Receiver<RenderInfo> {
        self.inner.render_info.subscribe()
    }

    pub fn subscribe_smartbar_render_info(&self) -> watch::Receiver<RenderInfo> {
        self.inner.smartbar_render_info.subscribe()
    }

    pub fn subscribe_last_characters_render_info(&self) -> watch::Receiver<RenderInfo> {
        self.inner.last_characters_render_info.subscribe()
    }

    pub fn subscribe_active_subtype(&self) -> watch::Receiver<Subtype> {
        self.inner.active_subtype.subscribe()
    }

    pub fn subscribe_debug_layout_results(&self) -> watch::Receiver<DebugLayoutResults> {
        self.inner.layouts.subscribe_debug_results()
    }

    /// Recompute with no other change.
    pub async fn refresh(&self) -> RenderInfo {
        self.inner.update_render_info(None).await
    }

    /// Merged keyboard for `mode` and `subtype`, from the cache when present.
    pub async fn compute_keyboard(&self, mode: KeyboardMode, subtype: &Subtype) -> Arc<TextKeyboard> {
        let prefs = self.inner.prefs();
        self.inner.keyboard(mode, subtype, &prefs).await
    }

    /// New resource sources: every memoized layout, mapping and keyboard is
    /// dropped.
    pub async fn on_resources_changed(
        &self,
        index: Arc<dyn ResourceIndex>,
        packages: Arc<dyn PackageResolver>,
    ) -> RenderInfo {
        self.inner
            .update_render_info(Some(PendingAction::ReplaceSources { index, packages }))
            .await
    }

    pub async fn set_prefs(&self, prefs: Prefs) -> RenderInfo {
        let action = {
            let mut current = self.inner.prefs.write().unwrap_or_else(PoisonError::into_inner);
            let changed = current.characters_layout_changed(&prefs);
            *current = Arc::new(prefs);
            changed.then_some(PendingAction::ClearKeyboardMode(KeyboardMode::Characters))
        };
        self.inner.update_render_info(action).await
    }

    pub async fn set_subtypes(&self, list: Vec<Subtype>) -> RenderInfo {
        self.inner
            .subtypes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .list = list;
        self.inner.update_render_info(None).await
    }

    pub async fn set_active_subtype(&self, subtype: Subtype) -> RenderInfo {
        self.inner
            .subtypes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .active = subtype.clone();
        self.update_caps_state();
        self.inner.active_subtype.send_replace(subtype);
        self.inner.update_render_info(None).await
    }

    pub async fn on_primary_clip_changed(&self, has_clip: bool) -> RenderInfo {
        self.inner.has_primary_clip.store(has_clip, Ordering::SeqCst);
        self.inner.update_render_info(None).await
    }

    /// Adopt a newly focused editor: mode, key variation and composing flag
    /// change in one batch.
    pub async fn start_input_view(&self, editor_info: EditorInfo) -> RenderInfo {
        let (mode, variation) = editor_info.keyboard_setup();
        let composing = match editor_info.input_class {
            InputClass::Number | InputClass::Phone | InputClass::Datetime => false,
            _ if variation == KeyVariation::Password => false,
            _ => self.inner.prefs().suggestion.enabled,
        };
        *self.inner.editor_info.write().unwrap_or_else(PoisonError::into_inner) = editor_info;
        self.inner.state.batch_edit(|s| {
            s.set_keyboard_mode(mode);
            s.set_key_variation(variation);
            s.set_composing_enabled(composing);
        });
        self.inner.update_render_info(None).await
    }

    /// Shift drops back to unshifted unless caps lock is on.
    pub fn update_caps_state(&self) {
        self.inner.state.update(|s| {
            if s.input_shift_state() != InputShiftState::CapsLock {
                s.set_input_shift_state(InputShiftState::Unshifted);
            }
        });
    }

    /// Cancels outstanding loads and stops reacting to register changes.
    pub fn shutdown(&self) {
        self.inner.state.remove_observer(self.observer);
        self.inner.layouts.shutdown();
    }
}

impl Drop for KeyboardManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
