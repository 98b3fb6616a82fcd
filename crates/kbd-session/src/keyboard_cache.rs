use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use kbd_core::{KeyboardMode, Subtype, TextKeyboard};

type Entry = Arc<OnceCell<Arc<TextKeyboard>>>;

/// Merged keyboards per (mode, subtype). An entry may still be computing;
/// concurrent requests for it wait on the same computation.
#[derive(Default)]
pub struct TextKeyboardCache {
    entries: Mutex<HashMap<KeyboardMode, HashMap<Subtype, Entry>>>,
}

impl TextKeyboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, mode: KeyboardMode, subtype: &Subtype) -> Entry {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let by_subtype = entries.entry(mode).or_default();
        Arc::clone(by_subtype.entry(subtype.clone()).or_default())
    }

    /// Completed keyboard, if any.
    pub fn get(&self, mode: KeyboardMode, subtype: &Subtype) -> Option<Arc<TextKeyboard>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(&mode)?.get(subtype)?.get().cloned()
    }

    pub async fn get_or_else<F, Fut>(&self, mode: KeyboardMode, subtype: &Subtype, compute: F) -> Arc<TextKeyboard>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TextKeyboard>,
    {
        let entry = self.entry(mode, subtype);
        if let Some(keyboard) = entry.get() {
            debug!(?mode, subtype = subtype.id, "keyboard cache hit");
            return Arc::clone(keyboard);
        }
        Arc::clone(
            entry
                .get_or_init(|| async move {
                    debug!(?mode, subtype = subtype.id, "computing keyboard");
                    Arc::new(compute().await)
                })
                .await,
        )
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn clear_mode(&self, mode: KeyboardMode) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&mode);
    }

    pub fn clear_subtype(&self, subtype: &Subtype) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for by_subtype in entries.values_mut() {
            by_subtype.remove(subtype);
        }
    }

    pub fn clear_mode_subtype(&self, mode: KeyboardMode, subtype: &Subtype) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(by_subtype) = entries.get_mut(&mode) {
            by_subtype.remove(subtype);
        }
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
