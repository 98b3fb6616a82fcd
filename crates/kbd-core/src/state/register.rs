use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{trace, warn};

use super::{ImeUiMode, InputShiftState, KeyVariation, KeyboardMode, KeyboardState};

type Observer = Arc<dyn Fn(KeyboardState) + Send + Sync>;

/// Handle returned by [`StateRegister::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

/// Live keyboard state with change notification and batch edits.
///
/// A write that changes the packed value notifies all observers with a
/// snapshot, unless a batch edit is open; closing the outermost batch
/// notifies once. The raw value can only be replaced through [`reset`].
///
/// [`reset`]: StateRegister::reset
pub struct StateRegister {
    raw: AtomicU64,
    batch_edit_count: AtomicU32,
    next_observer: AtomicU64,
    observers: Mutex<Vec<(ObserverId, Observer)>>,
}

macro_rules! register_accessors {
    ($($get:ident, $set:ident : $ty:ty;)*) => {
        $(
            pub fn $get(&self) -> $ty {
                self.snapshot().$get()
            }

            pub fn $set(&self, v: $ty) {
                self.update(|s| s.$set(v));
            }
        )*
    };
}

impl StateRegister {
    pub fn new(initial: KeyboardState) -> Self {
        Self {
            raw: AtomicU64::new(initial.raw()),
            batch_edit_count: AtomicU32::new(0),
            next_observer: AtomicU64::new(0),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Frozen copy of the current bits.
    pub fn snapshot(&self) -> KeyboardState {
        KeyboardState::new(self.raw.load(Ordering::SeqCst))
    }

    pub fn raw(&self) -> u64 {
        self.raw.load(Ordering::SeqCst)
    }

    pub fn observe<F>(&self, f: F) -> ObserverId
    where
        F: Fn(KeyboardState) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().push((id, Arc::new(f)));
        id
    }

    pub fn remove_observer(&self, id: ObserverId) {
        self.lock_observers().retain(|(oid, _)| *oid != id);
    }

    /// Apply `f` to a working copy and store it; dispatches only on change.
    pub fn update(&self, f: impl FnOnce(&mut KeyboardState)) {
        let old = self.raw.load(Ordering::SeqCst);
        let mut state = KeyboardState::new(old);
        f(&mut state);
        if state.raw() != old {
            self.raw.store(state.raw(), Ordering::SeqCst);
            self.dispatch();
        }
    }

    pub fn reset(&self, value: KeyboardState) {
        self.update(|s| *s = value);
    }

    pub fn reset_to(&self, other: &StateRegister) {
        self.reset(other.snapshot());
    }

    pub fn begin_batch_edit(&self) {
        self.batch_edit_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn end_batch_edit(&self) {
        let prev = self
            .batch_edit_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| Some(c.saturating_sub(1)))
            .unwrap_or(0);
        if prev == 0 {
            warn!("end_batch_edit without matching begin_batch_edit");
        }
        self.dispatch();
    }

    /// Run `f` inside a batch edit. The batch is closed even if `f` panics.
    pub fn batch_edit<R>(&self, f: impl FnOnce(&StateRegister) -> R) -> R {
        struct BatchGuard<'a>(&'a StateRegister);

        impl Drop for BatchGuard<'_> {
            fn drop(&mut self) {
                self.0.end_batch_edit();
            }
        }

        self.begin_batch_edit();
        let _guard = BatchGuard(self);
        f(self)
    }

    pub fn is_batch_editing(&self) -> bool {
        self.batch_edit_count.load(Ordering::SeqCst) > 0
    }

    pub fn is_uppercase(&self) -> bool {
        self.snapshot().is_uppercase()
    }

    pub fn flag(&self, flag: u64) -> bool {
        self.snapshot().get_flag(flag)
    }

    pub fn set_flag(&self, flag: u64, v: bool) {
        self.update(|s| s.set_flag(flag, v));
    }

    register_accessors! {
        keyboard_mode, set_keyboard_mode: KeyboardMode;
        key_variation, set_key_variation: KeyVariation;
        input_shift_state, set_input_shift_state: InputShiftState;
        ime_ui_mode, set_ime_ui_mode: ImeUiMode;
        is_selection_mode, set_selection_mode: bool;
        is_manual_selection_mode, set_manual_selection_mode: bool;
        is_manual_selection_mode_start, set_manual_selection_mode_start: bool;
        is_manual_selection_mode_end, set_manual_selection_mode_end: bool;
        is_private_mode, set_private_mode: bool;
        is_quick_actions_visible, set_quick_actions_visible: bool;
        is_showing_inline_suggestions, set_showing_inline_suggestions: bool;
        is_composing_enabled, set_composing_enabled: bool;
        is_char_half_width, set_char_half_width: bool;
        is_kana_kata, set_kana_kata: bool;
        is_kana_small, set_kana_small: bool;
        is_rtl_layout_direction, set_rtl_layout_direction: bool;
    }

    fn dispatch(&self) {
        if self.batch_edit_count.load(Ordering::SeqCst) != 0 {
            return;
        }
        let state = self.snapshot();
        // Observers may touch the register again, so call them unlocked.
        let observers: Vec<Observer> = self
            .lock_observers()
            .iter()
            .map(|(_, f)| Arc::clone(f))
            .collect();
        trace!(?state, observers = observers.len(), "dispatch state");
        for observer in observers {
            observer(state);
        }
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Vec<(ObserverId, Observer)>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for StateRegister {
    fn default() -> Self {
        Self::new(KeyboardState::default())
    }
}
