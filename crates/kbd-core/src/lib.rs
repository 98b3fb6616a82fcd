//! Keyboard layout model: key data and selectors, the state register,
//! layout merging with hint overlays, popup resolution and the resource
//! index the layouts are read from.

pub mod computed;
pub mod display;
pub mod editor;
pub mod error;
pub mod evaluator;
pub mod key;
pub mod layout;
pub mod popup;
pub mod prefs;
pub mod resources;
pub mod state;
pub mod subtype;

pub use computed::{ComputedKey, ComputedKeyboard};
pub use error::{KeyDataError, LoadError, ResourceError};
pub use evaluator::{ComputingEvaluator, DefaultComputingEvaluator};
pub use key::{AbstractKeyData, KeyData, KeyType};
pub use layout::{CachedLayout, LayoutArrangement, LayoutType, Ltn, TextKey, TextKeyboard};
pub use prefs::Prefs;
pub use state::{KeyboardMode, KeyboardState, StateRegister};
pub use subtype::{ComponentName, Subtype};
