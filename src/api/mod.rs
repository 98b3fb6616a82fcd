//! UniFFI export layer for host keyboards.
//!
//! Each public type here maps to a generated class, record, or enum on the
//! host side.

mod engine;
mod types;


pub use engine::KbdEngine;
pub use types::{
    KbdEditorInfo, KbdError, KbdImeAction, KbdInputClass, KbdKey, KbdKeyType, KbdKeyboard,
    KbdLayoutMap, KbdMode, KbdRow, KbdShiftState, KbdSubtype, KbdTextVariation,
};

use std::path::Path;

// ---------------------------------------------------------------------------
// Top-level functions
// ---------------------------------------------------------------------------

#[uniffi::export]
fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[uniffi::export]
fn prefs_default_config() -> String {
    kbd_core::prefs::default_toml().to_string()
}

#[uniffi::export]
fn prefs_validate(prefs_toml: String) -> Result<(), KbdError> {
    kbd_core::prefs::parse_prefs_toml(&prefs_toml)?;
    Ok(())
}

#[uniffi::export]
fn default_subtype() -> KbdSubtype {
    KbdSubtype::from(&kbd_core::Subtype::default_subtype())
}

#[uniffi::export]
fn trace_init(log_dir: String) {
    crate::trace_init::init_tracing(Path::new(&log_dir));
}
