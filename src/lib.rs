uniffi::setup_scaffolding!();

mod api;
mod trace_init;

pub use api::*;
