pub mod compute_ops;
pub mod index_ops;
pub mod prefs_ops;

use std::path::Path;

use kbd_core::resources::{ExtensionStore, MANIFEST_FILE};
use kbd_core::ResourceError;

/// Opens a single extension (directory with a manifest, or archive) or every
/// extension inside a plain directory.
pub fn open_store(path: &Path) -> Result<ExtensionStore, ResourceError> {
    if path.is_dir() && !path.join(MANIFEST_FILE).is_file() {
        return ExtensionStore::open_dir(path);
    }
    let mut store = ExtensionStore::new();
    store.open_path(path)?;
    Ok(store)
}
