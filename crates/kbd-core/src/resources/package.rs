use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::ResourceError;

use super::{KeyboardExtension, KeyboardResources, Package, PackageResolver};

/// Manifest file at the root of every extension package.
pub const MANIFEST_FILE: &str = "extension.json";

/// Rejects absolute paths and parent-directory segments.
fn checked_relative(path: &str) -> Result<PathBuf, ResourceError> {
    let p = Path::new(path);
    if path.is_empty()
        || !p
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(ResourceError::InvalidPath(path.to_string()));
    }
    Ok(p.to_path_buf())
}

/// Extension unpacked into a directory.
#[derive(Debug, Clone)]
pub struct DirPackage {
    root: PathBuf,
}

impl DirPackage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Package for DirPackage {
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let rel = checked_relative(path)?;
        match fs::read(self.root.join(rel)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ResourceError::NotFound(path.to_string()))
            }
            Err(e) => Err(ResourceError::Io(e)),
        }
    }
}

/// Extension archive (`.zip` / `.flex`).
#[derive(Debug)]
pub struct ZipPackage {
    archive: Mutex<zip::ZipArchive<BufReader<File>>>,
}

impl ZipPackage {
    pub fn open(path: &Path) -> Result<Self, ResourceError> {
        let file = File::open(path)?;
        let archive = zip::ZipArchive::new(BufReader::new(file))?;
        Ok(Self {
            archive: Mutex::new(archive),
        })
    }
}

impl Package for ZipPackage {
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        checked_relative(path)?;
        let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = match archive.by_name(path) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ResourceError::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// Assets held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl Package for MemoryPackage {
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }
}

/// Installed extensions and the packages backing them.
#[derive(Default, Clone)]
pub struct ExtensionStore {
    packages: HashMap<String, Arc<dyn Package>>,
    extensions: Vec<KeyboardExtension>,
}

impl std::fmt::Debug for ExtensionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionStore")
            .field("extensions", &self.extension_ids())
            .finish()
    }
}

impl ExtensionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the package manifest and registers the package under its id,
    /// replacing any earlier package with the same id.
    pub fn insert(&mut self, package: Arc<dyn Package>) -> Result<&KeyboardExtension, ResourceError> {
        let manifest = KeyboardExtension::from_json(&package.read(MANIFEST_FILE)?)?;
        let id = manifest.meta.id.clone();
        self.extensions.retain(|e| e.meta.id != id);
        self.packages.insert(id, package);
        self.extensions.push(manifest);
        let last = self.extensions.len() - 1;
        Ok(&self.extensions[last])
    }

    /// Opens a single extension directory or archive.
    pub fn open_path(&mut self, path: &Path) -> Result<&KeyboardExtension, ResourceError> {
        let package: Arc<dyn Package> = if path.is_dir() {
            Arc::new(DirPackage::new(path))
        } else {
            Arc::new(ZipPackage::open(path)?)
        };
        self.insert(package)
    }

    /// Loads every extension found directly under `dir`: subdirectories with
    /// a manifest, and `.zip` / `.flex` archives. Unreadable entries are
    /// skipped.
    pub fn open_dir(dir: &Path) -> Result<Self, ResourceError> {
        let mut store = Self::new();
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        entries.sort();
        for path in entries {
            let is_archive = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("zip") || e.eq_ignore_ascii_case("flex"));
            let is_ext_dir = path.is_dir() && path.join(MANIFEST_FILE).is_file();
            if !is_archive && !is_ext_dir {
                continue;
            }
            match store.open_path(&path) {
                Ok(ext) => debug!(path = %path.display(), extension = %ext.meta.id, "loaded extension"),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping extension"),
            }
        }
        Ok(store)
    }

    pub fn extensions(&self) -> &[KeyboardExtension] {
        &self.extensions
    }

    pub fn extension_ids(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.meta.id.as_str()).collect()
    }

    pub fn resources(&self) -> KeyboardResources {
        KeyboardResources::from_extensions(&self.extensions)
    }
}

impl PackageResolver for ExtensionStore {
    fn package(&self, extension_id: &str) -> Option<Arc<dyn Package>> {
        self.packages.get(extension_id).cloned()
    }
}
