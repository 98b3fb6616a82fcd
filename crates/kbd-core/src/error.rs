use std::io;
use std::sync::Arc;

/// Malformed key JSON.
#[derive(Debug, thiserror::Error)]
pub enum KeyDataError {
    #[error("unknown key discriminator: {0}")]
    UnknownDiscriminator(String),
    #[error("key must be a JSON object, got {0}")]
    NotAnObject(String),
}

/// Package and asset access.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid asset path: {0}")]
    InvalidPath(String),
    #[error("invalid component name: {0}")]
    InvalidComponentName(String),
}

/// Why a layout or popup mapping could not be produced. Cloneable so one
/// cached failure can be handed to every waiter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("no indexed entry found for {0}")]
    NoIndexEntry(String),
    #[error("extension {0} not found")]
    ExtensionNotFound(String),
    #[error("failed to read {path}: {source}")]
    Resource {
        path: String,
        #[source]
        source: Arc<ResourceError>,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: Arc<serde_json::Error>,
    },
    #[error("load cancelled")]
    Cancelled,
}
