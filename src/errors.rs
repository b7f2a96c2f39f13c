use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading documents or the version manifest.
///
/// Analysis itself never fails: these surface only from the explicit
/// loading entry points, and the engine degrades them into diagnostics.
#[derive(Error, Debug)]
pub enum ExtlintError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The version manifest is structurally unusable.
    #[error("manifest error: {message}")]
    Manifest { message: String },

    /// Document exceeds the read size cap.
    #[error("file too large: {} ({size} bytes, limit {limit})", path.display())]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },
}

/// Convenience alias for `Result<T, ExtlintError>`.
pub type Result<T> = std::result::Result<T, ExtlintError>;
