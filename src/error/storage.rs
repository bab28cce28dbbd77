use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Get,
    Set,
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageOperation::Get => f.write_str("get"),
            StorageOperation::Set => f.write_str("set"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Extension context invalidated.")]
    ContextInvalidated,
    #[error("Failed to access store '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Store '{path}' holds malformed JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Store '{path}' must hold a JSON object.")]
    NotAnObject { path: PathBuf },
    #[error("Store rejected key '{key}': {reason}")]
    Rejected { key: String, reason: String },
    #[error("Injected {operation} failure.")]
    Injected { operation: StorageOperation },
}
