//! Persistence error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Snapshot persistence error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded.
    #[error("Failed to serialize navigation snapshot")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Bytes are not a navigation snapshot.
    #[error("Failed to deserialize navigation snapshot")]
    Deserialization {
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// `map_err` adapter for an I/O failure of `operation` on `path`.
    pub(crate) fn io(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io {
            operation,
            path,
            source,
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.")
                } else {
                    Some("Check that you have permission to write to this location.")
                }
            }
            Self::Serialization { .. } => None,
            Self::Deserialization { .. } => {
                Some("Discard the saved state; navigation will start from its initial backstack.")
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.")
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
