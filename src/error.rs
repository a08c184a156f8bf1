use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the JSON document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid recipe '{name}': {reason}")]
    InvalidRecipe { name: String, reason: String },

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }
}
