//! Top-level error types for the reconciler.

use std::sync::Arc;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error enum wrapping domain-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Config file loading and persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        path: String,
        source: Arc<std::io::Error>,
    },

    #[error("failed to write config to {path}: {source}")]
    Write {
        path: String,
        source: Arc<std::io::Error>,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Environment value parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors raised while editing the JSON document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A path segment that must be walked through holds a non-object value.
    /// The reconciler refuses to replace operator data to make room.
    #[error("cannot write {path}: {at} is not an object (found {found})")]
    NotAnObject {
        path: String,
        at: String,
        found: &'static str,
    },
}
