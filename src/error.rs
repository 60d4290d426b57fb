//! Error kinds returned by every library operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, FconfError>;

#[derive(Error, Debug)]
pub enum FconfError {
    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("{medium} '{id}' is not configured, run with --config first")]
    NotConfigured { medium: &'static str, id: String },

    #[error("state file {} has no config body", path.display())]
    CorruptState { path: PathBuf },

    #[error("{action} failed: {reason}")]
    OsAction { action: String, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render dialer profile: {0}")]
    Template(#[from] tera::Error),
}

impl FconfError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FconfError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        FconfError::Validation(msg.into())
    }
}
