//! Medium adapters plugged into the lifecycle engine.

use std::path::{Path, PathBuf};

use crate::config::expand;
use crate::error::{FconfError, Result};

pub mod access_point;
pub mod ethernet;
pub mod threeg;
pub mod voice;
pub mod wifi;

pub use access_point::{AccessPoint, AccessPointConfig};
pub use ethernet::Wired;
pub use threeg::{ThreeG, ThreeGConfig};
pub use voice::{VoiceChannel, VoiceChannelConfig};
pub use wifi::{WifiClient, WifiConfig};

/// Where a medium writes its generated file: a directory plus a file-name
/// pattern that may embed the identifier through `%s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub dir: PathBuf,
    pub pattern: String,
}

impl ArtifactLocation {
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        ArtifactLocation {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn path(&self, id: &str) -> PathBuf {
        self.dir.join(expand(&self.pattern, id))
    }

    /// Replace the directory and/or pattern with caller-supplied values.
    pub fn overridden(mut self, dir: Option<&Path>, pattern: Option<&str>) -> Self {
        if let Some(dir) = dir {
            self.dir = dir.to_path_buf();
        }
        if let Some(pattern) = pattern {
            self.pattern = pattern.to_string();
        }
        self
    }
}

/// Identifiers end up in file names, so they must be a single path component.
pub(crate) fn check_identifier(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(FconfError::validation(format!("{what} must not be empty")));
    }
    if id.contains('/') || id == "." || id == ".." {
        return Err(FconfError::validation(format!("{what} '{id}' is not a valid name")));
    }
    Ok(())
}
