//! Persisted per-interface state.
//!
//! One JSON file per (medium, identifier) pair holds
//! `{"enabled": bool, "config": {...}}`. The lifecycle engine is the only
//! writer; everything else should treat these files as read-only.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::expand;
use crate::error::{FconfError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord<C> {
    pub enabled: bool,
    pub config: C,
}

/// On-disk shape, where a missing body is representable.
#[derive(Deserialize)]
struct StoredRecord<C> {
    #[serde(default)]
    enabled: bool,
    config: Option<C>,
}

/// Outcome of [`StateStore::load`].
#[derive(Debug)]
pub enum Lookup<C> {
    Found(StateRecord<C>),
    Missing,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StateStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, pattern: &str, id: &str) -> PathBuf {
        self.root.join(expand(pattern, id))
    }

    /// Read the record for `id`.
    ///
    /// A file that decodes but carries no `config` is [`FconfError::CorruptState`];
    /// an absent file is [`Lookup::Missing`].
    pub fn load<C: DeserializeOwned>(&self, pattern: &str, id: &str) -> Result<Lookup<C>> {
        let path = self.path(pattern, id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state record");
                return Ok(Lookup::Missing);
            }
            Err(e) => return Err(FconfError::io(&path, e)),
        };

        let stored: StoredRecord<C> =
            serde_json::from_slice(&bytes).map_err(|source| FconfError::Decode {
                path: path.clone(),
                source,
            })?;

        match stored.config {
            Some(config) => Ok(Lookup::Found(StateRecord {
                enabled: stored.enabled,
                config,
            })),
            None => Err(FconfError::CorruptState { path }),
        }
    }

    /// Write the record so a concurrent reader sees either the old or the new
    /// file, never a partial one.
    pub fn save<C: Serialize>(&self, pattern: &str, id: &str, record: &StateRecord<C>) -> Result<PathBuf> {
        ensure_dir(&self.root)?;
        let path = self.path(pattern, id);
        let data = serde_json::to_vec(record).map_err(|source| FconfError::Decode {
            path: path.clone(),
            source,
        })?;
        atomic_write(&path, &data)?;
        debug!(path = %path.display(), enabled = record.enabled, "saved state record");
        Ok(path)
    }

    pub fn delete(&self, pattern: &str, id: &str) -> Result<()> {
        remove_file(&self.path(pattern, id))
    }
}

/// Create `dir` and its parents if absent.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| FconfError::io(dir, e))
}

/// Write `data` to a sibling temporary file, then rename it over `path`.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let written = write_synced(&tmp, data)
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| FconfError::io(path, e)));

    if written.is_err() {
        if let Err(e) = fs::remove_file(&tmp) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %e, "could not clean up temporary file");
            }
        }
    }
    written
}

fn write_synced(tmp: &Path, data: &[u8]) -> Result<()> {
    let mut f = fs::File::create(tmp).map_err(|e| FconfError::io(tmp, e))?;
    f.write_all(data).map_err(|e| FconfError::io(tmp, e))?;
    f.sync_all().map_err(|e| FconfError::io(tmp, e))
}

/// Remove a file, treating "already absent" as success.
pub fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            println!("removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "already absent");
            Ok(())
        }
        Err(e) => Err(FconfError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    const PATTERN: &str = "ethernet@%s.json";

    fn network() -> Network {
        Network {
            interface: "eth0".into(),
            dhcp: true,
            ..Network::default()
        }
    }

    #[test]
    fn save_then_load_preserves_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested/state"));
        let record = StateRecord {
            enabled: true,
            config: network(),
        };

        let path = store.save(PATTERN, "eth0", &record).unwrap();
        assert!(path.ends_with("ethernet@eth0.json"));

        match store.load::<Network>(PATTERN, "eth0").unwrap() {
            Lookup::Found(loaded) => assert_eq!(loaded, record),
            Lookup::Missing => panic!("record should exist"),
        }
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn absent_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        assert!(matches!(
            store.load::<Network>(PATTERN, "eth9").unwrap(),
            Lookup::Missing
        ));
    }

    #[test]
    fn record_without_config_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        fs::write(store.path(PATTERN, "eth0"), r#"{"enabled": true}"#).unwrap();

        let err = store.load::<Network>(PATTERN, "eth0").unwrap_err();
        assert!(matches!(err, FconfError::CorruptState { .. }));

        fs::write(store.path(PATTERN, "eth0"), r#"{"enabled": false, "config": null}"#).unwrap();
        let err = store.load::<Network>(PATTERN, "eth0").unwrap_err();
        assert!(matches!(err, FconfError::CorruptState { .. }));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        fs::write(store.path(PATTERN, "eth0"), "{not json").unwrap();

        let err = store.load::<Network>(PATTERN, "eth0").unwrap_err();
        assert!(matches!(err, FconfError::Decode { .. }));
    }

    #[test]
    fn delete_tolerates_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        store
            .save(PATTERN, "eth0", &StateRecord { enabled: false, config: network() })
            .unwrap();

        store.delete(PATTERN, "eth0").unwrap();
        assert!(!store.path(PATTERN, "eth0").exists());
        store.delete(PATTERN, "eth0").unwrap();
    }

    #[test]
    fn failed_write_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory where the file should go makes the rename fail
        let target = dir.path().join("fconf-wired-eth0.network");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let err = atomic_write(&target, b"[Match]\n").unwrap_err();
        assert!(matches!(err, FconfError::Io { .. }));
        assert!(!target.with_extension("tmp").exists());
        assert!(target.join("keep").exists());
    }
}
