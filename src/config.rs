//! Runtime settings.
//!
//! The state root comes from `FCONF_CONFIGDIR` (default `/etc/fconf`). An
//! optional `fconf.toml` inside it overrides artifact directories and unit
//! names; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{FconfError, Result};

/// Environment variable overriding the state root directory.
pub const STATE_DIR_ENV: &str = "FCONF_CONFIGDIR";

pub const DEFAULT_STATE_DIR: &str = "/etc/fconf";

/// Optional overrides file, looked up inside the state root.
pub const SETTINGS_FILE: &str = "fconf.toml";

/// Directories and unit names the tool writes to and drives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where state records live. Never read from the overrides file.
    #[serde(skip)]
    pub state_dir: PathBuf,
    pub network_dir: PathBuf,
    pub wpa_dir: PathBuf,
    pub ap_dir: PathBuf,
    pub dialer_dir: PathBuf,
    /// Unit restarted so that regenerated `.network` files take effect.
    pub network_manager: String,
    pub wpa_ctrl_interface: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            network_dir: PathBuf::from("/etc/systemd/network"),
            wpa_dir: PathBuf::from("/etc/wpa_supplicant"),
            ap_dir: PathBuf::from("/etc"),
            dialer_dir: PathBuf::from("/etc"),
            network_manager: "systemd-networkd".to_string(),
            wpa_ctrl_interface: "/run/wpa_supplicant_fconf".to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from `FCONF_CONFIGDIR` and the optional overrides file.
    pub fn load() -> Result<Self> {
        Self::load_from(state_dir_from_env())
    }

    pub fn load_from(state_dir: impl Into<PathBuf>) -> Result<Self> {
        let state_dir = state_dir.into();
        let path = state_dir.join(SETTINGS_FILE);

        let mut settings = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<Settings>(&content)
                .map_err(|source| FconfError::Settings {
                    path: path.clone(),
                    source,
                })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Settings::default(),
            Err(e) => return Err(FconfError::io(&path, e)),
        };
        debug!(state_dir = %state_dir.display(), "resolved settings");
        settings.state_dir = state_dir;
        Ok(settings)
    }

    /// Every directory placed under `root`, for sandboxed runs and tests.
    pub fn rooted(root: &Path) -> Self {
        Settings {
            state_dir: root.join("fconf"),
            network_dir: root.join("network"),
            wpa_dir: root.join("wpa_supplicant"),
            ap_dir: root.join("ap"),
            dialer_dir: root.join("dialer"),
            ..Settings::default()
        }
    }
}

pub fn state_dir_from_env() -> PathBuf {
    match env::var(STATE_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_STATE_DIR),
    }
}

/// Substitute the first `%s` in a file-name pattern with `id`.
pub fn expand(pattern: &str, id: &str) -> String {
    if pattern.contains("%s") {
        pattern.replacen("%s", id, 1)
    } else {
        pattern.to_string()
    }
}
