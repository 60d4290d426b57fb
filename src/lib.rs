//! Network configuration manager for a systemd-based gateway appliance.
//!
//! This library turns declarative JSON descriptions of network endpoints
//! (wired, Wi-Fi client, 4G/3G modem, access point, voice channel) into the
//! files the OS consumes, and drives each endpoint through a
//! configure → enable → disable → remove lifecycle while keeping a state
//! record per endpoint so repeated invocations are idempotent.
//!
//! # Modules
//!
//! - [`config`] - Directories, unit names and the state root
//! - [`error`] - Error kinds surfaced by every operation
//! - [`interfaces`] - Host interface listing
//! - [`lifecycle`] - The generic lifecycle engine and the [`Medium`] trait
//! - [`media`] - Per-medium adapters
//! - [`network`] - Addressing model shared by networkd-managed media
//! - [`source`] - Reading configuration payloads
//! - [`state`] - Persisted state records
//! - [`system`] - OS actions (services, links, addresses)
//! - [`unit`] - systemd-networkd unit rendering
//!
//! # Example Usage
//!
//! ```no_run
//! use fconf::{Engine, HostSystem, Settings, StateStore, Wired};
//!
//! let settings = Settings::load().expect("settings");
//! let system = HostSystem;
//! let engine = Engine::new(
//!     Wired::ethernet(&settings),
//!     StateStore::new(&settings.state_dir),
//!     &system,
//! );
//!
//! let id = engine
//!     .configure(br#"{"interface":"","dhcp":true}"#)
//!     .expect("configure failed");
//! engine.enable(&id).expect("enable failed");
//! ```

/// Runtime settings: state root (`FCONF_CONFIGDIR`), artifact directories and
/// the optional `fconf.toml` overrides file.
pub mod config;

/// Error kinds, built with `thiserror`.
pub mod error;

/// Host interface listing read from sysfs.
pub mod interfaces;

/// Lifecycle engine shared by every medium.
pub mod lifecycle;

/// Medium adapters: ethernet, 4G NDIS, Wi-Fi client, access point, 3G dialer
/// and voice channel.
pub mod media;

/// Endpoint model for networkd-managed media and its validation.
pub mod network;

/// Configuration payload sources: a file path or standard input.
pub mod source;

/// JSON state records, one per (medium, identifier).
pub mod state;

/// OS action collaborator and its host implementation.
pub mod system;

/// systemd-networkd unit rendering.
pub mod unit;

pub use config::Settings;
pub use error::{FconfError, Result};
pub use lifecycle::{Artifact, Engine, Medium, Step};
pub use media::{AccessPoint, ThreeG, VoiceChannel, WifiClient, Wired};
pub use network::{Addressing, Network, Static};
pub use state::{Lookup, StateRecord, StateStore};
pub use system::{HostSystem, OsAction, SystemActions};
