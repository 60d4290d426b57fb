//! The configure → enable → disable → remove state machine.
//!
//! Every medium runs through the same [`Engine`]; a [`Medium`] only supplies
//! its defaults, the artifacts it generates and the OS actions each transition
//! performs. Per (medium, identifier) the states are
//!
//! ```text
//! Unconfigured --configure--> Configured(disabled) <--enable/disable--> Configured(enabled)
//!       ^                                |                                     |
//!       +------------remove--------------+------------remove (disable first)---+
//! ```
//!
//! The persisted `enabled` flag only changes after every OS action of a
//! transition has succeeded, so a failed step leaves the previous record intact.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{FconfError, Result};
use crate::state::{self, Lookup, StateRecord, StateStore};
use crate::system::{OsAction, SystemActions};

/// A generated configuration file, fully rendered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// One step of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Os(OsAction),
    /// Delete the medium's generated artifacts, tolerating absent files.
    Retract,
}

impl From<OsAction> for Step {
    fn from(action: OsAction) -> Self {
        Step::Os(action)
    }
}

pub trait Medium {
    type Config: Serialize + DeserializeOwned + Clone + fmt::Debug;

    /// Human name used in messages, e.g. `ethernet`.
    fn name(&self) -> &'static str;

    /// State file-name pattern, `%s` is replaced by the identifier.
    fn state_pattern(&self) -> &str;

    /// Apply defaults (blank interface, empty credentials) and validate.
    /// Runs once per configure; the result is what gets persisted.
    fn prepare(&self, config: &mut Self::Config) -> Result<()>;

    /// Interface name, IMEI or IMSI the record is keyed by.
    fn identifier<'c>(&self, config: &'c Self::Config) -> &'c str;

    fn artifact_paths(&self, config: &Self::Config) -> Vec<PathBuf>;

    fn render(&self, config: &Self::Config, system: &dyn SystemActions) -> Result<Vec<Artifact>>;

    /// Link up / start service, restart the manager, enable for boot. Artifacts
    /// are materialised by the engine beforehand.
    fn enable_steps(&self, config: &Self::Config) -> Vec<Step>;

    fn disable_steps(&self, config: &Self::Config) -> Vec<Step>;

    /// Runs after artifacts and the state record have been deleted.
    fn remove_steps(&self, config: &Self::Config) -> Vec<Step>;
}

pub struct Engine<'a, M: Medium> {
    medium: M,
    store: StateStore,
    system: &'a dyn SystemActions,
}

impl<'a, M: Medium> Engine<'a, M> {
    pub fn new(medium: M, store: StateStore, system: &'a dyn SystemActions) -> Self {
        Engine {
            medium,
            store,
            system,
        }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Parse a JSON payload and configure from it. Returns the resolved identifier.
    pub fn configure(&self, raw: &[u8]) -> Result<String> {
        let config: M::Config = serde_json::from_slice(raw).map_err(|e| {
            FconfError::validation(format!("malformed {} configuration: {e}", self.medium.name()))
        })?;
        self.configure_model(config)
    }

    pub fn configure_model(&self, mut config: M::Config) -> Result<String> {
        self.medium.prepare(&mut config)?;
        let id = self.medium.identifier(&config).to_string();

        let artifacts = self.medium.render(&config, self.system)?;
        let enabled = self.previously_enabled(&id)?;

        for artifact in &artifacts {
            write_artifact(artifact)?;
        }

        let path = self.store.save(
            self.medium.state_pattern(),
            &id,
            &StateRecord { enabled, config },
        )?;
        debug!(path = %path.display(), "state record written");
        info!(medium = self.medium.name(), %id, enabled, "configured");
        Ok(id)
    }

    /// Enable a configured endpoint.
    pub fn enable(&self, id: &str) -> Result<()> {
        let mut record = self.load(id)?;

        self.materialize(&record.config)?;
        self.run(self.medium.enable_steps(&record.config), &record.config)?;

        record.enabled = true;
        self.store.save(self.medium.state_pattern(), id, &record)?;
        info!(medium = self.medium.name(), %id, "enabled");
        Ok(())
    }

    /// Configure from `raw`, then enable the identifier it resolved to.
    pub fn enable_inline(&self, raw: &[u8]) -> Result<String> {
        let id = self.configure(raw)?;
        self.enable(&id)?;
        Ok(id)
    }

    /// Safe to repeat: on an already disabled endpoint it re-asserts the down state.
    pub fn disable(&self, id: &str) -> Result<()> {
        let mut record = self.load(id)?;

        self.run(self.medium.disable_steps(&record.config), &record.config)?;

        record.enabled = false;
        self.store.save(self.medium.state_pattern(), id, &record)?;
        info!(medium = self.medium.name(), %id, "disabled");
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let record = self.load(id)?;

        if record.enabled {
            self.disable(id)?;
        }

        self.retract(&record.config)?;
        self.store.delete(self.medium.state_pattern(), id)?;
        self.run(self.medium.remove_steps(&record.config), &record.config)?;

        info!(medium = self.medium.name(), %id, "removed");
        Ok(())
    }

    /// Load the record for `id`, failing with `NotConfigured` when absent.
    pub fn load(&self, id: &str) -> Result<StateRecord<M::Config>> {
        match self.store.load(self.medium.state_pattern(), id)? {
            Lookup::Found(record) => Ok(record),
            Lookup::Missing => Err(FconfError::NotConfigured {
                medium: self.medium.name(),
                id: id.to_string(),
            }),
        }
    }

    fn previously_enabled(&self, id: &str) -> Result<bool> {
        match self.store.load::<M::Config>(self.medium.state_pattern(), id) {
            Ok(Lookup::Found(previous)) => Ok(previous.enabled),
            Ok(Lookup::Missing) => Ok(false),
            Err(e @ (FconfError::CorruptState { .. } | FconfError::Decode { .. })) => {
                warn!(error = %e, "replacing unreadable state record");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Bring every artifact in line with `config`: files that went missing
    /// or were overwritten (e.g. a profile shared between identifiers) are
    /// rewritten, identical ones are left alone.
    fn materialize(&self, config: &M::Config) -> Result<()> {
        for artifact in self.medium.render(config, self.system)? {
            match fs::read_to_string(&artifact.path) {
                Ok(current) if current == artifact.contents => continue,
                Ok(_) => debug!(path = %artifact.path.display(), "artifact out of date"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %artifact.path.display(), "artifact missing")
                }
                Err(e) => return Err(FconfError::io(&artifact.path, e)),
            }
            write_artifact(&artifact)?;
        }
        Ok(())
    }

    fn retract(&self, config: &M::Config) -> Result<()> {
        for path in self.medium.artifact_paths(config) {
            state::remove_file(&path)?;
        }
        Ok(())
    }

    fn run(&self, steps: Vec<Step>, config: &M::Config) -> Result<()> {
        for step in steps {
            match step {
                Step::Os(action) => self.perform(&action)?,
                Step::Retract => self.retract(config)?,
            }
        }
        Ok(())
    }

    fn perform(&self, action: &OsAction) -> Result<()> {
        print!("{action} ...");
        match action.apply(self.system) {
            Ok(()) => {
                println!(" done");
                Ok(())
            }
            Err(e) => {
                println!(" failed");
                Err(e)
            }
        }
    }
}

fn write_artifact(artifact: &Artifact) -> Result<()> {
    if let Some(parent) = artifact.path.parent() {
        state::ensure_dir(parent)?;
    }
    state::atomic_write(&artifact.path, artifact.contents.as_bytes())?;
    println!("wrote {}", artifact.path.display());
    Ok(())
}
