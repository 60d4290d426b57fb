//! Wired media managed purely by systemd-networkd: plain ethernet and the
//! 4G NDIS modem, which shows up as an ethernet-like interface.

use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;
use crate::lifecycle::{Artifact, Medium, Step};
use crate::media::{check_identifier, ArtifactLocation};
use crate::network::Network;
use crate::system::{OsAction, SystemActions};
use crate::unit;

#[derive(Debug, Clone)]
pub struct Wired {
    name: &'static str,
    default_interface: &'static str,
    state_pattern: &'static str,
    unit: ArtifactLocation,
    manager: String,
}

impl Wired {
    pub fn ethernet(settings: &Settings) -> Self {
        Wired {
            name: "ethernet",
            default_interface: "eth0",
            state_pattern: "ethernet@%s.json",
            unit: ArtifactLocation::new(&settings.network_dir, "fconf-wired-%s.network"),
            manager: settings.network_manager.clone(),
        }
    }

    pub fn modem(settings: &Settings) -> Self {
        Wired {
            name: "4g-ndis",
            default_interface: "eth1",
            state_pattern: "4g-ndis@%s.json",
            unit: ArtifactLocation::new(&settings.network_dir, "fconf-4g-%s.network"),
            manager: settings.network_manager.clone(),
        }
    }

    pub fn with_unit(mut self, unit: ArtifactLocation) -> Self {
        self.unit = unit;
        self
    }

    pub fn unit_location(&self) -> &ArtifactLocation {
        &self.unit
    }
}

impl Medium for Wired {
    type Config = Network;

    fn name(&self) -> &'static str {
        self.name
    }

    fn state_pattern(&self) -> &str {
        self.state_pattern
    }

    fn prepare(&self, config: &mut Network) -> Result<()> {
        config.resolve_interface(self.default_interface);
        check_identifier("interface", &config.interface)?;
        config.validate()
    }

    fn identifier<'c>(&self, config: &'c Network) -> &'c str {
        &config.interface
    }

    fn artifact_paths(&self, config: &Network) -> Vec<PathBuf> {
        vec![self.unit.path(&config.interface)]
    }

    fn render(&self, config: &Network, _system: &dyn SystemActions) -> Result<Vec<Artifact>> {
        Ok(vec![Artifact {
            path: self.unit.path(&config.interface),
            contents: unit::unit_file(config)?,
        }])
    }

    fn enable_steps(&self, config: &Network) -> Vec<Step> {
        vec![
            OsAction::LinkUp(config.interface.clone()).into(),
            OsAction::Restart(self.manager.clone()).into(),
            OsAction::Enable(self.manager.clone()).into(),
        ]
    }

    fn disable_steps(&self, config: &Network) -> Vec<Step> {
        vec![
            OsAction::Flush(config.interface.clone()).into(),
            OsAction::LinkDown(config.interface.clone()).into(),
            Step::Retract,
            OsAction::Restart(self.manager.clone()).into(),
        ]
    }

    fn remove_steps(&self, config: &Network) -> Vec<Step> {
        vec![
            OsAction::Flush(config.interface.clone()).into(),
            OsAction::Restart(self.manager.clone()).into(),
        ]
    }
}
