//! Wi-Fi client: a networkd unit plus a wpa_supplicant profile driven by
//! the `wpa_supplicant@<iface>` template unit.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::{FconfError, Result};
use crate::lifecycle::{Artifact, Medium, Step};
use crate::media::{check_identifier, ArtifactLocation};
use crate::network::Network;
use crate::system::{OsAction, SystemActions};
use crate::unit;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WifiConfig {
    #[serde(flatten)]
    pub network: Network,
    #[serde(default)]
    pub ssid: String,
    #[serde(default)]
    pub passphrase: String,
}

#[derive(Debug, Clone)]
pub struct WifiClient {
    unit: ArtifactLocation,
    supplicant: ArtifactLocation,
    ctrl_interface: String,
    manager: String,
}

impl WifiClient {
    pub fn new(settings: &Settings) -> Self {
        WifiClient {
            unit: ArtifactLocation::new(&settings.network_dir, "fconf-wireless-%s.network"),
            supplicant: ArtifactLocation::new(&settings.wpa_dir, "wpa_supplicant-%s.conf"),
            ctrl_interface: settings.wpa_ctrl_interface.clone(),
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

    fn service(interface: &str) -> String {
        format!("wpa_supplicant@{interface}")
    }
}

impl Medium for WifiClient {
    type Config = WifiConfig;

    fn name(&self) -> &'static str {
        "wifi-client"
    }

    fn state_pattern(&self) -> &str {
        "wifi-client@%s.json"
    }

    fn prepare(&self, config: &mut WifiConfig) -> Result<()> {
        config.network.resolve_interface("wlan0");
        check_identifier("interface", &config.network.interface)?;
        if config.ssid.is_empty() {
            return Err(FconfError::validation("ssid must not be empty"));
        }
        // wpa_passphrase refuses anything outside 8..=63
        let len = config.passphrase.chars().count();
        if !(8..=63).contains(&len) {
            return Err(FconfError::validation(
                "passphrase must be between 8 and 63 characters",
            ));
        }
        config.network.validate()
    }

    fn identifier<'c>(&self, config: &'c WifiConfig) -> &'c str {
        &config.network.interface
    }

    fn artifact_paths(&self, config: &WifiConfig) -> Vec<PathBuf> {
        let iface = &config.network.interface;
        vec![self.unit.path(iface), self.supplicant.path(iface)]
    }

    fn render(&self, config: &WifiConfig, system: &dyn SystemActions) -> Result<Vec<Artifact>> {
        let iface = &config.network.interface;
        let unit_file = unit::unit_file(&config.network)?;

        let block = system.wpa_passphrase(&config.ssid, &config.passphrase)?;
        let mut profile = format!("ctrl_interface={}\n\n{}", self.ctrl_interface, block);
        if !profile.ends_with('\n') {
            profile.push('\n');
        }

        Ok(vec![
            Artifact {
                path: self.unit.path(iface),
                contents: unit_file,
            },
            Artifact {
                path: self.supplicant.path(iface),
                contents: profile,
            },
        ])
    }

    fn enable_steps(&self, config: &WifiConfig) -> Vec<Step> {
        let iface = &config.network.interface;
        vec![
            OsAction::LinkUp(iface.clone()).into(),
            OsAction::Start(Self::service(iface)).into(),
            OsAction::Restart(self.manager.clone()).into(),
            OsAction::Enable(Self::service(iface)).into(),
        ]
    }

    fn disable_steps(&self, config: &WifiConfig) -> Vec<Step> {
        let iface = &config.network.interface;
        vec![
            OsAction::Flush(iface.clone()).into(),
            OsAction::Stop(Self::service(iface)).into(),
            OsAction::Disable(Self::service(iface)).into(),
            OsAction::Restart(self.manager.clone()).into(),
        ]
    }

    fn remove_steps(&self, config: &WifiConfig) -> Vec<Step> {
        vec![
            OsAction::Flush(config.network.interface.clone()).into(),
            OsAction::Restart(self.manager.clone()).into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WifiConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn flattened_network_fields_parse() {
        let config = parse(
            r#"{"interface":"wlan1","dhcp":true,"dns-servers":["1.1.1.1"],
                "ssid":"fessbox","passphrase":"correct horse"}"#,
        );
        assert_eq!(config.network.interface, "wlan1");
        assert!(config.network.dhcp);
        assert_eq!(config.ssid, "fessbox");
    }

    #[test]
    fn empty_ssid_is_rejected_after_defaulting() {
        let medium = WifiClient::new(&Settings::default());
        let mut config = parse(r#"{"dhcp":true,"ssid":"","passphrase":"12345678"}"#);

        let err = medium.prepare(&mut config).unwrap_err();
        assert!(matches!(err, FconfError::Validation(msg) if msg.contains("ssid")));
        assert_eq!(config.network.interface, "wlan0");
    }

    #[test]
    fn short_passphrase_is_rejected() {
        let medium = WifiClient::new(&Settings::default());
        let mut config = parse(r#"{"dhcp":true,"ssid":"x","passphrase":"short"}"#);
        assert!(medium.prepare(&mut config).is_err());
    }

    #[test]
    fn supplicant_service_is_started_before_manager_restart() {
        let medium = WifiClient::new(&Settings::default());
        let mut config = parse(r#"{"dhcp":true,"ssid":"x","passphrase":"12345678"}"#);
        medium.prepare(&mut config).unwrap();

        let steps = medium.enable_steps(&config);
        assert_eq!(steps[1], Step::Os(OsAction::Start("wpa_supplicant@wlan0".into())));
        assert_eq!(steps[3], Step::Os(OsAction::Enable("wpa_supplicant@wlan0".into())));
    }
}
