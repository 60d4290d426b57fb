//! Access point backed by `create_ap`. The JSON payload overlays the stock
//! create_ap defaults and is written out as its `KEY=VALUE` config file.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::{FconfError, Result};
use crate::lifecycle::{Artifact, Medium, Step};
use crate::media::{check_identifier, ArtifactLocation};
use crate::system::{OsAction, SystemActions};

const DEFAULT_WIFI_IFACE: &str = "wlan0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AccessPointConfig {
    pub channel: String,
    pub gateway: String,
    pub wpa_version: u8,
    pub etc_hosts: bool,
    pub dhcp_dns: String,
    pub hidden: bool,
    pub mac_filter: bool,
    pub mac_filter_accept: String,
    pub isolate_clients: bool,
    pub share_method: String,
    pub ieee80211n: bool,
    pub ieee80211ac: bool,
    pub ht_capab: String,
    pub vht_capab: String,
    pub driver: String,
    pub no_virt: bool,
    pub country: String,
    pub freq_band: f64,
    pub new_macaddr: String,
    pub daemonize: bool,
    pub no_haveged: bool,
    pub wifi_iface: String,
    pub internet_iface: String,
    pub ssid: String,
    pub passphrase: String,
    pub use_psk: bool,
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        AccessPointConfig {
            channel: "default".to_string(),
            gateway: "192.168.12.1".to_string(),
            wpa_version: 2,
            etc_hosts: false,
            dhcp_dns: "gateway".to_string(),
            hidden: false,
            mac_filter: false,
            mac_filter_accept: "/etc/hostapd/hostapd.accept".to_string(),
            isolate_clients: false,
            share_method: "nat".to_string(),
            ieee80211n: false,
            ieee80211ac: false,
            ht_capab: "[HT40+]".to_string(),
            vht_capab: String::new(),
            driver: "nl80211".to_string(),
            no_virt: false,
            country: String::new(),
            freq_band: 2.4,
            new_macaddr: String::new(),
            daemonize: false,
            no_haveged: false,
            wifi_iface: DEFAULT_WIFI_IFACE.to_string(),
            internet_iface: "eth0".to_string(),
            ssid: "MyAccessPoint".to_string(),
            passphrase: "12345678".to_string(),
            use_psk: false,
        }
    }
}

impl AccessPointConfig {
    /// The create_ap configuration file, one `KEY=VALUE` per line in a fixed order.
    pub fn to_conf(&self) -> String {
        let flag = |b: bool| if b { "1" } else { "0" };
        let entries: [(&str, String); 26] = [
            ("CHANNEL", self.channel.clone()),
            ("GATEWAY", self.gateway.clone()),
            ("WPA_VERSION", self.wpa_version.to_string()),
            ("ETC_HOSTS", flag(self.etc_hosts).into()),
            ("DHCP_DNS", self.dhcp_dns.clone()),
            ("HIDDEN", flag(self.hidden).into()),
            ("MAC_FILTER", flag(self.mac_filter).into()),
            ("MAC_FILTER_ACCEPT", self.mac_filter_accept.clone()),
            ("ISOLATE_CLIENTS", flag(self.isolate_clients).into()),
            ("SHARE_METHOD", self.share_method.clone()),
            ("IEEE80211N", flag(self.ieee80211n).into()),
            ("IEEE80211AC", flag(self.ieee80211ac).into()),
            ("HT_CAPAB", self.ht_capab.clone()),
            ("VHT_CAPAB", self.vht_capab.clone()),
            ("DRIVER", self.driver.clone()),
            ("NO_VIRT", flag(self.no_virt).into()),
            ("COUNTRY", self.country.clone()),
            ("FREQ_BAND", self.freq_band.to_string()),
            ("NEW_MACADDR", self.new_macaddr.clone()),
            ("DAEMONIZE", flag(self.daemonize).into()),
            ("NO_HAVEGED", flag(self.no_haveged).into()),
            ("WIFI_IFACE", self.wifi_iface.clone()),
            ("INTERNET_IFACE", self.internet_iface.clone()),
            ("SSID", self.ssid.clone()),
            ("PASSPHRASE", self.passphrase.clone()),
            ("USE_PSK", flag(self.use_psk).into()),
        ];

        let mut out = String::new();
        for (key, value) in entries {
            let _ = writeln!(out, "{key}={value}");
        }
        out
    }

    fn validate(&self) -> Result<()> {
        check_identifier("wifi-iface", &self.wifi_iface)?;
        if self.ssid.is_empty() {
            return Err(FconfError::validation("ssid must not be empty"));
        }
        let len = self.passphrase.chars().count();
        if len != 0 && !(8..=63).contains(&len) {
            return Err(FconfError::validation(
                "passphrase must be empty or between 8 and 63 characters",
            ));
        }
        if !matches!(self.wpa_version, 1 | 2) {
            return Err(FconfError::validation("wpa-version must be 1 or 2"));
        }
        if self.freq_band != 2.4 && self.freq_band != 5.0 {
            return Err(FconfError::validation("freq-band must be 2.4 or 5"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AccessPoint {
    conf: ArtifactLocation,
}

impl AccessPoint {
    pub fn new(settings: &Settings) -> Self {
        AccessPoint {
            conf: ArtifactLocation::new(&settings.ap_dir, "create_ap-%s.conf"),
        }
    }

    pub fn with_conf(mut self, conf: ArtifactLocation) -> Self {
        self.conf = conf;
        self
    }

    pub fn conf_location(&self) -> &ArtifactLocation {
        &self.conf
    }

    fn service(interface: &str) -> String {
        format!("create_ap@{interface}")
    }
}

impl Medium for AccessPoint {
    type Config = AccessPointConfig;

    fn name(&self) -> &'static str {
        "access-point"
    }

    fn state_pattern(&self) -> &str {
        "access-point@%s.json"
    }

    fn prepare(&self, config: &mut AccessPointConfig) -> Result<()> {
        if config.wifi_iface.trim().is_empty() {
            config.wifi_iface = DEFAULT_WIFI_IFACE.to_string();
        }
        config.validate()
    }

    fn identifier<'c>(&self, config: &'c AccessPointConfig) -> &'c str {
        &config.wifi_iface
    }

    fn artifact_paths(&self, config: &AccessPointConfig) -> Vec<PathBuf> {
        vec![self.conf.path(&config.wifi_iface)]
    }

    fn render(&self, config: &AccessPointConfig, _system: &dyn SystemActions) -> Result<Vec<Artifact>> {
        Ok(vec![Artifact {
            path: self.conf.path(&config.wifi_iface),
            contents: config.to_conf(),
        }])
    }

    fn enable_steps(&self, config: &AccessPointConfig) -> Vec<Step> {
        let service = Self::service(&config.wifi_iface);
        vec![OsAction::Start(service.clone()).into(), OsAction::Enable(service).into()]
    }

    fn disable_steps(&self, config: &AccessPointConfig) -> Vec<Step> {
        let service = Self::service(&config.wifi_iface);
        vec![OsAction::Stop(service.clone()).into(), OsAction::Disable(service).into()]
    }

    fn remove_steps(&self, _config: &AccessPointConfig) -> Vec<Step> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_payload_overlays_defaults() {
        let config: AccessPointConfig =
            serde_json::from_str(r#"{"ssid":"fessbox","passphrase":"supersecret","hidden":true}"#)
                .unwrap();
        assert_eq!(config.ssid, "fessbox");
        assert!(config.hidden);
        assert_eq!(config.wifi_iface, "wlan0");
        assert_eq!(config.share_method, "nat");
    }

    #[test]
    fn conf_lines_follow_fixed_order() {
        let conf = AccessPointConfig::default().to_conf();
        let keys: Vec<&str> = conf
            .lines()
            .map(|l| l.split_once('=').map(|(k, _)| k).unwrap_or(l))
            .collect();
        assert_eq!(keys.first(), Some(&"CHANNEL"));
        assert_eq!(keys.last(), Some(&"USE_PSK"));
        assert_eq!(keys.len(), 26);
        assert!(conf.contains("FREQ_BAND=2.4\n"));
        assert!(conf.contains("HT_CAPAB=[HT40+]\n"));
        assert!(conf.contains("HIDDEN=0\n"));
    }

    #[test]
    fn blank_iface_defaults_and_empty_ssid_fails() {
        let medium = AccessPoint::new(&Settings::default());

        let mut config = AccessPointConfig {
            wifi_iface: String::new(),
            ..AccessPointConfig::default()
        };
        medium.prepare(&mut config).unwrap();
        assert_eq!(config.wifi_iface, "wlan0");

        config.ssid.clear();
        assert!(matches!(medium.prepare(&mut config), Err(FconfError::Validation(_))));
    }

    #[test]
    fn open_network_is_allowed() {
        let mut config = AccessPointConfig {
            passphrase: String::new(),
            ..AccessPointConfig::default()
        };
        assert!(AccessPoint::new(&Settings::default()).prepare(&mut config).is_ok());
    }
}
