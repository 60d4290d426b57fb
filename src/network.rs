//! Addressing model shared by every medium that ends up as a
//! systemd-networkd `.network` file (wired, 4G NDIS and Wi-Fi client).

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::error::{FconfError, Result};

/// Static IPv4/IPv6 assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Static {
    /// Address with prefix length, `xxx.xxx.xxx.xxx/xx`.
    pub ip: String,
    #[serde(default)]
    pub gateway: String,
}

/// Desired network configuration of one interface, as supplied in JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub interface: String,
    #[serde(default, rename = "static", skip_serializing_if = "Option::is_none")]
    pub static_addr: Option<Static>,
    #[serde(default)]
    pub dhcp: bool,
    #[serde(default, rename = "dns-servers", alias = "dns")]
    pub dns: Vec<String>,
}

/// The addressing method selected by a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing<'a> {
    Static { ip: &'a str, gateway: &'a str },
    /// Static address plus DHCP for the rest of the lease (routes, gateway).
    StaticWithDhcp { ip: &'a str },
    Dhcp,
}

impl Network {
    pub fn addressing(&self) -> Result<Addressing<'_>> {
        match (&self.static_addr, self.dhcp) {
            (Some(s), false) => Ok(Addressing::Static {
                ip: &s.ip,
                gateway: &s.gateway,
            }),
            (Some(s), true) => Ok(Addressing::StaticWithDhcp { ip: &s.ip }),
            (None, true) => Ok(Addressing::Dhcp),
            (None, false) => Err(FconfError::validation("no addressing method specified")),
        }
    }

    /// Fill in `default_interface` when the interface is blank.
    pub fn resolve_interface(&mut self, default_interface: &str) {
        if self.interface.trim().is_empty() {
            self.interface = default_interface.to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interface.is_empty() {
            return Err(FconfError::validation("interface must not be empty"));
        }
        match self.addressing()? {
            Addressing::Static { ip, gateway } => {
                check_cidr(ip)?;
                check_ip("gateway", gateway)?;
            }
            Addressing::StaticWithDhcp { ip } => check_cidr(ip)?,
            Addressing::Dhcp => {}
        }
        for server in &self.dns {
            check_ip("dns server", server)?;
        }
        Ok(())
    }
}

fn check_ip(what: &str, value: &str) -> Result<()> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| FconfError::validation(format!("{what} '{value}' is not an IP address")))
}

fn check_cidr(value: &str) -> Result<()> {
    let invalid = || FconfError::validation(format!("static ip '{value}' is not in CIDR form"));

    let (addr, prefix) = value.split_once('/').ok_or_else(invalid)?;
    let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Network {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_wire_field_names() {
        let n = parse(
            r#"{"interface":"eth0","static":{"ip":"10.0.0.2/24","gateway":"10.0.0.1"},
                "dns-servers":["1.1.1.1"]}"#,
        );
        assert_eq!(n.dns, vec!["1.1.1.1"]);
        assert_eq!(
            n.addressing().unwrap(),
            Addressing::Static {
                ip: "10.0.0.2/24",
                gateway: "10.0.0.1"
            }
        );
    }

    #[test]
    fn accepts_short_dns_alias() {
        let n = parse(r#"{"dhcp":true,"dns":["8.8.8.8","8.8.4.4"]}"#);
        assert_eq!(n.dns.len(), 2);
        assert_eq!(n.addressing().unwrap(), Addressing::Dhcp);
    }

    #[test]
    fn missing_addressing_is_a_validation_error() {
        let mut n = parse(r#"{"interface":"","dns":["8.8.8.8"]}"#);
        n.resolve_interface("eth0");
        assert!(matches!(n.validate(), Err(FconfError::Validation(_))));
    }

    #[test]
    fn blank_interface_takes_default_once() {
        let mut n = parse(r#"{"interface":"  ","dhcp":true}"#);
        n.resolve_interface("wlan0");
        assert_eq!(n.interface, "wlan0");
        n.resolve_interface("eth0");
        assert_eq!(n.interface, "wlan0");
    }

    #[test]
    fn rejects_malformed_addresses() {
        let mut n = parse(r#"{"interface":"eth0","static":{"ip":"192.168.1.8","gateway":"x"}}"#);
        assert!(n.validate().is_err());
        n.static_addr = Some(Static {
            ip: "192.168.1.8/33".into(),
            gateway: String::new(),
        });
        assert!(n.validate().is_err());
        n.static_addr = Some(Static {
            ip: "192.168.1.8/24".into(),
            gateway: "192.168.1.1".into(),
        });
        assert!(n.validate().is_ok());
        n.dns = vec!["dns.example".into()];
        assert!(n.validate().is_err());
    }
}
