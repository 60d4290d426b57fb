//! systemd-networkd unit rendering.
//!
//! [`render`] turns a [`Network`] into an ordered list of directives and
//! [`serialize`] writes them out. Both are pure, so identical input always
//! produces byte-identical files and an unchanged configuration never makes
//! networkd see a modified unit.

use std::fmt;

use crate::error::Result;
use crate::network::{Addressing, Network};

/// One `Name=Value` directive inside a `[Section]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOption {
    pub section: &'static str,
    pub name: &'static str,
    pub value: String,
}

impl UnitOption {
    fn new(section: &'static str, name: &'static str, value: impl Into<String>) -> Self {
        UnitOption {
            section,
            name,
            value: value.into(),
        }
    }
}

impl fmt::Display for UnitOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

pub fn render(network: &Network) -> Result<Vec<UnitOption>> {
    let addressing = network.addressing()?;

    let mut options = vec![UnitOption::new("Match", "Name", network.interface.as_str())];

    match addressing {
        Addressing::Static { ip, gateway } => {
            options.push(UnitOption::new("Network", "Address", ip));
            options.push(UnitOption::new("Network", "Gateway", gateway));
        }
        Addressing::StaticWithDhcp { ip } => {
            options.push(UnitOption::new("Network", "Address", ip));
            options.push(UnitOption::new("Network", "DHCP", "ipv4"));
        }
        Addressing::Dhcp => {
            options.push(UnitOption::new("Network", "DHCP", "ipv4"));
        }
    }

    // Duplicates are kept; networkd tolerates them and callers may rely on order.
    options.extend(
        network
            .dns
            .iter()
            .map(|server| UnitOption::new("Network", "DNS", server.as_str())),
    );

    Ok(options)
}

/// Write directives as unit-file text, opening a new `[Section]` header
/// whenever the section changes.
pub fn serialize(options: &[UnitOption]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for option in options {
        if current != Some(option.section) {
            out.push('[');
            out.push_str(option.section);
            out.push_str("]\n");
            current = Some(option.section);
        }
        out.push_str(&option.to_string());
        out.push('\n');
    }

    out
}

/// Render and serialize in one step.
pub fn unit_file(network: &Network) -> Result<String> {
    render(network).map(|options| serialize(&options))
}
