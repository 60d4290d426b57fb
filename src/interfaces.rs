//! Host interface listing for `fconf list-interface`.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{FconfError, Result};

pub const SYSFS_NET: &str = "/sys/class/net";

/// IFF_* bits from `<linux/if.h>` worth reporting.
const FLAGS: [(u32, &str); 6] = [
    (0x1, "up"),
    (0x2, "broadcast"),
    (0x8, "loopback"),
    (0x10, "pointtopoint"),
    (0x1000, "multicast"),
    (0x10000, "running"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostInterface {
    pub name: String,
    pub mtu: u32,
    pub hardware_addr: String,
    pub flags: Vec<&'static str>,
}

/// Interfaces under `root` (normally [`SYSFS_NET`]), sorted by name.
pub fn list_interfaces(root: &Path) -> Result<Vec<HostInterface>> {
    let entries = fs::read_dir(root).map_err(|e| FconfError::io(root, e))?;

    let mut interfaces = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FconfError::io(root, e))?;
        let dir = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let mtu = read_attr(&dir, "mtu").parse().unwrap_or(0);
        let hardware_addr = read_attr(&dir, "address");
        let raw_flags = u32::from_str_radix(read_attr(&dir, "flags").trim_start_matches("0x"), 16)
            .unwrap_or(0);

        interfaces.push(HostInterface {
            name,
            mtu,
            hardware_addr,
            flags: decode_flags(raw_flags),
        });
    }

    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(interfaces)
}

fn read_attr(dir: &Path, attr: &str) -> String {
    fs::read_to_string(dir.join(attr))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn decode_flags(raw: u32) -> Vec<&'static str> {
    FLAGS
        .iter()
        .filter(|(bit, _)| raw & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sysfs_layout() {
        let root = tempfile::tempdir().unwrap();
        for (name, mtu, addr, flags) in [
            ("lo", "65536", "00:00:00:00:00:00", "0x9"),
            ("eth0", "1500", "b8:27:eb:12:34:56", "0x1003"),
        ] {
            let dir = root.path().join(name);
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("mtu"), format!("{mtu}\n")).unwrap();
            fs::write(dir.join("address"), format!("{addr}\n")).unwrap();
            fs::write(dir.join("flags"), format!("{flags}\n")).unwrap();
        }

        let interfaces = list_interfaces(root.path()).unwrap();
        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces[0].name, "eth0");
        assert_eq!(interfaces[0].mtu, 1500);
        assert_eq!(interfaces[0].flags, vec!["up", "broadcast", "multicast"]);
        assert_eq!(interfaces[1].flags, vec!["up", "loopback"]);
    }
}
