//! OS actions the lifecycle engine depends on.
//!
//! The engine only talks to [`SystemActions`]; [`HostSystem`] is the real
//! implementation: it shells out to `systemctl`, `ip` and `wpa_passphrase`,
//! and signals supervising processes directly. Tests substitute a recording fake.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fmt;
use std::process::Command;
use tracing::debug;

use crate::error::{FconfError, Result};

pub trait SystemActions {
    fn service_start(&self, name: &str) -> Result<()>;
    fn service_stop(&self, name: &str) -> Result<()>;
    fn service_enable(&self, name: &str) -> Result<()>;
    fn service_disable(&self, name: &str) -> Result<()>;
    fn service_restart(&self, name: &str) -> Result<()>;
    fn link_set(&self, interface: &str, up: bool) -> Result<()>;
    fn address_flush(&self, interface: &str) -> Result<()>;

    /// Generate a wpa_supplicant `network={...}` block for the credentials.
    fn wpa_passphrase(&self, ssid: &str, passphrase: &str) -> Result<String>;

    /// Ask a supervising process to reload its configuration (SIGHUP).
    fn signal_reload(&self, pid: i32) -> Result<()>;
}

/// A single step of an enable, disable or remove transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsAction {
    Start(String),
    Stop(String),
    Enable(String),
    Disable(String),
    Restart(String),
    LinkUp(String),
    LinkDown(String),
    Flush(String),
    Notify(i32),
}

impl OsAction {
    pub fn apply(&self, system: &dyn SystemActions) -> Result<()> {
        match self {
            OsAction::Start(unit) => system.service_start(unit),
            OsAction::Stop(unit) => system.service_stop(unit),
            OsAction::Enable(unit) => system.service_enable(unit),
            OsAction::Disable(unit) => system.service_disable(unit),
            OsAction::Restart(unit) => system.service_restart(unit),
            OsAction::LinkUp(iface) => system.link_set(iface, true),
            OsAction::LinkDown(iface) => system.link_set(iface, false),
            OsAction::Flush(iface) => system.address_flush(iface),
            OsAction::Notify(pid) => system.signal_reload(*pid),
        }
    }
}

impl fmt::Display for OsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsAction::Start(unit) => write!(f, "start {unit}"),
            OsAction::Stop(unit) => write!(f, "stop {unit}"),
            OsAction::Enable(unit) => write!(f, "enable {unit}"),
            OsAction::Disable(unit) => write!(f, "disable {unit}"),
            OsAction::Restart(unit) => write!(f, "restart {unit}"),
            OsAction::LinkUp(iface) => write!(f, "link up {iface}"),
            OsAction::LinkDown(iface) => write!(f, "link down {iface}"),
            OsAction::Flush(iface) => write!(f, "flush addresses on {iface}"),
            OsAction::Notify(pid) => write!(f, "send SIGHUP to {pid}"),
        }
    }
}

/// Drives the running host through its command-line tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSystem;

impl HostSystem {
    fn systemctl(&self, verb: &str, unit: &str) -> Result<()> {
        run("systemctl", &[verb, unit]).map(|_| ())
    }
}

impl SystemActions for HostSystem {
    fn service_start(&self, name: &str) -> Result<()> {
        self.systemctl("start", name)
    }

    fn service_stop(&self, name: &str) -> Result<()> {
        self.systemctl("stop", name)
    }

    fn service_enable(&self, name: &str) -> Result<()> {
        self.systemctl("enable", name)
    }

    fn service_disable(&self, name: &str) -> Result<()> {
        self.systemctl("disable", name)
    }

    fn service_restart(&self, name: &str) -> Result<()> {
        self.systemctl("restart", name)
    }

    fn link_set(&self, interface: &str, up: bool) -> Result<()> {
        let state = if up { "up" } else { "down" };
        run("ip", &["link", "set", state, interface]).map(|_| ())
    }

    fn address_flush(&self, interface: &str) -> Result<()> {
        run("ip", &["addr", "flush", "dev", interface]).map(|_| ())
    }

    fn wpa_passphrase(&self, ssid: &str, passphrase: &str) -> Result<String> {
        run("wpa_passphrase", &[ssid, passphrase])
    }

    fn signal_reload(&self, pid: i32) -> Result<()> {
        debug!(pid, "sending SIGHUP");
        kill(Pid::from_raw(pid), Signal::SIGHUP).map_err(|errno| FconfError::OsAction {
            action: format!("kill -HUP {pid}"),
            reason: errno.desc().to_string(),
        })
    }
}

/// Run a command to completion and return its stdout.
fn run(program: &str, args: &[&str]) -> Result<String> {
    let action = format!("{} {}", program, args.join(" "));
    debug!(command = %action, "running");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| FconfError::OsAction {
            action: action.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        // Prefer stderr, some tools only report on stdout
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let reason = if stderr.trim().is_empty() {
            format!("{} {}", output.status, stdout.trim())
        } else {
            stderr.trim().to_string()
        };
        return Err(FconfError::OsAction { action, reason });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_describe_themselves() {
        assert_eq!(
            OsAction::Restart("systemd-networkd".into()).to_string(),
            "restart systemd-networkd"
        );
        assert_eq!(OsAction::LinkUp("eth0".into()).to_string(), "link up eth0");
        assert_eq!(OsAction::Notify(42).to_string(), "send SIGHUP to 42");
    }

    #[test]
    fn missing_program_is_an_os_action_error() {
        let err = run("fconf-definitely-not-installed", &["x"]).unwrap_err();
        assert!(matches!(err, FconfError::OsAction { .. }));
    }

    #[test]
    fn signalling_a_dead_pid_fails() {
        // pid 0 would target our own process group, i32::MAX is never allocated
        let err = HostSystem.signal_reload(i32::MAX).unwrap_err();
        match err {
            FconfError::OsAction { action, reason } => {
                assert_eq!(action, format!("kill -HUP {}", i32::MAX));
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
