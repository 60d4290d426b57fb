//! Voice channel of a 3G dongle. Nothing is generated on disk besides the
//! state record; the supervising process re-reads it after a SIGHUP.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::lifecycle::{Artifact, Medium, Step};
use crate::media::check_identifier;
use crate::system::{OsAction, SystemActions};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceChannelConfig {
    #[serde(default)]
    pub imsi: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default, rename = "rx-gain", skip_serializing_if = "Option::is_none")]
    pub rx_gain: Option<i32>,
    #[serde(default, rename = "tx-gain", skip_serializing_if = "Option::is_none")]
    pub tx_gain: Option<i32>,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "sms_out")]
    pub sms_out: String,
    #[serde(default, rename = "calls_out")]
    pub calls_out: String,
}

#[derive(Debug, Clone, Default)]
pub struct VoiceChannel {
    notify_pid: Option<i32>,
}

impl VoiceChannel {
    /// `notify_pid` is signalled after every transition, when given.
    pub fn new(notify_pid: Option<i32>) -> Self {
        VoiceChannel { notify_pid }
    }

    fn notify(&self) -> Vec<Step> {
        self.notify_pid
            .map(|pid| Step::Os(OsAction::Notify(pid)))
            .into_iter()
            .collect()
    }
}

impl Medium for VoiceChannel {
    type Config = VoiceChannelConfig;

    fn name(&self) -> &'static str {
        "voice-channel"
    }

    fn state_pattern(&self) -> &str {
        "voice-channel@%s.json"
    }

    fn prepare(&self, config: &mut VoiceChannelConfig) -> Result<()> {
        check_identifier("imsi", &config.imsi)
    }

    fn identifier<'c>(&self, config: &'c VoiceChannelConfig) -> &'c str {
        &config.imsi
    }

    fn artifact_paths(&self, _config: &VoiceChannelConfig) -> Vec<PathBuf> {
        Vec::new()
    }

    fn render(&self, _config: &VoiceChannelConfig, _system: &dyn SystemActions) -> Result<Vec<Artifact>> {
        Ok(Vec::new())
    }

    fn enable_steps(&self, _config: &VoiceChannelConfig) -> Vec<Step> {
        self.notify()
    }

    fn disable_steps(&self, _config: &VoiceChannelConfig) -> Vec<Step> {
        self.notify()
    }

    fn remove_steps(&self, _config: &VoiceChannelConfig) -> Vec<Step> {
        self.notify()
    }
}
