//! 3G RAS dialer. Instead of a networkd unit this medium writes a wvdial
//! profile, keyed by the modem IMEI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tera::{Context, Tera};

use crate::config::Settings;
use crate::error::{FconfError, Result};
use crate::lifecycle::{Artifact, Medium, Step};
use crate::media::{check_identifier, ArtifactLocation};
use crate::system::{OsAction, SystemActions};

const DIALER_TEMPLATE: &str = r#"[Dialer Defaults]
Init1 = ATZ
Init2 = ATQ0 V1 E1 S0=0 &C1 &D2
; set APN
Init3 = AT+CGDCONT=1,"IP","{{ apn }}"
Modem Type = USB Modem
; modem command port (by IMSI)
Modem = /dev/{{ imsi }}.imsi
Baud = 115200
ISDN = 0
Phone = {{ dial }}
; 0 if not specified
Username = {{ username }}
Password = {{ password }}
Stupid Mode = 1
"#;

/// Stand-in credential for carriers that do not check them.
const ANONYMOUS: &str = "0";

const DIALER_SERVICE: &str = "fconf-wvdial";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreeGConfig {
    #[serde(default)]
    pub imei: String,
    #[serde(default)]
    pub imsi: String,
    #[serde(default)]
    pub apn: String,
    #[serde(default)]
    pub dial: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "defaultGateway")]
    pub default_gateway: bool,
}

impl ThreeGConfig {
    pub fn to_profile(&self) -> Result<String> {
        let context = Context::from_serialize(self)?;
        Ok(Tera::one_off(DIALER_TEMPLATE, &context, false)?)
    }
}

#[derive(Debug, Clone)]
pub struct ThreeG {
    profile: ArtifactLocation,
}

impl ThreeG {
    pub fn new(settings: &Settings) -> Self {
        ThreeG {
            profile: ArtifactLocation::new(&settings.dialer_dir, "fconf-wvdial.conf"),
        }
    }

    pub fn with_profile(mut self, profile: ArtifactLocation) -> Self {
        self.profile = profile;
        self
    }

    pub fn profile_location(&self) -> &ArtifactLocation {
        &self.profile
    }
}

impl Medium for ThreeG {
    type Config = ThreeGConfig;

    fn name(&self) -> &'static str {
        "3g-ras"
    }

    fn state_pattern(&self) -> &str {
        "3g-ras@%s.json"
    }

    fn prepare(&self, config: &mut ThreeGConfig) -> Result<()> {
        if config.username.is_empty() {
            config.username = ANONYMOUS.to_string();
        }
        if config.password.is_empty() {
            config.password = ANONYMOUS.to_string();
        }
        check_identifier("imei", &config.imei)?;
        check_identifier("imsi", &config.imsi)?;
        if config.dial.is_empty() {
            return Err(FconfError::validation("dial must not be empty"));
        }
        Ok(())
    }

    fn identifier<'c>(&self, config: &'c ThreeGConfig) -> &'c str {
        &config.imei
    }

    fn artifact_paths(&self, config: &ThreeGConfig) -> Vec<PathBuf> {
        vec![self.profile.path(&config.imei)]
    }

    fn render(&self, config: &ThreeGConfig, _system: &dyn SystemActions) -> Result<Vec<Artifact>> {
        Ok(vec![Artifact {
            path: self.profile.path(&config.imei),
            contents: config.to_profile()?,
        }])
    }

    fn enable_steps(&self, _config: &ThreeGConfig) -> Vec<Step> {
        vec![
            OsAction::Start(DIALER_SERVICE.to_string()).into(),
            OsAction::Enable(DIALER_SERVICE.to_string()).into(),
        ]
    }

    fn disable_steps(&self, _config: &ThreeGConfig) -> Vec<Step> {
        vec![
            OsAction::Stop(DIALER_SERVICE.to_string()).into(),
            OsAction::Disable(DIALER_SERVICE.to_string()).into(),
        ]
    }

    fn remove_steps(&self, _config: &ThreeGConfig) -> Vec<Step> {
        Vec::new()
    }
}
