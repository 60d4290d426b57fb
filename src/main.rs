use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use fconf::{
    interfaces,
    lifecycle::{Engine, Medium},
    media::{AccessPoint, ArtifactLocation, ThreeG, VoiceChannel, WifiClient, Wired},
    source, HostSystem, Settings, StateStore, SystemActions,
};

#[derive(Parser)]
#[command(name = "fconf")]
#[command(about = "Network configuration manager for the gateway appliance")]
#[command(version)]
struct Cli {
    /// Interface (or IMEI/IMSI) targeted by --enable, --disable and --remove
    #[arg(long, global = true)]
    interface: Option<String>,

    /// Process to send SIGHUP to after voice channel changes
    #[arg(long, global = true)]
    pid: Option<i32>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure ethernet with systemd-networkd
    #[command(visible_alias = "e")]
    Ethernet {
        #[command(flatten)]
        artifact: ArtifactArgs,
        #[command(flatten)]
        action: ActionArgs,
    },

    /// Configure a 4G NDIS modem with systemd-networkd
    #[command(name = "4g-ndis", visible_alias = "4g")]
    FourG {
        #[command(flatten)]
        artifact: ArtifactArgs,
        #[command(flatten)]
        action: ActionArgs,
    },

    /// Configure the 3G RAS dialer
    #[command(name = "3g-ras", visible_alias = "3g")]
    ThreeG {
        #[command(flatten)]
        artifact: ArtifactArgs,
        #[command(flatten)]
        action: ActionArgs,
    },

    /// Configure a Wi-Fi client with systemd-networkd and wpa_supplicant
    #[command(visible_alias = "w")]
    WifiClient {
        #[command(flatten)]
        artifact: ArtifactArgs,
        #[command(flatten)]
        action: ActionArgs,
    },

    /// Configure an access point with create_ap
    #[command(visible_alias = "a")]
    AccessPoint {
        #[command(flatten)]
        artifact: ArtifactArgs,
        #[command(flatten)]
        action: ActionArgs,
    },

    /// Configure a voice channel of a 3G dongle
    #[command(visible_alias = "v")]
    VoiceChannel {
        #[command(flatten)]
        action: ActionArgs,
    },

    /// Print a JSON array of all network interfaces
    #[command(visible_alias = "i")]
    ListInterface,
}

#[derive(Args)]
struct ArtifactArgs {
    /// File name of the generated file, `%s` is replaced by the identifier
    #[arg(long)]
    name: Option<String>,

    /// Directory in which to write the generated file
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Args)]
struct ActionArgs {
    /// Path to the JSON configuration, or `stdin`
    #[arg(long)]
    config: Option<String>,

    /// Enable (configures first when --config is given)
    #[arg(long, conflicts_with_all = ["disable", "remove"])]
    enable: bool,

    /// Disable temporarily, keeping the configuration
    #[arg(long, conflicts_with = "remove")]
    disable: bool,

    /// Disable if needed, then delete generated files and state
    #[arg(long)]
    remove: bool,

    /// Interface (or IMEI/IMSI), when --interface is not given
    target: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::ListInterface => cmd_list_interface(),
        command => {
            let settings = Settings::load().context("Failed to load settings")?;
            cmd_medium(command, &settings, cli.interface.as_deref(), cli.pid)
        }
    }
}

fn cmd_medium(command: Commands, settings: &Settings, target: Option<&str>, pid: Option<i32>) -> Result<()> {
    let system = HostSystem;

    match command {
        Commands::Ethernet { artifact, action } => {
            let medium = Wired::ethernet(settings);
            let unit = artifact.apply(medium.unit_location());
            let medium = medium.with_unit(unit);
            cmd_lifecycle(engine(medium, settings, &system), &action, target)
        }
        Commands::FourG { artifact, action } => {
            let medium = Wired::modem(settings);
            let unit = artifact.apply(medium.unit_location());
            let medium = medium.with_unit(unit);
            cmd_lifecycle(engine(medium, settings, &system), &action, target)
        }
        Commands::ThreeG { artifact, action } => {
            let medium = ThreeG::new(settings);
            let profile = artifact.apply(medium.profile_location());
            let medium = medium.with_profile(profile);
            cmd_lifecycle(engine(medium, settings, &system), &action, target)
        }
        Commands::WifiClient { artifact, action } => {
            let medium = WifiClient::new(settings);
            let unit = artifact.apply(medium.unit_location());
            let medium = medium.with_unit(unit);
            cmd_lifecycle(engine(medium, settings, &system), &action, target)
        }
        Commands::AccessPoint { artifact, action } => {
            let medium = AccessPoint::new(settings);
            let conf = artifact.apply(medium.conf_location());
            let medium = medium.with_conf(conf);
            cmd_lifecycle(engine(medium, settings, &system), &action, target)
        }
        Commands::VoiceChannel { action } => {
            let medium = VoiceChannel::new(pid);
            cmd_lifecycle(engine(medium, settings, &system), &action, target)
        }
        Commands::ListInterface => cmd_list_interface(),
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl ArtifactArgs {
    fn apply(&self, defaults: &ArtifactLocation) -> ArtifactLocation {
        defaults
            .clone()
            .overridden(self.dir.as_deref(), self.name.as_deref())
    }
}

fn engine<'a, M: Medium>(medium: M, settings: &Settings, system: &'a dyn SystemActions) -> Engine<'a, M> {
    Engine::new(medium, StateStore::new(&settings.state_dir), system)
}

fn cmd_lifecycle<M: Medium>(engine: Engine<'_, M>, action: &ActionArgs, target: Option<&str>) -> Result<()> {
    let name = engine.medium().name();
    let target = target.or(action.target.as_deref());

    if action.enable {
        let id = match &action.config {
            Some(src) => {
                let payload = source::read_payload(src)?;
                engine.enable_inline(&payload)?
            }
            None => {
                let id = require_target(target)?;
                engine.enable(id)?;
                id.to_string()
            }
        };
        println!("successfully enabled {name} {id}");
        return Ok(());
    }

    if action.disable {
        if action.config.is_some() {
            println!("WARN: --config is ignored when --disable is used");
        }
        let id = require_target(target)?;
        engine.disable(id)?;
        println!("successfully disabled {name} {id}");
        return Ok(());
    }

    if action.remove {
        let id = require_target(target)?;
        engine.remove(id)?;
        println!("successfully removed {name} {id}");
        return Ok(());
    }

    if let Some(src) = &action.config {
        let payload = source::read_payload(src)?;
        let id = engine.configure(&payload)?;
        println!("successfully configured {name} {id}");
        return Ok(());
    }

    bail!("nothing to do: pass --config, --enable, --disable or --remove")
}

fn require_target(target: Option<&str>) -> Result<&str> {
    match target {
        Some(id) if !id.is_empty() => Ok(id),
        _ => bail!("missing interface, you must specify --interface or a positional argument"),
    }
}

fn cmd_list_interface() -> Result<()> {
    let interfaces = interfaces::list_interfaces(Path::new(interfaces::SYSFS_NET))?;
    let json = serde_json::to_string(&interfaces).context("Failed to serialize interfaces")?;
    println!("{json}");
    Ok(())
}
