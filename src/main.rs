use std::path::PathBuf;

use bouquet_cleanup::reload::{ReloadConfig, WebifClient};
use bouquet_cleanup::tuners::{reachable_networks, TunerConfig};
use bouquet_cleanup::{run_cleanup, CleanupConfig, Mode};
use clap::Parser;
use config::Config;
use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Cleanup mode (overrides config)
    #[arg(long)]
    mode: Option<ModeArg>,

    /// Directory to read bouquets from (overrides config)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Directory to write cleaned bouquets to (overrides config)
    #[arg(long)]
    target: Option<PathBuf>,

    /// Do not ask the receiver to reload after writing
    #[arg(long)]
    no_reload: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Path to configuration file
    #[arg(long, default_value = "bouquet-cleanup.toml")]
    config: String,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ModeArg {
    HideUnreachable,
    ReinstateAll,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::HideUnreachable => Mode::HideUnreachable,
            ModeArg::ReinstateAll => Mode::ReinstateAll,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Settings {
    #[serde(default)]
    paths: PathsConfig,
    #[serde(default)]
    cleanup: CleanupSettings,
    #[serde(default)]
    tuners: Vec<TunerConfig>,
    #[serde(default)]
    reload: ReloadConfig,
}

#[derive(Debug, Deserialize)]
struct PathsConfig {
    #[serde(default = "default_live_dir")]
    source: PathBuf,
    #[serde(default = "default_live_dir")]
    target: PathBuf,
    /// Directory the running receiver loads its bouquets from.
    #[serde(default = "default_live_dir")]
    live: PathBuf,
}

fn default_live_dir() -> PathBuf {
    PathBuf::from("/etc/enigma2")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_live_dir(),
            target: default_live_dir(),
            live: default_live_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CleanupSettings {
    #[serde(default = "default_mode")]
    mode: ModeArg,
}

fn default_mode() -> ModeArg {
    ModeArg::HideUnreachable
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self { mode: default_mode() }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let settings = Config::builder()
        .add_source(config::File::with_name(&args.config).required(false))
        .build()?;
    let settings: Settings = settings.try_deserialize()?;

    info!("Configuration loaded from {}: {:?}", args.config, settings);

    let mode: Mode = args.mode.unwrap_or(settings.cleanup.mode).into();
    let cleanup = CleanupConfig {
        source: args.source.unwrap_or(settings.paths.source),
        target: args.target.unwrap_or(settings.paths.target),
    };

    let reachable = reachable_networks(&settings.tuners);
    if reachable.is_empty() && mode.hide_unreachable() {
        warn!("No tuner is configured, every satellite, terrestrial and cable service will be hidden");
    }

    let job_config = cleanup.clone();
    let summary =
        tokio::task::spawn_blocking(move || run_cleanup(&job_config, &reachable, mode)).await??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    info!(
        "Bouquet clean-up complete: {} bouquets, {} services hidden, {} bouquets hidden",
        summary.bouquets,
        summary.services.hidden,
        summary.written.bouquets_hidden.len()
    );

    let reload = settings.reload;
    if cleanup.target != settings.paths.live {
        info!(
            "Target {} is not the live directory {}, skipping reload",
            cleanup.target.display(),
            settings.paths.live.display()
        );
    } else if args.no_reload || !reload.enabled {
        info!("Reload disabled, restart the receiver to see the changes");
    } else {
        match WebifClient::new(&reload) {
            Ok(client) => {
                if let Err(e) = client.reload_services().await {
                    error!("Failed to reload service list: {:#}", e);
                }
            }
            Err(e) => error!("Failed to set up reload client: {:#}", e),
        }
    }

    Ok(())
}
