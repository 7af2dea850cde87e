use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pulso_service::Config;

mod commands;

use commands::{HistoryAction, SettingsAction, WebhookAction};

#[derive(Parser)]
#[command(name = "pulso")]
#[command(author, version, about = "Bluetooth heart-rate monitor with sessions and webhooks", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for nearby heart-rate sensors
    Scan {
        /// Scan timeout in seconds
        #[arg(short, long, default_value = "5")]
        timeout: u64,

        /// Include devices that don't advertise the Heart Rate service
        #[arg(long)]
        all: bool,
    },

    /// Connect to a sensor and stream live readings
    Monitor {
        /// Device name, address, or peripheral ID
        #[arg(short, long)]
        device: Option<String>,

        /// Use a simulated heart-rate source instead of real hardware
        #[arg(long)]
        simulate: bool,

        /// Record this run as a session (overrides the stored setting)
        #[arg(long)]
        record: bool,

        /// Do not record this run
        #[arg(long, conflicts_with = "record")]
        no_record: bool,
    },

    /// Manage recorded sessions
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Manage webhooks
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },

    /// Read or write persisted monitor settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    config.validate()?;
    tracing::debug!("Using database at {}", config.db_path().display());

    match cli.command {
        Commands::Scan { timeout, all } => commands::cmd_scan(timeout, all).await,
        Commands::Monitor {
            device,
            simulate,
            record,
            no_record,
        } => {
            let record_override = match (record, no_record) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::cmd_monitor(&config, device, simulate, record_override).await
        }
        Commands::History { action } => commands::cmd_history(&config, action),
        Commands::Webhook { action } => commands::cmd_webhook(&config, action).await,
        Commands::Settings { action } => commands::cmd_settings(&config, action),
    }
}
