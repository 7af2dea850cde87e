//! Monitor command implementation.

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;

use pulso_core::MockSource;
use pulso_service::{Config, Monitor, MonitorOptions, MonitorUpdate};

use crate::commands::open_store;

pub async fn cmd_monitor(
    config: &Config,
    device: Option<String>,
    simulate: bool,
    record_override: Option<bool>,
) -> Result<()> {
    let store = open_store(config)?;
    let mut monitor = Monitor::new(store)?;

    let options = MonitorOptions {
        record_override,
        ..Default::default()
    };

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    if simulate || config.monitor.simulate {
        let source = MockSource::new("Virtual HRM");
        println!("Monitoring simulated source (Ctrl-C to disconnect)");
        monitor
            .run_simulated(&source, options, cancel, print_update)
            .await?;
        return Ok(());
    }

    let identifier = match device.or_else(|| config.monitor.device.clone()) {
        Some(identifier) => identifier,
        None => bail!(
            "No device given. Pass --device, set monitor.device in the config, \
             or run `pulso scan` to find one."
        ),
    };

    println!("Connecting to {} (Ctrl-C to disconnect)", identifier);
    monitor
        .run_device(&identifier, options, cancel, print_update)
        .await?;

    Ok(())
}

fn print_update(update: MonitorUpdate) {
    match update {
        MonitorUpdate::Connected { device } => {
            println!("Connected: {}", device.display_name());
        }
        MonitorUpdate::Reading { bpm } => {
            println!("  ♥ {} bpm", bpm);
        }
        MonitorUpdate::Disconnected { device, last_bpm } => {
            println!(
                "Disconnected from {} (last reading {} bpm)",
                device.display_name(),
                last_bpm
            );
        }
        MonitorUpdate::WebhookError { webhook, message } => {
            eprintln!("Webhook '{}' failed: {}", webhook, message);
        }
        MonitorUpdate::SessionSaved { id, samples } => {
            println!("Session #{} saved ({} readings)", id, samples);
        }
        MonitorUpdate::Reconnecting { attempt, delay } => {
            println!("Reconnecting (attempt {}) in {:?}...", attempt, delay);
        }
    }
}
