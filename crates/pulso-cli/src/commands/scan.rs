//! Scan command implementation.

use anyhow::{Context, Result};

use pulso_core::{ScanOptions, scan};

pub async fn cmd_scan(timeout: u64, all: bool) -> Result<()> {
    let mut options = ScanOptions::new().duration_secs(timeout);
    if all {
        options = options.all_devices();
    }

    let devices = scan::scan_with_options(options)
        .await
        .context("Failed to scan for devices")?;

    if devices.is_empty() {
        println!("No heart-rate sensors found. Is the strap awake and in range?");
        return Ok(());
    }

    println!("{:<28} {:<20} {:>6}", "NAME", "IDENTIFIER", "RSSI");
    for device in &devices {
        let name = device.name.as_deref().unwrap_or("(unnamed)");
        let rssi = device
            .rssi
            .map(|r| format!("{} dBm", r))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<28} {:<20} {:>6}", name, device.identifier(), rssi);
    }

    Ok(())
}
