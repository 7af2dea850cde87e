//! Device discovery and scanning.
//!
//! This module provides functionality to scan for heart-rate sensors
//! using Bluetooth Low Energy.

use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use tokio::time::sleep;
use tracing::{debug, info};

use pulso_types::uuids::HEART_RATE_SERVICE;

use crate::error::{Error, Result};

/// Information about a discovered heart-rate sensor.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// The advertised device name (e.g., "Polar H10 C1234567").
    pub name: Option<String>,
    /// The peripheral ID for connecting.
    pub id: PeripheralId,
    /// The BLE address as a string (may be zeros on macOS, use `id` instead).
    pub address: String,
    /// RSSI signal strength.
    pub rssi: Option<i16>,
    /// Whether the device advertises the Heart Rate service.
    pub has_heart_rate: bool,
}

impl DiscoveredDevice {
    /// The identifier to pass to [`crate::Device::connect`].
    ///
    /// On macOS the advertised address is all zeros, so the peripheral ID
    /// is the stable handle; on Linux and Windows the MAC address is.
    pub fn identifier(&self) -> String {
        if self.address.chars().all(|c| c == '0' || c == ':') {
            self.id.to_string()
        } else {
            self.address.clone()
        }
    }
}

/// Options for scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// How long to scan for devices.
    pub duration: Duration,
    /// Only return devices that advertise the Heart Rate service.
    pub heart_rate_only: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            heart_rate_only: true,
        }
    }
}

impl ScanOptions {
    /// Create new scan options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set scan duration in seconds.
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration = Duration::from_secs(secs);
        self
    }

    /// Scan for all BLE devices, not just heart-rate sensors.
    pub fn all_devices(mut self) -> Self {
        self.heart_rate_only = false;
        self
    }
}

/// Get the first available Bluetooth adapter.
///
/// Returns [`Error::NoAdapter`] when the host has no Bluetooth support;
/// callers surface this as a status message and the user may retry.
pub async fn get_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;

    adapters.into_iter().next().ok_or(Error::NoAdapter)
}

/// Scan for heart-rate sensors in range.
///
/// Returns a list of discovered devices, or an error if the scan failed.
/// An empty list indicates no devices were found (not an error).
pub async fn scan_for_devices() -> Result<Vec<DiscoveredDevice>> {
    scan_with_options(ScanOptions::default()).await
}

/// Scan for devices with custom options.
pub async fn scan_with_options(options: ScanOptions) -> Result<Vec<DiscoveredDevice>> {
    let adapter = get_adapter().await?;
    scan_with_adapter(&adapter, options).await
}

/// Scan for devices using a specific adapter.
pub async fn scan_with_adapter(
    adapter: &Adapter,
    options: ScanOptions,
) -> Result<Vec<DiscoveredDevice>> {
    info!(
        "Starting BLE scan for {} seconds...",
        options.duration.as_secs()
    );

    adapter.start_scan(ScanFilter::default()).await?;
    sleep(options.duration).await;
    adapter.stop_scan().await?;

    let peripherals = adapter.peripherals().await?;
    let mut discovered = Vec::new();

    for peripheral in peripherals {
        match process_peripheral(&peripheral, options.heart_rate_only).await {
            Ok(Some(device)) => {
                info!("Found heart-rate sensor: {:?}", device.name);
                discovered.push(device);
            }
            Ok(None) => {
                // Not a heart-rate sensor or filtered out
            }
            Err(e) => {
                debug!("Error processing peripheral: {}", e);
            }
        }
    }

    info!("Scan complete. Found {} device(s)", discovered.len());
    Ok(discovered)
}

/// Process a peripheral and determine if it's a heart-rate sensor.
async fn process_peripheral(
    peripheral: &Peripheral,
    heart_rate_only: bool,
) -> Result<Option<DiscoveredDevice>> {
    let properties = peripheral.properties().await?;
    let properties = match properties {
        Some(p) => p,
        None => return Ok(None),
    };

    let has_heart_rate = advertises_heart_rate(&properties);
    if heart_rate_only && !has_heart_rate {
        return Ok(None);
    }

    Ok(Some(DiscoveredDevice {
        name: properties.local_name.clone(),
        id: peripheral.id(),
        address: properties.address.to_string(),
        rssi: properties.rssi,
        has_heart_rate,
    }))
}

/// Find a specific peripheral by name, address, or peripheral ID.
///
/// Returns the adapter alongside the peripheral so the connection can
/// outlive the scan.
pub async fn find_device(identifier: &str, options: ScanOptions) -> Result<(Adapter, Peripheral)> {
    let adapter = get_adapter().await?;

    adapter.start_scan(ScanFilter::default()).await?;
    sleep(options.duration).await;
    adapter.stop_scan().await?;

    let peripherals = adapter.peripherals().await?;
    for peripheral in peripherals {
        if peripheral_matches(&peripheral, identifier).await {
            return Ok((adapter, peripheral));
        }
    }

    Err(Error::device_not_found(identifier))
}

async fn peripheral_matches(peripheral: &Peripheral, identifier: &str) -> bool {
    if peripheral.id().to_string() == identifier {
        return true;
    }

    if let Ok(Some(properties)) = peripheral.properties().await {
        if properties
            .address
            .to_string()
            .eq_ignore_ascii_case(identifier)
        {
            return true;
        }
        if properties.local_name.as_deref() == Some(identifier) {
            return true;
        }
    }

    false
}

/// Check if a peripheral advertises the Heart Rate service.
fn advertises_heart_rate(properties: &btleplug::api::PeripheralProperties) -> bool {
    properties
        .services
        .iter()
        .chain(properties.service_data.keys())
        .any(|uuid| *uuid == HEART_RATE_SERVICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_options_builder() {
        let options = ScanOptions::new().duration_secs(12).all_devices();
        assert_eq!(options.duration, Duration::from_secs(12));
        assert!(!options.heart_rate_only);
    }

    #[test]
    fn test_default_options_filter_heart_rate() {
        let options = ScanOptions::default();
        assert!(options.heart_rate_only);
        assert_eq!(options.duration, Duration::from_secs(5));
    }
}
