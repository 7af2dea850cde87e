//! Connection to a heart-rate sensor over BLE.
//!
//! A [`Device`] owns one GATT connection. Heart-rate readings arrive as
//! notifications on the Heart Rate Measurement characteristic; they are
//! parsed here and forwarded through a channel in delivery order. The
//! channel closing signals that the sensor dropped the link.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use btleplug::api::{Characteristic, Peripheral as _};
use btleplug::platform::Peripheral;
use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pulso_types::uuids::{BATTERY_LEVEL, HEART_RATE_MEASUREMENT};
use pulso_types::{HeartRateMeasurement, parse_battery_level};

use crate::error::{Error, Result};
use crate::events::DeviceId;
use crate::scan::{ScanOptions, find_device};

/// Buffer size for the measurement channel.
const MEASUREMENT_CHANNEL_CAPACITY: usize = 16;

/// Timeouts for establishing a connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// How long to scan for the named device before giving up.
    pub scan_duration: Duration,
    /// Timeout for the GATT connect itself.
    pub connect_timeout: Duration,
    /// Timeout for service discovery.
    pub discovery_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            scan_duration: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(15),
            discovery_timeout: Duration::from_secs(10),
        }
    }
}

/// A connected heart-rate sensor.
///
/// Call [`Device::disconnect`] before dropping the device to release
/// BLE resources; the notification task is aborted there.
pub struct Device {
    peripheral: Peripheral,
    name: Option<String>,
    address: String,
    characteristics: HashMap<Uuid, Characteristic>,
    notification_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
    disconnected: AtomicBool,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish()
    }
}

impl Device {
    /// Connect to a heart-rate sensor by name, address, or peripheral ID.
    #[tracing::instrument(level = "info", skip_all, fields(identifier = %identifier))]
    pub async fn connect(identifier: &str) -> Result<Self> {
        Self::connect_with_options(identifier, ConnectOptions::default()).await
    }

    /// Connect with custom timeouts.
    #[tracing::instrument(level = "info", skip_all, fields(identifier = %identifier))]
    pub async fn connect_with_options(identifier: &str, options: ConnectOptions) -> Result<Self> {
        let scan = ScanOptions::new()
            .duration(options.scan_duration)
            .all_devices();
        let (_adapter, peripheral) = find_device(identifier, scan).await?;

        info!("Connecting to device...");
        timeout(options.connect_timeout, peripheral.connect())
            .await
            .map_err(|_| Error::timeout("connect to device", options.connect_timeout))??;
        info!("Connected!");

        info!("Discovering services...");
        timeout(options.discovery_timeout, peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("discover services", options.discovery_timeout))??;

        // Cache characteristics for O(1) lookups
        let mut characteristics = HashMap::new();
        for service in peripheral.services() {
            debug!("  Service: {}", service.uuid);
            for characteristic in &service.characteristics {
                debug!("    Characteristic: {}", characteristic.uuid);
                characteristics.insert(characteristic.uuid, characteristic.clone());
            }
        }

        let properties = peripheral.properties().await?;
        let name = properties.as_ref().and_then(|p| p.local_name.clone());
        let address = properties
            .as_ref()
            .map(|p| p.address.to_string())
            .unwrap_or_else(|| peripheral.id().to_string());

        Ok(Self {
            peripheral,
            name,
            address,
            characteristics,
            notification_task: Mutex::new(None),
            disconnected: AtomicBool::new(false),
        })
    }

    /// Get the device name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the device address or identifier.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The identity this device reports in events.
    pub fn device_id(&self) -> DeviceId {
        match &self.name {
            Some(name) => DeviceId::with_name(&self.address, name),
            None => DeviceId::new(&self.address),
        }
    }

    /// Check if the device is connected (queries BLE stack state).
    pub async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    /// Subscribe to Heart Rate Measurement notifications.
    ///
    /// Parsed measurements are forwarded through the returned channel in
    /// notification delivery order. The channel closes when the sensor
    /// drops the link or [`disconnect`](Self::disconnect) is called;
    /// malformed payloads are logged and skipped without closing it.
    pub async fn subscribe_heart_rate(&self) -> Result<mpsc::Receiver<HeartRateMeasurement>> {
        let characteristic = self.find_characteristic(HEART_RATE_MEASUREMENT)?;

        self.peripheral.subscribe(characteristic).await?;
        let mut stream = self.peripheral.notifications().await?;

        let (tx, rx) = mpsc::channel(MEASUREMENT_CHANNEL_CAPACITY);

        let handle = tokio::spawn(async move {
            while let Some(notification) = stream.next().await {
                if notification.uuid != HEART_RATE_MEASUREMENT {
                    continue;
                }
                match HeartRateMeasurement::from_bytes(&notification.value) {
                    Ok(measurement) => {
                        if tx.send(measurement).await.is_err() {
                            debug!("Measurement receiver dropped, stopping");
                            break;
                        }
                    }
                    Err(e) => warn!("Dropping malformed measurement: {}", e),
                }
            }
            debug!("Notification stream ended");
        });

        // Track the handle for cleanup on disconnect
        *self.notification_task.lock().await = Some(handle);

        Ok(rx)
    }

    /// Read the battery level characteristic (0-100 percent).
    pub async fn read_battery(&self) -> Result<u8> {
        let characteristic = self.find_characteristic(BATTERY_LEVEL)?;
        let data = self.peripheral.read(characteristic).await?;
        Ok(parse_battery_level(&data)?)
    }

    /// Disconnect from the device.
    ///
    /// Aborts the notification task (closing the measurement channel) and
    /// disconnects the peripheral.
    #[tracing::instrument(level = "info", skip(self), fields(device_name = ?self.name))]
    pub async fn disconnect(&self) -> Result<()> {
        info!("Disconnecting from device...");
        self.disconnected.store(true, Ordering::SeqCst);

        if let Some(handle) = self.notification_task.lock().await.take() {
            handle.abort();
        }

        self.peripheral.disconnect().await?;
        Ok(())
    }

    fn find_characteristic(&self, uuid: Uuid) -> Result<&Characteristic> {
        self.characteristics
            .get(&uuid)
            .ok_or_else(|| Error::characteristic_not_found(uuid.to_string()))
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if !self.disconnected.load(Ordering::SeqCst) {
            warn!(
                device = ?self.name,
                "Device dropped without calling disconnect(); BLE resources may linger"
            );
        }
    }
}
