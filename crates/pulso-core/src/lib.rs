//! Core BLE library for heart-rate sensors.
//!
//! This crate provides Bluetooth Low Energy communication with standard
//! heart-rate straps (Heart Rate service 0x180D), a simulated source for
//! demos and tests, the monitor's domain events, and the session
//! recording state machine.
//!
//! # Quick Start
//!
//! ```no_run
//! use pulso_core::{Device, scan};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Scan for sensors
//!     let devices = scan::scan_for_devices().await?;
//!     println!("Found {} sensors", devices.len());
//!
//!     // Connect and stream readings
//!     let device = Device::connect("Polar H10 C1234567").await?;
//!     let mut readings = device.subscribe_heart_rate().await?;
//!     while let Some(measurement) = readings.recv().await {
//!         println!("{} bpm", measurement.bpm);
//!     }
//!
//!     device.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod events;
pub mod mock;
pub mod scan;
pub mod session;

pub use device::{ConnectOptions, Device};
pub use error::{Error, Result};
pub use events::{DeviceId, DisconnectReason, EventBus, EventReceiver, EventSender, MonitorEvent};
pub use mock::MockSource;
pub use scan::{DiscoveredDevice, ScanOptions, scan_for_devices, scan_with_options};
pub use session::{RecorderState, SessionRecorder};

// Re-export the shared types crate
pub use pulso_types::{HeartRateMeasurement, Sample, Session};
