//! The monitor runtime.
//!
//! Bridges a reading source (a real [`Device`] or a [`MockSource`]) to the
//! side effects of each reading, in a fixed order: display, record,
//! notify. Session lifecycle follows the connection: a session starts on
//! connect when recording is enabled, and is persisted on disconnect iff
//! it holds at least one reading.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pulso_core::{
    ConnectOptions, Device, DeviceId, DisconnectReason, EventBus, EventReceiver, MockSource,
    MonitorEvent, SessionRecorder,
};
use pulso_store::{SETTING_AUTO_RECONNECT, SETTING_RECORD_SESSIONS, Store, WebhookRepository};
use pulso_types::HeartRateMeasurement;

use crate::dispatch::Dispatcher;
use crate::error::Result;

/// Options for a monitor run.
#[derive(Debug, Clone, Default)]
pub struct MonitorOptions {
    /// Force recording on or off for this run; `None` follows the
    /// persisted `record_sessions` setting.
    pub record_override: Option<bool>,
    /// Connection timeouts.
    pub connect: ConnectOptions,
}

/// Progress updates surfaced to the user interface.
#[derive(Debug, Clone)]
pub enum MonitorUpdate {
    /// Connected to a source.
    Connected { device: DeviceId },
    /// A reading arrived (the display step).
    Reading { bpm: u16 },
    /// Disconnected, with the last known bpm (0 if none).
    Disconnected { device: DeviceId, last_bpm: u16 },
    /// A webhook send could not be attempted.
    WebhookError { webhook: String, message: String },
    /// The session was persisted.
    SessionSaved { id: i64, samples: usize },
    /// Waiting before a reconnect attempt.
    Reconnecting { attempt: u32, delay: Duration },
}

/// The monitor runtime: one store, one webhook collection, one
/// dispatcher, and the session recorder.
pub struct Monitor {
    store: Store,
    hooks: WebhookRepository,
    dispatcher: Dispatcher,
    recorder: SessionRecorder,
    bus: EventBus,
    last_bpm: u16,
}

impl Monitor {
    /// Build a monitor over an open store.
    pub fn new(store: Store) -> Result<Self> {
        let hooks = WebhookRepository::load(&store)?;
        Ok(Self {
            store,
            hooks,
            dispatcher: Dispatcher::new(),
            recorder: SessionRecorder::new(),
            bus: EventBus::default(),
            last_bpm: 0,
        })
    }

    /// The store this monitor persists to.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The webhook collection.
    pub fn hooks(&self) -> &WebhookRepository {
        &self.hooks
    }

    /// Subscribe to the raw event stream, independent of webhooks.
    pub fn subscribe(&self) -> EventReceiver {
        self.bus.subscribe()
    }

    /// Monitor a real device, reconnecting on link loss when the
    /// `auto_reconnect` setting is enabled.
    ///
    /// The initial connection failure is surfaced to the caller; the user
    /// may retry manually. Cancel the token to disconnect cleanly.
    pub async fn run_device(
        &mut self,
        identifier: &str,
        options: MonitorOptions,
        cancel: CancellationToken,
        mut on_update: impl FnMut(MonitorUpdate),
    ) -> Result<()> {
        let record = self.should_record(options.record_override)?;
        let mut attempt: u32 = 0;

        loop {
            let device = match Device::connect_with_options(identifier, options.connect.clone())
                .await
            {
                Ok(device) => device,
                Err(e) if attempt == 0 => return Err(e.into()),
                Err(e) => {
                    // Reconnect attempt failed; back off and try again
                    warn!("Reconnect failed: {}", e);
                    attempt += 1;
                    if !self
                        .wait_before_reconnect(attempt, &cancel, &mut on_update)
                        .await
                    {
                        return Ok(());
                    }
                    continue;
                }
            };

            let readings = device.subscribe_heart_rate().await?;
            attempt = 0;

            let reason = self
                .run_with_source(device.device_id(), readings, record, &cancel, &mut on_update)
                .await?;

            if let Err(e) = device.disconnect().await {
                warn!("Disconnect cleanup failed: {}", e);
            }

            match reason {
                DisconnectReason::UserRequested => return Ok(()),
                _ => {
                    if !self.store.get_bool(SETTING_AUTO_RECONNECT)? {
                        return Ok(());
                    }
                    attempt += 1;
                    if !self
                        .wait_before_reconnect(attempt, &cancel, &mut on_update)
                        .await
                    {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Monitor a simulated source. Ends when the token is cancelled or
    /// the source drops its simulated link.
    pub async fn run_simulated(
        &mut self,
        source: &MockSource,
        options: MonitorOptions,
        cancel: CancellationToken,
        mut on_update: impl FnMut(MonitorUpdate),
    ) -> Result<()> {
        let record = self.should_record(options.record_override)?;
        let (readings, source_cancel) = source.start();

        self.run_with_source(source.device_id(), readings, record, &cancel, &mut on_update)
            .await?;

        source_cancel.cancel();
        Ok(())
    }

    /// Drive one connect-to-disconnect lifetime over a measurement channel.
    ///
    /// The channel closing means the source dropped the link; cancelling
    /// the token is a user-requested disconnect.
    pub async fn run_with_source(
        &mut self,
        device: DeviceId,
        mut readings: mpsc::Receiver<HeartRateMeasurement>,
        record: bool,
        cancel: &CancellationToken,
        on_update: &mut dyn FnMut(MonitorUpdate),
    ) -> Result<DisconnectReason> {
        info!(device = %device.display_name(), record, "Source connected");

        if record {
            self.recorder.begin(&device.id);
        }
        self.last_bpm = 0;

        on_update(MonitorUpdate::Connected {
            device: device.clone(),
        });
        self.notify(
            &MonitorEvent::Connected {
                device: device.clone(),
            },
            on_update,
        );

        let reason = loop {
            tokio::select! {
                _ = cancel.cancelled() => break DisconnectReason::UserRequested,
                maybe = readings.recv() => match maybe {
                    Some(measurement) => {
                        self.handle_reading(&device, measurement.bpm, on_update);
                    }
                    None => break DisconnectReason::LinkLost,
                }
            }
        };

        self.finish_connection(device, reason.clone(), on_update)?;
        Ok(reason)
    }

    /// Side effects of one reading, in the documented order:
    /// display, record, notify.
    fn handle_reading(
        &mut self,
        device: &DeviceId,
        bpm: u16,
        on_update: &mut dyn FnMut(MonitorUpdate),
    ) {
        on_update(MonitorUpdate::Reading { bpm });
        self.last_bpm = bpm;
        self.recorder.record(bpm);
        self.notify(
            &MonitorEvent::HeartRateUpdated {
                device: device.clone(),
                bpm,
            },
            on_update,
        );
    }

    /// Close out a connection: status update, `disconnected` webhooks,
    /// then session persistence.
    fn finish_connection(
        &mut self,
        device: DeviceId,
        reason: DisconnectReason,
        on_update: &mut dyn FnMut(MonitorUpdate),
    ) -> Result<()> {
        let last_bpm = self.recorder.last_bpm().unwrap_or(self.last_bpm);
        info!(device = %device.display_name(), last_bpm, ?reason, "Source disconnected");

        on_update(MonitorUpdate::Disconnected {
            device: device.clone(),
            last_bpm,
        });
        self.notify(
            &MonitorEvent::Disconnected {
                device,
                last_bpm,
                reason,
            },
            on_update,
        );

        if let Some(session) = self.recorder.finish() {
            let samples = session.samples.len();
            let id = self.store.insert_session(&session)?;
            on_update(MonitorUpdate::SessionSaved { id, samples });
        }

        Ok(())
    }

    /// Publish an event and dispatch its webhooks, surfacing per-hook
    /// failures.
    fn notify(&self, event: &MonitorEvent, on_update: &mut dyn FnMut(MonitorUpdate)) {
        self.bus.send(event.clone());
        for failure in self.dispatcher.dispatch(&self.hooks, event) {
            on_update(MonitorUpdate::WebhookError {
                webhook: failure.webhook,
                message: failure.error.to_string(),
            });
        }
    }

    fn should_record(&self, record_override: Option<bool>) -> Result<bool> {
        match record_override {
            Some(record) => Ok(record),
            None => Ok(self.store.get_bool(SETTING_RECORD_SESSIONS)?),
        }
    }

    /// Sleep with backoff before a reconnect attempt. Returns `false`
    /// when cancelled.
    async fn wait_before_reconnect(
        &self,
        attempt: u32,
        cancel: &CancellationToken,
        on_update: &mut dyn FnMut(MonitorUpdate),
    ) -> bool {
        let delay = backoff_delay(attempt);
        on_update(MonitorUpdate::Reconnecting { attempt, delay });

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

/// Exponential backoff: 1s, 2s, 4s, ... capped at 30s.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(5);
    Duration::from_secs(1u64 << exp).min(Duration::from_secs(30))
}
