//! MQTT telemetry channel adapter.
//!
//! Implements [`TelemetryPort`] — best-effort, fire-and-forget delivery of
//! door events to the broker. `try_send` returning `true` means the client
//! accepted the payload, not that the broker (or anything behind it)
//! received it.
//!
//! Also answers remote door-status queries: a message on the status request
//! topic is answered with the current [`DoorStatus`] payload on the next
//! [`poll`](MqttTelemetry::poll).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real `esp-idf-svc` MQTT client.
//! - **all other targets**: [`SimTelemetryChannel`], an in-memory stub with
//!   scriptable connectivity for host-side tests.

#[cfg(target_os = "espidf")]
pub use espidf_impl::MqttTelemetry;

/// Topic carrying door-event JSON payloads.
pub const EVENT_TOPIC: &str = "gatekeeper/events";
/// Topic carrying door-status responses.
pub const STATUS_TOPIC: &str = "gatekeeper/status";
/// Incoming requests for the current door status.
pub const STATUS_REQUEST_TOPIC: &str = "gatekeeper/status/get";

#[cfg(target_os = "espidf")]
mod espidf_impl {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
    use log::{info, warn};

    use super::{EVENT_TOPIC, STATUS_REQUEST_TOPIC, STATUS_TOPIC};
    use crate::app::ports::TelemetryPort;
    use crate::door::DoorStatus;

    pub struct MqttTelemetry {
        client: Option<Mutex<EspMqttClient<'static>>>,
        connected: Arc<AtomicBool>,
        status_requested: Arc<AtomicBool>,
        status: DoorStatus,
    }

    impl MqttTelemetry {
        /// Connect to `broker_url`. Failure is degraded, not fatal: the
        /// adapter reports disconnected and every send is refused, matching
        /// the controller's drop-when-offline policy.
        pub fn connect(broker_url: &str, client_id: &str, status: DoorStatus) -> Self {
            match Self::try_connect(broker_url, client_id, status.clone()) {
                Ok(adapter) => adapter,
                Err(e) => {
                    warn!("MQTT | connect failed ({e}); telemetry disabled");
                    Self {
                        client: None,
                        connected: Arc::new(AtomicBool::new(false)),
                        status_requested: Arc::new(AtomicBool::new(false)),
                        status,
                    }
                }
            }
        }

        fn try_connect(
            broker_url: &str,
            client_id: &str,
            status: DoorStatus,
        ) -> anyhow::Result<Self> {
            let connected = Arc::new(AtomicBool::new(false));
            let status_requested = Arc::new(AtomicBool::new(false));

            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };

            let conn_flag = Arc::clone(&connected);
            let req_flag = Arc::clone(&status_requested);
            let mut client = EspMqttClient::new_cb(broker_url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => {
                        info!("MQTT | connected");
                        conn_flag.store(true, Ordering::Release);
                    }
                    EventPayload::Disconnected => {
                        warn!("MQTT | disconnected");
                        conn_flag.store(false, Ordering::Release);
                    }
                    EventPayload::Received { topic, .. } => {
                        if topic == Some(STATUS_REQUEST_TOPIC) {
                            req_flag.store(true, Ordering::Release);
                        }
                    }
                    _ => {}
                }
            })?;

            client.subscribe(STATUS_REQUEST_TOPIC, QoS::AtMostOnce)?;

            Ok(Self {
                client: Some(Mutex::new(client)),
                connected,
                status_requested,
                status,
            })
        }

        /// Answer a pending status request, if any. Called from the main
        /// bring-up loop; the MQTT event callback itself never publishes.
        pub fn poll(&self) {
            if !self.status_requested.swap(false, Ordering::AcqRel) {
                return;
            }
            let payload = self.status.payload();
            if !self.publish(STATUS_TOPIC, payload) {
                warn!("MQTT | status response not accepted");
            }
        }

        fn publish(&self, topic: &str, payload: &[u8]) -> bool {
            let Some(client) = &self.client else {
                return false;
            };
            let Ok(mut client) = client.lock() else {
                return false;
            };
            client
                .enqueue(topic, QoS::AtMostOnce, false, payload)
                .is_ok()
        }
    }

    impl TelemetryPort for MqttTelemetry {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Acquire)
        }

        fn try_send(&self, payload: &[u8]) -> bool {
            if !self.is_connected() {
                return false;
            }
            self.publish(EVENT_TOPIC, payload)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use sim_impl::SimTelemetryChannel;

#[cfg(not(target_os = "espidf"))]
mod sim_impl {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use crate::app::ports::TelemetryPort;

    /// Scriptable in-memory telemetry channel for host targets.
    #[derive(Default)]
    pub struct SimTelemetryChannel {
        connected: AtomicBool,
        accept: AtomicBool,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl SimTelemetryChannel {
        /// Starts connected and accepting.
        pub fn new() -> Self {
            Self {
                connected: AtomicBool::new(true),
                accept: AtomicBool::new(true),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn set_connected(&self, connected: bool) {
            self.connected.store(connected, Ordering::Relaxed);
        }

        /// Whether `try_send` accepts payloads (simulates a saturated link).
        pub fn set_accepting(&self, accept: bool) {
            self.accept.store(accept, Ordering::Relaxed);
        }

        pub fn sent(&self) -> Vec<Vec<u8>> {
            self.sent.lock().map(|v| v.clone()).unwrap_or_default()
        }
    }

    impl TelemetryPort for SimTelemetryChannel {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Relaxed)
        }

        fn try_send(&self, payload: &[u8]) -> bool {
            if !self.is_connected() || !self.accept.load(Ordering::Relaxed) {
                return false;
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(payload.to_vec());
            }
            true
        }
    }

}
