//! Gatekeeper firmware — main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                   │
//! │                                                           │
//! │  SonarSensorAdapter   GateActuatorAdapter   SystemClock   │
//! │  (ProximitySensor)    (Actuator)            (Clock)       │
//! │  WiFi station         MqttTelemetry                       │
//! │  (connectivity)       (TelemetryPort + status query)      │
//! │                                                           │
//! │  ─────────────── Port Trait Boundary ──────────────────   │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │   ControlLoop (pure logic)                          │  │
//! │  │   debounce · DoorController · RetryQueue            │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use gatekeeper::adapters::hardware::{GateActuatorAdapter, SonarSensorAdapter};
use gatekeeper::adapters::mqtt::MqttTelemetry;
use gatekeeper::adapters::time::SystemClock;
use gatekeeper::adapters::wifi;
use gatekeeper::config::SystemConfig;
use gatekeeper::control::ControlLoop;
use gatekeeper::door::DoorStatus;

// Provisioned at build time; the defaults keep bench units compiling.
static WIFI_SSID: &str = match option_env!("GATEKEEPER_WIFI_SSID") {
    Some(v) => v,
    None => "YourSSID",
};
static WIFI_PASSWORD: &str = match option_env!("GATEKEEPER_WIFI_PASSWORD") {
    Some(v) => v,
    None => "YourPassword",
};
static MQTT_BROKER_URL: &str = match option_env!("GATEKEEPER_MQTT_URL") {
    Some(v) => v,
    None => "mqtt://broker.local:1883",
};

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Gatekeeper v{} starting", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();
    config.validate()?;

    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;

    // WiFi is best-effort: an offline controller still operates the gate,
    // it just drops events at the connectivity gate.
    let _wifi = match wifi::connect_station(peripherals.modem, WIFI_SSID, WIFI_PASSWORD) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("WiFi bring-up failed ({e}); running offline");
            None
        }
    };

    let sensor = SonarSensorAdapter::new();
    let actuator = GateActuatorAdapter::new();
    let clock = SystemClock::new();

    // One status mirror shared by the control loop (writer) and the MQTT
    // adapter (reader, answers remote status queries).
    let status = DoorStatus::new();
    let channel = Arc::new(MqttTelemetry::connect(
        MQTT_BROKER_URL,
        config.sender.as_str(),
        status.clone(),
    ));

    // Status-query responder runs out of band of the control cycle.
    let responder = Arc::clone(&channel);
    thread::Builder::new()
        .name("status-responder".into())
        .spawn(move || {
            loop {
                responder.poll();
                thread::sleep(Duration::from_millis(250));
            }
        })?;

    let mut control = ControlLoop::with_status(config, sensor, actuator, channel, clock, status);

    // Firmware never stops on its own; the flag exists for the cooperative
    // shutdown contract (tests exercise it on the host).
    let run_forever = AtomicBool::new(false);
    control.run(&run_forever)?;

    Ok(())
}
