//! Telemetry dispatch flow: door events travelling from the control cycle
//! through the retry queue to the channel, including link flaps.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use gatekeeper::adapters::mqtt::SimTelemetryChannel;
use gatekeeper::app::events::{DoorEvent, DoorEventKind};
use gatekeeper::config::SystemConfig;
use gatekeeper::control::ControlLoop;

use crate::mock_hw::{MockActuator, ScriptedSensor, TestClock};

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn fast_config() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.dispatch_poll_interval_ms = 10;
    config.dispatch_retry_delay_ms = 5;
    config.dispatch_retry_delay_cap_ms = 20;
    config
}

#[test]
fn events_reach_the_channel_in_order_once_the_link_recovers() {
    let channel = Arc::new(SimTelemetryChannel::new());
    let mut control = ControlLoop::new(
        fast_config(),
        ScriptedSensor::new([Ok(3.0), Ok(10.0)]),
        MockActuator::new(),
        Arc::clone(&channel),
        TestClock(7_000),
    );

    // Link saturated: the channel is connected but refuses payloads, so
    // events pile up behind the retrying head.
    channel.set_accepting(false);
    control.start();
    control.run_cycle().unwrap();
    control.run_cycle().unwrap();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(control.queue_depth(), 2, "nothing delivered while refused");
    assert!(channel.sent().is_empty());

    channel.set_accepting(true);
    assert!(wait_for(|| control.queue_depth() == 0));
    control.shutdown().unwrap();

    let sent = channel.sent();
    let events: Vec<DoorEvent> = sent
        .iter()
        .map(|p| serde_json::from_slice(p).expect("wire payload is event JSON"))
        .collect();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, DoorEventKind::Open);
    assert_eq!(events[1].kind, DoorEventKind::Close);
    assert_ne!(events[0].id, events[1].id);
    assert_eq!(events[0].sender.as_str(), "gatekeeper-fw");
    assert_eq!(events[0].name.as_str(), "main-gate");
    assert_eq!(events[0].timestamp_ticks, 7_000);
}

#[test]
fn backlog_survives_worker_shutdown_and_is_delivered_after_restart() {
    let channel = Arc::new(SimTelemetryChannel::new());
    let mut control = ControlLoop::new(
        fast_config(),
        ScriptedSensor::new([Ok(3.0), Ok(10.0)]),
        MockActuator::new(),
        Arc::clone(&channel),
        TestClock(0),
    );

    channel.set_accepting(false);
    control.start();
    control.run_cycle().unwrap();
    control.run_cycle().unwrap();
    control.shutdown().unwrap();
    assert_eq!(control.queue_depth(), 2, "shutdown must not lose the backlog");

    channel.set_accepting(true);
    control.start();
    assert!(wait_for(|| control.queue_depth() == 0));
    control.shutdown().unwrap();
    assert_eq!(channel.sent().len(), 2);
}

#[test]
fn link_flap_after_acceptance_retries_until_delivered() {
    let channel = Arc::new(SimTelemetryChannel::new());
    let mut control = ControlLoop::new(
        fast_config(),
        ScriptedSensor::new([Ok(3.0)]),
        MockActuator::new(),
        Arc::clone(&channel),
        TestClock(0),
    );

    // Event born while connected, so it passes the connectivity gate and
    // enters the queue; the link then drops before delivery succeeds.
    channel.set_accepting(false);
    control.start();
    control.run_cycle().unwrap();
    channel.set_connected(false);

    thread::sleep(Duration::from_millis(50));
    assert_eq!(control.queue_depth(), 1, "retained across the outage");

    channel.set_connected(true);
    channel.set_accepting(true);
    assert!(wait_for(|| control.queue_depth() == 0));
    control.shutdown().unwrap();
    assert_eq!(channel.sent().len(), 1);
}
