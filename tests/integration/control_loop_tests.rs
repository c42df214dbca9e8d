//! Control-loop scenarios: sample → debounce → door → queue, end to end
//! against mock hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use gatekeeper::adapters::mqtt::SimTelemetryChannel;
use gatekeeper::app::events::DoorEventKind;
use gatekeeper::config::SystemConfig;
use gatekeeper::control::{ControlLoop, CycleOutcome};
use gatekeeper::door::DoorState;
use gatekeeper::error::SensorError;

use crate::mock_hw::{MockActuator, ScriptedSensor, TestClock};

type TestLoop = ControlLoop<ScriptedSensor, MockActuator, SimTelemetryChannel, TestClock>;

struct Rig {
    control: TestLoop,
    channel: Arc<SimTelemetryChannel>,
    calls: Arc<Mutex<Vec<(i32, f32)>>>,
    fail: Arc<Mutex<bool>>,
}

fn rig(script: impl IntoIterator<Item = Result<f32, SensorError>>) -> Rig {
    rig_with_config(SystemConfig::default(), script)
}

fn rig_with_config(
    config: SystemConfig,
    script: impl IntoIterator<Item = Result<f32, SensorError>>,
) -> Rig {
    let channel = Arc::new(SimTelemetryChannel::new());
    let actuator = MockActuator::new();
    let calls = actuator.calls_handle();
    let fail = actuator.fail_handle();
    let control = ControlLoop::new(
        config,
        ScriptedSensor::new(script),
        actuator,
        Arc::clone(&channel),
        TestClock(5_000),
    );
    Rig { control, channel, calls, fail }
}

/// Spin until `cond` holds or two seconds pass.
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

#[test]
fn approach_then_sensor_loss_runs_full_cycle() {
    // Far, near, then the sensor drops out for debounce_limit (2) samples,
    // then far again. Expected: open on approach, close once the loss is
    // resolved, nothing more.
    let mut r = rig([
        Ok(6.0),
        Ok(4.0),
        Err(SensorError::Timeout),
        Err(SensorError::Timeout),
        Ok(6.0),
    ]);

    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);
    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::Transitioned(DoorEventKind::Open)
    );
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::DebouncePending);
    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::Transitioned(DoorEventKind::Close)
    );
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);

    assert_eq!(r.control.door_state(), DoorState::Closed);
    assert_eq!(*r.calls.lock().unwrap(), vec![(2048, 15.0), (-2048, 15.0)]);
    // Worker never started: both events are still pending.
    assert_eq!(r.control.queue_depth(), 2);
}

#[test]
fn sustained_proximity_triggers_once() {
    let mut r = rig([Ok(3.0), Ok(2.0), Ok(4.0)]);

    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::Transitioned(DoorEventKind::Open)
    );
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);

    assert_eq!(r.calls.lock().unwrap().len(), 1);
    assert_eq!(r.control.queue_depth(), 1);
}

#[test]
fn failures_below_debounce_limit_do_not_resolve() {
    // One failed sample (limit is 2) must not count as "no detection";
    // the door stays open and the cycle reports a pending retry.
    let mut r = rig([Ok(3.0), Err(SensorError::GpioReadFailed), Ok(3.0)]);

    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::Transitioned(DoorEventKind::Open)
    );
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::DebouncePending);
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);

    assert_eq!(r.control.door_state(), DoorState::Open);
    assert_eq!(r.calls.lock().unwrap().len(), 1, "no close actuation");
}

#[test]
fn successful_sample_resets_the_debounce_counter() {
    // fail, ok, fail, fail: the counter restarts after the good sample, so
    // only the final pair resolves.
    let mut r = rig([
        Err(SensorError::Timeout),
        Ok(20.0),
        Err(SensorError::Timeout),
        Err(SensorError::Timeout),
    ]);

    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::DebouncePending);
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::DebouncePending);
    // Resolved to no-detection; door already closed, so no transition.
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);
}

#[test]
fn boundary_distances_do_not_trigger() {
    // 0.0 is the no-echo sentinel; 5.0 sits exactly on the threshold.
    let mut r = rig([Ok(0.0), Ok(5.0)]);

    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);
    assert_eq!(r.control.run_cycle().unwrap(), CycleOutcome::Steady);
    assert!(r.calls.lock().unwrap().is_empty());
}

#[test]
fn disconnected_channel_drops_event_but_door_still_moves() {
    let mut r = rig([Ok(3.0), Ok(10.0)]);

    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::Transitioned(DoorEventKind::Open)
    );
    assert_eq!(r.control.queue_depth(), 1);

    r.channel.set_connected(false);
    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::TransitionDropped(DoorEventKind::Close)
    );

    // Door and status still follow the physical transition; only the event
    // is lost, and the existing backlog is untouched.
    assert_eq!(r.control.door_state(), DoorState::Closed);
    assert!(!r.control.status().is_open());
    assert_eq!(r.control.queue_depth(), 1);
    assert_eq!(r.calls.lock().unwrap().len(), 2);
}

#[test]
fn actuation_fault_surfaces_and_state_holds() {
    let mut r = rig([Ok(3.0), Ok(3.0)]);

    *r.fail.lock().unwrap() = true;
    assert!(r.control.run_cycle().is_err());
    assert_eq!(r.control.door_state(), DoorState::Closed);
    assert_eq!(r.control.queue_depth(), 0, "no event on a failed actuation");

    // Same condition on the next cycle retries the transition.
    *r.fail.lock().unwrap() = false;
    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::Transitioned(DoorEventKind::Open)
    );
}

#[test]
fn full_queue_reports_a_dropped_transition() {
    let mut config = SystemConfig::default();
    config.max_queue_depth = 1;
    let mut r = rig_with_config(config, [Ok(3.0), Ok(10.0)]);

    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::Transitioned(DoorEventKind::Open)
    );
    assert_eq!(
        r.control.run_cycle().unwrap(),
        CycleOutcome::TransitionDropped(DoorEventKind::Close)
    );
    assert_eq!(r.control.queue_depth(), 1);
}

#[test]
fn status_mirror_tracks_transitions() {
    let mut r = rig([Ok(3.0), Ok(10.0)]);
    let status = r.control.status();

    assert_eq!(status.payload(), b"{\"doorStatus\":\"closed\"}");
    r.control.run_cycle().unwrap();
    assert_eq!(status.payload(), b"{\"doorStatus\":\"open\"}");
    r.control.run_cycle().unwrap();
    assert_eq!(status.payload(), b"{\"doorStatus\":\"closed\"}");
}

#[test]
fn shutdown_stops_the_worker_and_restart_resumes() {
    let mut r = rig([]);

    r.control.start();
    assert!(r.control.queue_is_running());
    r.control.shutdown().unwrap();
    assert!(!r.control.queue_is_running());

    r.control.start();
    assert!(r.control.queue_is_running());
    r.control.shutdown().unwrap();
}

#[test]
fn run_stops_cooperatively() {
    let mut config = SystemConfig::default();
    config.cycle_interval_ms = 5;
    config.debounce_retry_delay_ms = 2;
    config.dispatch_poll_interval_ms = 5;
    let r = rig_with_config(config, [Ok(3.0), Ok(10.0)]);
    let channel = Arc::clone(&r.channel);

    let stop = Arc::new(AtomicBool::new(false));
    let stop2 = Arc::clone(&stop);
    let handle = thread::spawn(move || {
        let mut control = r.control;
        control.run(&stop2)
    });

    // Both scripted transitions should make it out to the channel while the
    // loop free-runs on the fallback reading.
    assert!(wait_for(|| channel.sent().len() >= 2));

    stop.store(true, Ordering::Relaxed);
    let result = handle.join().expect("run thread panicked");
    assert!(result.is_ok(), "cooperative shutdown failed: {result:?}");
}
