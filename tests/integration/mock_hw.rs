//! Mock hardware for integration tests.
//!
//! Records every actuator call and replays scripted sensor readings so
//! tests can drive the full control path without touching real GPIO.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use gatekeeper::app::ports::{ActuatorPort, ClockPort, ProximitySensorPort};
use gatekeeper::error::{ActuationError, SensorError};

// ── Scripted sensor ───────────────────────────────────────────

/// Replays a fixed sequence of sample results, then a fallback forever.
pub struct ScriptedSensor {
    script: VecDeque<Result<f32, SensorError>>,
    fallback: Result<f32, SensorError>,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new(script: impl IntoIterator<Item = Result<f32, SensorError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: Ok(100.0),
        }
    }

    pub fn with_fallback(mut self, fallback: Result<f32, SensorError>) -> Self {
        self.fallback = fallback;
        self
    }
}

impl ProximitySensorPort for ScriptedSensor {
    fn sample(&mut self) -> Result<f32, SensorError> {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

// ── Recording actuator ────────────────────────────────────────

/// Records `(steps, rpm)` per call; shared handle survives the move into
/// the control loop.
pub struct MockActuator {
    calls: Arc<Mutex<Vec<(i32, f32)>>>,
    fail: Arc<Mutex<bool>>,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn calls_handle(&self) -> Arc<Mutex<Vec<(i32, f32)>>> {
        Arc::clone(&self.calls)
    }

    pub fn fail_handle(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.fail)
    }
}

impl ActuatorPort for MockActuator {
    fn rotate(&mut self, steps: i32, rpm: f32) -> Result<(), ActuationError> {
        if *self.fail.lock().unwrap() {
            return Err(ActuationError::Stalled);
        }
        self.calls.lock().unwrap().push((steps, rpm));
        Ok(())
    }
}

// ── Fixed clock ───────────────────────────────────────────────

pub struct TestClock(pub i64);

impl ClockPort for TestClock {
    fn now_ticks(&self) -> i64 {
        self.0
    }
}
