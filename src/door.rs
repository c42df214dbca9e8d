//! Door state machine.
//!
//! Two states, one latch rule:
//!
//! ```text
//!            detected                      !detected
//!   Closed ───────────▶ rotate(+stroke) ──▶ Open
//!   Open   ───────────▶ rotate(-stroke) ──▶ Closed
//! ```
//!
//! "Detected" means a valid reading strictly between zero and the proximity
//! threshold. Sustained proximity does not re-trigger an already-open door;
//! the opposite condition must occur first (single-trigger latch).
//!
//! `DoorState` has exactly one writer and one reader (the control-cycle
//! thread), so no locking is involved. The shared [`DoorStatus`] mirror
//! exists only for read-only remote status queries.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::app::events::{DoorEvent, DoorEventKind};
use crate::app::ports::{ActuatorPort, ClockPort};
use crate::config::SystemConfig;
use crate::error::ActuationError;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One debounce-resolved distance sample, produced once per control cycle.
///
/// `valid = false` models a sample failure or timeout that the debounce
/// counter has already resolved to authoritative "no detection" — it is not
/// a near/far decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceReading {
    pub cm: f32,
    pub valid: bool,
}

impl DistanceReading {
    pub fn valid(cm: f32) -> Self {
        Self { cm, valid: true }
    }

    pub fn invalid() -> Self {
        Self { cm: 0.0, valid: false }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Current logical position of the door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Closed,
    Open,
}

/// Shared read-only mirror of [`DoorState`] for remote status queries.
///
/// Written by the control cycle after each successful transition; read by
/// the telemetry adapter when answering a status request.
#[derive(Debug, Clone, Default)]
pub struct DoorStatus(Arc<AtomicBool>);

impl DoorStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn set_open(&self, open: bool) {
        self.0.store(open, Ordering::Relaxed);
    }

    /// JSON body returned to a remote status query.
    pub fn payload(&self) -> &'static [u8] {
        if self.is_open() {
            b"{\"doorStatus\":\"open\"}"
        } else {
            b"{\"doorStatus\":\"closed\"}"
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the door state and the transition rule.
///
/// Actuation is synchronous with respect to the calling cycle: no sensor
/// sampling happens while the stepper runs. On an actuation fault the state
/// is left unchanged and no event is emitted, so logical state and the
/// physical mechanism may disagree until a later cycle re-evaluates.
pub struct DoorController {
    state: DoorState,
    threshold_cm: f32,
    full_stroke_steps: i32,
    rpm: f32,
    sender: heapless::String<32>,
    door_name: heapless::String<32>,
}

impl DoorController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: DoorState::Closed,
            threshold_cm: config.proximity_threshold_cm,
            full_stroke_steps: config.full_stroke_steps,
            rpm: config.actuation_rpm,
            sender: config.sender.clone(),
            door_name: config.door_name.clone(),
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Decide whether `reading` causes a transition, drive the actuator if
    /// so, and return the emitted event.
    ///
    /// Returns `Ok(None)` when no transition occurs. An [`ActuationError`]
    /// aborts the transition: state unchanged, nothing emitted.
    pub fn evaluate(
        &mut self,
        reading: DistanceReading,
        actuator: &mut impl ActuatorPort,
        clock: &impl ClockPort,
    ) -> Result<Option<DoorEvent>, ActuationError> {
        let detected = reading.valid && reading.cm > 0.0 && reading.cm < self.threshold_cm;

        let kind = match (self.state, detected) {
            (DoorState::Closed, true) => DoorEventKind::Open,
            (DoorState::Open, false) => DoorEventKind::Close,
            _ => return Ok(None),
        };

        let steps = match kind {
            DoorEventKind::Open => self.full_stroke_steps,
            DoorEventKind::Close => -self.full_stroke_steps,
        };

        info!(
            "DOOR | {:?}: rotating {} steps at {} RPM",
            kind, steps, self.rpm
        );
        actuator.rotate(steps, self.rpm)?;

        self.state = match kind {
            DoorEventKind::Open => DoorState::Open,
            DoorEventKind::Close => DoorState::Closed,
        };

        Ok(Some(DoorEvent::new(
            &self.sender,
            &self.door_name,
            kind,
            clock.now_ticks(),
        )))
    }
}
