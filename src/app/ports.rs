//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ domain (DoorController / ControlLoop)
//! ```
//!
//! Driven adapters (sonar, stepper, MQTT client, system clock) implement
//! these traits. The domain consumes them via generics, so the core never
//! touches hardware directly and the whole control path is testable with
//! mock adapters.

use crate::error::{ActuationError, SensorError};

// ───────────────────────────────────────────────────────────────
// Proximity sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one distance sample per call.
///
/// A sample may fail transiently ([`SensorError`]); the control loop absorbs
/// runs of failures through its debounce counter. Implementations are not
/// expected to carry persistent failure state.
pub trait ProximitySensorPort {
    /// Measure the distance to the nearest obstacle, in centimetres.
    fn sample(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain commands the gate mechanism through this.
pub trait ActuatorPort {
    /// Rotate the stepper by `steps` half-steps at `rpm`.
    ///
    /// The sign of `steps` encodes direction (positive = open stroke).
    /// **Blocking**: returns only when motion completes or fails. There is
    /// no interruption point and no obstruction feedback mid-stroke.
    fn rotate(&mut self, steps: i32, rpm: f32) -> Result<(), ActuationError>;
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

/// Best-effort outbound channel.
///
/// Methods take `&self` so the channel can be shared between the control
/// cycle (connectivity gate at enqueue time) and the dispatch worker
/// (send attempts); implementations use interior mutability where needed.
pub trait TelemetryPort: Send + Sync {
    /// Whether the transport currently believes it is connected.
    fn is_connected(&self) -> bool;

    /// Hand `payload` to the transport. `true` means *accepted*, not
    /// delivered — fire-and-forget semantics.
    fn try_send(&self, payload: &[u8]) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Timestamp source for emitted events.
pub trait ClockPort {
    /// Current time in 100 ns ticks since the Unix epoch.
    fn now_ticks(&self) -> i64;
}
