//! System configuration parameters
//!
//! All tunable parameters for the gate controller. Defaults match the
//! deployed demo unit (5 cm detection threshold, 2048 half-steps per stroke
//! at 15 RPM, 200 ms control cadence).

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Detection ---
    /// Distance (cm) below which an object counts as detected.
    pub proximity_threshold_cm: f32,
    /// Consecutive failed samples before a cycle resolves to "no detection".
    pub debounce_limit: u8,

    // --- Actuation ---
    /// Half-steps for a full stroke (2048 = 180° on the ULN2003 gearbox).
    pub full_stroke_steps: i32,
    /// Stepper speed in revolutions per minute.
    pub actuation_rpm: f32,

    // --- Timing ---
    /// Control cycle interval (milliseconds).
    pub cycle_interval_ms: u32,
    /// Delay between sample retries inside the debounce sub-loop (ms).
    pub debounce_retry_delay_ms: u32,
    /// Dispatch worker idle poll interval (milliseconds).
    pub dispatch_poll_interval_ms: u32,
    /// Initial pause after a failed dispatch attempt (milliseconds).
    pub dispatch_retry_delay_ms: u32,
    /// Ceiling for the escalating dispatch retry delay (milliseconds).
    pub dispatch_retry_delay_cap_ms: u32,

    // --- Telemetry queue ---
    /// Maximum pending outbound messages; the newest is dropped beyond this.
    pub max_queue_depth: usize,
    /// Grace period for the dispatch worker to exit on shutdown (ms).
    pub shutdown_grace_ms: u32,

    // --- Identity ---
    /// Reported as the `sender` field of every door event.
    pub sender: heapless::String<32>,
    /// Logical name of the controlled door.
    pub door_name: heapless::String<32>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Detection
            proximity_threshold_cm: 5.0,
            debounce_limit: 2,

            // Actuation
            full_stroke_steps: 2048,
            actuation_rpm: 15.0,

            // Timing
            cycle_interval_ms: 200,
            debounce_retry_delay_ms: 50,
            dispatch_poll_interval_ms: 100,
            dispatch_retry_delay_ms: 100,
            dispatch_retry_delay_cap_ms: 5_000,

            // Telemetry queue
            max_queue_depth: 64,
            shutdown_grace_ms: 1_000,

            // Identity
            sender: heapless::String::try_from("gatekeeper-fw").unwrap_or_default(),
            door_name: heapless::String::try_from("main-gate").unwrap_or_default(),
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration. Called once at startup; invalid values
    /// are rejected rather than clamped.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;
        if self.proximity_threshold_cm <= 0.0 {
            return Err(Error::Config("proximity_threshold_cm must be positive"));
        }
        if self.debounce_limit == 0 {
            return Err(Error::Config("debounce_limit must be at least 1"));
        }
        if self.full_stroke_steps <= 0 {
            return Err(Error::Config("full_stroke_steps must be positive"));
        }
        if self.actuation_rpm <= 0.0 {
            return Err(Error::Config("actuation_rpm must be positive"));
        }
        if self.max_queue_depth == 0 {
            return Err(Error::Config("max_queue_depth must be at least 1"));
        }
        if self.dispatch_retry_delay_cap_ms < self.dispatch_retry_delay_ms {
            return Err(Error::Config("dispatch retry cap below initial delay"));
        }
        Ok(())
    }
}
