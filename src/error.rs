#![allow(dead_code)] // Error types reserved for future typed returns across the port boundary

//! Unified error types for the Gatekeeper firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! and allocation-free.
//!
//! Taxonomy:
//! - [`SensorError`] — transient sample failures, absorbed by the debounce
//!   counter and never surfaced beyond a log line.
//! - [`ActuationError`] — aborts the in-flight transition; the door state is
//!   left unchanged and the fault is reported to the cycle boundary.
//! - [`DispatchError`] — transient send failures, absorbed by the retry
//!   queue's head retry.
//! - [`ShutdownError`] — the dispatch worker failed to exit within the grace
//!   period during cooperative shutdown.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The proximity sensor could not produce a reading.
    Sensor(SensorError),
    /// The gate actuator failed mid-command.
    Actuation(ActuationError),
    /// The telemetry dispatch path failed.
    Dispatch(DispatchError),
    /// Queue shutdown did not complete cooperatively.
    Shutdown(ShutdownError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::Dispatch(e) => write!(f, "dispatch: {e}"),
            Self::Shutdown(e) => write!(f, "shutdown: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No echo pulse arrived within the measurement window.
    Timeout,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "echo timeout"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

/// An actuation fault leaves [`DoorState`](crate::door::DoorState) unchanged
/// while the mechanism may have partially moved. The controller does not
/// attempt to resolve that inconsistency; it reports the fault and lets the
/// next cycle re-evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// GPIO phase write failed mid-sequence.
    GpioWriteFailed,
    /// The driver rejected the command (zero RPM, step overflow).
    InvalidCommand,
    /// The mechanism reported a stall.
    Stalled,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::InvalidCommand => write!(f, "invalid command"),
            Self::Stalled => write!(f, "mechanism stalled"),
        }
    }
}

impl std::error::Error for ActuationError {}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// Transport refused the payload (broker down, buffer full).
    NotAccepted,
    /// The channel is not connected.
    Disconnected,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAccepted => write!(f, "payload not accepted"),
            Self::Disconnected => write!(f, "channel disconnected"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<DispatchError> for Error {
    fn from(e: DispatchError) -> Self {
        Self::Dispatch(e)
    }
}

// ---------------------------------------------------------------------------
// Shutdown errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownError {
    /// The dispatch worker did not exit within the grace period.
    /// The thread is left detached; it holds no lock while parked in
    /// `dispatch`, so producers are unaffected.
    WorkerUnresponsive,
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerUnresponsive => write!(f, "dispatch worker unresponsive"),
        }
    }
}

impl std::error::Error for ShutdownError {}

impl From<ShutdownError> for Error {
    fn from(e: ShutdownError) -> Self {
        Self::Shutdown(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
