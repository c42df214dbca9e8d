//! Gatekeeper firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod door;
pub mod error;
pub mod telemetry;

mod pins;

// Hardware-facing modules; the actual peripheral access is cfg-guarded
// inside, with host simulation fallbacks.
pub mod adapters;
pub mod drivers;
