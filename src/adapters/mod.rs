//! Adapters — implementations of the port traits in
//! [`crate::app::ports`] over real peripherals and transports.
//!
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; host targets get simulation implementations.

pub mod hardware;
pub mod mqtt;
pub mod time;
pub mod wifi;
