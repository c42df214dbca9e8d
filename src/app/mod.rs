//! Application layer: port traits and the outbound event model.
//!
//! The domain core ([`DoorController`](crate::door::DoorController) and
//! [`ControlLoop`](crate::control::ControlLoop)) touches hardware and the
//! network only through the traits in [`ports`], so everything above the
//! adapter ring runs unmodified on the host.

pub mod events;
pub mod ports;
