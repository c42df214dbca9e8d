//! Hardware drivers.
//!
//! Dumb peripherals only — no policy. On ESP-IDF these drive real GPIO;
//! on host targets they run against in-memory simulation state so the
//! full control path is testable without hardware.

pub mod sonar;
pub mod stepper;
