//! Telemetry dispatch: the retrying outbound queue.
//!
//! Event production (control cycle) is decoupled from network transmission
//! (a single background worker) by [`RetryQueue`]. The queue is strict FIFO
//! with head-of-line blocking: a failing front item is retried until the
//! transport accepts it, and nothing behind it is attempted in the meantime.

mod queue;

pub use queue::{DispatchPolicy, RetryQueue};
