//! Top-level control loop.
//!
//! Fixed-cadence driver tying the proximity sensor, door controller, retry
//! queue, and telemetry channel together. One direction of data flow per
//! cycle:
//!
//! ```text
//! sensor ──▶ debounce ──▶ DoorController ──▶ stepper (blocking)
//!                              │
//!                              └─▶ JSON ──▶ RetryQueue ──▶ TelemetryPort
//! ```
//!
//! Connectivity policy: an event born while the channel is disconnected is
//! dropped outright (at-most-once). The queue's retry contract covers only
//! transient send failures *after* the channel accepted responsibility.
//!
//! No error terminates the loop: actuation faults are logged at the cycle
//! boundary and the next tick proceeds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::app::events::DoorEventKind;
use crate::app::ports::{ActuatorPort, ClockPort, ProximitySensorPort, TelemetryPort};
use crate::config::SystemConfig;
use crate::door::{DistanceReading, DoorController, DoorState, DoorStatus};
use crate::error::{Error, Result, ShutdownError};
use crate::telemetry::{DispatchPolicy, RetryQueue};

/// What a single pass of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Sample failed below the debounce limit; retry after the short delay
    /// without advancing the rest of the cycle.
    DebouncePending,
    /// Resolved reading produced no transition.
    Steady,
    /// Transition occurred and the event was handed to the queue.
    Transitioned(DoorEventKind),
    /// Transition occurred but the channel was disconnected; event dropped.
    TransitionDropped(DoorEventKind),
}

/// Owns every component of the control path. Constructed once at startup and
/// driven from a single thread; there is no hidden global state.
pub struct ControlLoop<S, A, C, K> {
    sensor: S,
    actuator: A,
    channel: Arc<C>,
    clock: K,
    door: DoorController,
    queue: RetryQueue<Vec<u8>>,
    status: DoorStatus,
    config: SystemConfig,
    debounce: u8,
}

impl<S, A, C, K> ControlLoop<S, A, C, K>
where
    S: ProximitySensorPort,
    A: ActuatorPort,
    C: TelemetryPort + 'static,
    K: ClockPort,
{
    pub fn new(config: SystemConfig, sensor: S, actuator: A, channel: Arc<C>, clock: K) -> Self {
        Self::with_status(config, sensor, actuator, channel, clock, DoorStatus::new())
    }

    /// Like [`new`], but shares an externally created status mirror (the
    /// telemetry adapter reads it to answer remote status queries).
    pub fn with_status(
        config: SystemConfig,
        sensor: S,
        actuator: A,
        channel: Arc<C>,
        clock: K,
        status: DoorStatus,
    ) -> Self {
        let door = DoorController::new(&config);
        let queue = RetryQueue::new(DispatchPolicy::from_config(&config));
        Self {
            sensor,
            actuator,
            channel,
            clock,
            door,
            queue,
            status,
            config,
            debounce: 0,
        }
    }

    /// Start the dispatch worker. Safe to call again after [`shutdown`].
    pub fn start(&mut self) {
        let channel = Arc::clone(&self.channel);
        self.queue
            .start(move |payload: &Vec<u8>| channel.try_send(payload));
    }

    /// Stop the dispatch worker cooperatively. Pending items survive a
    /// later [`start`].
    pub fn shutdown(&mut self) -> core::result::Result<(), ShutdownError> {
        self.queue.stop()
    }

    /// Drive cycles until `stop` is set, then shut the queue down.
    pub fn run(&mut self, stop: &AtomicBool) -> core::result::Result<(), ShutdownError> {
        info!("CTRL | control loop starting");
        self.start();

        while !stop.load(Ordering::Relaxed) {
            let delay = match self.run_cycle() {
                Ok(CycleOutcome::DebouncePending) => self.config.debounce_retry_delay_ms,
                Ok(_) => self.config.cycle_interval_ms,
                Err(e) => {
                    // Fault boundary: log and resume on the next tick.
                    error!("CTRL | cycle fault: {e}");
                    self.config.cycle_interval_ms
                }
            };
            thread::sleep(Duration::from_millis(delay.into()));
        }

        info!("CTRL | control loop stopping");
        self.shutdown()
    }

    /// One pass: sample, debounce, evaluate, encode, enqueue.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let reading = match self.sensor.sample() {
            Ok(cm) => {
                debug!("CTRL | distance: {cm:.1} cm");
                self.debounce = 0;
                DistanceReading::valid(cm)
            }
            Err(e) => {
                self.debounce += 1;
                if self.debounce < self.config.debounce_limit {
                    debug!("CTRL | sample failed ({e}), debounce {}", self.debounce);
                    return Ok(CycleOutcome::DebouncePending);
                }
                debug!("CTRL | distance: unknown ({e}), resolved as no detection");
                self.debounce = 0;
                DistanceReading::invalid()
            }
        };

        let Some(event) = self
            .door
            .evaluate(reading, &mut self.actuator, &self.clock)
            .map_err(Error::Actuation)?
        else {
            return Ok(CycleOutcome::Steady);
        };

        let kind = event.kind;
        self.status.set_open(kind == DoorEventKind::Open);

        if !self.channel.is_connected() {
            info!("TELEM | dropping {kind:?} event: channel disconnected");
            return Ok(CycleOutcome::TransitionDropped(kind));
        }

        match event.to_payload() {
            Ok(payload) => {
                if !self.queue.enqueue(payload) {
                    warn!("TELEM | dropping {kind:?} event: queue at capacity");
                    return Ok(CycleOutcome::TransitionDropped(kind));
                }
                Ok(CycleOutcome::Transitioned(kind))
            }
            Err(e) => {
                error!("TELEM | event encoding failed: {e}");
                Ok(CycleOutcome::TransitionDropped(kind))
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn door_state(&self) -> DoorState {
        self.door.state()
    }

    /// Shared read-only door-state mirror for status responders.
    pub fn status(&self) -> DoorStatus {
        self.status.clone()
    }

    /// Pending-message count in the outbound queue.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn queue_is_running(&self) -> bool {
        self.queue.is_running()
    }
}
