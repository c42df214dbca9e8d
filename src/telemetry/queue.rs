//! Thread-safe FIFO of pending outbound messages with a background dispatch
//! worker.
//!
//! ```text
//!  control cycle ──enqueue──▶ ┌─────────────┐
//!                             │  RetryQueue │──peek──▶ dispatch(item)?
//!                             │  (VecDeque) │◀─commit── true
//!                             └─────────────┘    │
//!                                     ▲          └─ false: pause, retry head
//!                                     └── single worker thread
//! ```
//!
//! Invariants:
//! - Items are dispatched in strict enqueue order; no item is attempted
//!   while a predecessor is still pending (head-of-line blocking).
//! - The head is removed only after `dispatch` returns `true` — an explicit
//!   two-phase `peek_head` / `commit_head` operation.
//! - The internal lock is scoped to each queue operation and is never held
//!   across the `dispatch` callback, so a slow send stalls only subsequent
//!   dispatch attempts, never producers.
//! - Shutdown is cooperative: a stop request plus a bounded join grace.
//!   A worker that misses the grace window is reported as a fault and left
//!   detached, never force-terminated.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::error::ShutdownError;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Timing and bounding knobs for the dispatch worker.
#[derive(Debug, Clone, Copy)]
pub struct DispatchPolicy {
    /// Idle wait between wake-signal checks when the queue is empty.
    pub poll_interval: Duration,
    /// Pause after the first failed attempt on a head item.
    pub retry_delay: Duration,
    /// Ceiling for the doubling retry pause.
    pub retry_delay_cap: Duration,
    /// Capacity ceiling; the newest item is dropped beyond this.
    pub max_depth: usize,
    /// How long `stop` waits for the worker to exit.
    pub shutdown_grace: Duration,
}

impl DispatchPolicy {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.dispatch_poll_interval_ms.into()),
            retry_delay: Duration::from_millis(config.dispatch_retry_delay_ms.into()),
            retry_delay_cap: Duration::from_millis(config.dispatch_retry_delay_cap_ms.into()),
            max_depth: config.max_queue_depth,
            shutdown_grace: Duration::from_millis(config.shutdown_grace_ms.into()),
        }
    }
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Shared<T> {
    items: Mutex<VecDeque<T>>,
    wake: Condvar,
    /// Run generation. A worker keeps going only while this equals the value
    /// captured at its spawn; both `start` and `stop` bump it, so a worker
    /// that overslept its grace period can never race a successor.
    generation: AtomicU64,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        // The worker never panics while holding the lock; recover anyway.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Unordered-growth-free FIFO with a single retrying dispatch worker.
///
/// `T` is an opaque payload (the crate uses `Vec<u8>` of serialized events);
/// `Clone` is required because the head is peeked out of the lock for the
/// duration of the dispatch attempt.
pub struct RetryQueue<T> {
    shared: Arc<Shared<T>>,
    policy: DispatchPolicy,
    worker: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + 'static> RetryQueue<T> {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(VecDeque::new()),
                wake: Condvar::new(),
                generation: AtomicU64::new(0),
            }),
            policy,
            worker: None,
        }
    }

    // ── Producer side ─────────────────────────────────────────

    /// Append at the tail and wake the worker. Never blocks.
    ///
    /// Returns `false` when the capacity ceiling is hit and the item was
    /// dropped (drop-newest keeps the order of everything already accepted).
    pub fn enqueue(&self, item: T) -> bool {
        {
            let mut items = self.shared.lock();
            if items.len() >= self.policy.max_depth {
                warn!(
                    "QUEUE | at capacity ({}), dropping newest item",
                    self.policy.max_depth
                );
                return false;
            }
            items.push_back(item);
        }
        self.shared.wake.notify_one();
        true
    }

    /// Drop every pending item.
    pub fn clear(&self) {
        self.shared.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().is_empty()
    }

    // ── Two-phase head access ─────────────────────────────────
    //
    // Exposed so the retry discipline stays auditable independent of the
    // worker: an attempt peeks, and only a confirmed send commits.

    /// Copy of the head item, if any. Does not remove it.
    pub fn peek_head(&self) -> Option<T> {
        self.shared.lock().front().cloned()
    }

    /// Remove the head item after a successful dispatch.
    pub fn commit_head(&self) -> Option<T> {
        self.shared.lock().pop_front()
    }

    // ── Worker lifecycle ──────────────────────────────────────

    /// Spawn the background dispatch loop.
    ///
    /// Idempotent for a running queue: the previous worker is stopped
    /// cleanly first (pending items are untouched). `dispatch` returns
    /// `true` when the transport accepted the item.
    pub fn start<F>(&mut self, dispatch: F)
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                warn!("QUEUE | restart: previous worker not stopped cleanly: {e}");
            }
        }

        let my_gen = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let shared = Arc::clone(&self.shared);
        let policy = self.policy;

        let handle = thread::Builder::new()
            .name("telemetry-dispatch".into())
            .spawn(move || worker_loop(&shared, &policy, my_gen, dispatch));

        match handle {
            Ok(h) => {
                debug!("QUEUE | dispatch worker started (gen {my_gen})");
                self.worker = Some(h);
            }
            Err(e) => warn!("QUEUE | failed to spawn dispatch worker: {e}"),
        }
    }

    /// Request stop, wake the worker, and join with a bounded grace period.
    ///
    /// A grace-period overrun is a reportable fault
    /// ([`ShutdownError::WorkerUnresponsive`]); the thread is detached, not
    /// killed. Its stale generation keeps it from starting new attempts and
    /// from committing an attempt it was still inside, so it can never pop
    /// an item a successor worker has yet to deliver.
    pub fn stop(&mut self) -> Result<(), ShutdownError> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };

        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        self.shared.wake.notify_all();

        let deadline = Instant::now() + self.policy.shutdown_grace;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        if handle.is_finished() {
            let _ = handle.join();
            info!("QUEUE | dispatch worker stopped");
            Ok(())
        } else {
            warn!("QUEUE | dispatch worker missed shutdown grace period");
            Err(ShutdownError::WorkerUnresponsive)
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for RetryQueue<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.shared.generation.fetch_add(1, Ordering::AcqRel);
            self.shared.wake.notify_all();
            let _ = handle;
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

fn worker_loop<T, F>(shared: &Shared<T>, policy: &DispatchPolicy, my_gen: u64, mut dispatch: F)
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    let still_mine = |shared: &Shared<T>| shared.generation.load(Ordering::Acquire) == my_gen;
    let mut retry_delay = policy.retry_delay;

    while still_mine(shared) {
        // Idle wait: a new-item signal or the poll interval, whichever first.
        {
            let items = shared.lock();
            if items.is_empty() {
                let result = shared.wake.wait_timeout(items, policy.poll_interval);
                drop(result.unwrap_or_else(PoisonError::into_inner));
            }
        }

        // Drain pass: attempt the head until it clears or stop is requested.
        while still_mine(shared) {
            let Some(item) = shared.lock().front().cloned() else {
                break;
            };

            // Lock released: the attempt itself never blocks producers.
            if dispatch(&item) {
                // Commit under the lock and only while current: a stale
                // worker surfacing from a long dispatch after shutdown must
                // not pop a head that now belongs to a successor. The
                // generation is bumped at stop(), before any successor can
                // exist, so a stale commit can never pass this check.
                let mut items = shared.lock();
                if still_mine(shared) {
                    items.pop_front();
                }
                drop(items);
                retry_delay = policy.retry_delay;
            } else {
                debug!("QUEUE | head dispatch failed, retrying in {retry_delay:?}");
                let items = shared.lock();
                let result = shared.wake.wait_timeout(items, retry_delay);
                drop(result.unwrap_or_else(PoisonError::into_inner));
                retry_delay = (retry_delay * 2).min(policy.retry_delay_cap);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
