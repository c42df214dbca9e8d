//! System clock adapter.
//!
//! Timestamps use 100 ns ticks since the Unix epoch. On ESP-IDF the wall
//! clock is only meaningful once SNTP has synced after WiFi association;
//! before that, tick values are small but still ordered.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;

/// 100 ns ticks per second.
const TICKS_PER_SEC: i64 = 10_000_000;

pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now_ticks(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => {
                d.as_secs() as i64 * TICKS_PER_SEC + i64::from(d.subsec_nanos()) / 100
            }
            // Clock before the epoch: report zero rather than panic.
            Err(_) => 0,
        }
    }
}
