//! Cooperative event pump bookkeeping.
//!
//! No timers or signals here. Long operations poll a yield point, and the
//! pump only says whether a tick is due; ticks that would land re-entrantly
//! are dropped by the session.

use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct EventPump {
    interval: Duration,
    last_tick: Instant,
    active: bool,
    in_tick: bool,
}

impl EventPump {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: Instant::now(),
            active: false,
            in_tick: false,
        }
    }

    pub fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.last_tick = Instant::now();
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Whether a tick is owed. Stays true until someone actually ticks, so a
    /// dropped tick is retried at the next yield point.
    pub fn due(&self) -> bool {
        self.active && self.last_tick.elapsed() >= self.interval
    }

    pub(crate) fn begin_tick(&mut self) {
        self.in_tick = true;
        self.last_tick = Instant::now();
    }

    pub(crate) fn end_tick(&mut self) {
        self.in_tick = false;
    }

    pub(crate) fn in_tick(&self) -> bool {
        self.in_tick
    }
}

impl Default for EventPump {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
