// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session clocks.
//!
//! Menu polling, move retries and the migration ceiling all measure elapsed
//! time through [`Clock`]. Sessions get a [`SystemClock`]; tests hand them a
//! [`FakeClock`] so backoff sleeps return immediately.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Block the calling session for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Monotonic wall clock whose origin is its creation.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
struct Timeline {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// Clock that only moves when told to.
///
/// `sleep` records the requested duration and jumps forward by it. Clones
/// observe the same timeline, so a test can keep one half and give the
/// other to a session.
#[derive(Clone, Debug, Default)]
pub struct FakeClock {
    timeline: Arc<Mutex<Timeline>>,
}

impl FakeClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            timeline: Arc::new(Mutex::new(Timeline {
                elapsed: Duration::from_millis(start_millis),
                sleeps: Vec::new(),
            })),
        }
    }

    pub fn at_epoch() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut timeline = self.timeline.lock();
        timeline.elapsed = timeline.elapsed.saturating_add(by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn sleep_count(&self) -> u64 {
        self.timeline.lock().sleeps.len() as u64
    }

    /// Durations passed to `sleep`, oldest first.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.timeline.lock().sleeps.clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.timeline.lock().elapsed
    }

    fn sleep(&self, duration: Duration) {
        let mut timeline = self.timeline.lock();
        timeline.sleeps.push(duration);
        timeline.elapsed = timeline.elapsed.saturating_add(duration);
    }
}

/// The clock a session context owns.
#[derive(Clone)]
pub struct ClockHandle {
    clock: Arc<dyn Clock>,
    simulated: bool,
}

impl ClockHandle {
    pub fn system() -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            simulated: false,
        }
    }

    /// Fake clock starting at zero.
    pub fn fake() -> Self {
        FakeClock::at_epoch().into()
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }
}

impl Clock for ClockHandle {
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }
}

impl Default for ClockHandle {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for ClockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockHandle")
            .field("simulated", &self.simulated)
            .field("now", &self.clock.now())
            .finish()
    }
}

impl From<FakeClock> for ClockHandle {
    fn from(clock: FakeClock) -> Self {
        Self {
            clock: Arc::new(clock),
            simulated: true,
        }
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
