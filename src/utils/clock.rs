//! Time sources
//!
//! Timer-driven behaviour (autosave intervals, the software playback timeline)
//! reads time through [`Clock`] so hosts and tests can control it.
//!
//! Timestamps shown to the user come from [`Clock::now`]. Intervals are
//! measured on [`Clock::monotonic`], which never goes backwards when the
//! system time is changed.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Wall time
    fn now(&self) -> DateTime<Utc>;

    /// Time since the clock was created. Never decreases.
    fn monotonic(&self) -> Duration;
}

pub type SharedClock = Arc<dyn Clock>;

/// Wall clock for timestamps, `Instant` for intervals
#[derive(Debug, Clone, Copy)]
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
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Debug)]
struct ManualTime {
    wall: DateTime<Utc>,
    elapsed: Duration,
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    time: Arc<Mutex<ManualTime>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            time: Arc::new(Mutex::new(ManualTime {
                wall: start,
                elapsed: Duration::ZERO,
            })),
        }
    }

    /// Move both wall and monotonic time forward
    pub fn advance(&self, by: Duration) {
        let wall_step = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        let mut time = self.time.lock();
        time.wall += wall_step;
        time.elapsed += by;
    }

    /// Change the wall time only, like a user adjusting the system clock
    pub fn set(&self, to: DateTime<Utc>) {
        self.time.lock().wall = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.time.lock().wall
    }

    fn monotonic(&self) -> Duration {
        self.time.lock().elapsed
    }
}

/// Elapsed time between two instants, zero if `later` is before `earlier`
pub fn elapsed_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> Duration {
    (later - earlier).to_std().unwrap_or(Duration::ZERO)
}
