use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source plus the loop's only blocking point.
pub trait Clock {
    /// Time since the clock's origin. Never decreases.
    fn now(&self) -> Duration;

    /// Blocks for at least roughly `duration`. May oversleep.
    fn sleep_for(&mut self, duration: Duration);
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }

    fn sleep_for(&mut self, duration: Duration) {
        if duration > Duration::ZERO {
            thread::sleep(duration);
        }
    }
}
