use std::time::{Duration, Instant};

/// Paces a polling loop to a fixed period. If the work between ticks overran
/// the period, the next tick returns immediately.
pub struct Interval {
    last_tick: Instant,
    period: Duration,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            last_tick: Instant::now(),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn tick(&mut self) {
        let current_tick = Instant::now();
        let last_tick_duration = current_tick - self.last_tick;

        if last_tick_duration < self.period {
            std::thread::sleep(self.period - last_tick_duration);
        }

        self.last_tick = Instant::now();
    }
}
