//! Periodic driver for [`TimerEngine::tick`](super::TimerEngine::tick).
//!
//! Each step runs to completion before the next period is awaited, so two
//! ticks are never in flight at once. Missed periods are skipped rather
//! than replayed in a burst.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Call `step` once per period until it breaks. Returns the number of
    /// steps taken.
    pub async fn run<F>(&self, mut step: F) -> u64
    where
        F: FnMut() -> ControlFlow<()>,
    {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately.
        interval.tick().await;

        let mut steps = 0;
        loop {
            interval.tick().await;
            steps += 1;
            if step().is_break() {
                return steps;
            }
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::every_second()
    }
}
