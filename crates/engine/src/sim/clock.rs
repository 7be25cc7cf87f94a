//! Millisecond-resolution simulation clock.
//!
//! The clock is zeroed when the simulation starts; every event-log line
//! carries a lap timestamp in `HH:MM:SS.mmmmmm` form. [`SimClock::wait`] is
//! the primitive that drives simulated time forward.

use std::thread;
use std::time::{Duration, Instant};

/// Wall-clock timer for event-log timestamps.
#[derive(Debug, Default)]
pub struct SimClock {
    started: Option<Instant>,
}

impl SimClock {
    /// Creates a clock that has not been zeroed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes the clock; laps are measured from this point.
    pub fn zero(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Formats the elapsed time since [`zero`](Self::zero) as
    /// `HH:MM:SS.mmmmmm`. A clock that was never zeroed reads as zero.
    pub fn lap(&self) -> String {
        let elapsed = self
            .started
            .map(|started| started.elapsed())
            .unwrap_or_default();
        format_elapsed(elapsed)
    }

    /// Takes a final lap and stops the clock.
    pub fn stop(&mut self) -> String {
        let stamp = self.lap();
        self.started = None;
        stamp
    }

    /// Blocks the calling thread for `ms` milliseconds of wall time.
    pub fn wait(ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:06}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        elapsed.subsec_micros()
    )
}
