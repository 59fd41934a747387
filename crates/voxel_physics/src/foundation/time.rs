//! Time management utilities

use std::time::{Duration, Instant};

/// Simulation clock driven by the elapsed time handed to each tick
///
/// Throttled work (grid rebuilds, cache sweeps) is scheduled against this
/// clock rather than `Instant::now()` so that a simulation stepped by a
/// test harness behaves exactly like one stepped by a render loop.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ms: f64,
    tick_count: u64,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick
    pub fn advance(&mut self, elapsed_ms: f32) {
        self.now_ms += f64::from(elapsed_ms);
        self.tick_count += 1;
    }

    /// Current simulation time in milliseconds
    pub const fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of ticks seen so far
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub const fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self
            .start_time
            .map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_clock_accumulates() {
        let mut clock = SimClock::new();
        clock.advance(16.0);
        clock.advance(16.0);
        assert_eq!(clock.now_ms(), 32.0);
        assert_eq!(clock.tick_count(), 2);
    }

    #[test]
    fn test_stopwatch_stops() {
        let mut stopwatch = Stopwatch::start_new();
        stopwatch.stop();
        let first = stopwatch.elapsed();
        assert_eq!(first, stopwatch.elapsed());
    }
}
