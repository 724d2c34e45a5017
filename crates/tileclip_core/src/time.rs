//! Wall-clock to tick conversion.
//!
//! The scheduler only understands whole ticks. `StepClock` accumulates real
//! frame time in integer microseconds and hands out the number of ticks to
//! feed the scheduler, carrying the remainder to the next frame.

use std::time::Duration;

/// 60 ticks per second.
pub const DEFAULT_TICK_US: u64 = 16_667;

/// Longest frame accepted before the accumulator is capped.
pub const DEFAULT_MAX_FRAME_US: u64 = 250_000;

#[derive(Debug, Clone)]
pub struct StepClock {
    pub tick_us: u64,
    pub max_frame_us: u64,
    accumulator_us: u64,
    pub total_ticks: u64,
    pub frame_count: u64,
    pub ticks_this_frame: u64,
}

impl StepClock {
    pub fn new() -> Self {
        Self::with_tick(DEFAULT_TICK_US)
    }

    /// Clock emitting one tick per `tick_us` microseconds (at least 1).
    pub fn with_tick(tick_us: u64) -> Self {
        Self {
            tick_us: tick_us.max(1),
            max_frame_us: DEFAULT_MAX_FRAME_US,
            accumulator_us: 0,
            total_ticks: 0,
            frame_count: 0,
            ticks_this_frame: 0,
        }
    }

    /// Clock for a target tick rate in Hz.
    pub fn from_hz(hz: u32) -> Self {
        Self::with_tick(1_000_000 / u64::from(hz.max(1)))
    }

    pub fn feed(&mut self, frame_time: Duration) -> u64 {
        let micros = u64::try_from(frame_time.as_micros()).unwrap_or(u64::MAX);
        self.feed_micros(micros)
    }

    /// Account for one rendered frame lasting `frame_us` and return how many
    /// whole ticks to simulate.
    pub fn feed_micros(&mut self, frame_us: u64) -> u64 {
        let mut frame_us = frame_us;
        // Spiral-of-death cap
        if frame_us > self.max_frame_us {
            log::warn!(
                "Frame took {:.1}ms; capping to {:.1}ms",
                frame_us as f64 / 1000.0,
                self.max_frame_us as f64 / 1000.0
            );
            frame_us = self.max_frame_us;
        }

        self.accumulator_us += frame_us;
        let ticks = self.accumulator_us / self.tick_us;
        self.accumulator_us %= self.tick_us;

        self.ticks_this_frame = ticks;
        self.total_ticks += ticks;
        self.frame_count += 1;
        ticks
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator_us as f64 / self.tick_us as f64
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new()
    }
}
