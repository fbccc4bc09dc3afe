//! Converts variable frame times into whole fixed-length simulation ticks

use shared::TICK_DT;

/// Upper bound on ticks replayed after a single slow frame
pub const MAX_TICKS_PER_FRAME: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TickScheduler {
    step: f32,
    max_ticks: u32,
    accumulator: f32,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::with_step(TICK_DT, MAX_TICKS_PER_FRAME)
    }

    pub fn with_step(step: f32, max_ticks: u32) -> Self {
        Self {
            step,
            max_ticks,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Adds `frame_time` seconds and returns how many ticks are now due.
    ///
    /// Time beyond `max_ticks` is dropped, keeping only the sub-tick remainder.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        if frame_time.is_finite() && frame_time > 0.0 {
            self.accumulator += frame_time;
        }

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_ticks {
            self.accumulator -= self.step;
            ticks += 1;
        }

        if self.accumulator >= self.step {
            self.accumulator %= self.step;
        }
        ticks
    }

    /// Runs `tick` once per due tick with the fixed step
    pub fn run<F: FnMut(f32)>(&mut self, frame_time: f32, mut tick: F) -> u32 {
        let ticks = self.advance(frame_time);
        for _ in 0..ticks {
            tick(self.step);
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}
