//! Fixed-timestep frame governor.
//!
//! Wall-clock time feeds an accumulator; the simulation consumes it in
//! fixed 1/60 s slices so physics and animation counters advance the same
//! way regardless of display refresh rate. A cap on the per-frame delta
//! stops the spiral of death after a long stall (window drag, debugger
//! pause).

use std::time::{Duration, Instant};

/// Frames in the rolling window behind `fps()` / `frame_time_ms()`.
const FPS_WINDOW: usize = 60;

pub struct TimeState {
    step: Duration,
    cap: Duration,
    accumulator: Duration,
    last_instant: Instant,
    pub fixed_step_count: u64,
    pub steps_this_frame: u32,
    recent: [Duration; FPS_WINDOW],
    recent_index: usize,
}

impl TimeState {
    pub fn new(steps_per_second: u32) -> Self {
        let step = Duration::from_secs(1) / steps_per_second;
        Self {
            step,
            cap: Duration::from_millis(250),
            accumulator: Duration::ZERO,
            last_instant: Instant::now(),
            fixed_step_count: 0,
            steps_this_frame: 0,
            recent: [step; FPS_WINDOW],
            recent_index: 0,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let mut real_dt = now - self.last_instant;
        self.last_instant = now;

        if real_dt > self.cap {
            log::warn!(
                "Frame took {:?}, capping accumulator at {:?}",
                real_dt,
                self.cap
            );
            real_dt = self.cap;
        }

        self.accumulator += real_dt;
        self.steps_this_frame = 0;
        self.recent[self.recent_index] = real_dt;
        self.recent_index = (self.recent_index + 1) % FPS_WINDOW;
    }

    /// Consume one fixed slice if enough time has accumulated. Called in a
    /// loop: a slow frame yields several catch-up steps, a fast one zero.
    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    fn average_frame_time(&self) -> Duration {
        self.recent.iter().sum::<Duration>() / FPS_WINDOW as u32
    }

    /// Smoothed frames-per-second over the recent window.
    pub fn fps(&self) -> f64 {
        let avg = self.average_frame_time().as_secs_f64();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    /// Smoothed frame time in milliseconds over the recent window.
    pub fn frame_time_ms(&self) -> f64 {
        self.average_frame_time().as_secs_f64() * 1000.0
    }
}
