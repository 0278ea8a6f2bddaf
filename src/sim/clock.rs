//! Fixed timestep accumulator
//!
//! Hosts drive the simulation from a display-rate frame callback with a
//! variable wall-clock delta. The clock turns that into zero or more fixed
//! ticks so trajectories do not depend on the monitor's refresh rate.

use crate::consts::{MAX_SUBSTEPS, SIM_DT_SECS};

/// Longest frame delta accepted (a tab returning from the background)
pub const MAX_FRAME_SECS: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct FixedClock {
    step_secs: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(SIM_DT_SECS, MAX_SUBSTEPS)
    }
}

impl FixedClock {
    pub fn new(step_secs: f32, max_substeps: u32) -> Self {
        let step_secs = if step_secs.is_finite() && step_secs > 0.0 {
            step_secs
        } else {
            SIM_DT_SECS
        };
        Self {
            step_secs,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    /// Add a frame's wall-clock time and return how many ticks to run.
    ///
    /// Never returns more than `max_substeps`; time that would need more is
    /// dropped to avoid a spiral of death.
    pub fn advance(&mut self, frame_secs: f32) -> u32 {
        let frame_secs = if frame_secs.is_finite() {
            frame_secs.clamp(0.0, MAX_FRAME_SECS)
        } else {
            0.0
        };
        self.accumulator += frame_secs;

        let mut steps = 0;
        while self.accumulator >= self.step_secs && steps < self.max_substeps {
            self.accumulator -= self.step_secs;
            steps += 1;
        }

        if steps == self.max_substeps && self.accumulator >= self.step_secs {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator %= self.step_secs;
        }

        steps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step_secs
    }
}
