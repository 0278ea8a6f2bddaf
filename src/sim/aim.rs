//! Enemy aiming and miss-driven learning
//!
//! The enemy aims along the straight line to its target's body, bent by a
//! remembered angle offset, and fires at a remembered speed. After every
//! miss both are nudged by random jitter whose size grows with the miss.
//! This is stochastic hill climbing with no convergence guarantee: a bad
//! roll can make the next shot worse.

use glam::Vec2;
use rand::Rng;

use super::state::AimState;
use crate::direction;
use crate::tuning::{AimTuning, JitterBand};

/// Launch parameters chosen by [`aim`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolution {
    /// Screen-space angle in radians (y down)
    pub angle: f32,
    pub speed: f32,
}

impl AimSolution {
    pub fn velocity(&self) -> Vec2 {
        direction(self.angle) * self.speed
    }
}

/// Miss-size classes, each with its own jitter amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissBand {
    /// Close call: fine angle corrections
    Near,
    Medium,
    /// Way off: mostly speed corrections
    Large,
}

impl MissBand {
    pub fn classify(miss_distance: f32, tuning: &AimTuning) -> Self {
        if miss_distance > tuning.large_miss_threshold {
            MissBand::Large
        } else if miss_distance < tuning.near_miss_threshold {
            MissBand::Near
        } else {
            MissBand::Medium
        }
    }

    fn jitter(self, tuning: &AimTuning) -> JitterBand {
        match self {
            MissBand::Near => tuning.near,
            MissBand::Medium => tuning.medium,
            MissBand::Large => tuning.large,
        }
    }
}

/// Pick an angle and speed toward `target_pos`. Pure, no randomness.
pub fn aim(shooter_pos: Vec2, target_pos: Vec2, state: &AimState) -> AimSolution {
    let delta = target_pos - shooter_pos;
    let base_angle = delta.y.atan2(delta.x);
    AimSolution {
        angle: base_angle + state.angle_offset,
        speed: state.speed,
    }
}

/// Severity of a miss in `[0, 1]`
#[inline]
pub fn miss_severity(miss_distance: f32, tuning: &AimTuning) -> f32 {
    (miss_distance / tuning.reference_distance).min(1.0)
}

/// Adjust aim after a miss.
///
/// Non-finite or negative distances are ignored. Speed always ends inside
/// the tuning's bounds. Returns the band used, or `None` when ignored.
pub fn learn(
    state: &mut AimState,
    miss_distance: f32,
    tuning: &AimTuning,
    rng: &mut impl Rng,
) -> Option<MissBand> {
    if !miss_distance.is_finite() || miss_distance < 0.0 {
        log::debug!("Ignoring miss distance {}", miss_distance);
        return None;
    }

    let band = MissBand::classify(miss_distance, tuning);
    let jitter = band.jitter(tuning);
    let gain = state.improvement_factor * (1.0 + miss_severity(miss_distance, tuning));

    // Draw order is fixed (angle, then speed) so seeded runs replay exactly
    let angle_roll: f32 = rng.random_range(-1.0..=1.0);
    let speed_roll: f32 = rng.random_range(-1.0..=1.0);

    state.angle_offset += angle_roll * jitter.angle * gain;
    state.speed = tuning.clamp_speed(state.speed + speed_roll * jitter.speed * gain);
    state.last_miss_distance = miss_distance;

    log::debug!(
        "Learned from {:?} miss of {:.1}: offset={:.3} speed={:.2}",
        band,
        miss_distance,
        state.angle_offset,
        state.speed
    );

    Some(band)
}
