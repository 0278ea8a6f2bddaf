//! Fletch - a 2D archery duel simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (projectiles, adaptive aim, round state)
//! - `tuning`: Data-driven game balance
//! - `wasm`: Browser bindings for a canvas host (wasm32 only)

pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use tuning::{AimTuning, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
///
/// Distances are screen pixels (y grows downward), speeds are pixels per
/// reference frame, and gravity is added to vertical velocity once per frame.
pub mod consts {
    /// Reference frame rate the per-tick constants were tuned against
    pub const TICK_RATE: f32 = 60.0;
    /// Wall-clock length of one fixed simulation step
    pub const SIM_DT_SECS: f32 = 1.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 1000.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Height of the ground band at the bottom of the arena
    pub const GROUND_HEIGHT: f32 = 50.0;
    /// Horizontal slack beyond the side walls before an arrow is discarded
    pub const ARENA_MARGIN: f32 = 50.0;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.4;

    /// Launch speed at zero power
    pub const BASE_SPEED: f32 = 10.0;
    /// Extra launch speed at full power
    pub const SPEED_RANGE: f32 = 20.0;
    pub const MIN_POWER: f32 = 10.0;
    pub const MAX_POWER: f32 = 100.0;
    pub const MAX_ANGLE_DEG: f32 = 90.0;

    /// Shooter body hit circle
    pub const HIT_RADIUS: f32 = 30.0;
    /// Body centre sits this far above the shooter's feet
    pub const BODY_OFFSET: f32 = 100.0;
    /// Arrow spawn points relative to the shooter's feet
    pub const PLAYER_BOW_OFFSET: (f32, f32) = (20.0, -120.0);
    pub const ENEMY_BOW_OFFSET: (f32, f32) = (-5.0, -115.0);

    /// Enemy aim defaults
    pub const ENEMY_DEFAULT_SPEED: f32 = 15.0;
    pub const ENEMY_MIN_SPEED_FACTOR: f32 = 0.6;
    pub const ENEMY_MAX_SPEED_FACTOR: f32 = 1.6;
    pub const IMPROVEMENT_FACTOR: f32 = 0.3;
    /// Miss-distance thresholds (multiplied by the tuning scale)
    pub const LARGE_MISS_DISTANCE: f32 = 100.0;
    pub const NEAR_MISS_DISTANCE: f32 = 40.0;
    pub const REFERENCE_MISS_DISTANCE: f32 = 200.0;

    /// Enemy fires at a random interval in this range (seconds)
    pub const ENEMY_FIRE_MIN_SECS: f32 = 1.5;
    pub const ENEMY_FIRE_MAX_SECS: f32 = 2.5;
    /// Pause between a decisive hit and the next round (seconds)
    pub const ROUND_RESTART_SECS: f32 = 0.5;
    /// Arrows still airborne after this long are retired (seconds)
    pub const MAX_FLIGHT_SECS: f32 = 20.0;
}

/// Convert seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> f32 {
    (secs * consts::TICK_RATE).round().max(1.0)
}

/// Unit direction for a screen-space angle in radians (y down)
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Unit launch direction for an elevation in degrees above the horizon.
///
/// Up is negative y in screen space, so the vertical component is flipped.
#[inline]
pub fn elevation_direction(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}
