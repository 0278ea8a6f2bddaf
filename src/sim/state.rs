//! Simulation data model
//!
//! Shooters, projectiles, per-enemy aim memory and the arena they live in.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::{AimTuning, Tuning};

/// Entity id shared by shooters and projectiles
pub type ShooterId = u32;

/// Which side of the duel a shooter fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// A shooter: can fire arrows and be hit by them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shooter {
    pub id: ShooterId,
    pub side: Side,
    /// Feet position
    pub pos: Vec2,
    /// Body centre sits this far above the feet
    pub body_offset: f32,
    pub hit_radius: f32,
}

impl Shooter {
    pub fn new(id: ShooterId, side: Side, tuning: &Tuning) -> Self {
        Self {
            id,
            side,
            pos: Vec2::ZERO,
            body_offset: tuning.body_offset,
            hit_radius: tuning.hit_radius,
        }
    }

    /// Collision centre ("centre of mass") above the feet
    #[inline]
    pub fn body_center(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.body_offset)
    }
}

/// Terminal result of a projectile's flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Hit(ShooterId),
    OutOfBounds,
}

/// Projectile lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Flying,
    Terminated(Termination),
}

/// An arrow in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: ShooterId,
    /// Shooter this arrow was aimed at, used for miss distance
    pub target: Option<ShooterId>,
    /// Closest distance to the target's body centre seen so far
    pub closest_approach: f32,
    /// Ticks flown
    pub ticks: u32,
    /// Ticks of flight left before the arrow is retired
    pub ttl: f32,
    pub state: ProjectileState,
}

impl Projectile {
    /// Create a flying projectile with an explicit velocity
    pub fn from_velocity(id: u32, origin: Vec2, vel: Vec2, owner: ShooterId) -> Self {
        Self {
            id,
            pos: origin,
            vel,
            owner,
            target: None,
            closest_approach: f32::INFINITY,
            ticks: 0,
            ttl: crate::secs_to_ticks(crate::consts::MAX_FLIGHT_SECS),
            state: ProjectileState::Flying,
        }
    }

    /// Override the flight lifetime (ticks)
    pub fn with_lifetime(mut self, ttl: f32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Record the shooter this arrow is meant for
    pub fn aimed_at(mut self, target: ShooterId) -> Self {
        self.target = Some(target);
        self
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    /// Terminal event, if the flight is over
    pub fn termination(&self) -> Option<Termination> {
        match self.state {
            ProjectileState::Flying => None,
            ProjectileState::Terminated(t) => Some(t),
        }
    }

    /// Heading in radians (screen space), for drawing the arrow
    pub fn heading(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }
}

/// Per-enemy aim memory, updated only by the learner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimState {
    /// Added to the straight-line angle toward the target (radians)
    pub angle_offset: f32,
    /// Launch speed, always within the tuning's speed bounds
    pub speed: f32,
    pub improvement_factor: f32,
    pub last_miss_distance: f32,
}

impl AimState {
    pub fn new(tuning: &AimTuning) -> Self {
        Self {
            angle_offset: 0.0,
            speed: tuning.clamp_speed(tuning.default_speed),
            improvement_factor: tuning.improvement_factor,
            last_miss_distance: 0.0,
        }
    }

    /// Forget everything learned (round start)
    pub fn reset(&mut self, tuning: &AimTuning) {
        *self = Self::new(tuning);
    }
}

/// Bounded 2D arena with a floor line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub ground_height: f32,
    /// Slack beyond the side walls
    pub margin: f32,
}

impl Arena {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            width: tuning.arena_width,
            height: tuning.arena_height,
            ground_height: tuning.ground_height,
            margin: tuning.arena_margin,
        }
    }

    /// Y coordinate of the floor line
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.height - self.ground_height
    }
}

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Arrows flying, both sides may fire
    Playing,
    /// Game is paused
    Paused,
    /// A decisive hit landed; next round starts when the timer runs out
    RoundOver { winner: Side, restart_in: f32 },
}

/// Events emitted by a tick, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { round: u32 },
    Fired { shooter: ShooterId, projectile: u32 },
    Hit {
        projectile: u32,
        shooter: ShooterId,
        target: ShooterId,
        /// Only the first hit of a round is decisive; later ones are cosmetic
        critical: bool,
    },
    OutOfBounds { projectile: u32, shooter: ShooterId },
    Learned {
        shooter: ShooterId,
        miss_distance: f32,
        angle_offset: f32,
        speed: f32,
    },
    RoundOver { winner: Side },
}

/// Per-side score keeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Rounds won (persists across rounds)
    pub wins: u32,
    /// Arrows fired this round
    pub shots: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_center_is_above_feet() {
        let tuning = Tuning::default();
        let mut shooter = Shooter::new(1, Side::Player, &tuning);
        shooter.pos = Vec2::new(100.0, 500.0);
        assert_eq!(shooter.body_center(), Vec2::new(100.0, 500.0 - tuning.body_offset));
    }

    #[test]
    fn test_aim_state_reset() {
        let tuning = AimTuning::default();
        let mut aim = AimState::new(&tuning);
        aim.angle_offset = 0.7;
        aim.speed = tuning.max_speed;
        aim.last_miss_distance = 55.0;
        aim.reset(&tuning);
        assert_eq!(aim, AimState::new(&tuning));
        assert_eq!(aim.speed, tuning.default_speed);
    }

    #[test]
    fn test_projectile_termination_accessor() {
        let mut p = Projectile::from_velocity(1, Vec2::ZERO, Vec2::X, 7).aimed_at(9);
        assert!(p.is_flying());
        assert_eq!(p.target, Some(9));
        assert_eq!(p.termination(), None);
        p.state = ProjectileState::Terminated(Termination::Hit(9));
        assert_eq!(p.termination(), Some(Termination::Hit(9)));
    }
}
