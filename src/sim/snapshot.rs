//! Serializable view of a match for hosts
//!
//! Renderers read positions from here instead of reaching into the match
//! state, and the runner writes these as replay frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::round::MatchState;
use super::state::{RoundPhase, Score, ShooterId, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShooterView {
    pub id: ShooterId,
    pub side: Side,
    /// Feet position
    pub pos: Vec2,
    pub body_center: Vec2,
    pub hit_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u32,
    pub owner: ShooterId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rotation for drawing the arrow (radians)
    pub heading: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AimView {
    pub shooter: ShooterId,
    pub angle_offset: f32,
    pub speed: f32,
    pub last_miss_distance: f32,
}

/// Everything a host needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub round: u32,
    pub phase: RoundPhase,
    pub floor_y: f32,
    pub shooters: Vec<ShooterView>,
    pub projectiles: Vec<ProjectileView>,
    pub aims: Vec<AimView>,
    pub player_score: Score,
    pub enemy_score: Score,
}

impl Snapshot {
    pub fn capture(state: &MatchState) -> Self {
        Self {
            tick: state.time_ticks,
            round: state.round,
            phase: state.phase,
            floor_y: state.arena.floor_y(),
            shooters: state
                .shooters
                .iter()
                .map(|s| ShooterView {
                    id: s.id,
                    side: s.side,
                    pos: s.pos,
                    body_center: s.body_center(),
                    hit_radius: s.hit_radius,
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .filter(|p| p.is_flying())
                .map(|p| ProjectileView {
                    id: p.id,
                    owner: p.owner,
                    pos: p.pos,
                    vel: p.vel,
                    heading: p.heading(),
                })
                .collect(),
            aims: state
                .enemies
                .iter()
                .map(|e| AimView {
                    shooter: e.shooter,
                    angle_offset: e.aim.angle_offset,
                    speed: e.aim.speed,
                    last_miss_distance: e.aim.last_miss_distance,
                })
                .collect(),
            player_score: state.scores.player,
            enemy_score: state.scores.enemy,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
