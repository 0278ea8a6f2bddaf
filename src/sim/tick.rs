//! Simulation tick
//!
//! Advances a match by one step: input, enemy cadence, projectile flight,
//! scoring and learning, in that order.

use super::aim::learn;
use super::projectile::{StepEvent, step};
use super::round::MatchState;
use super::state::{GameEvent, RoundPhase, Shooter, ShooterId, Side, Termination};
use crate::secs_to_ticks;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Player elevation in degrees (0-90)
    pub angle: f32,
    /// Player power (min_power-100)
    pub power: f32,
    /// Loose the player's arrow
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            angle: 45.0,
            power: 50.0,
            fire: false,
            pause: false,
        }
    }
}

/// Advance the match by `dt` ticks (1.0 = one reference frame).
///
/// A negative or non-finite `dt` is treated as zero.
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    // Handle pause toggle
    if input.pause {
        match state.phase {
            RoundPhase::Playing => {
                state.phase = RoundPhase::Paused;
                log::info!("Paused");
                return events;
            }
            RoundPhase::Paused => {
                state.phase = RoundPhase::Playing;
                log::info!("Resumed");
            }
            RoundPhase::RoundOver { .. } => {}
        }
    }

    match state.phase {
        RoundPhase::Paused => return events,
        RoundPhase::RoundOver { winner, restart_in } => {
            let restart_in = restart_in - dt;
            if restart_in <= 0.0 {
                events.push(state.start_round());
            } else {
                state.phase = RoundPhase::RoundOver { winner, restart_in };
            }
            return events;
        }
        RoundPhase::Playing => {}
    }

    state.time_ticks += 1;

    if input.fire {
        events.extend(state.fire_player(input.angle, input.power));
    }

    // Enemies fire on their own cadence; a busy bow skips the opportunity
    for i in 0..state.enemies.len() {
        state.enemies[i].fire_cooldown -= dt;
        if state.enemies[i].fire_cooldown <= 0.0 {
            let shooter = state.enemies[i].shooter;
            events.extend(state.fire_enemy(shooter));
            state.enemies[i].fire_cooldown = state.roll_fire_cooldown();
        }
    }

    // Fly every arrow once; only the first cross-side hit decides the round
    let gravity = state.tuning.gravity;
    let mut winner = None;
    let mut misses = Vec::new();
    for p in state.projectiles.iter_mut() {
        match step(p, &state.shooters, &state.arena, gravity, dt) {
            StepEvent::Hit(target) => {
                let owner_side = side_of(&state.shooters, p.owner);
                let target_side = side_of(&state.shooters, target);
                let critical = winner.is_none() && owner_side.is_some() && owner_side != target_side;
                if critical {
                    winner = owner_side;
                } else {
                    misses.push((p.owner, p.closest_approach));
                }
                events.push(GameEvent::Hit {
                    projectile: p.id,
                    shooter: p.owner,
                    target,
                    critical,
                });
            }
            StepEvent::OutOfBounds => {
                misses.push((p.owner, p.closest_approach));
                events.push(GameEvent::OutOfBounds {
                    projectile: p.id,
                    shooter: p.owner,
                });
            }
            StepEvent::InFlight | StepEvent::AlreadyTerminated => {}
        }
    }

    // Each missed enemy arrow teaches its archer exactly once
    for (owner, miss_distance) in misses {
        let Some(enemy) = state.enemies.iter_mut().find(|e| e.shooter == owner) else {
            continue;
        };
        if learn(&mut enemy.aim, miss_distance, &state.tuning.aim, &mut state.rng).is_some() {
            events.push(GameEvent::Learned {
                shooter: owner,
                miss_distance,
                angle_offset: enemy.aim.angle_offset,
                speed: enemy.aim.speed,
            });
        }
    }

    match winner {
        Some(side) => {
            state.scores.side_mut(side).wins += 1;
            state.projectiles.clear();
            state.phase = RoundPhase::RoundOver {
                winner: side,
                restart_in: secs_to_ticks(state.tuning.round_restart_secs),
            };
            log::info!(
                "Round {} won by {:?} (player {} - {} enemy)",
                state.round,
                side,
                state.scores.player.wins,
                state.scores.enemy.wins
            );
            events.push(GameEvent::RoundOver { winner: side });
        }
        None => state.projectiles.retain(|p| p.is_flying()),
    }

    events
}

fn side_of(shooters: &[Shooter], id: ShooterId) -> Option<Side> {
    shooters.iter().find(|s| s.id == id).map(|s| s.side)
}

/// Whether an event ended a projectile's flight as a miss
pub fn is_miss(event: &GameEvent) -> bool {
    matches!(
        event,
        GameEvent::OutOfBounds { .. } | GameEvent::Hit { critical: false, .. }
    )
}

/// Terminal reason for a finished projectile, if the event carries one
pub fn termination_of(event: &GameEvent) -> Option<Termination> {
    match event {
        GameEvent::Hit { target, .. } => Some(Termination::Hit(*target)),
        GameEvent::OutOfBounds { .. } => Some(Termination::OutOfBounds),
        _ => None,
    }
}

/// Drop the oldest events so at most `cap` remain
pub fn trim_backlog(events: &mut Vec<GameEvent>, cap: usize) {
    if events.len() > cap {
        let overflow = events.len() - cap;
        events.drain(..overflow);
    }
}
