//! Archery duel simulation
//!
//! Flight, hit tests, enemy aim and round flow. Everything here is driven by
//! fixed ticks and the match's seeded RNG, iterates entities in id order,
//! and never touches a window, DOM or file.

pub mod aim;
pub mod clock;
pub mod collision;
pub mod projectile;
pub mod round;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use aim::{AimSolution, MissBand, aim, learn};
pub use clock::FixedClock;
pub use collision::{first_hit, out_of_bounds};
pub use projectile::{StepEvent, launch, step};
pub use round::{EnemyAi, MatchState, Scores};
pub use snapshot::Snapshot;
pub use state::{
    AimState, Arena, GameEvent, Projectile, ProjectileState, RoundPhase, Score, Shooter,
    ShooterId, Side, Termination,
};
pub use tick::{TickInput, tick};
