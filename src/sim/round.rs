//! Match state and round lifecycle
//!
//! One player duels one or more scripted enemies. A round ends on the first
//! decisive hit; scores carry over, everything else is re-rolled.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::aim::aim;
use super::projectile::launch;
use super::snapshot::Snapshot;
use super::state::{
    AimState, Arena, GameEvent, Projectile, RoundPhase, Score, Shooter, ShooterId, Side,
};
use crate::secs_to_ticks;
use crate::tuning::Tuning;

/// Per-enemy brain: aim memory plus firing cadence
#[derive(Debug, Clone)]
pub struct EnemyAi {
    pub shooter: ShooterId,
    pub aim: AimState,
    /// Ticks until the next firing opportunity
    pub fire_cooldown: f32,
}

/// Scores for both sides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scores {
    pub player: Score,
    pub enemy: Score,
}

impl Scores {
    pub fn side_mut(&mut self, side: Side) -> &mut Score {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }
}

/// Complete match state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct MatchState {
    pub seed: u64,
    pub tuning: Tuning,
    pub arena: Arena,
    /// 1-based round number
    pub round: u32,
    /// Simulation tick counter (ticks while playing)
    pub time_ticks: u64,
    pub phase: RoundPhase,
    pub player: ShooterId,
    /// All shooters, sorted by id; collision order follows this order
    pub shooters: Vec<Shooter>,
    /// Live projectiles, sorted by id
    pub projectiles: Vec<Projectile>,
    pub enemies: Vec<EnemyAi>,
    pub scores: Scores,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl MatchState {
    /// Classic one-on-one duel
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_enemies(tuning, seed, 1)
    }

    /// Duel against `enemy_count` enemies (at least one)
    pub fn with_enemies(tuning: Tuning, seed: u64, enemy_count: usize) -> Self {
        let tuning = tuning.sanitized();
        let arena = Arena::from_tuning(&tuning);

        let mut state = Self {
            seed,
            arena,
            round: 0,
            time_ticks: 0,
            phase: RoundPhase::Playing,
            player: 0,
            shooters: Vec::new(),
            projectiles: Vec::new(),
            enemies: Vec::new(),
            scores: Scores::default(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        };

        let player = state.spawn_shooter(Side::Player);
        state.player = player;
        for _ in 0..enemy_count.max(1) {
            let id = state.spawn_shooter(Side::Enemy);
            let aim = AimState::new(&state.tuning.aim);
            state.enemies.push(EnemyAi {
                shooter: id,
                aim,
                fire_cooldown: 0.0,
            });
        }

        state.start_round();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_shooter(&mut self, side: Side) -> ShooterId {
        let id = self.next_entity_id();
        self.shooters.push(Shooter::new(id, side, &self.tuning));
        id
    }

    pub fn shooter(&self, id: ShooterId) -> Option<&Shooter> {
        self.shooters.iter().find(|s| s.id == id)
    }

    pub fn player_shooter(&self) -> Option<&Shooter> {
        self.shooter(self.player)
    }

    /// The shooter's arrow currently in flight, if any
    pub fn live_projectile_of(&self, owner: ShooterId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.owner == owner && p.is_flying())
    }

    pub fn enemy_ai(&self, shooter: ShooterId) -> Option<&EnemyAi> {
        self.enemies.iter().find(|e| e.shooter == shooter)
    }

    /// Begin a fresh round: re-place shooters, forget learned aim, clear arrows
    pub fn start_round(&mut self) -> GameEvent {
        self.round += 1;
        self.projectiles.clear();
        self.place_shooters();

        for i in 0..self.enemies.len() {
            let cooldown = self.roll_fire_cooldown();
            let enemy = &mut self.enemies[i];
            enemy.aim.reset(&self.tuning.aim);
            enemy.fire_cooldown = cooldown;
        }

        self.scores.player.shots = 0;
        self.scores.enemy.shots = 0;
        self.phase = RoundPhase::Playing;

        log::info!(
            "Round {} started (player {} - {} enemy)",
            self.round,
            self.scores.player.wins,
            self.scores.enemy.wins
        );
        GameEvent::RoundStarted { round: self.round }
    }

    /// Scatter shooters: player on the left, enemies on the right
    fn place_shooters(&mut self) {
        let width = self.arena.width;
        let height = self.arena.height;
        let rise = self.tuning.spawn_rise_min..=self.tuning.spawn_rise_max;

        for shooter in &mut self.shooters {
            let (lo, hi) = match shooter.side {
                Side::Player => (0.05, 0.20),
                Side::Enemy => (0.70, 0.95),
            };
            let x = width * self.rng.random_range(lo..=hi);
            let y = height - self.rng.random_range(rise.clone());
            shooter.pos = Vec2::new(x, y);
        }
    }

    /// Random delay before an enemy's next shot, in ticks
    pub(crate) fn roll_fire_cooldown(&mut self) -> f32 {
        let secs = self
            .rng
            .random_range(self.tuning.enemy_fire_min_secs..=self.tuning.enemy_fire_max_secs);
        secs_to_ticks(secs)
    }

    /// Fire the player's arrow if none is in flight
    pub fn fire_player(&mut self, angle_deg: f32, power: f32) -> Option<GameEvent> {
        if self.live_projectile_of(self.player).is_some() {
            return None;
        }
        let player = self.player_shooter()?.clone();
        let target = self.enemies.first().map(|e| e.shooter);

        let id = self.next_entity_id();
        let origin = player.pos + self.tuning.player_bow_offset;
        let mut arrow = launch(id, player.id, origin, angle_deg, power, &self.tuning);
        arrow.target = target;

        self.projectiles.push(arrow);
        self.scores.player.shots += 1;
        Some(GameEvent::Fired {
            shooter: player.id,
            projectile: id,
        })
    }

    /// Fire an enemy arrow at the player's body, using its learned aim
    pub fn fire_enemy(&mut self, enemy: ShooterId) -> Option<GameEvent> {
        if self.live_projectile_of(enemy).is_some() {
            return None;
        }
        let shooter = self.shooter(enemy)?.clone();
        let target = self.player_shooter()?.clone();
        let aim_state = self.enemy_ai(enemy)?.aim;

        let origin = shooter.pos + self.tuning.enemy_bow_offset;
        let solution = aim(origin, target.body_center(), &aim_state);

        let id = self.next_entity_id();
        let arrow = Projectile::from_velocity(id, origin, solution.velocity(), enemy)
            .aimed_at(target.id)
            .with_lifetime(self.tuning.max_flight_ticks());
        self.projectiles.push(arrow);
        self.scores.enemy.shots += 1;

        log::debug!(
            "Enemy {} fired: angle={:.3} speed={:.2}",
            enemy,
            solution.angle,
            solution.speed
        );
        Some(GameEvent::Fired {
            shooter: enemy,
            projectile: id,
        })
    }

    /// Read-only view for the host renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
