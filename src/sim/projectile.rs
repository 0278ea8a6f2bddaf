//! Arrow launch and flight
//!
//! Flight uses semi-implicit Euler with a fixed per-tick gravity increment:
//! velocity picks up gravity first, then position moves by the new
//! velocity. Trajectory shapes depend on this ordering, so keep it.

use glam::Vec2;

use super::collision::{distance_to_body, first_hit, out_of_bounds};
use super::state::{Arena, Projectile, ProjectileState, Shooter, ShooterId, Termination};
use crate::consts::MAX_ANGLE_DEG;
use crate::elevation_direction;
use crate::tuning::Tuning;

/// Outcome of advancing one projectile by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// Still flying
    InFlight,
    Hit(ShooterId),
    OutOfBounds,
    /// The projectile had already terminated; nothing changed
    AlreadyTerminated,
}

/// Clamp an elevation into `[0, 90]` degrees; NaN maps to flat
#[inline]
pub fn clamp_angle(angle_deg: f32) -> f32 {
    if angle_deg.is_nan() {
        return 0.0;
    }
    angle_deg.clamp(0.0, MAX_ANGLE_DEG)
}

/// Launch velocity for an elevation (degrees above horizontal) and power
pub fn launch_velocity(angle_deg: f32, power: f32, tuning: &Tuning) -> Vec2 {
    let speed = tuning.launch_speed(power);
    elevation_direction(clamp_angle(angle_deg)) * speed
}

/// Loose an arrow from `origin` at the given elevation and power
pub fn launch(
    id: u32,
    owner: ShooterId,
    origin: Vec2,
    angle_deg: f32,
    power: f32,
    tuning: &Tuning,
) -> Projectile {
    Projectile::from_velocity(id, origin, launch_velocity(angle_deg, power, tuning), owner)
        .with_lifetime(tuning.max_flight_ticks())
}

/// Advance a projectile by `dt` ticks and test it against shooters and walls.
///
/// Shooters are tested before the arena, so an arrow that reaches a body on
/// the same tick it crosses the floor still counts as a hit. An arrow whose
/// lifetime runs out is retired as out of bounds; with no gravity an upward
/// shot would otherwise climb forever.
pub fn step(
    p: &mut Projectile,
    shooters: &[Shooter],
    arena: &Arena,
    gravity: f32,
    dt: f32,
) -> StepEvent {
    if !p.is_flying() {
        return StepEvent::AlreadyTerminated;
    }

    p.vel.y += gravity * dt;
    p.pos += p.vel * dt;
    p.ticks += 1;
    p.ttl -= dt;

    if let Some(target) = p.target.and_then(|id| shooters.iter().find(|s| s.id == id)) {
        p.closest_approach = p.closest_approach.min(distance_to_body(p.pos, target));
    }

    if let Some(id) = first_hit(p.pos, shooters, p.owner) {
        p.state = ProjectileState::Terminated(Termination::Hit(id));
        return StepEvent::Hit(id);
    }

    if out_of_bounds(p.pos, arena) || p.ttl <= 0.0 {
        p.state = ProjectileState::Terminated(Termination::OutOfBounds);
        return StepEvent::OutOfBounds;
    }

    StepEvent::InFlight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Side;
    use proptest::prelude::*;

    fn open_arena() -> Arena {
        Arena {
            width: 10_000.0,
            height: 10_000.0,
            ground_height: 0.0,
            margin: 10_000.0,
        }
    }

    fn target_at(id: ShooterId, center: Vec2, radius: f32) -> Shooter {
        let mut s = Shooter::new(id, Side::Enemy, &Tuning::default());
        s.pos = center;
        s.body_offset = 0.0;
        s.hit_radius = radius;
        s
    }

    proptest! {
        #[test]
        fn launch_goes_up_at_mapped_speed(angle in 0.0f32..=90.0, power in 10.0f32..=100.0) {
            let tuning = Tuning::default();
            let vel = launch_velocity(angle, power, &tuning);
            let expected = tuning.base_speed + power / 100.0 * tuning.speed_range;

            prop_assert!(vel.y <= 0.0);
            prop_assert!((vel.length() - expected).abs() < 1e-3);
        }

        #[test]
        fn zero_gravity_flies_straight(
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
            dt in 0.1f32..2.0,
            n in 1u32..100,
        ) {
            let origin = Vec2::new(100.0, 100.0);
            let vel = Vec2::new(vx, vy);
            let mut p = Projectile::from_velocity(1, origin, vel, 0);

            for _ in 0..n {
                prop_assert_eq!(step(&mut p, &[], &open_arena(), 0.0, dt), StepEvent::InFlight);
            }

            let expected = origin + vel * dt * n as f32;
            prop_assert_eq!(p.vel, vel);
            prop_assert!(p.pos.distance(expected) < 0.05);
        }
    }

    #[test]
    fn test_launch_clamps_inputs() {
        let tuning = Tuning::default();

        let steep = launch_velocity(140.0, 500.0, &tuning);
        assert!(steep.x.abs() < 1e-4);
        assert!((steep.y + tuning.launch_speed(100.0)).abs() < 1e-4);

        let flat = launch_velocity(-30.0, 0.0, &tuning);
        assert_eq!(flat.y, 0.0);
        assert_eq!(flat.x, tuning.launch_speed(tuning.min_power));

        let nan = launch_velocity(f32::NAN, f32::NAN, &tuning);
        assert!(nan.is_finite());
    }

    #[test]
    fn test_gravity_applies_before_move() {
        let mut p = Projectile::from_velocity(1, Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 0);
        step(&mut p, &[], &open_arena(), 0.4, 1.0);
        assert_eq!(p.vel, Vec2::new(1.0, 0.4));
        assert!(p.pos.distance(Vec2::new(101.0, 100.4)) < 1e-4);
    }

    #[test]
    fn test_gravity_eventually_lands() {
        let tuning = Tuning::default();
        let arena = Arena::from_tuning(&tuning);

        for angle in [0.0, 30.0, 45.0, 60.0, 90.0] {
            let mut p = launch(1, 0, Vec2::new(500.0, 400.0), angle, 100.0, &tuning);
            let mut ticks = 0;
            let event = loop {
                let event = step(&mut p, &[], &arena, tuning.gravity, 1.0);
                ticks += 1;
                if event != StepEvent::InFlight {
                    break event;
                }
                assert!(ticks < 10_000, "arrow at {angle} degrees never landed");
            };
            assert_eq!(event, StepEvent::OutOfBounds);
        }
    }

    #[test]
    fn test_straight_shot_hits_at_expected_tick() {
        let tuning = Tuning {
            gravity: 0.0,
            base_speed: 0.0,
            speed_range: 20.0,
            ..Tuning::default()
        };
        let shooters = [target_at(1, Vec2::ZERO, 10.0), target_at(2, Vec2::new(100.0, 0.0), 10.0)];

        // 50% power over a 20 range is 10 px/tick: x = 100 after 10 ticks
        let mut p = launch(1, 1, Vec2::ZERO, 0.0, 50.0, &tuning).aimed_at(2);
        let mut hit_tick = None;
        for tick in 1..=20 {
            if let StepEvent::Hit(id) = step(&mut p, &shooters, &open_arena(), tuning.gravity, 1.0) {
                assert_eq!(id, 2);
                hit_tick = Some(tick);
                break;
            }
        }

        assert_eq!(hit_tick, Some(10));
        assert!((90.0..=110.0).contains(&p.pos.x));
        assert_eq!(p.termination(), Some(Termination::Hit(2)));
        assert_eq!(p.closest_approach, 0.0);
    }

    #[test]
    fn test_step_after_termination_is_noop() {
        let arena = Arena {
            width: 100.0,
            height: 100.0,
            ground_height: 0.0,
            margin: 0.0,
        };
        let mut p = Projectile::from_velocity(1, Vec2::new(99.0, 50.0), Vec2::new(5.0, 0.0), 0);
        assert_eq!(step(&mut p, &[], &arena, 0.0, 1.0), StepEvent::OutOfBounds);

        let frozen = p.clone();
        assert_eq!(step(&mut p, &[], &arena, 0.4, 1.0), StepEvent::AlreadyTerminated);
        assert_eq!(p.pos, frozen.pos);
        assert_eq!(p.vel, frozen.vel);
        assert_eq!(p.ticks, frozen.ticks);
    }

    #[test]
    fn test_weightless_upward_shot_is_retired() {
        let tuning = Tuning {
            gravity: 0.0,
            max_flight_secs: 2.0,
            ..Tuning::default()
        };
        let arena = Arena::from_tuning(&tuning);
        let mut p = launch(1, 0, Vec2::new(500.0, 400.0), 90.0, 100.0, &tuning);

        let mut ticks = 0;
        while step(&mut p, &[], &arena, tuning.gravity, 1.0) == StepEvent::InFlight {
            ticks += 1;
            assert!(ticks < 1_000, "arrow never retired");
        }
        assert_eq!(p.ticks, 120);
        assert_eq!(p.termination(), Some(Termination::OutOfBounds));
    }

    #[test]
    fn test_closest_approach_tracks_target() {
        let shooters = [target_at(2, Vec2::new(50.0, 20.0), 5.0)];
        let mut p = Projectile::from_velocity(1, Vec2::ZERO, Vec2::new(10.0, 0.0), 1).aimed_at(2);
        for _ in 0..10 {
            step(&mut p, &shooters, &open_arena(), 0.0, 1.0);
        }
        // Passes directly beneath the target at x = 50
        assert!((p.closest_approach - 20.0).abs() < 1e-4);
    }
}
