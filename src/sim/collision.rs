//! Collision tests for arrows
//!
//! Shooters are circles around their body centre; the arena is a box whose
//! sides extend by a margin and whose bottom is the floor line. The top is
//! open so high lobs can come back down.

use glam::Vec2;

use super::state::{Arena, Shooter, ShooterId};

/// Distance from a point to a shooter's body centre
#[inline]
pub fn distance_to_body(pos: Vec2, shooter: &Shooter) -> f32 {
    pos.distance(shooter.body_center())
}

/// Check whether a point lies strictly inside a shooter's hit circle
#[inline]
pub fn point_hits_shooter(pos: Vec2, shooter: &Shooter) -> bool {
    distance_to_body(pos, shooter) < shooter.hit_radius
}

/// First shooter (in slice order) whose hit circle contains `pos`.
///
/// The owner is skipped so an arrow cannot hit the archer who loosed it.
/// When circles overlap, the lower index wins even if a later shooter is
/// closer.
pub fn first_hit(pos: Vec2, shooters: &[Shooter], owner: ShooterId) -> Option<ShooterId> {
    shooters
        .iter()
        .filter(|s| s.id != owner)
        .find(|s| point_hits_shooter(pos, s))
        .map(|s| s.id)
}

/// Check whether a point has left the playable arena
#[inline]
pub fn out_of_bounds(pos: Vec2, arena: &Arena) -> bool {
    pos.x < -arena.margin || pos.x > arena.width + arena.margin || pos.y > arena.floor_y()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Side;
    use crate::tuning::Tuning;

    fn shooter_at(id: ShooterId, center: Vec2, radius: f32) -> Shooter {
        let mut s = Shooter::new(id, Side::Enemy, &Tuning::default());
        s.body_offset = 0.0;
        s.hit_radius = radius;
        s.pos = center;
        s
    }

    #[test]
    fn test_hit_radius_boundary() {
        let shooter = shooter_at(2, Vec2::new(100.0, 0.0), 10.0);
        let eps = 1e-3;

        assert!(point_hits_shooter(Vec2::new(100.0 - (10.0 - eps), 0.0), &shooter));
        assert!(!point_hits_shooter(Vec2::new(100.0 - (10.0 + eps), 0.0), &shooter));
        // Exactly on the rim is a miss
        assert!(!point_hits_shooter(Vec2::new(90.0, 0.0), &shooter));
    }

    #[test]
    fn test_body_offset_moves_hit_circle() {
        let tuning = Tuning::default();
        let mut shooter = Shooter::new(1, Side::Player, &tuning);
        shooter.pos = Vec2::new(200.0, 500.0);

        // Feet are not the target, the body is
        assert!(!point_hits_shooter(Vec2::new(200.0, 500.0), &shooter));
        assert!(point_hits_shooter(Vec2::new(200.0, 400.0), &shooter));
    }

    #[test]
    fn test_first_hit_skips_owner() {
        let shooters = [
            shooter_at(1, Vec2::ZERO, 10.0),
            shooter_at(2, Vec2::new(5.0, 0.0), 10.0),
        ];
        assert_eq!(first_hit(Vec2::new(2.0, 0.0), &shooters, 1), Some(2));
        assert_eq!(first_hit(Vec2::new(2.0, 0.0), &shooters, 99), Some(1));
        assert_eq!(first_hit(Vec2::new(50.0, 0.0), &shooters, 99), None);
    }

    #[test]
    fn test_first_hit_prefers_slice_order_over_distance() {
        let shooters = [
            shooter_at(1, Vec2::ZERO, 10.0),
            shooter_at(2, Vec2::new(8.0, 0.0), 10.0),
        ];
        // Point is closer to shooter 2 but shooter 1 comes first
        assert_eq!(first_hit(Vec2::new(7.0, 0.0), &shooters, 99), Some(1));
    }

    #[test]
    fn test_out_of_bounds() {
        let arena = Arena {
            width: 1000.0,
            height: 600.0,
            ground_height: 50.0,
            margin: 20.0,
        };

        assert!(!out_of_bounds(Vec2::new(500.0, 300.0), &arena));
        // Open sky
        assert!(!out_of_bounds(Vec2::new(500.0, -5000.0), &arena));
        // Side margins
        assert!(!out_of_bounds(Vec2::new(-19.0, 300.0), &arena));
        assert!(out_of_bounds(Vec2::new(-21.0, 300.0), &arena));
        assert!(out_of_bounds(Vec2::new(1021.0, 300.0), &arena));
        // Floor line
        assert!(!out_of_bounds(Vec2::new(500.0, 550.0), &arena));
        assert!(out_of_bounds(Vec2::new(500.0, 550.5), &arena));
    }
}
