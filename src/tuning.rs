//! Game balance and arena configuration
//!
//! Loaded from JSON by hosts that want to tweak the duel. Missing fields
//! fall back to the reference values in [`crate::consts`], and every value
//! is clamped into a playable range before the simulation sees it.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while reading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Jitter amplitudes applied by the aim learner for one miss band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterBand {
    /// Maximum angle change (radians) before gain is applied
    pub angle: f32,
    /// Maximum speed change before gain is applied
    pub speed: f32,
}

/// Enemy aim-learning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimTuning {
    /// Launch speed at round start
    pub default_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Higher values make the enemy adjust faster (and wilder)
    pub improvement_factor: f32,
    /// Misses farther than this are corrected mostly through speed
    pub large_miss_threshold: f32,
    /// Misses closer than this are corrected mostly through angle
    pub near_miss_threshold: f32,
    /// Miss distance at which severity saturates at 1
    pub reference_distance: f32,
    pub large: JitterBand,
    pub medium: JitterBand,
    pub near: JitterBand,
}

impl Default for AimTuning {
    fn default() -> Self {
        Self {
            default_speed: ENEMY_DEFAULT_SPEED,
            min_speed: ENEMY_DEFAULT_SPEED * ENEMY_MIN_SPEED_FACTOR,
            max_speed: ENEMY_DEFAULT_SPEED * ENEMY_MAX_SPEED_FACTOR,
            improvement_factor: IMPROVEMENT_FACTOR,
            large_miss_threshold: LARGE_MISS_DISTANCE,
            near_miss_threshold: NEAR_MISS_DISTANCE,
            reference_distance: REFERENCE_MISS_DISTANCE,
            large: JitterBand { angle: 0.5, speed: 2.0 },
            medium: JitterBand { angle: 0.25, speed: 1.0 },
            near: JitterBand { angle: 0.15, speed: 0.25 },
        }
    }
}

impl AimTuning {
    /// Clamp a launch speed into `[min_speed, max_speed]`.
    ///
    /// Inverted bounds on a hand-built tuning are treated as swapped.
    pub fn clamp_speed(&self, speed: f32) -> f32 {
        let lo = self.min_speed.min(self.max_speed);
        let hi = self.min_speed.max(self.max_speed);
        if speed.is_nan() {
            return lo;
        }
        speed.max(lo).min(hi)
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();

        self.min_speed = clamp_field("aim.min_speed", self.min_speed, 0.1, f32::MAX, defaults.min_speed);
        self.max_speed = clamp_field(
            "aim.max_speed",
            self.max_speed,
            self.min_speed,
            f32::MAX,
            defaults.max_speed.max(self.min_speed),
        );
        self.default_speed = clamp_field(
            "aim.default_speed",
            self.default_speed,
            self.min_speed,
            self.max_speed,
            defaults.default_speed.clamp(self.min_speed, self.max_speed),
        );
        self.improvement_factor = clamp_field(
            "aim.improvement_factor",
            self.improvement_factor,
            0.0,
            10.0,
            defaults.improvement_factor,
        );
        self.near_miss_threshold = clamp_field(
            "aim.near_miss_threshold",
            self.near_miss_threshold,
            0.0,
            f32::MAX,
            defaults.near_miss_threshold,
        );
        self.large_miss_threshold = clamp_field(
            "aim.large_miss_threshold",
            self.large_miss_threshold,
            self.near_miss_threshold,
            f32::MAX,
            defaults.large_miss_threshold.max(self.near_miss_threshold),
        );
        self.reference_distance = clamp_field(
            "aim.reference_distance",
            self.reference_distance,
            1.0,
            f32::MAX,
            defaults.reference_distance,
        );

        for (name, band, fallback) in [
            ("aim.large", &mut self.large, defaults.large),
            ("aim.medium", &mut self.medium, defaults.medium),
            ("aim.near", &mut self.near, defaults.near),
        ] {
            band.angle = clamp_field(name, band.angle, 0.0, std::f32::consts::PI, fallback.angle);
            band.speed = clamp_field(name, band.speed, 0.0, f32::MAX, fallback.speed);
        }
    }

    fn scale(&mut self, scale: f32) {
        self.default_speed *= scale;
        self.min_speed *= scale;
        self.max_speed *= scale;
        self.large_miss_threshold *= scale;
        self.near_miss_threshold *= scale;
        self.reference_distance *= scale;
        self.large.speed *= scale;
        self.medium.speed *= scale;
        self.near.speed *= scale;
    }
}

/// Complete duel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    pub ground_height: f32,
    /// Side-wall slack before an arrow counts as out of bounds
    pub arena_margin: f32,

    // === Physics ===
    /// Added to vertical velocity every tick
    pub gravity: f32,
    pub base_speed: f32,
    pub speed_range: f32,
    /// Lowest power the launcher accepts (0-100)
    pub min_power: f32,

    // === Shooters ===
    pub hit_radius: f32,
    /// Height of the body centre above the feet
    pub body_offset: f32,
    pub player_bow_offset: Vec2,
    pub enemy_bow_offset: Vec2,
    /// Feet are placed between these heights above the arena bottom
    pub spawn_rise_min: f32,
    pub spawn_rise_max: f32,

    // === Round pacing (seconds) ===
    pub enemy_fire_min_secs: f32,
    pub enemy_fire_max_secs: f32,
    pub round_restart_secs: f32,
    /// Flight lifetime; an arrow that neither hits nor lands is retired
    pub max_flight_secs: f32,

    // === Enemy AI ===
    pub aim: AimTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            ground_height: GROUND_HEIGHT,
            arena_margin: ARENA_MARGIN,

            gravity: GRAVITY,
            base_speed: BASE_SPEED,
            speed_range: SPEED_RANGE,
            min_power: MIN_POWER,

            hit_radius: HIT_RADIUS,
            body_offset: BODY_OFFSET,
            player_bow_offset: Vec2::new(PLAYER_BOW_OFFSET.0, PLAYER_BOW_OFFSET.1),
            enemy_bow_offset: Vec2::new(ENEMY_BOW_OFFSET.0, ENEMY_BOW_OFFSET.1),
            spawn_rise_min: GROUND_HEIGHT,
            spawn_rise_max: 200.0,

            enemy_fire_min_secs: ENEMY_FIRE_MIN_SECS,
            enemy_fire_max_secs: ENEMY_FIRE_MAX_SECS,
            round_restart_secs: ROUND_RESTART_SECS,
            max_flight_secs: MAX_FLIGHT_SECS,

            aim: AimTuning::default(),
        }
    }
}

impl Tuning {
    /// Reference tuning with every spatial quantity multiplied by `scale`.
    ///
    /// Speeds and gravity scale too, so trajectories keep their shape.
    pub fn scaled(scale: f32) -> Self {
        let mut tuning = Self::default();
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        tuning.arena_width *= scale;
        tuning.arena_height *= scale;
        tuning.ground_height *= scale;
        tuning.arena_margin *= scale;
        tuning.gravity *= scale;
        tuning.base_speed *= scale;
        tuning.speed_range *= scale;
        tuning.hit_radius *= scale;
        tuning.body_offset *= scale;
        tuning.player_bow_offset *= scale;
        tuning.enemy_bow_offset *= scale;
        tuning.spawn_rise_min *= scale;
        tuning.spawn_rise_max *= scale;
        tuning.aim.scale(scale);
        tuning
    }

    /// Parse tuning from JSON and clamp it into range
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp every field into a playable range.
    ///
    /// Out-of-range or non-finite values are replaced rather than rejected.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        self.arena_width = clamp_field("arena_width", self.arena_width, 1.0, f32::MAX, d.arena_width);
        self.arena_height = clamp_field("arena_height", self.arena_height, 1.0, f32::MAX, d.arena_height);
        self.ground_height = clamp_field(
            "ground_height",
            self.ground_height,
            0.0,
            self.arena_height,
            d.ground_height.min(self.arena_height),
        );
        self.arena_margin = clamp_field("arena_margin", self.arena_margin, 0.0, f32::MAX, d.arena_margin);

        self.gravity = clamp_field("gravity", self.gravity, 0.0, 100.0, d.gravity);
        self.base_speed = clamp_field("base_speed", self.base_speed, 0.0, f32::MAX, d.base_speed);
        self.speed_range = clamp_field("speed_range", self.speed_range, 0.0, f32::MAX, d.speed_range);
        self.min_power = clamp_field("min_power", self.min_power, 0.0, MAX_POWER, d.min_power);

        self.hit_radius = clamp_field("hit_radius", self.hit_radius, 0.0, f32::MAX, d.hit_radius);
        self.body_offset = clamp_field("body_offset", self.body_offset, 0.0, self.arena_height, d.body_offset);
        if !self.player_bow_offset.is_finite() {
            log::warn!("player_bow_offset is not finite, using default");
            self.player_bow_offset = d.player_bow_offset;
        }
        if !self.enemy_bow_offset.is_finite() {
            log::warn!("enemy_bow_offset is not finite, using default");
            self.enemy_bow_offset = d.enemy_bow_offset;
        }
        let floor_rise = self.ground_height;
        self.spawn_rise_min = clamp_field(
            "spawn_rise_min",
            self.spawn_rise_min,
            floor_rise,
            self.arena_height,
            floor_rise,
        );
        self.spawn_rise_max = clamp_field(
            "spawn_rise_max",
            self.spawn_rise_max,
            self.spawn_rise_min,
            self.arena_height,
            self.spawn_rise_min,
        );

        self.enemy_fire_min_secs = clamp_field(
            "enemy_fire_min_secs",
            self.enemy_fire_min_secs,
            0.0,
            3600.0,
            d.enemy_fire_min_secs,
        );
        self.enemy_fire_max_secs = clamp_field(
            "enemy_fire_max_secs",
            self.enemy_fire_max_secs,
            self.enemy_fire_min_secs,
            3600.0,
            d.enemy_fire_max_secs.max(self.enemy_fire_min_secs),
        );
        self.round_restart_secs = clamp_field(
            "round_restart_secs",
            self.round_restart_secs,
            0.0,
            3600.0,
            d.round_restart_secs,
        );
        self.max_flight_secs = clamp_field(
            "max_flight_secs",
            self.max_flight_secs,
            1.0,
            3600.0,
            d.max_flight_secs,
        );

        self.aim.sanitize();
        self
    }

    /// Launch speed for a power setting, after clamping power
    pub fn launch_speed(&self, power: f32) -> f32 {
        let power = self.clamp_power(power);
        self.base_speed + power / 100.0 * self.speed_range
    }

    /// Clamp power into `[min_power, 100]`; NaN maps to the minimum
    pub fn clamp_power(&self, power: f32) -> f32 {
        if power.is_nan() {
            return self.min_power;
        }
        power.min(MAX_POWER).max(self.min_power)
    }

    /// Y coordinate of the floor line
    pub fn floor_y(&self) -> f32 {
        self.arena_height - self.ground_height
    }

    /// Flight lifetime in ticks
    pub fn max_flight_ticks(&self) -> f32 {
        crate::secs_to_ticks(self.max_flight_secs)
    }
}

/// Clamp a tuning value, warning when the file asked for something else
fn clamp_field(name: &str, value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        log::warn!("{} is not finite, using {}", name, fallback);
        return fallback;
    }
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        log::warn!("{} = {} out of range, clamped to {}", name, value, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.2, "aim": { "improvement_factor": 0.5 } }"#)
            .expect("valid json");
        assert_eq!(tuning.gravity, 0.2);
        assert_eq!(tuning.aim.improvement_factor, 0.5);
        assert_eq!(tuning.hit_radius, HIT_RADIUS);
        assert_eq!(tuning.aim.default_speed, ENEMY_DEFAULT_SPEED);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let tuning = Tuning::from_json(
            r#"{ "gravity": -3.0, "min_power": 250, "aim": { "min_speed": 20, "max_speed": 5 } }"#,
        )
        .expect("valid json");
        assert_eq!(tuning.gravity, 0.0);
        assert_eq!(tuning.min_power, MAX_POWER);
        assert_eq!(tuning.aim.min_speed, 20.0);
        assert_eq!(tuning.aim.max_speed, 20.0);
        assert_eq!(tuning.aim.default_speed, 20.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let err = Tuning::from_json("{ gravity: ").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }

    #[test]
    fn test_json_roundtrip_keeps_defaults() {
        let tuning = Tuning::default();
        let json = tuning.to_json().expect("serializes");
        assert_eq!(Tuning::from_json(&json).expect("parses"), tuning);
    }

    #[test]
    fn test_scaled_doubles_distances() {
        let tuning = Tuning::scaled(2.0);
        assert_eq!(tuning.arena_width, ARENA_WIDTH * 2.0);
        assert_eq!(tuning.hit_radius, HIT_RADIUS * 2.0);
        assert_eq!(tuning.aim.large_miss_threshold, LARGE_MISS_DISTANCE * 2.0);
        assert_eq!(tuning.aim.near_miss_threshold, NEAR_MISS_DISTANCE * 2.0);
        // Bad scale falls back to the reference tuning
        assert_eq!(Tuning::scaled(f32::NAN), Tuning::default());
    }

    #[test]
    fn test_clamp_speed_with_inverted_bounds() {
        let aim = AimTuning {
            min_speed: 20.0,
            max_speed: 5.0,
            ..AimTuning::default()
        };
        assert_eq!(aim.clamp_speed(1.0), 5.0);
        assert_eq!(aim.clamp_speed(12.0), 12.0);
        assert_eq!(aim.clamp_speed(50.0), 20.0);
        assert_eq!(aim.clamp_speed(f32::NAN), 5.0);
    }

    #[test]
    fn test_flight_lifetime_is_clamped() {
        let tuning = Tuning::from_json(r#"{ "max_flight_secs": 0 }"#).expect("valid json");
        assert_eq!(tuning.max_flight_secs, 1.0);
        assert_eq!(tuning.max_flight_ticks(), 60.0);
        assert_eq!(Tuning::default().max_flight_ticks(), MAX_FLIGHT_SECS * 60.0);
    }

    #[test]
    fn test_launch_speed_mapping() {
        let tuning = Tuning::default();
        assert_eq!(tuning.launch_speed(100.0), BASE_SPEED + SPEED_RANGE);
        assert_eq!(tuning.launch_speed(50.0), BASE_SPEED + SPEED_RANGE * 0.5);
        // Below the minimum power is raised to it
        assert_eq!(tuning.launch_speed(0.0), BASE_SPEED + SPEED_RANGE * MIN_POWER / 100.0);
        assert_eq!(tuning.launch_speed(f32::NAN), tuning.launch_speed(MIN_POWER));
    }
}
