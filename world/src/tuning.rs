//! Tunable simulation constants.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric constants that shape the simulation.
///
/// Speeds and accelerations are stored in meters so a level designer can
/// reason about them independently of the pixel scale; the accessor methods
/// convert them into world units using [`Tuning::meter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Fixed simulation rate in ticks per second.
    pub fps: u32,
    /// Length of one meter in world units.
    pub meter: f32,
    /// Width of a tower column in meters.
    pub column_meters: f32,
    /// Height of a tower row in meters.
    pub row_meters: f32,
    /// Thickness of the landing band at the top of a row, as a fraction of the row height.
    pub surface_fraction: f32,
    /// Downward acceleration in meters per second squared.
    pub gravity: f32,
    /// Maximum horizontal speed in meters per second.
    pub max_dx: f32,
    /// Ladder climbing speed in meters per second.
    pub climb_dy: f32,
    /// Seconds needed to reach `max_dx` from rest.
    pub accel_seconds: f32,
    /// Seconds needed to stop from `max_dx` through friction.
    pub friction_seconds: f32,
    /// Upward speed applied by a jump in meters per second.
    pub impulse: f32,
    /// Ticks after walking off a ledge during which a jump is still accepted.
    pub jump_grace_ticks: u32,
    /// Ladder reach measured from a ladder column's centre, as a fraction of the column width.
    pub ladder_edge: f32,
    /// Length of the player's invulnerability window in ticks.
    pub hurt_ticks: u32,
    /// Ticks a stomped monster lingers before it is removed.
    pub dying_ticks: u32,
    /// Player width in meters.
    pub player_width: f32,
    /// Player height in meters.
    pub player_height: f32,
    /// Score awarded per coin.
    pub coin_score: u32,
    /// Whether falling onto a monster kills it instead of hurting the player.
    pub stomp: bool,
    /// Number of hits that end the run, unlimited when absent.
    pub lethal_hits: Option<u32>,
    /// Viewport width in world units.
    pub viewport_width: f32,
    /// Viewport height in world units.
    pub viewport_height: f32,
    /// Fraction of the remaining distance the camera covers each tick.
    pub camera_smoothing: f32,
    /// Upper bound on fixed ticks run for a single wall-clock advance.
    pub max_ticks_per_advance: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fps: 60,
            meter: 27.0,
            column_meters: 3.0,
            row_meters: 1.0,
            surface_fraction: 0.3,
            gravity: 9.8 * 4.0,
            max_dx: 10.0,
            climb_dy: 8.0,
            accel_seconds: 0.25,
            friction_seconds: 0.125,
            impulse: 15.0,
            jump_grace_ticks: 12,
            ladder_edge: 0.6,
            hurt_ticks: 60,
            dying_ticks: 30,
            player_width: 1.5,
            player_height: 2.0,
            coin_score: 50,
            stomp: true,
            lethal_hits: None,
            viewport_width: 720.0,
            viewport_height: 540.0,
            camera_smoothing: 1.0,
            max_ticks_per_advance: 8,
        }
    }
}

impl Tuning {
    /// Parses a TOML document, filling absent keys with defaults, and validates it.
    pub fn from_toml_str(source: &str) -> Result<Self, TuningError> {
        let tuning: Self = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Checks that every constant is usable by the simulation.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.fps == 0 {
            return Err(TuningError::ZeroRate { field: "fps" });
        }
        if self.max_ticks_per_advance == 0 {
            return Err(TuningError::ZeroRate {
                field: "max_ticks_per_advance",
            });
        }

        let positive = [
            ("meter", self.meter),
            ("column_meters", self.column_meters),
            ("row_meters", self.row_meters),
            ("surface_fraction", self.surface_fraction),
            ("gravity", self.gravity),
            ("max_dx", self.max_dx),
            ("climb_dy", self.climb_dy),
            ("accel_seconds", self.accel_seconds),
            ("friction_seconds", self.friction_seconds),
            ("impulse", self.impulse),
            ("ladder_edge", self.ladder_edge),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("camera_smoothing", self.camera_smoothing),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let fractions = [
            ("surface_fraction", self.surface_fraction),
            ("camera_smoothing", self.camera_smoothing),
        ];
        for (field, value) in fractions {
            if value > 1.0 {
                return Err(TuningError::NotFraction { field, value });
            }
        }

        Ok(())
    }

    /// Duration of a single fixed tick, rounded up to whole nanoseconds so a
    /// host frame of this length always covers one tick.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000_u64.div_ceil(u64::from(self.fps.max(1))))
    }

    /// Duration of a single fixed tick in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// Width of a tower column in world units.
    #[must_use]
    pub fn column_width(&self) -> f32 {
        self.column_meters * self.meter
    }

    /// Height of a tower row in world units.
    #[must_use]
    pub fn row_height(&self) -> f32 {
        self.row_meters * self.meter
    }

    /// Thickness of the landing band in world units.
    #[must_use]
    pub fn surface_band(&self) -> f32 {
        self.row_height() * self.surface_fraction
    }

    /// Gravity in world units per second squared.
    #[must_use]
    pub fn gravity_units(&self) -> f32 {
        self.gravity * self.meter
    }

    /// Maximum horizontal speed in world units per second.
    #[must_use]
    pub fn max_dx_units(&self) -> f32 {
        self.max_dx * self.meter
    }

    /// Fastest fall in world units per second; one tick never covers more
    /// than the landing band.
    #[must_use]
    pub fn max_fall_units(&self) -> f32 {
        self.surface_band() * self.fps as f32
    }

    /// Climbing speed in world units per second.
    #[must_use]
    pub fn climb_units(&self) -> f32 {
        self.climb_dy * self.meter
    }

    /// Horizontal acceleration in world units per second squared.
    #[must_use]
    pub fn accel_units(&self) -> f32 {
        self.max_dx_units() / self.accel_seconds
    }

    /// Friction deceleration in world units per second squared.
    #[must_use]
    pub fn friction_units(&self) -> f32 {
        self.max_dx_units() / self.friction_seconds
    }

    /// Jump speed in world units per second.
    #[must_use]
    pub fn impulse_units(&self) -> f32 {
        self.impulse * self.meter
    }

    /// Horizontal distance from a ladder column's centre that still reaches it.
    #[must_use]
    pub fn ladder_reach(&self) -> f32 {
        self.ladder_edge * self.column_width()
    }

    /// Player bounding box size in world units.
    #[must_use]
    pub fn player_size(&self) -> Vec2 {
        Vec2::new(self.player_width, self.player_height) * self.meter
    }

    /// Viewport size in world units.
    #[must_use]
    pub fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }
}

/// Errors raised while loading or validating [`Tuning`].
#[derive(Debug, Error)]
pub enum TuningError {
    /// The TOML document could not be parsed.
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] toml::de::Error),
    /// A rate that must be at least one was zero.
    #[error("{field} must be at least 1")]
    ZeroRate {
        /// Name of the offending key.
        field: &'static str,
    },
    /// A constant that must be positive and finite was not.
    #[error("{field} must be positive and finite (received {value})")]
    NotPositive {
        /// Name of the offending key.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A constant that must lie in `(0, 1]` was larger than one.
    #[error("{field} must not exceed 1.0 (received {value})")]
    NotFraction {
        /// Name of the offending key.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
}
