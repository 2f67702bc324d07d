//! Data-driven physics and scoring balance
//!
//! All velocities are in world units per tick, accelerations in units per
//! tick squared. Missing JSON fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::BodyParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration added to velocity.y every tick
    pub gravity: f32,
    /// Terminal velocity (downward)
    pub max_fall_speed: f32,
    /// velocity.y applied on jump (negative = up)
    pub jump_impulse: f32,
    pub player_accel: f32,
    pub player_max_speed: f32,
    /// Horizontal decay per tick when no direction is held
    pub friction: f32,

    pub enemy_speed: f32,
    pub enemy_gravity_scale: f32,
    /// Ticks between spontaneous direction-flip rolls (~3 s at 60 Hz)
    pub enemy_flip_interval: u32,
    pub enemy_flip_chance: f64,

    /// Stomp window: player bottom may sit this far above the enemy top...
    pub stomp_band_above: f32,
    /// ...or this far below it
    pub stomp_band_below: f32,
    pub stomp_bonus: u32,
    pub collect_bonus: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            max_fall_speed: 15.0,
            jump_impulse: -12.0,
            player_accel: 0.5,
            player_max_speed: 5.0,
            friction: 0.3,

            enemy_speed: 2.0,
            enemy_gravity_scale: 1.0,
            enemy_flip_interval: 180,
            enemy_flip_chance: 0.3,

            stomp_band_above: 10.0,
            stomp_band_below: 15.0,
            stomp_bonus: 100,
            collect_bonus: 50,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    fn validate(&self) -> Result<(), SimError> {
        if self.gravity <= 0.0 {
            return Err(SimError::Config("gravity must be positive (down)".into()));
        }
        if self.max_fall_speed <= 0.0 {
            return Err(SimError::Config("max_fall_speed must be positive".into()));
        }
        if self.jump_impulse >= 0.0 {
            return Err(SimError::Config("jump_impulse must be negative (up)".into()));
        }
        if !(0.0..=1.0).contains(&self.enemy_flip_chance) {
            return Err(SimError::Config("enemy_flip_chance must be within 0..=1".into()));
        }
        if self.friction < 0.0 || self.player_accel < 0.0 {
            return Err(SimError::Config("friction and player_accel cannot be negative".into()));
        }
        Ok(())
    }

    /// Motion constants for the player
    pub fn player_body(&self) -> BodyParams {
        BodyParams {
            gravity_scale: 1.0,
            max_fall_speed: self.max_fall_speed,
            accel: self.player_accel,
            max_speed: self.player_max_speed,
            friction: self.friction,
        }
    }

    /// Motion constants for patrolling enemies (no friction, constant speed)
    pub fn enemy_body(&self) -> BodyParams {
        BodyParams {
            gravity_scale: self.enemy_gravity_scale,
            max_fall_speed: self.max_fall_speed,
            accel: 0.0,
            max_speed: self.enemy_speed,
            friction: 0.0,
        }
    }
}
