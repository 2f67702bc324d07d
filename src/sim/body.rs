//! Motion bodies and the per-tick velocity integrator
//!
//! The integrator only touches velocity. Position changes belong to the
//! collision world, which turns the integrated velocity into a resolved move.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;

/// Per-entity motion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    pub gravity_scale: f32,
    pub max_fall_speed: f32,
    /// Horizontal acceleration per tick while a direction is held
    pub accel: f32,
    /// Horizontal speed cap
    pub max_speed: f32,
    /// Horizontal decay per tick while no direction is held
    pub friction: f32,
}

/// Position, velocity and contact state of a moving entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionBody {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Set only by a downward resolution in the most recent tick
    pub on_ground: bool,
}

impl MotionBody {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            on_ground: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    /// Add gravity to velocity.y and clamp it at the body's terminal velocity
    pub fn apply_gravity(&mut self, gravity: f32, params: &BodyParams) {
        self.vel.y = (self.vel.y + gravity * params.gravity_scale).min(params.max_fall_speed);
    }

    /// Accelerate toward `axis` (-1, 0 or +1). With no input the horizontal
    /// speed decays toward zero by `friction` without changing sign.
    pub fn apply_horizontal(&mut self, axis: f32, params: &BodyParams) {
        if axis != 0.0 {
            self.vel.x =
                (self.vel.x + axis.signum() * params.accel).clamp(-params.max_speed, params.max_speed);
        } else {
            let speed = (self.vel.x.abs() - params.friction).max(0.0);
            self.vel.x = speed.copysign(self.vel.x);
        }
    }
}

/// Common capability of the entities that take part in physics
pub trait Mobile {
    fn body_mut(&mut self) -> &mut MotionBody;
    fn params(&self) -> &BodyParams;
}
