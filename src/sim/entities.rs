//! Player, enemy and collectible behaviour
//!
//! Behaviours only change velocities (and their own bookkeeping). Positions
//! are written by [`CollisionWorld::resolve`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::body::{BodyParams, Mobile, MotionBody};
use super::collision::{CollisionWorld, Resolution};
use crate::consts::*;
use crate::tuning::Tuning;

/// Held/pressed input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump went down this tick
    pub jump_pressed: bool,
    /// Jump is being held
    pub jump_held: bool,
}

impl TickInput {
    /// -1, 0 or +1. Both directions at once cancel out.
    pub fn axis(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    #[inline]
    fn jump_down(&self) -> bool {
        self.jump_pressed || self.jump_held
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Gravity half of the integrator for any physics entity
pub fn integrate<M: Mobile>(entity: &mut M, gravity: f32) {
    let params = *entity.params();
    entity.body_mut().apply_gravity(gravity, &params);
}

/// Resolve the entity's current velocity as this tick's move
pub fn resolve_body<M: Mobile>(entity: &mut M, world: &CollisionWorld) -> Resolution {
    let body = entity.body_mut();
    let (dx, dy) = (body.vel.x, body.vel.y);
    world.resolve(body, dx, dy)
}

/// The player character
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub body: MotionBody,
    pub params: BodyParams,
    pub score: u32,
    pub collected_count: u32,
    pub facing: Facing,
    /// Set by a jump, cleared once the jump input is released
    pub jumped: bool,
}

impl Player {
    pub fn new(spawn: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: MotionBody::new(spawn, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            params: tuning.player_body(),
            score: 0,
            collected_count: 0,
            facing: Facing::Right,
            jumped: false,
        }
    }

    /// Apply one tick of input on top of the already-integrated gravity.
    /// Returns true if a jump started.
    pub fn apply_input(&mut self, input: &TickInput, tuning: &Tuning) -> bool {
        let axis = input.axis();
        self.body.apply_horizontal(axis, &self.params);
        if self.body.vel.x > 0.0 {
            self.facing = Facing::Right;
        } else if self.body.vel.x < 0.0 {
            self.facing = Facing::Left;
        }

        let mut started = false;
        if input.jump_down() && !self.jumped && self.body.on_ground {
            self.body.vel.y = tuning.jump_impulse;
            self.jumped = true;
            started = true;
        }
        if !input.jump_down() {
            self.jumped = false;
        }
        started
    }

    /// Full player tick: gravity, then input (a jump overrides the fall),
    /// then resolution. Returns the resolution and whether a jump started.
    pub fn step(&mut self, input: &TickInput, world: &CollisionWorld, tuning: &Tuning) -> (Resolution, bool) {
        integrate(self, tuning.gravity);
        let jumped = self.apply_input(input, tuning);
        (resolve_body(self, world), jumped)
    }

    /// Bounce after stomping an enemy
    pub fn bounce(&mut self, tuning: &Tuning) {
        self.body.vel.y = tuning.jump_impulse / 2.0;
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        self.body.rect()
    }
}

impl Mobile for Player {
    fn body_mut(&mut self) -> &mut MotionBody {
        &mut self.body
    }

    fn params(&self) -> &BodyParams {
        &self.params
    }
}

/// Stable identity of an enemy within a level (its spawn index)
pub type EnemyId = u32;

/// A patrolling enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    pub body: MotionBody,
    pub params: BodyParams,
    pub initial_pos: Vec2,
    /// Ticks since the last spontaneous flip roll
    pub flip_timer: u32,
}

impl Enemy {
    pub fn new(id: EnemyId, spawn: Vec2, tuning: &Tuning) -> Self {
        let mut body = MotionBody::new(spawn, Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT));
        body.vel.x = -tuning.enemy_speed;
        Self {
            id,
            body,
            params: tuning.enemy_body(),
            initial_pos: spawn,
            flip_timer: 0,
        }
    }

    /// Move one tick of patrol. The heading flips on a wall, at a world edge,
    /// or (at most once per tick) on a periodic random roll.
    pub fn patrol<R: Rng>(&mut self, world: &CollisionWorld, tuning: &Tuning, rng: &mut R) -> Resolution {
        let heading = self.body.vel.x;
        integrate(self, tuning.gravity);
        let res = resolve_body(self, world);

        let mut flipped = false;
        if res.blocked_x || res.bounds.horizontal() {
            self.body.vel.x = -heading;
            flipped = true;
        }

        self.flip_timer += 1;
        if self.flip_timer > tuning.enemy_flip_interval {
            // Roll even when already flipped so the random stream advances the same way
            let roll = rng.random_bool(tuning.enemy_flip_chance);
            if roll && !flipped {
                self.body.vel.x = -self.body.vel.x;
            }
            self.flip_timer = 0;
        }
        res
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        self.body.rect()
    }
}

impl Mobile for Enemy {
    fn body_mut(&mut self) -> &mut MotionBody {
        &mut self.body
    }

    fn params(&self) -> &BodyParams {
        &self.params
    }
}

/// How a player/enemy overlap resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    Stomp,
    Fatal,
}

/// Classify a player/enemy pair. The stomp window is checked before the
/// fatal case: a deep overlap while falling onto the enemy's head is a stomp.
pub fn classify_contact(player: &Player, enemy: &Enemy, tuning: &Tuning) -> Contact {
    let p = player.rect();
    let e = enemy.rect();
    if !p.intersects(&e) {
        return Contact::None;
    }
    let falling = player.body.vel.y > 0.0;
    let in_band = p.bottom() > e.top() - tuning.stomp_band_above
        && p.bottom() < e.top() + tuning.stomp_band_below;
    if falling && in_band {
        Contact::Stomp
    } else {
        Contact::Fatal
    }
}

/// Bob period of collectibles in ticks
const BOB_PERIOD: u32 = 60;
const BOB_STEP: f32 = 0.2;

/// A star to pick up. Takes no part in physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
    /// Latches true; only a level restart clears it
    pub collected: bool,
    /// Animation clock in ticks
    pub phase: u32,
}

impl Collectible {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            collected: false,
            phase: 0,
        }
    }

    /// Advance the bob animation (frozen once collected)
    pub fn animate(&mut self) {
        if !self.collected {
            self.phase = self.phase.wrapping_add(1);
        }
    }

    /// Vertical bob: triangle wave between -3 and +3
    pub fn bob_offset(&self) -> f32 {
        let t = self.phase % BOB_PERIOD;
        let quarter = BOB_PERIOD / 4;
        match t {
            t if t <= quarter => t as f32 * BOB_STEP,
            t if t <= 3 * quarter => (2 * quarter) as f32 * BOB_STEP - t as f32 * BOB_STEP,
            t => (t as f32 - BOB_PERIOD as f32) * BOB_STEP,
        }
    }

    pub fn rect(&self) -> Aabb {
        Aabb::new(
            self.pos.x,
            self.pos.y + self.bob_offset(),
            COLLECTIBLE_SIZE,
            COLLECTIBLE_SIZE,
        )
    }

    /// Mark collected if `by` overlaps it. Returns true only on the first pickup.
    pub fn try_collect(&mut self, by: &Aabb) -> bool {
        if self.collected || !self.rect().intersects(by) {
            return false;
        }
        self.collected = true;
        true
    }
}
