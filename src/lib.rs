//! Platform Replay - deterministic 2D platformer core with frame-exact replay
//!
//! Core modules:
//! - `sim`: Simulation (AABB physics, collision resolution, entities, phases, replay)
//! - `settings`: Session behaviour switches
//! - `tuning`: Data-driven physics and scoring balance
//! - `error`: Errors surfaced by the public API
//!
//! Rendering, audio and input polling are left to the host: it calls
//! [`sim::Simulation::tick`] once per frame and reads the resolved state back.

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use settings::Settings;
pub use tuning::Tuning;

/// Fixed world geometry
pub mod consts {
    use glam::Vec2;

    /// Nominal simulation rate; all physics is expressed per tick
    pub const SIM_HZ: u32 = 60;

    /// World dimensions (y grows downward)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;
    pub const ENEMY_WIDTH: f32 = 32.0;
    pub const ENEMY_HEIGHT: f32 = 32.0;
    pub const COLLECTIBLE_SIZE: f32 = 16.0;

    /// Default player spawn (top-left corner)
    pub const PLAYER_SPAWN: Vec2 = Vec2::new(100.0, 500.0);
}
