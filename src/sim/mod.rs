//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed tick only, no wall-clock time
//! - Seeded RNG only (enemy direction flips)
//! - Stable iteration order (platforms and enemies in level order)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod body;
pub mod collision;
pub mod entities;
pub mod level;
pub mod phase;
pub mod replay;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use body::{BodyParams, Mobile, MotionBody};
pub use collision::{BoundaryHits, CollisionWorld, Platform, PlatformKind, Resolution, SeamPolicy, WorldBounds};
pub use entities::{Collectible, Contact, Enemy, EnemyId, Facing, Player, TickInput, classify_contact};
pub use level::Level;
pub use phase::{GamePhase, PhaseMachine};
pub use replay::{EnemySnapshot, PlaybackStep, Recording, ReplayPlayer, ReplayRate, ReplayRecorder, Snapshot};
pub use state::{DeathCause, Flow, GameEvent, InputAction, Simulation};
pub use tick::tick;
