//! The simulation aggregate
//!
//! Everything a session owns lives in [`Simulation`]: the level's collision
//! world, the entities, the phase machine, the recorder and the seeded RNG
//! that drives enemy flips. Collaborators read it between ticks and drive it
//! through the trigger methods below plus [`Simulation::tick`].

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionWorld;
use super::entities::{Collectible, Enemy, EnemyId, Player, TickInput};
use super::level::Level;
use super::phase::{GamePhase, PhaseMachine};
use super::replay::{EnemySnapshot, Recording, ReplayPlayer, ReplayRate, ReplayRecorder, Snapshot};
use crate::error::SimError;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Why an attempt ended in game over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Enemy(EnemyId),
    FellOut,
}

/// Things that happened during the last tick, for audio/UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Landed,
    EnemyStomped { id: EnemyId },
    /// Index into the level's collectible list
    Collected { index: usize },
    /// Fell out with fall-out set to non-fatal
    Respawned,
    PlayerKilled { cause: DeathCause },
    LevelComplete { level: u32 },
    RecordingStopped { frames: usize },
    /// `frame` is the clamped last index playback stopped on
    ReplayFinished { frame: usize },
}

/// Discrete input edges (menu keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAction {
    /// Space/click: start, continue, next level
    Start,
    /// Escape: leave the current screen
    Back,
    /// Watch (or restart) the last recording
    Replay,
    FasterReplay,
    SlowerReplay,
}

/// What the host loop should do after an input edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A complete simulation session
#[derive(Debug)]
pub struct Simulation {
    pub(crate) seed: u64,
    /// Only enemy direction flips draw from this
    pub(crate) rng: Pcg32,
    pub(crate) settings: Settings,
    pub(crate) tuning: Tuning,
    pub(crate) levels: Vec<Level>,
    /// Index into `levels` of the loaded layout
    pub(crate) level_index: usize,
    pub(crate) world: CollisionWorld,
    pub(crate) player: Player,
    /// Live enemies, in spawn order
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) collectibles: Vec<Collectible>,
    pub(crate) phase: PhaseMachine,
    pub(crate) recorder: ReplayRecorder,
    pub(crate) playback: Option<ReplayPlayer>,
    pub(crate) time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
}

impl Simulation {
    /// A session over the built-in campaign
    pub fn new(seed: u64, settings: Settings, tuning: Tuning) -> Self {
        Self::build(seed, settings, tuning, Level::campaign())
    }

    /// A session over a custom level set. Levels are renumbered 1..=n in the
    /// given order.
    pub fn with_levels(seed: u64, settings: Settings, tuning: Tuning, mut levels: Vec<Level>) -> Result<Self, SimError> {
        if levels.is_empty() {
            return Err(SimError::Config("a session needs at least one level".into()));
        }
        for (i, level) in levels.iter_mut().enumerate() {
            level.number = i as u32 + 1;
        }
        Ok(Self::build(seed, settings, tuning, levels))
    }

    fn build(seed: u64, settings: Settings, tuning: Tuning, levels: Vec<Level>) -> Self {
        let world = CollisionWorld::new(Vec::new(), settings.world_bounds(), settings.seam_policy);
        let mut sim = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(Vec2::ZERO, &tuning),
            settings,
            tuning,
            levels,
            level_index: 0,
            world,
            enemies: Vec::new(),
            collectibles: Vec::new(),
            phase: PhaseMachine::default(),
            recorder: ReplayRecorder::default(),
            playback: None,
            time_ticks: 0,
            events: Vec::new(),
        };
        // Menu backdrop
        sim.load_level(0);
        sim
    }

    // === Read-only state ===

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase.current()
    }

    pub fn phase_machine(&self) -> &PhaseMachine {
        &self.phase
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// 1-based number of the loaded level
    pub fn level_number(&self) -> u32 {
        self.levels[self.level_index].number
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    /// Events published by the last tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// The last finished recording, if any
    pub fn recording(&self) -> Option<Arc<Recording>> {
        self.recorder.finished()
    }

    /// Snapshot index the active replay last applied to the world, `None`
    /// outside a replay and before its first tick
    pub fn replay_index(&self) -> Option<usize> {
        self.playback.as_ref().and_then(ReplayPlayer::displayed)
    }

    pub fn replay_rate(&self) -> Option<ReplayRate> {
        self.playback.as_ref().map(ReplayPlayer::rate)
    }

    // === Snapshots ===

    /// Capture the current resolved world state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player_pos: self.player.body.pos,
            player_vel: self.player.body.vel,
            player_facing: self.player.facing,
            score: self.player.score,
            collected_count: self.player.collected_count,
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemySnapshot {
                    id: e.id,
                    pos: e.body.pos,
                    vel: e.body.vel,
                })
                .collect(),
            collectibles: self.collectibles.iter().map(|c| c.collected).collect(),
        }
    }

    /// Overwrite entity state from a snapshot of the loaded level
    pub(crate) fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        assert_eq!(
            snapshot.collectibles.len(),
            self.collectibles.len(),
            "snapshot does not match level {}",
            self.level_number()
        );
        let body = &mut self.player.body;
        body.pos = snapshot.player_pos;
        body.vel = snapshot.player_vel;
        self.player.facing = snapshot.player_facing;
        self.player.score = snapshot.score;
        self.player.collected_count = snapshot.collected_count;

        let level = &self.levels[self.level_index];
        self.enemies = snapshot
            .enemies
            .iter()
            .map(|e| {
                let spawn = level.enemy_spawns[e.id as usize];
                let mut enemy = Enemy::new(e.id, spawn, &self.tuning);
                enemy.body.pos = e.pos;
                enemy.body.vel = e.vel;
                enemy
            })
            .collect();

        for (collectible, &collected) in self.collectibles.iter_mut().zip(&snapshot.collectibles) {
            collectible.collected = collected;
        }
    }

    // === Triggers ===

    /// Start (or restart) level `number`, 1-based. Resets the player, loads
    /// the layout and begins a fresh recording.
    pub fn start_level(&mut self, number: u32) -> Result<(), SimError> {
        let available = self.level_count();
        if number == 0 || number > available {
            return Err(SimError::UnknownLevel { level: number, available });
        }
        self.phase.transition(GamePhase::Playing, self.time_ticks)?;
        self.playback = None;
        self.load_level(number as usize - 1);
        self.recorder.start(number);
        log::info!("Level {number} started");
        Ok(())
    }

    /// Replay the last finished recording. The level layout is loaded here;
    /// the first replay tick shows frame 0.
    pub fn start_replay(&mut self) -> Result<(), SimError> {
        let from = self.phase();
        if !from.allows_replay() {
            return Err(SimError::InvalidTransition {
                from,
                to: GamePhase::Replay,
            });
        }
        let recording = self.recorder.finished().ok_or(SimError::NoRecording)?;
        self.phase.transition(GamePhase::Replay, self.time_ticks)?;

        // Snapshots only hold dynamic state; the layout comes from the level
        self.load_level(recording.level as usize - 1);
        let player = ReplayPlayer::new(recording, self.settings.default_replay_rate);
        log::info!(
            "Replay started: {} frames at {}x",
            player.recording().len(),
            player.rate().multiplier()
        );
        self.playback = Some(player);
        Ok(())
    }

    /// Change the speed of the running replay. Outside a replay this has no
    /// effect; the next replay starts at the configured default rate.
    pub fn set_replay_rate(&mut self, multiplier: f32) -> Result<ReplayRate, SimError> {
        let rate = ReplayRate::try_from(multiplier)?;
        if let Some(player) = self.playback.as_mut() {
            player.set_rate(rate);
        }
        Ok(rate)
    }

    /// React to a discrete input edge
    pub fn handle_input_edge(&mut self, action: InputAction) -> Result<Flow, SimError> {
        use GamePhase::*;
        match (self.phase(), action) {
            (Menu, InputAction::Start) => self.start_level(1)?,
            (GameOver, InputAction::Start) => self.enter_phase(Menu),
            (Win, InputAction::Start) => {
                let next = self.level_number() + 1;
                if next <= self.level_count() {
                    let score = self.player.score;
                    self.start_level(next)?;
                    self.player.score = score;
                } else {
                    log::info!("Campaign complete with score {}", self.player.score);
                    self.enter_phase(Menu);
                }
            }

            (Menu | GameOver | Win, InputAction::Back) => return Ok(Flow::Quit),
            (Playing, InputAction::Back) => {
                let frames = self.recorder.stop();
                self.events.push(GameEvent::RecordingStopped { frames });
                self.enemies.clear();
                self.collectibles.clear();
                self.enter_phase(Menu);
            }
            (Replay, InputAction::Back) => {
                self.playback = None;
                self.enter_phase(Menu);
            }

            (Menu | GameOver | Win, InputAction::Replay) => self.start_replay()?,
            (Replay, InputAction::Replay) => {
                if let Some(player) = self.playback.as_mut() {
                    player.restart();
                }
            }
            (Replay, InputAction::FasterReplay | InputAction::SlowerReplay) => {
                if let Some(player) = self.playback.as_mut() {
                    let rate = match action {
                        InputAction::FasterReplay => player.rate().faster(),
                        _ => player.rate().slower(),
                    };
                    player.set_rate(rate);
                }
            }

            // Jumping is tick input; replay speed keys only act during replay
            _ => {}
        }
        Ok(Flow::Continue)
    }

    /// Advance one tick. Returns the events it produced.
    pub fn tick(&mut self, input: &TickInput) -> &[GameEvent] {
        super::tick::tick(self, input)
    }

    // === Internals ===

    /// Replace the platform set and every entity with a fresh copy of a level
    pub(crate) fn load_level(&mut self, index: usize) {
        let level = &self.levels[index];
        self.level_index = index;
        self.world.replace_platforms(level.platforms.clone());
        self.player = Player::new(level.player_spawn, &self.tuning);
        self.enemies = level
            .enemy_spawns
            .iter()
            .enumerate()
            .map(|(id, &spawn)| Enemy::new(id as EnemyId, spawn, &self.tuning))
            .collect();
        self.collectibles = level.collectibles.iter().copied().map(Collectible::new).collect();
        log::debug!(
            "Loaded level {}: {} platforms, {} enemies, {} collectibles",
            level.number,
            level.platforms.len(),
            self.enemies.len(),
            self.collectibles.len()
        );
    }

    /// Transition the simulation itself decided on. An illegal edge here is a
    /// bug, not a caller error.
    pub(crate) fn enter_phase(&mut self, next: GamePhase) {
        if let Err(err) = self.phase.transition(next, self.time_ticks) {
            panic!("internal phase change rejected: {err}");
        }
    }

    /// Put the player back at the level spawn, keeping score
    pub(crate) fn respawn_player(&mut self) {
        let spawn = self.levels[self.level_index].player_spawn;
        self.player.body.pos = spawn;
        self.player.body.vel = Vec2::ZERO;
        self.player.body.on_ground = false;
        self.player.jumped = false;
    }
}
