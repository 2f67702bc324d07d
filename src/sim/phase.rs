//! Game phase state machine
//!
//! ```text
//! menu -> playing -> game_over -> menu | replay
//!                 -> win       -> playing (next level) | menu | replay
//! menu -> replay -> menu
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Menu,
    /// Live simulation; the only phase that records
    Playing,
    GameOver,
    /// Level cleared
    Win,
    /// Playing back the last recording
    Replay,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game_over",
            GamePhase::Win => "win",
            GamePhase::Replay => "replay",
        }
    }

    /// Edges of the state machine. `Playing -> Playing` is a level restart.
    pub fn can_transition_to(self, next: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, next),
            (Menu, Playing)
                | (Menu, Replay)
                | (Playing, Playing)
                | (Playing, GameOver)
                | (Playing, Win)
                | (Playing, Menu)
                | (GameOver, Menu)
                | (GameOver, Replay)
                | (Win, Playing)
                | (Win, Menu)
                | (Win, Replay)
                | (Replay, Menu)
        )
    }

    /// Phases a replay may be started from
    pub fn allows_replay(self) -> bool {
        self.can_transition_to(GamePhase::Replay)
    }
}

/// Current phase plus bookkeeping about the last change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMachine {
    current: GamePhase,
    previous: Option<GamePhase>,
    entered_at_tick: u64,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self {
            current: GamePhase::Menu,
            previous: None,
            entered_at_tick: 0,
        }
    }
}

impl PhaseMachine {
    #[inline]
    pub fn current(&self) -> GamePhase {
        self.current
    }

    pub fn previous(&self) -> Option<GamePhase> {
        self.previous
    }

    pub fn entered_at_tick(&self) -> u64 {
        self.entered_at_tick
    }

    /// Move to `next` if the edge exists
    pub fn transition(&mut self, next: GamePhase, tick: u64) -> Result<(), SimError> {
        if !self.current.can_transition_to(next) {
            return Err(SimError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        log::debug!("phase {} -> {} at tick {}", self.current.as_str(), next.as_str(), tick);
        self.previous = Some(self.current);
        self.current = next;
        self.entered_at_tick = tick;
        Ok(())
    }
}
