//! Errors returned by the public simulation API
//!
//! Only caller mistakes and bad configuration surface here. Broken internal
//! invariants panic.

use core::fmt;

use crate::sim::GamePhase;

#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    UnknownLevel { level: u32, available: u32 },
    InvalidTransition { from: GamePhase, to: GamePhase },
    NoRecording,
    UnsupportedReplayRate(f32),
    Config(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel { level, available } => {
                write!(f, "level {level} does not exist (1..={available})")
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "cannot go from {} to {}", from.as_str(), to.as_str())
            }
            Self::NoRecording => write!(f, "no replay data available"),
            Self::UnsupportedReplayRate(rate) => {
                write!(f, "unsupported replay rate {rate}x (expected 0.25, 0.5, 1, 2 or 4)")
            }
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
