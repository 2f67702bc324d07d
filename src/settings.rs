//! Session settings
//!
//! Behaviour switches that are not physics tuning: seam handling, world
//! edges, fall-out handling and the replay start speed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::WORLD_WIDTH;
use crate::error::SimError;
use crate::sim::{ReplayRate, SeamPolicy, WorldBounds};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How a vertical move touching several platforms picks its snap surface
    pub seam_policy: SeamPolicy,
    /// Falling below the world ends the attempt; otherwise the player respawns
    pub fall_out_is_fatal: bool,
    /// Clamp bodies to the right world edge as well as the left one
    pub clamp_right_edge: bool,
    /// Speed every replay starts at
    pub default_replay_rate: ReplayRate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seam_policy: SeamPolicy::NearestContact,
            fall_out_is_fatal: true,
            clamp_right_edge: true,
            default_replay_rate: ReplayRate::Normal,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(|err| SimError::Config(err.to_string()))
            .and_then(|json| Self::from_json(&json));
        match loaded {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings ({}: {err})", path.display());
                Self::default()
            }
        }
    }

    /// Edges bodies are clamped to. There is no floor: falling out of the
    /// world is detected by the simulation instead.
    pub fn world_bounds(&self) -> WorldBounds {
        WorldBounds {
            left: Some(0.0),
            right: self.clamp_right_edge.then_some(WORLD_WIDTH),
            top: Some(0.0),
            floor: None,
        }
    }
}
