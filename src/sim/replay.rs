//! Frame-exact session recording and variable-speed playback
//!
//! Every recorded tick stores a full copy of the resolved world state.
//! Playback never runs physics; it overwrites entity state from snapshots,
//! so a replay looks the same no matter how the simulation changes later.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{EnemyId, Facing};
use crate::error::SimError;

/// Recorded state of one live enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: EnemyId,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Fully resolved world state of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    pub player_facing: Facing,
    pub score: u32,
    pub collected_count: u32,
    /// Enemies alive this tick, in simulation order
    pub enemies: Vec<EnemySnapshot>,
    /// `collected` flag per collectible, in level order
    pub collectibles: Vec<bool>,
}

/// All snapshots of one level attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Level the attempt was played on
    pub level: u32,
    pub snapshots: Vec<Snapshot>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Captures snapshots while a level attempt is live
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    /// Attempt being recorded (exclusively owned until stopped)
    active: Option<Recording>,
    /// Last finished recording, shared read-only with players
    finished: Option<Arc<Recording>>,
}

impl ReplayRecorder {
    /// Start a fresh recording, discarding any previous one
    pub fn start(&mut self, level: u32) {
        self.finished = None;
        self.active = Some(Recording {
            level,
            snapshots: Vec::new(),
        });
        log::info!("Recording started (level {level})");
    }

    /// Freeze the active recording. Returns the number of frames captured.
    pub fn stop(&mut self) -> usize {
        match self.active.take() {
            Some(recording) => {
                let frames = recording.len();
                log::info!("Recording stopped. Captured {frames} frames");
                self.finished = Some(Arc::new(recording));
                frames
            }
            None => 0,
        }
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Append a snapshot; ignored when not recording
    pub fn record(&mut self, snapshot: Snapshot) {
        if let Some(active) = self.active.as_mut() {
            active.snapshots.push(snapshot);
        }
    }

    /// Frames captured so far by the active recording
    pub fn active_len(&self) -> usize {
        self.active.as_ref().map_or(0, Recording::len)
    }

    /// The last finished recording, if it holds at least one frame
    pub fn finished(&self) -> Option<Arc<Recording>> {
        self.finished.as_ref().filter(|r| !r.is_empty()).cloned()
    }
}

/// Supported playback speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub enum ReplayRate {
    Quarter,
    Half,
    #[default]
    Normal,
    Double,
    Quadruple,
}

impl ReplayRate {
    pub const ALL: [ReplayRate; 5] = [
        ReplayRate::Quarter,
        ReplayRate::Half,
        ReplayRate::Normal,
        ReplayRate::Double,
        ReplayRate::Quadruple,
    ];

    pub fn multiplier(self) -> f32 {
        match self {
            ReplayRate::Quarter => 0.25,
            ReplayRate::Half => 0.5,
            ReplayRate::Normal => 1.0,
            ReplayRate::Double => 2.0,
            ReplayRate::Quadruple => 4.0,
        }
    }

    /// Snapshot indices advanced per playback tick (0 for slow rates)
    fn frames_per_tick(self) -> usize {
        match self {
            ReplayRate::Double => 2,
            ReplayRate::Quadruple => 4,
            _ => 1,
        }
    }

    /// Playback ticks each snapshot is held for
    fn ticks_per_frame(self) -> u32 {
        match self {
            ReplayRate::Quarter => 4,
            ReplayRate::Half => 2,
            _ => 1,
        }
    }

    /// Twice as fast, saturating at 4x
    pub fn faster(self) -> Self {
        match self {
            ReplayRate::Quarter => ReplayRate::Half,
            ReplayRate::Half => ReplayRate::Normal,
            ReplayRate::Normal => ReplayRate::Double,
            ReplayRate::Double | ReplayRate::Quadruple => ReplayRate::Quadruple,
        }
    }

    /// Half as fast, saturating at 0.25x
    pub fn slower(self) -> Self {
        match self {
            ReplayRate::Quarter | ReplayRate::Half => ReplayRate::Quarter,
            ReplayRate::Normal => ReplayRate::Half,
            ReplayRate::Double => ReplayRate::Normal,
            ReplayRate::Quadruple => ReplayRate::Double,
        }
    }
}

impl TryFrom<f32> for ReplayRate {
    type Error = SimError;

    fn try_from(multiplier: f32) -> Result<Self, Self::Error> {
        ReplayRate::ALL
            .into_iter()
            .find(|r| r.multiplier() == multiplier)
            .ok_or(SimError::UnsupportedReplayRate(multiplier))
    }
}

impl From<ReplayRate> for f32 {
    fn from(rate: ReplayRate) -> f32 {
        rate.multiplier()
    }
}

/// Result of one playback tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStep {
    /// Snapshot index to display this tick
    pub shown: usize,
    /// Playback reached the end during this tick
    pub finished: bool,
}

/// Cursor over a finished recording
#[derive(Debug, Clone)]
pub struct ReplayPlayer {
    recording: Arc<Recording>,
    /// Index the next tick shows
    cursor: usize,
    /// Index the most recent tick showed
    displayed: Option<usize>,
    rate: ReplayRate,
    /// Ticks the current snapshot has been held (slow rates)
    held: u32,
    finished: bool,
}

impl ReplayPlayer {
    pub fn new(recording: Arc<Recording>, rate: ReplayRate) -> Self {
        assert!(!recording.is_empty(), "cannot play an empty recording");
        Self {
            recording,
            cursor: 0,
            displayed: None,
            rate,
            held: 0,
            finished: false,
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Snapshot index on screen, `None` before the first tick
    #[inline]
    pub fn displayed(&self) -> Option<usize> {
        self.displayed
    }

    pub fn rate(&self) -> ReplayRate {
        self.rate
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn set_rate(&mut self, rate: ReplayRate) {
        if rate != self.rate {
            log::info!("Replay speed: {}x", rate.multiplier());
        }
        self.rate = rate;
        self.held = 0;
    }

    /// Back to the first frame; the next tick shows index 0
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.displayed = None;
        self.held = 0;
        self.finished = false;
    }

    /// Show the snapshot under the cursor, then move the cursor by the rate.
    /// An advance past the end clamps to the last index, which is shown on
    /// its own tick; playback finishes when the last index is due to advance.
    pub fn step(&mut self) -> PlaybackStep {
        let shown = self.cursor;
        if self.finished {
            return PlaybackStep { shown, finished: true };
        }
        self.displayed = Some(shown);

        let advance = if self.rate.ticks_per_frame() > 1 {
            self.held += 1;
            if self.held >= self.rate.ticks_per_frame() {
                self.held = 0;
                1
            } else {
                0
            }
        } else {
            self.rate.frames_per_tick()
        };

        let last = self.recording.len() - 1;
        if advance > 0 {
            if shown == last {
                self.finished = true;
            } else {
                self.cursor = (shown + advance).min(last);
            }
        }
        PlaybackStep {
            shown,
            finished: self.finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(i: usize) -> Snapshot {
        Snapshot {
            player_pos: Vec2::new(i as f32, 0.0),
            player_vel: Vec2::ZERO,
            player_facing: Facing::Right,
            score: 0,
            collected_count: 0,
            enemies: Vec::new(),
            collectibles: vec![false],
        }
    }

    fn recording(frames: usize) -> Arc<Recording> {
        Arc::new(Recording {
            level: 1,
            snapshots: (0..frames).map(snapshot).collect(),
        })
    }

    /// Indices shown until playback finishes, plus the last one displayed
    fn play(frames: usize, rate: ReplayRate) -> (Vec<usize>, usize) {
        let mut player = ReplayPlayer::new(recording(frames), rate);
        let mut shown = Vec::new();
        loop {
            let step = player.step();
            assert_eq!(player.displayed(), Some(step.shown));
            shown.push(step.shown);
            if step.finished {
                return (shown, step.shown);
            }
            assert!(shown.len() < 10_000, "playback never terminated");
        }
    }

    #[test]
    fn test_double_speed_visits_even_frames_then_last() {
        let (shown, end) = play(100, ReplayRate::Double);
        let mut expected: Vec<usize> = (0..100).step_by(2).collect();
        expected.push(99);
        assert_eq!(shown, expected);
        assert_eq!(end, 99);
    }

    #[test]
    fn test_normal_speed_visits_every_frame() {
        let (shown, end) = play(10, ReplayRate::Normal);
        assert_eq!(shown, (0..10).collect::<Vec<_>>());
        assert_eq!(end, 9);
    }

    #[test]
    fn test_quarter_speed_holds_each_frame_four_ticks() {
        let (shown, end) = play(3, ReplayRate::Quarter);
        assert_eq!(shown, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(end, 2);
    }

    #[test]
    fn test_quadruple_speed_clamps_to_last() {
        let (shown, end) = play(10, ReplayRate::Quadruple);
        assert_eq!(shown, vec![0, 4, 8, 9]);
        assert_eq!(end, 9);
    }

    #[test]
    fn test_single_frame_recording_at_half_speed() {
        let (shown, end) = play(1, ReplayRate::Half);
        assert_eq!(shown, vec![0, 0]);
        assert_eq!(end, 0);
    }

    #[test]
    fn test_restart_and_finished_is_sticky() {
        let mut player = ReplayPlayer::new(recording(2), ReplayRate::Quadruple);
        assert_eq!(player.displayed(), None);
        assert_eq!(player.step(), PlaybackStep { shown: 0, finished: false });
        assert_eq!(player.step(), PlaybackStep { shown: 1, finished: true });
        assert_eq!(player.step(), PlaybackStep { shown: 1, finished: true });
        assert_eq!(player.displayed(), Some(1));

        player.restart();
        assert_eq!(player.displayed(), None);
        assert!(!player.is_finished());
        assert_eq!(player.step().shown, 0);
    }

    #[test]
    fn test_rate_ladder_saturates() {
        assert_eq!(ReplayRate::Normal.faster().faster().faster(), ReplayRate::Quadruple);
        assert_eq!(ReplayRate::Normal.slower().slower().slower(), ReplayRate::Quarter);
    }

    #[test]
    fn test_rate_from_multiplier() {
        assert_eq!(ReplayRate::try_from(0.5), Ok(ReplayRate::Half));
        assert_eq!(ReplayRate::try_from(3.0), Err(SimError::UnsupportedReplayRate(3.0)));
        let json = serde_json::to_string(&ReplayRate::Double).unwrap();
        assert_eq!(json, "2.0");
        let back: ReplayRate = serde_json::from_str("0.25").unwrap();
        assert_eq!(back, ReplayRate::Quarter);
    }

    #[test]
    fn test_recorder_lifecycle() {
        let mut recorder = ReplayRecorder::default();
        recorder.record(snapshot(0));
        assert!(recorder.finished().is_none());

        recorder.start(2);
        assert!(recorder.is_recording());
        for i in 0..5 {
            recorder.record(snapshot(i));
        }
        assert_eq!(recorder.active_len(), 5);
        assert!(recorder.finished().is_none());
        assert_eq!(recorder.stop(), 5);
        assert!(!recorder.is_recording());

        let done = recorder.finished().unwrap();
        assert_eq!(done.level, 2);
        assert_eq!(done.len(), 5);

        // A new attempt clears the old recording at once
        recorder.start(3);
        assert!(recorder.finished().is_none());
        assert_eq!(recorder.stop(), 0);
        assert!(recorder.finished().is_none());
    }
}
