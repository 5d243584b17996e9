//! Events emitted during a frame.
//! The presentation layer consumes these for UI, audio and effects.

use serde::{Deserialize, Serialize};

use super::contact::VolumeId;
use super::locomotion::Facing;
use super::palette::Palette;
use super::session::Phase;

/// One-shot audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    SwitchLane,
    Jump,
    Land,
    Pickup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: Phase, to: Phase },
    ScoreChanged { score: u64 },
    LaneSwitched { facing: Facing },
    Jumped,
    Landed { impact_speed: f32 },
    PickupCollected { volume: VolumeId, points: u64 },
    PlayerDied { score: u64, high_score: u64 },
    GoalReached,
    /// `loop_index` is the 0-based loop that was just finished
    LevelCompleted { loop_index: u32 },
    LevelReset,
    LoopStarted { loop_count: u32, speed_multiplier: f32, score_multiplier: f32 },
    PaletteChanged(Palette),
    Sound { cue: SoundCue, volume: f32 },
}
