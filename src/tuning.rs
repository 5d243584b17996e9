//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level designer can override it from a
//! JSON file. Missing keys fall back to the defaults below.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("could not read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Actor movement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    /// Forward speed before the loop multiplier (units/s)
    pub base_speed: f32,
    /// Upward velocity change on jump launch
    pub jump_force: f32,
    /// Vertical acceleration while rising from a jump
    pub air_gravity: f32,
    /// Vertical acceleration while falling
    pub fall_gravity: f32,
    /// Vertical acceleration while grounded
    pub ground_gravity: f32,
    /// Ground probe sphere radius
    pub ground_probe_radius: f32,
    /// Ground probe cast length
    pub ground_probe_distance: f32,
    /// Falling below this height kills the actor
    pub death_height: f32,
    /// Delay between jump input and launch (lets the squash play)
    pub jump_delay: f32,
    /// Deceleration ramp length after reaching the goal
    pub finish_ramp_duration: f32,
    /// Pause after stopping before the level is reported complete
    pub finish_hold: f32,
    /// Speed under which a grounded actor counts as stalled
    pub stall_speed: f32,
    /// Backward impulse applied to a stalled actor
    pub stall_nudge: f32,
    /// Landing speed above which the impact squash plays
    pub impact_speed_threshold: f32,
    /// Yaw of the two lanes in degrees
    pub lane_yaw_degrees: [f32; 2],
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            jump_force: 3.2,
            air_gravity: -4.5,
            fall_gravity: -9.81,
            ground_gravity: -9.81,
            ground_probe_radius: 0.25,
            ground_probe_distance: 0.8,
            death_height: -5.0,
            jump_delay: 0.08,
            finish_ramp_duration: 2.0,
            finish_hold: 1.0,
            stall_speed: 0.05,
            stall_nudge: 3.0,
            impact_speed_threshold: 1.0,
            lane_yaw_degrees: [0.0, 90.0],
        }
    }
}

/// Run loop and difficulty parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    /// Distance between automatic score checkpoints
    pub checkpoint_step: f32,
    /// Base points per checkpoint
    pub checkpoint_points: u32,
    /// Speed multiplier growth per completed loop
    pub speed_growth: f32,
    /// Score multiplier growth per completed loop
    pub score_growth: f32,
    /// Menu to play-view camera move
    pub camera_transition: f32,
    /// Camera orbit after reaching the goal
    pub celebration_duration: f32,
    /// Overlay fade in/out
    pub fade_duration: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            checkpoint_step: 5.0,
            checkpoint_points: 1,
            speed_growth: 1.1,
            score_growth: 1.5,
            camera_transition: 1.5,
            celebration_duration: 3.0,
            fade_duration: 1.0,
        }
    }
}

/// Camera placement and smoothing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub menu_position: Vec3,
    /// Menu camera Euler angles in degrees
    pub menu_euler: Vec3,
    /// Follow offset in the actor's local frame
    pub follow_offset: Vec3,
    pub follow_speed: f32,
    pub rotation_smooth: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            menu_position: Vec3::new(-13.0, 7.5, -7.5),
            menu_euler: Vec3::new(19.0, 40.0, 0.2),
            follow_offset: Vec3::new(0.0, 4.0, -6.0),
            follow_speed: 5.0,
            rotation_smooth: 5.0,
        }
    }
}

/// Squash and stretch shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SquashTuning {
    pub squash_scale: f32,
    pub stretch_scale: f32,
    pub impact_scale: f32,
    pub animation_speed: f32,
}

impl Default for SquashTuning {
    fn default() -> Self {
        Self {
            squash_scale: 0.8,
            stretch_scale: 1.2,
            impact_scale: 0.7,
            animation_speed: 10.0,
        }
    }
}

/// Level colour scheme generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteTuning {
    pub road_darken: f32,
    pub actor_darken: f32,
    pub background_darken: f32,
    pub saturation: (f32, f32),
    pub value: (f32, f32),
}

impl Default for PaletteTuning {
    fn default() -> Self {
        Self {
            road_darken: 0.7,
            actor_darken: 0.5,
            background_darken: 0.3,
            saturation: (0.7, 1.0),
            value: (0.6, 0.9),
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub locomotion: LocomotionTuning,
    pub session: SessionTuning,
    pub camera: CameraTuning,
    pub squash: SquashTuning,
    pub palette: PaletteTuning,
}

impl Tuning {
    /// Parse and validate tuning from JSON text
    pub fn from_json(text: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&text)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Self::default()
            }
        }
    }

    /// Reject values that would stall or invert the run loop
    pub fn validate(&self) -> Result<(), TuningError> {
        let loco = &self.locomotion;
        let session = &self.session;

        positive("locomotion.base_speed", loco.base_speed)?;
        positive("locomotion.jump_force", loco.jump_force)?;
        positive("locomotion.ground_probe_distance", loco.ground_probe_distance)?;
        non_negative("locomotion.ground_probe_radius", loco.ground_probe_radius)?;
        non_negative("locomotion.jump_delay", loco.jump_delay)?;
        non_negative("locomotion.finish_ramp_duration", loco.finish_ramp_duration)?;
        non_negative("locomotion.finish_hold", loco.finish_hold)?;

        positive("session.checkpoint_step", session.checkpoint_step)?;
        growth("session.speed_growth", session.speed_growth)?;
        growth("session.score_growth", session.score_growth)?;
        non_negative("session.camera_transition", session.camera_transition)?;
        non_negative("session.celebration_duration", session.celebration_duration)?;
        non_negative("session.fade_duration", session.fade_duration)?;

        positive("squash.animation_speed", self.squash.animation_speed)?;

        let (lo, hi) = self.palette.saturation;
        if !(0.0..=1.0).contains(&lo) || !(lo..=1.0).contains(&hi) {
            return Err(TuningError::Invalid {
                field: "palette.saturation",
                reason: "must be an ordered range within [0, 1]",
            });
        }
        let (lo, hi) = self.palette.value;
        if !(0.0..=1.0).contains(&lo) || !(lo..=1.0).contains(&hi) {
            return Err(TuningError::Invalid {
                field: "palette.value",
                reason: "must be an ordered range within [0, 1]",
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: "must be a positive number",
        })
    }
}

/// Per-loop growth factors compound, so keep them in a sane band
const MAX_GROWTH: f32 = 4.0;

fn growth(field: &'static str, value: f32) -> Result<(), TuningError> {
    positive(field, value)?;
    if value > MAX_GROWTH {
        return Err(TuningError::Invalid {
            field,
            reason: "must not exceed 4.0",
        });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: "must be zero or positive",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "session": { "speed_growth": 1.25 } }"#).unwrap();
        assert_eq!(tuning.session.speed_growth, 1.25);
        assert_eq!(tuning.session.score_growth, 1.5);
        assert_eq!(tuning.locomotion.jump_force, 3.2);
    }

    #[test]
    fn test_rejects_zero_checkpoint_step() {
        let err = Tuning::from_json(r#"{ "session": { "checkpoint_step": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "session.checkpoint_step",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_runaway_score_growth() {
        let err = Tuning::from_json(r#"{ "session": { "score_growth": 1e20 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "session.score_growth",
                ..
            }
        ));
        assert!(Tuning::from_json(r#"{ "session": { "score_growth": 4.0 } }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ locomotion: ").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = Tuning::load_or_default("/nonexistent/zigzag/tuning.json");
        assert_eq!(tuning.locomotion.base_speed, 5.0);
    }
}
