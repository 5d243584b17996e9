//! Player settings and preferences
//!
//! Persisted separately from tuning; the host decides where the file lives.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::SoundCue;

/// Errors raised while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Lane switch cue volume
    pub switch_volume: f32,
    /// Jump take-off cue volume
    pub jump_volume: f32,
    /// Landing cue volume
    pub land_volume: f32,
    /// Crystal pickup cue volume
    pub pickup_volume: f32,
    /// Silence every cue
    pub muted: bool,

    // === Visual Effects ===
    /// Squash and stretch on jump/land
    pub squash_effects: bool,
    /// Celebration camera orbit on level complete
    pub celebration_orbit: bool,

    // === Accessibility ===
    /// Reduced motion (no squash, no orbit)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            switch_volume: 1.0,
            jump_volume: 1.0,
            land_volume: 1.0,
            pickup_volume: 1.0,
            muted: false,

            squash_effects: true,
            celebration_orbit: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective volume for a cue (0 when muted)
    pub fn cue_volume(&self, cue: SoundCue) -> f32 {
        if self.muted {
            return 0.0;
        }
        let cue_volume = match cue {
            SoundCue::SwitchLane => self.switch_volume,
            SoundCue::Jump => self.jump_volume,
            SoundCue::Land => self.land_volume,
            SoundCue::Pickup => self.pickup_volume,
        };
        (self.master_volume * cue_volume).clamp(0.0, 1.0)
    }

    /// Effective squash and stretch (respects reduced_motion)
    pub fn effective_squash(&self) -> bool {
        self.squash_effects && !self.reduced_motion
    }

    /// Effective celebration orbit (respects reduced_motion)
    pub fn effective_orbit(&self) -> bool {
        self.celebration_orbit && !self.reduced_motion
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_volume_scales_by_master() {
        let settings = Settings {
            master_volume: 0.5,
            jump_volume: 0.5,
            ..Default::default()
        };
        assert!((settings.cue_volume(SoundCue::Jump) - 0.25).abs() < 1e-6);
        assert!((settings.cue_volume(SoundCue::Land) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_muted_silences_everything() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.cue_volume(SoundCue::Pickup), 0.0);
        assert_eq!(settings.cue_volume(SoundCue::SwitchLane), 0.0);
    }

    #[test]
    fn test_reduced_motion_disables_effects() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_squash());
        assert!(!settings.effective_orbit());
        assert!(Settings::default().effective_squash());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("zigzag_settings_{}.json", std::process::id()));
        let settings = Settings {
            master_volume: 0.3,
            squash_effects: false,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.master_volume, 0.3);
        assert!(!loaded.squash_effects);
    }
}
