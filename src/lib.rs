//! Zigzag Run - gameplay core for a single-lane runner
//!
//! Core modules:
//! - `sim`: Frame-driven gameplay (locomotion, session loop, scoring, cosmetics)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (audio cue volumes, effects)
//! - `highscores`: In-process leaderboard
//!
//! Physics, rendering and UI belong to the host engine; the core talks to them
//! through the traits in [`sim::body`].

pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the scheduler will accept before clamping
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Distance under which exponential scale/camera smoothing snaps to target
    pub const SETTLE_EPSILON: f32 = 0.01;
}

/// Position and orientation of something in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Transform a local-space offset into world space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep on [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rotation whose local +Z points along `forward` with +Y as close to `up` as possible.
///
/// Returns identity for a degenerate direction.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize_or_zero();
    if z == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut x = up.cross(z).normalize_or_zero();
    if x == Vec3::ZERO {
        // forward parallel to up
        x = Vec3::X;
    }
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Rotation from Euler angles in degrees, applied Z then X then Y
pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        glam::EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(7.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_look_rotation_identity_for_forward() {
        let q = look_rotation(Vec3::Z, Vec3::Y);
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_look_rotation_points_forward() {
        let dir = Vec3::new(1.0, -0.5, 2.0).normalize();
        let q = look_rotation(dir, Vec3::Y);
        assert!((q * Vec3::Z).abs_diff_eq(dir, 1e-5));
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert_eq!(look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
        let q = look_rotation(Vec3::Y, Vec3::Y);
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_euler_quarter_turn_about_y() {
        let q = euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_pose_transform_point() {
        let pose = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(90f32.to_radians()));
        let p = pose.transform_point(Vec3::new(0.0, 4.0, -6.0));
        assert!(p.abs_diff_eq(Vec3::new(-5.0, 4.0, 0.0), 1e-4));
    }
}
