//! Camera rig: menu shot, intro move, chase camera and celebration orbit

use glam::Vec3;

use super::tween::{Easing, Tween};
use crate::tuning::CameraTuning;
use crate::{Pose, euler_degrees, look_rotation};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    /// Hold the current pose
    Static,
    /// Move from `from` to the chase pose behind the actor
    Transition { from: Pose, tween: Tween },
    /// Chase the actor
    Follow,
    /// Circle the actor once
    Orbit {
        radius: f32,
        height: f32,
        start_angle: f32,
        tween: Tween,
    },
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    params: CameraTuning,
    pose: Pose,
    mode: Mode,
}

impl CameraRig {
    /// Camera parked at the menu shot
    pub fn new(params: CameraTuning) -> Self {
        let pose = Pose::new(params.menu_position, euler_degrees(params.menu_euler));
        Self {
            params,
            pose,
            mode: Mode::Static,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_following(&self) -> bool {
        self.mode == Mode::Follow
    }

    /// True when no timed move is in progress
    pub fn is_settled(&self) -> bool {
        match self.mode {
            Mode::Static | Mode::Follow => true,
            Mode::Transition { tween, .. } | Mode::Orbit { tween, .. } => tween.is_done(),
        }
    }

    /// Where the chase camera wants to be for `target`
    pub fn chase_pose(&self, target: Pose) -> Pose {
        let position = target.transform_point(self.params.follow_offset);
        Pose::new(position, look_rotation(target.position - position, Vec3::Y))
    }

    /// Smoothstepped move from the current pose to the chase pose
    pub fn transition_to_play(&mut self, duration: f32) {
        self.mode = Mode::Transition {
            from: self.pose,
            tween: Tween::new(duration, Easing::SmoothStep),
        };
    }

    pub fn follow(&mut self) {
        self.mode = Mode::Follow;
    }

    /// Jump straight to the chase pose and keep following
    pub fn snap_follow(&mut self, target: Pose) {
        self.pose = self.chase_pose(target);
        self.mode = Mode::Follow;
    }

    /// One full turn around `target` over `duration`, keeping distance and height
    pub fn orbit(&mut self, target: Pose, duration: f32) {
        let offset = self.pose.position - target.position;
        let radius = Vec3::new(offset.x, 0.0, offset.z).length().max(1.0);
        self.mode = Mode::Orbit {
            radius,
            height: offset.y,
            start_angle: offset.x.atan2(offset.z),
            tween: Tween::new(duration, Easing::Linear),
        };
    }

    pub fn advance(&mut self, dt: f32, target: Pose) {
        match &mut self.mode {
            Mode::Static => {}
            Mode::Transition { from, tween } => {
                let t = tween.advance(dt);
                let from = *from;
                let to = self.chase_pose(target);
                self.pose = Pose::new(
                    from.position.lerp(to.position, t),
                    from.rotation.slerp(to.rotation, t),
                );
            }
            Mode::Follow => {
                let desired = target.transform_point(self.params.follow_offset);
                let move_t = (self.params.follow_speed * dt).clamp(0.0, 1.0);
                let position = self.pose.position.lerp(desired, move_t);
                let look = look_rotation(target.position - position, Vec3::Y);
                let turn_t = (self.params.rotation_smooth * dt).clamp(0.0, 1.0);
                self.pose = Pose::new(position, self.pose.rotation.slerp(look, turn_t));
            }
            Mode::Orbit {
                radius,
                height,
                start_angle,
                tween,
            } => {
                let angle = *start_angle + tween.advance(dt) * std::f32::consts::TAU;
                let position =
                    target.position + Vec3::new(angle.sin() * *radius, *height, angle.cos() * *radius);
                self.pose = Pose::new(position, look_rotation(target.position - position, Vec3::Y));
            }
        }
    }
}
