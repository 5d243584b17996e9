//! Boundary with the host engine
//!
//! The core never owns physics. It reads a [`BodySample`] each step, asks the
//! host for ground probes and contacts, and answers with [`BodyCommand`]s.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::contact::Contact;

/// Snapshot of the actor's rigid body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySample {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Result of a downward ground probe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeHit {
    /// Distance travelled by the probe before the hit
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Something the controller wants done to the body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyCommand {
    /// Overwrite linear velocity
    SetVelocity(Vec3),
    /// Continuous acceleration for this step (mass-independent)
    AddAcceleration(Vec3),
    /// Instant impulse (mass-scaled)
    AddImpulse(Vec3),
    /// Instant velocity change (mass-independent)
    AddVelocityChange(Vec3),
    /// Kinematic bodies ignore forces
    SetKinematic(bool),
    SetRotation(Quat),
    Teleport(Vec3),
}

/// A rigid body the host exposes to the core
pub trait Body {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn apply(&mut self, command: BodyCommand);

    fn sample(&self) -> BodySample {
        BodySample {
            position: self.position(),
            velocity: self.velocity(),
        }
    }
}

/// Engine services the frame scheduler needs
pub trait Host {
    /// The actor body, if the scene has one
    fn body(&mut self) -> Option<&mut dyn Body>;

    /// Sphere-cast downward from `origin`; `None` when nothing is hit or no
    /// ground layer is configured
    fn probe_ground(&self, origin: Vec3, radius: f32, max_distance: f32) -> Option<ProbeHit>;

    /// Trigger volumes entered since the last call
    fn drain_contacts(&mut self) -> Vec<Contact>;

    /// Advance the physics world by one fixed step. Engines that integrate on
    /// their own can leave this empty.
    fn step_physics(&mut self, dt: f32);
}

/// Apply commands to an optional body; without a body they are dropped
pub fn apply_commands(body: Option<&mut dyn Body>, commands: &mut Vec<BodyCommand>) {
    match body {
        Some(body) => {
            for command in commands.drain(..) {
                body.apply(command);
            }
        }
        None => commands.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<BodyCommand>,
    }

    impl Body for Recorder {
        fn position(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn velocity(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn apply(&mut self, command: BodyCommand) {
            self.seen.push(command);
        }
    }

    #[test]
    fn test_apply_in_order() {
        let mut body = Recorder::default();
        let mut commands = vec![
            BodyCommand::SetKinematic(false),
            BodyCommand::AddVelocityChange(Vec3::Y),
        ];
        apply_commands(Some(&mut body), &mut commands);
        assert!(commands.is_empty());
        assert_eq!(
            body.seen,
            vec![
                BodyCommand::SetKinematic(false),
                BodyCommand::AddVelocityChange(Vec3::Y)
            ]
        );
    }

    #[test]
    fn test_missing_body_drops_commands() {
        let mut commands = vec![BodyCommand::Teleport(Vec3::ONE)];
        apply_commands(None, &mut commands);
        assert!(commands.is_empty());
    }
}
