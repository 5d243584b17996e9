//! Actor locomotion controller
//!
//! Drives one ball: constant forward run, two-lane turning, buffered jumps,
//! grounded detection and the death/finish latches. The controller never touches
//! the physics body directly; it queues [`BodyCommand`]s for the host.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::body::{BodyCommand, BodySample, ProbeHit};
use super::contact::ContactKind;
use super::tween::{Easing, Ramp, Timer};
use crate::tuning::LocomotionTuning;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    /// No motion (menu, transitions, after a reset)
    Frozen,
    Grounded,
    Airborne,
    /// Latched until `reset`
    Dead,
    /// Latched until `reset`
    Finished,
}

/// Which of the two lanes the actor runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Forward,
    Side,
}

impl Facing {
    pub fn toggled(self) -> Self {
        match self {
            Facing::Forward => Facing::Side,
            Facing::Side => Facing::Forward,
        }
    }

    fn lane_index(self) -> usize {
        match self {
            Facing::Forward => 0,
            Facing::Side => 1,
        }
    }
}

/// Edge-triggered input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorInput {
    pub switch_lane: bool,
    pub jump: bool,
}

/// Things the controller reports upward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActorEvent {
    LaneSwitched(Facing),
    /// Jump accepted; squash now, launch after the buffer delay
    JumpStarted,
    /// Upward velocity change applied
    JumpLaunched,
    Landed { impact_speed: f32 },
    Died,
    GoalReached,
    /// Deceleration and hold finished
    LevelComplete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum JumpPhase {
    None,
    Buffered(Timer),
    /// `rising` flips once the body is seen moving up
    Launched { rising: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FinishPhase {
    Decelerating(Ramp),
    Holding(Timer),
    Reported,
}

/// Locomotion controller for the player ball
#[derive(Debug, Clone)]
pub struct Locomotion {
    params: LocomotionTuning,
    state: MotionState,
    facing: Facing,
    grounded: bool,
    was_grounded: bool,
    ascending: bool,
    speed_multiplier: f32,
    forward_speed: f32,
    jump: JumpPhase,
    finish: Option<FinishPhase>,
    last_vertical_speed: f32,
    events: Vec<ActorEvent>,
    commands: Vec<BodyCommand>,
}

impl Locomotion {
    pub fn new(params: LocomotionTuning) -> Self {
        let forward_speed = params.base_speed;
        Self {
            params,
            state: MotionState::Frozen,
            facing: Facing::Forward,
            grounded: false,
            was_grounded: false,
            ascending: false,
            speed_multiplier: 1.0,
            forward_speed,
            jump: JumpPhase::None,
            finish: None,
            last_vertical_speed: 0.0,
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Last ground probe result
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn is_alive(&self) -> bool {
        self.state != MotionState::Dead
    }

    pub fn is_finished(&self) -> bool {
        self.state == MotionState::Finished
    }

    pub fn forward_speed(&self) -> f32 {
        self.forward_speed
    }

    pub fn params(&self) -> &LocomotionTuning {
        &self.params
    }

    /// World rotation for the current lane
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.params.lane_yaw_degrees[self.facing.lane_index()].to_radians())
    }

    /// Unit run direction for the current lane
    pub fn facing_direction(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    pub fn drain_events(&mut self) -> Vec<ActorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_commands(&mut self) -> Vec<BodyCommand> {
        std::mem::take(&mut self.commands)
    }

    fn is_live(&self) -> bool {
        matches!(self.state, MotionState::Grounded | MotionState::Airborne)
    }

    /// Forward speed becomes `base_speed * multiplier` (ignored mid-deceleration)
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
        if self.finish.is_none() {
            self.forward_speed = self.params.base_speed * multiplier;
        }
    }

    /// Stop and hold the body in place
    pub fn freeze(&mut self) {
        if self.is_live() {
            self.state = MotionState::Frozen;
            self.jump = JumpPhase::None;
            self.ascending = false;
        }
        self.commands.push(BodyCommand::SetKinematic(true));
        self.commands.push(BodyCommand::SetVelocity(Vec3::ZERO));
    }

    /// Release a frozen actor; latched states stay put
    pub fn unfreeze(&mut self) {
        if self.state != MotionState::Frozen {
            return;
        }
        self.state = MotionState::Grounded;
        self.grounded = true;
        self.was_grounded = true;
        self.commands.push(BodyCommand::SetKinematic(false));
    }

    /// Back to the initial frozen state at `start`
    pub fn reset(&mut self, start: Vec3) {
        self.state = MotionState::Frozen;
        self.facing = Facing::Forward;
        self.grounded = false;
        self.was_grounded = false;
        self.ascending = false;
        self.jump = JumpPhase::None;
        self.finish = None;
        self.last_vertical_speed = 0.0;
        self.forward_speed = self.params.base_speed * self.speed_multiplier;

        self.commands.push(BodyCommand::SetKinematic(true));
        self.commands.push(BodyCommand::Teleport(start));
        self.commands.push(BodyCommand::SetRotation(self.rotation()));
        self.commands.push(BodyCommand::SetVelocity(Vec3::ZERO));
    }

    /// Toggle lanes; only while grounded
    pub fn switch_lane(&mut self) -> bool {
        if self.state != MotionState::Grounded || !self.grounded {
            return false;
        }
        self.facing = self.facing.toggled();
        self.commands.push(BodyCommand::SetRotation(self.rotation()));
        self.events.push(ActorEvent::LaneSwitched(self.facing));
        true
    }

    /// Start a buffered jump; only while grounded
    pub fn request_jump(&mut self) -> bool {
        if self.state != MotionState::Grounded || !self.grounded {
            return false;
        }
        self.state = MotionState::Airborne;
        self.ascending = true;
        self.jump = JumpPhase::Buffered(Timer::new(self.params.jump_delay));
        self.events.push(ActorEvent::JumpStarted);
        true
    }

    /// React to a trigger volume. Pickups are not the controller's business.
    pub fn on_contact(&mut self, kind: ContactKind) {
        match kind {
            ContactKind::Hazard => self.die(),
            ContactKind::Goal => self.reach_goal(),
            ContactKind::Pickup => {}
        }
    }

    fn die(&mut self) {
        if !self.is_live() {
            return;
        }
        self.state = MotionState::Dead;
        self.jump = JumpPhase::None;
        self.ascending = false;
        self.commands.push(BodyCommand::SetVelocity(Vec3::ZERO));
        self.events.push(ActorEvent::Died);
    }

    fn reach_goal(&mut self) {
        if !self.is_live() {
            return;
        }
        self.state = MotionState::Finished;
        self.jump = JumpPhase::None;
        self.finish = Some(FinishPhase::Decelerating(Ramp::new(
            self.forward_speed,
            0.0,
            self.params.finish_ramp_duration,
            Easing::Linear,
        )));
        self.events.push(ActorEvent::GoalReached);
    }

    /// Per-frame update: timers, ground detection, input
    pub fn frame(
        &mut self,
        dt: f32,
        input: ActorInput,
        body: Option<BodySample>,
        ground: Option<ProbeHit>,
    ) {
        match self.state {
            MotionState::Frozen | MotionState::Dead => return,
            MotionState::Finished => {
                self.advance_finish(dt);
                return;
            }
            MotionState::Grounded | MotionState::Airborne => {}
        }

        if let Some(sample) = body {
            if sample.position.y < self.params.death_height {
                self.die();
                return;
            }
        }
        let vy = body.map(|b| b.velocity.y).unwrap_or(0.0);

        self.advance_jump(dt, vy);

        self.was_grounded = self.grounded;
        self.grounded = ground.is_some();

        match self.state {
            MotionState::Airborne => self.check_landing(vy),
            MotionState::Grounded if !self.grounded => {
                // Ran off an edge
                self.state = MotionState::Airborne;
                self.ascending = false;
            }
            _ => {}
        }

        if input.switch_lane {
            self.switch_lane();
        }
        if input.jump {
            self.request_jump();
        }

        self.last_vertical_speed = vy;
    }

    fn advance_jump(&mut self, dt: f32, vy: f32) {
        match &mut self.jump {
            JumpPhase::Buffered(timer) => {
                if timer.tick(dt) {
                    self.launch();
                }
            }
            JumpPhase::Launched { rising } => {
                if vy > 0.0 {
                    *rising = true;
                }
            }
            JumpPhase::None => {}
        }
    }

    fn launch(&mut self) {
        self.jump = JumpPhase::Launched { rising: false };
        let dir = self.facing_direction();
        self.commands.push(BodyCommand::SetVelocity(Vec3::new(
            dir.x * self.forward_speed,
            0.0,
            dir.z * self.forward_speed,
        )));
        self.commands
            .push(BodyCommand::AddVelocityChange(Vec3::Y * self.params.jump_force));
        self.events.push(ActorEvent::JumpLaunched);
    }

    fn check_landing(&mut self, vy: f32) {
        if !self.grounded {
            return;
        }
        let settled = match self.jump {
            JumpPhase::Buffered(_) => return,
            JumpPhase::Launched { rising } => rising && vy <= 0.0,
            JumpPhase::None => vy <= 0.0,
        };

        if !self.was_grounded {
            let impact_speed = self.last_vertical_speed.abs();
            self.land();
            self.events.push(ActorEvent::Landed { impact_speed });
        } else if settled {
            // Probe never lost contact; settle without an impact
            self.land();
        }
    }

    fn land(&mut self) {
        self.state = MotionState::Grounded;
        self.ascending = false;
        self.jump = JumpPhase::None;
    }

    fn advance_finish(&mut self, dt: f32) {
        match &mut self.finish {
            Some(FinishPhase::Decelerating(ramp)) => {
                self.forward_speed = ramp.advance(dt);
                if ramp.is_done() {
                    self.forward_speed = 0.0;
                    self.commands.push(BodyCommand::SetVelocity(Vec3::ZERO));
                    self.finish = Some(FinishPhase::Holding(Timer::new(self.params.finish_hold)));
                }
            }
            Some(FinishPhase::Holding(timer)) => {
                if timer.tick(dt) {
                    self.finish = Some(FinishPhase::Reported);
                    self.events.push(ActorEvent::LevelComplete);
                }
            }
            Some(FinishPhase::Reported) | None => {}
        }
    }

    /// Fixed physics step: forward drive, state-dependent gravity, anti-stall
    pub fn fixed_step(&mut self, body: Option<BodySample>) {
        let Some(sample) = body else {
            return;
        };
        match self.state {
            MotionState::Grounded | MotionState::Airborne => {}
            MotionState::Finished
                if matches!(self.finish, Some(FinishPhase::Decelerating(_))) => {}
            _ => return,
        }

        let dir = self.facing_direction();
        let vy = sample.velocity.y;
        self.commands.push(BodyCommand::SetVelocity(Vec3::new(
            dir.x * self.forward_speed,
            vy,
            dir.z * self.forward_speed,
        )));

        let gravity = if self.grounded {
            self.params.ground_gravity
        } else if self.ascending && vy > 0.0 {
            self.params.air_gravity
        } else {
            self.params.fall_gravity
        };
        self.commands.push(BodyCommand::AddAcceleration(Vec3::Y * gravity));

        if self.state == MotionState::Grounded
            && self.grounded
            && sample.velocity.length() < self.params.stall_speed
        {
            self.commands
                .push(BodyCommand::AddImpulse(-dir * self.params.stall_nudge));
        }
    }
}
