//! Frame scheduler
//!
//! [`Game`] owns every gameplay component and wires them together once per
//! rendered frame. Components never find each other; everything they need is
//! passed in here.

use glam::Vec3;

use super::body::{BodyCommand, Host, apply_commands};
use super::contact::{Contact, ContactKind};
use super::events::{GameEvent, SoundCue};
use super::locomotion::{ActorEvent, ActorInput, Locomotion};
use super::palette::{LevelPalette, Palette};
use super::pickups::PickupSet;
use super::score::ScoreAccumulator;
use super::session::{Directive, Phase, RunState, Session, UiState};
use super::squash::{ScaleShape, SquashAnimator};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::Pose;
use crate::tuning::Tuning;

/// Player input sampled this frame (edge-triggered)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub switch_lane: bool,
    pub jump: bool,
}

pub struct Game {
    tuning: Tuning,
    settings: Settings,
    session: Session,
    actor: Locomotion,
    squash: SquashAnimator,
    score: ScoreAccumulator,
    pickups: PickupSet,
    palette: LevelPalette,
    start: Vec3,
    actor_pose: Pose,
    accumulator: f32,
    commands: Vec<BodyCommand>,
    events: Vec<GameEvent>,
}

impl Game {
    /// New game sitting at the menu with the actor frozen at `start`
    pub fn new(tuning: Tuning, settings: Settings, start: Vec3, seed: u64) -> Self {
        let session = Session::new(&tuning, settings.effective_orbit());
        let mut actor = Locomotion::new(tuning.locomotion.clone());
        actor.reset(start);
        let squash = SquashAnimator::new(tuning.squash.clone(), Vec3::ONE);
        let score = ScoreAccumulator::new(tuning.session.checkpoint_step, start);
        let palette = LevelPalette::new(tuning.palette.clone(), seed);
        let actor_pose = Pose::new(start, actor.rotation());

        Self {
            tuning,
            settings,
            session,
            actor,
            squash,
            score,
            pickups: PickupSet::new(),
            palette,
            start,
            actor_pose,
            accumulator: 0.0,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn actor(&self) -> &Locomotion {
        &self.actor
    }

    pub fn pickups(&self) -> &PickupSet {
        &self.pickups
    }

    pub fn run(&self) -> &RunState {
        self.session.run()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn ui(&self) -> &UiState {
        self.session.ui()
    }

    pub fn highscores(&self) -> &HighScores {
        self.session.highscores()
    }

    pub fn palette(&self) -> Palette {
        self.palette.current()
    }

    /// Scale to draw the ball with
    pub fn visual_scale(&self) -> Vec3 {
        self.squash.scale()
    }

    pub fn camera_pose(&self) -> Pose {
        self.session.camera().pose()
    }

    /// Overlay opacity for the host to draw; gameplay input is gated on the
    /// phase, not on the overlay
    pub fn fade_alpha(&self) -> f32 {
        self.session.fader().alpha()
    }

    /// Last known actor pose
    pub fn actor_pose(&self) -> Pose {
        self.actor_pose
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Make a crystal collectible for every loop of this level
    pub fn register_pickup(&mut self, id: u32, value: u32) {
        self.pickups.register(id, value);
    }

    /// Menu "Play" button
    pub fn play(&mut self) -> bool {
        let started = self.session.play_game();
        self.collect_session_output();
        started
    }

    /// Death screen "Retry" button
    pub fn retry(&mut self) -> bool {
        let started = self.session.retry_game();
        self.collect_session_output();
        started
    }

    /// Run one rendered frame
    pub fn frame(&mut self, dt: f32, input: &FrameInput, host: &mut dyn Host) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        for contact in host.drain_contacts() {
            self.dispatch_contact(contact);
        }

        let sample = host.body().map(|body| body.sample());
        let probe = sample.and_then(|s| {
            let params = self.actor.params();
            host.probe_ground(
                s.position,
                params.ground_probe_radius,
                params.ground_probe_distance,
            )
        });
        if let Some(s) = sample {
            self.actor_pose = Pose::new(s.position, self.actor.rotation());
        }

        let actor_input = if self.session.is_playing() {
            ActorInput {
                switch_lane: input.switch_lane,
                jump: input.jump,
            }
        } else {
            ActorInput::default()
        };
        self.actor.frame(dt, actor_input, sample, probe);
        self.route_actor_events();

        if self.session.is_playing() {
            if let Some(s) = sample {
                let crossed = self.score.update(s.position);
                if crossed > 0 {
                    log::debug!("Crossed {crossed} checkpoint(s)");
                }
                // Each checkpoint is its own scoring event
                for _ in 0..crossed {
                    self.session.add_score(self.tuning.session.checkpoint_points);
                }
            }
        }

        self.session.advance(dt, self.actor_pose);
        self.collect_session_output();

        self.squash.advance(dt);

        self.commands.extend(self.actor.drain_commands());
        apply_commands(host.body(), &mut self.commands);
        self.run_fixed_steps(dt, host);
    }

    fn run_fixed_steps(&mut self, dt: f32, host: &mut dyn Host) {
        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let sample = host.body().map(|body| body.sample());
            self.actor.fixed_step(sample);
            self.commands.extend(self.actor.drain_commands());
            apply_commands(host.body(), &mut self.commands);
            host.step_physics(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
    }

    fn dispatch_contact(&mut self, contact: Contact) {
        match contact.kind {
            ContactKind::Hazard | ContactKind::Goal => self.actor.on_contact(contact.kind),
            ContactKind::Pickup => {
                if !self.session.is_playing() {
                    return;
                }
                if let Some(value) = self.pickups.collect(contact.volume) {
                    let points = self.session.add_score(value);
                    self.events.push(GameEvent::PickupCollected {
                        volume: contact.volume,
                        points,
                    });
                    self.sound(SoundCue::Pickup);
                }
            }
        }
        self.route_actor_events();
    }

    fn route_actor_events(&mut self) {
        for event in self.actor.drain_events() {
            match event {
                ActorEvent::LaneSwitched(facing) => {
                    self.events.push(GameEvent::LaneSwitched { facing });
                    self.sound(SoundCue::SwitchLane);
                }
                ActorEvent::JumpStarted => self.play_shape(ScaleShape::Squash),
                ActorEvent::JumpLaunched => {
                    self.play_shape(ScaleShape::Stretch);
                    self.events.push(GameEvent::Jumped);
                    self.sound(SoundCue::Jump);
                }
                ActorEvent::Landed { impact_speed } => {
                    if impact_speed > self.tuning.locomotion.impact_speed_threshold {
                        self.play_shape(ScaleShape::Impact);
                    }
                    self.events.push(GameEvent::Landed { impact_speed });
                    self.sound(SoundCue::Land);
                }
                ActorEvent::Died => {
                    self.squash.cancel();
                    self.session.on_player_death();
                }
                ActorEvent::GoalReached => self.events.push(GameEvent::GoalReached),
                ActorEvent::LevelComplete => self.session.on_level_complete(self.actor_pose),
            }
        }
        self.collect_session_output();
    }

    fn collect_session_output(&mut self) {
        for directive in self.session.drain_directives() {
            self.apply_directive(directive);
        }
        self.events.extend(self.session.drain_events());
    }

    fn apply_directive(&mut self, directive: Directive) {
        match directive {
            Directive::FreezeActor => self.actor.freeze(),
            Directive::UnfreezeActor => self.actor.unfreeze(),
            Directive::ResetLevel => {
                self.actor.reset(self.start);
                self.pickups.reset_all();
                self.score.reset(self.start);
                self.squash.cancel();
                self.accumulator = 0.0;
                self.actor_pose = Pose::new(self.start, self.actor.rotation());
                self.session.snap_camera(self.actor_pose);
                self.events.push(GameEvent::LevelReset);
            }
            Directive::SetSpeedMultiplier(multiplier) => {
                self.actor.set_speed_multiplier(multiplier)
            }
            Directive::RerollPalette => {
                let palette = self.palette.reroll();
                self.events.push(GameEvent::PaletteChanged(palette));
            }
        }
    }

    fn play_shape(&mut self, shape: ScaleShape) {
        if self.settings.effective_squash() {
            self.squash.play(shape);
        }
    }

    fn sound(&mut self, cue: SoundCue) {
        let volume = self.settings.cue_volume(cue);
        if volume > 0.0 {
            self.events.push(GameEvent::Sound { cue, volume });
        }
    }
}
