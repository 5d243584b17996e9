//! Headless host
//!
//! A minimal stand-in for an engine scene: one ball body integrated with
//! explicit Euler, flat floor tiles whose tops sit at y = 0, a downward
//! sphere probe and enter-edge trigger volumes. Enough to play the whole loop
//! in tests and in the demo binary.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{Body, BodyCommand, Host, ProbeHit};
use super::contact::{Aabb, Contact, ContactKind, Volume, VolumeId};
use super::game::{FrameInput, Game};
use super::locomotion::Facing;
use super::pickups::DEFAULT_PICKUP_VALUE;

pub const BALL_RADIUS: f32 = 0.5;
/// Half the corridor width
pub const HALF_WIDTH: f32 = 0.6;
const TILE_THICKNESS: f32 = 0.5;
/// Straight after the goal, long enough to decelerate on
const RUNOUT: f32 = 16.0;
/// How far below the floor a falling ball may already be and still be caught
const LAND_TOLERANCE: f32 = 0.1;

pub const HAZARD_VOLUME: VolumeId = 0;
pub const GOAL_VOLUME: VolumeId = 1;
const FIRST_PICKUP: VolumeId = 100;

/// Rigid ball with unit mass
#[derive(Debug, Clone)]
pub struct BallBody {
    position: Vec3,
    velocity: Vec3,
    rotation: Quat,
    kinematic: bool,
    mass: f32,
    /// Accelerations queued for the next step
    acceleration: Vec3,
}

impl BallBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            kinematic: true,
            mass: 1.0,
            acceleration: Vec3::ZERO,
        }
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }
}

impl Body for BallBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn apply(&mut self, command: BodyCommand) {
        match command {
            BodyCommand::SetVelocity(v) => self.velocity = v,
            BodyCommand::AddAcceleration(a) => {
                if !self.kinematic {
                    self.acceleration += a;
                }
            }
            BodyCommand::AddImpulse(j) => {
                if !self.kinematic {
                    self.velocity += j / self.mass;
                }
            }
            BodyCommand::AddVelocityChange(dv) => {
                if !self.kinematic {
                    self.velocity += dv;
                }
            }
            BodyCommand::SetKinematic(kinematic) => {
                self.kinematic = kinematic;
                self.acceleration = Vec3::ZERO;
            }
            BodyCommand::SetRotation(rotation) => self.rotation = rotation,
            BodyCommand::Teleport(position) => self.position = position,
        }
    }
}

/// A generated level plus the physics to run it
#[derive(Debug, Clone)]
pub struct Track {
    body: BallBody,
    start: Vec3,
    tiles: Vec<Aabb>,
    volumes: Vec<Volume>,
    /// Corner points where the corridor changes direction, in order
    turns: Vec<Vec3>,
    /// Volumes the ball currently overlaps, sorted
    inside: Vec<VolumeId>,
    contacts: Vec<Contact>,
}

fn lane_direction(segment: usize) -> Vec3 {
    if segment % 2 == 0 { Vec3::Z } else { Vec3::X }
}

/// Floor slab covering the corridor from `a` to `b` (both at floor height)
fn corridor(a: Vec3, b: Vec3) -> Aabb {
    let pad = Vec3::new(HALF_WIDTH, 0.0, HALF_WIDTH);
    Aabb::new(
        a.min(b) - pad - Vec3::Y * TILE_THICKNESS,
        a.max(b) + pad,
    )
}

impl Track {
    fn empty() -> Self {
        let start = Vec3::new(0.0, BALL_RADIUS, 0.0);
        Self {
            body: BallBody::new(start),
            start,
            tiles: Vec::new(),
            volumes: Vec::new(),
            turns: Vec::new(),
            inside: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Single corridor along +Z with the goal at `length`
    pub fn straight(length: f32) -> Self {
        let mut track = Self::empty();
        let end = Vec3::Z * length;
        track.tiles.push(corridor(Vec3::ZERO, end));
        track.finish(end, Vec3::Z);
        track
    }

    /// Alternating +Z / +X corridors with random lengths and crystals
    pub fn zigzag(seed: u64, segments: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut track = Self::empty();
        let mut cursor = Vec3::ZERO;
        let mut next_pickup = FIRST_PICKUP;
        let segments = segments.max(1);

        for i in 0..segments {
            let dir = lane_direction(i);
            let length = if i == 0 {
                6.0
            } else {
                rng.random_range(4u32..=9) as f32
            };
            let end = cursor + dir * length;
            track.tiles.push(corridor(cursor, end));

            if rng.random_bool(0.6) {
                let center = cursor + dir * (length * 0.5) + Vec3::Y * BALL_RADIUS;
                track.volumes.push(Volume {
                    id: next_pickup,
                    kind: ContactKind::Pickup,
                    bounds: Aabb::from_center(center, Vec3::splat(0.3)),
                });
                next_pickup += 1;
            }
            if i + 1 < segments {
                track.turns.push(end);
            }
            cursor = end;
        }
        track.finish(cursor, lane_direction(segments - 1));
        log::debug!(
            "Generated zigzag track: {} tiles, {} pickups",
            track.tiles.len(),
            track.pickups().count()
        );
        track
    }

    /// Goal at `end`, runout beyond it and a hazard sheet under everything
    fn finish(&mut self, end: Vec3, dir: Vec3) {
        self.volumes.push(Volume {
            id: GOAL_VOLUME,
            kind: ContactKind::Goal,
            bounds: Aabb::from_center(
                end + dir * 0.5 + Vec3::Y * BALL_RADIUS,
                Vec3::new(HALF_WIDTH, 1.0, HALF_WIDTH),
            ),
        });
        self.tiles.push(corridor(end, end + dir * RUNOUT));

        let (lo, hi) = self.tiles.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), t| (lo.min(t.min), hi.max(t.max)),
        );
        self.volumes.push(Volume {
            id: HAZARD_VOLUME,
            kind: ContactKind::Hazard,
            bounds: Aabb::new(
                Vec3::new(lo.x - 20.0, -4.0, lo.z - 20.0),
                Vec3::new(hi.x + 20.0, -2.0, hi.z + 20.0),
            ),
        });
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn ball(&self) -> &BallBody {
        &self.body
    }

    pub fn turns(&self) -> &[Vec3] {
        &self.turns
    }

    /// Crystal ids and their values
    pub fn pickups(&self) -> impl Iterator<Item = (VolumeId, u32)> + '_ {
        self.volumes
            .iter()
            .filter(|v| v.kind == ContactKind::Pickup)
            .map(|v| (v.id, DEFAULT_PICKUP_VALUE))
    }

    /// Register every crystal with the game
    pub fn register_pickups(&self, game: &mut Game) {
        for (id, value) in self.pickups() {
            game.register_pickup(id, value);
        }
    }

    fn support_height(&self, x: f32, z: f32, margin: f32, below: f32) -> Option<f32> {
        self.tiles
            .iter()
            .filter(|t| t.contains_xz(x, z, margin) && t.max.y <= below)
            .map(|t| t.max.y)
            .reduce(f32::max)
    }

    fn update_triggers(&mut self) {
        let mut now: Vec<VolumeId> = self
            .volumes
            .iter()
            .filter(|v| v.bounds.overlaps_sphere(self.body.position, BALL_RADIUS))
            .map(|v| v.id)
            .collect();
        now.sort_unstable();

        for volume in &self.volumes {
            let entered = now.binary_search(&volume.id).is_ok()
                && self.inside.binary_search(&volume.id).is_err();
            if entered {
                self.contacts.push(Contact {
                    kind: volume.kind,
                    volume: volume.id,
                });
            }
        }
        self.inside = now;
    }
}

impl Host for Track {
    fn body(&mut self) -> Option<&mut dyn Body> {
        Some(&mut self.body)
    }

    fn probe_ground(&self, origin: Vec3, radius: f32, max_distance: f32) -> Option<ProbeHit> {
        let top = self.support_height(origin.x, origin.z, radius, origin.y)?;
        let distance = (origin.y - radius - top).max(0.0);
        (distance <= max_distance).then_some(ProbeHit {
            distance,
            point: Vec3::new(origin.x, top, origin.z),
            normal: Vec3::Y,
        })
    }

    fn drain_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }

    fn step_physics(&mut self, dt: f32) {
        if self.body.kinematic {
            return;
        }
        let previous_bottom = self.body.position.y - BALL_RADIUS;
        self.body.velocity += self.body.acceleration * dt;
        self.body.acceleration = Vec3::ZERO;
        self.body.position += self.body.velocity * dt;

        let p = self.body.position;
        if let Some(top) = self.support_height(p.x, p.z, 0.0, f32::MAX) {
            let bottom = p.y - BALL_RADIUS;
            if bottom < top && previous_bottom >= top - LAND_TOLERANCE {
                self.body.position.y = top + BALL_RADIUS;
                self.body.velocity.y = self.body.velocity.y.max(0.0);
            }
        }
        self.update_triggers();
    }
}

/// Steers a ball down a zigzag track for demos and tests
#[derive(Debug, Clone)]
pub struct Autopilot {
    next_turn: usize,
    steering: bool,
    jump_chance: f32,
    rng: Pcg32,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            next_turn: 0,
            steering: true,
            jump_chance: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Per-frame probability of a jump on long straights
    pub fn with_jumps(mut self, chance: f32) -> Self {
        self.jump_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Stop turning at corners (the ball will run off)
    pub fn set_steering(&mut self, steering: bool) {
        self.steering = steering;
    }

    /// Back to the first corner after a level reset
    pub fn reset(&mut self) {
        self.next_turn = 0;
    }

    pub fn input(&mut self, track: &Track, game: &Game) -> FrameInput {
        let mut input = FrameInput::default();
        let position = track.ball().position();
        let turns = track.turns();

        while let Some(turn) = turns.get(self.next_turn) {
            if (position - *turn).dot(lane_direction(self.next_turn)) < 0.0 {
                break;
            }
            self.next_turn += 1;
        }

        let wanted = if self.next_turn % 2 == 0 {
            Facing::Forward
        } else {
            Facing::Side
        };
        if self.steering && game.actor().facing() != wanted {
            input.switch_lane = true;
        }

        if self.jump_chance > 0.0 && game.actor().is_grounded() {
            let clear = match turns.get(self.next_turn) {
                Some(turn) => (*turn - position).dot(lane_direction(self.next_turn)),
                None => f32::MAX,
            };
            if clear > 1.5 * game.actor().forward_speed() + 1.0
                && self.rng.random::<f32>() < self.jump_chance
            {
                input.jump = true;
            }
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::events::GameEvent;
    use crate::sim::session::Phase;
    use crate::tuning::Tuning;

    const FRAME: f32 = 1.0 / 60.0;

    fn new_game(track: &mut Track, orbit: bool) -> Game {
        let settings = Settings {
            celebration_orbit: orbit,
            ..Default::default()
        };
        let mut game = Game::new(Tuning::default(), settings, track.start(), 3);
        track.register_pickups(&mut game);
        game.frame(FRAME, &FrameInput::default(), track);
        game
    }

    /// Run frames with the autopilot until `done` or the frame budget runs out
    fn drive(
        game: &mut Game,
        track: &mut Track,
        pilot: &mut Autopilot,
        frames: usize,
        done: impl Fn(&Game) -> bool,
    ) -> bool {
        for _ in 0..frames {
            let input = pilot.input(track, game);
            game.frame(FRAME, &input, track);
            for event in game.drain_events() {
                if event == GameEvent::LevelReset {
                    pilot.reset();
                }
            }
            if done(game) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_probe_respects_footprint_and_range() {
        let track = Track::straight(10.0);
        let hit = track.probe_ground(Vec3::new(0.0, 0.5, 3.0), 0.25, 0.8);
        assert_eq!(hit.map(|h| h.distance), Some(0.25));
        // Past the side of the corridor, but inside the probe radius
        assert!(track.probe_ground(Vec3::new(0.8, 0.5, 3.0), 0.25, 0.8).is_some());
        assert!(track.probe_ground(Vec3::new(1.0, 0.5, 3.0), 0.25, 0.8).is_none());
        // Too high
        assert!(track.probe_ground(Vec3::new(0.0, 2.0, 3.0), 0.25, 0.8).is_none());
    }

    #[test]
    fn test_triggers_fire_on_enter_only() {
        let mut track = Track::straight(3.0);
        track.body.apply(BodyCommand::SetKinematic(false));
        track.body.apply(BodyCommand::Teleport(Vec3::new(0.0, 0.5, 3.4)));
        track.step_physics(FRAME);
        track.step_physics(FRAME);
        let contacts = track.drain_contacts();
        assert_eq!(
            contacts,
            vec![Contact {
                kind: ContactKind::Goal,
                volume: GOAL_VOLUME
            }]
        );
    }

    #[test]
    fn test_ball_rests_on_floor_and_falls_off_edge() {
        let mut track = Track::straight(3.0);
        track.body.apply(BodyCommand::SetKinematic(false));
        for _ in 0..30 {
            track.body.apply(BodyCommand::AddAcceleration(Vec3::Y * -9.81));
            track.step_physics(FRAME);
        }
        assert!((track.ball().position().y - BALL_RADIUS).abs() < 1e-5);

        track.body.apply(BodyCommand::Teleport(Vec3::new(3.0, 0.5, 1.0)));
        for _ in 0..60 {
            track.body.apply(BodyCommand::AddAcceleration(Vec3::Y * -9.81));
            track.step_physics(FRAME);
        }
        assert!(track.ball().position().y < -2.0);
        assert!(track
            .drain_contacts()
            .iter()
            .any(|c| c.kind == ContactKind::Hazard));
    }

    #[test]
    fn test_twelve_units_pay_two_checkpoints() {
        let mut track = Track::straight(40.0);
        let mut game = new_game(&mut track, false);
        let mut pilot = Autopilot::new(1);
        game.play();
        let start = track.start();
        let reached = drive(&mut game, &mut track, &mut pilot, 60 * 6, |g| {
            g.actor_pose().position.distance(start) >= 12.0
        });
        assert!(reached);
        assert_eq!(game.run().score, 2);
    }

    #[test]
    fn test_autopilot_completes_a_loop() {
        let mut track = Track::zigzag(7, 6);
        let mut game = new_game(&mut track, true);
        let mut pilot = Autopilot::new(7);
        game.play();

        let finished = drive(&mut game, &mut track, &mut pilot, 60 * 60, |g| {
            g.run().loop_count == 1 && g.phase() == Phase::Playing
        });
        assert!(finished, "loop not completed, phase {:?}", game.phase());
        assert!(game.run().score > 0);
        assert!(game.run().high_score >= game.run().score);
        assert!((game.run().speed_multiplier - 1.1).abs() < 1e-6);
        assert_eq!(game.pickups().available_count(), game.pickups().len());
        assert!(track.ball().position().distance(track.start()) < 1.0);
    }

    #[test]
    fn test_missed_turn_kills_and_retry_restarts() {
        let mut track = Track::zigzag(11, 4);
        let mut game = new_game(&mut track, false);
        let mut pilot = Autopilot::new(11);
        pilot.set_steering(false);
        game.play();

        let died = drive(&mut game, &mut track, &mut pilot, 60 * 20, |g| g.phase() == Phase::Dead);
        assert!(died);
        assert!(game.ui().death_visible);
        assert!(game.highscores().top_score().is_some());

        pilot.set_steering(true);
        assert!(game.retry());
        let resumed = drive(&mut game, &mut track, &mut pilot, 60 * 3, |g| g.phase() == Phase::Playing);
        assert!(resumed);
        assert_eq!(game.run().score, 0);
        assert_eq!(game.run().loop_count, 0);
        assert!(track.ball().position().distance(track.start()) < 0.5);
        assert!(game.actor().is_alive());
    }
}
