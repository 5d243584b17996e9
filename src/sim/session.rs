//! Session coordinator
//!
//! Single owner of run state. Drives the menu → intro → play → death / loop
//! phases, escalates difficulty after every completed loop, and runs the
//! multi-frame sequences (camera intro, celebration orbit, fades) as explicit
//! state advanced once per frame.
//!
//! The coordinator never reaches into the actor or the level. It queues
//! [`Directive`]s and the frame scheduler carries them out.

use serde::{Deserialize, Serialize};

use super::camera::CameraRig;
use super::events::GameEvent;
use super::fader::ScreenFader;
use crate::Pose;
use crate::highscores::HighScores;
use crate::tuning::{SessionTuning, Tuning};

/// Run-level phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen, actor frozen
    Menu,
    /// Camera moving from the menu shot to the chase view
    Transitioning,
    /// Active run; the only phase that accumulates score
    Playing,
    /// Run ended, death UI up
    Dead,
    /// Goal reached; celebrating and reloading the next loop
    LoopTransition,
}

/// Run state record (single writer: [`Session`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Best score seen in this process
    pub high_score: u64,
    pub speed_multiplier: f32,
    pub score_multiplier: f32,
    /// Loops completed in the current run
    pub loop_count: u32,
    pub phase: Phase,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            score: 0,
            high_score: 0,
            speed_multiplier: 1.0,
            score_multiplier: 1.0,
            loop_count: 0,
            phase: Phase::Menu,
        }
    }
}

/// What the canvas should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub menu_visible: bool,
    pub score_visible: bool,
    pub death_visible: bool,
    pub score_text: String,
    pub final_score_text: String,
    pub high_score_text: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            menu_visible: true,
            score_visible: false,
            death_visible: false,
            score_text: "0".to_string(),
            final_score_text: String::new(),
            high_score_text: String::new(),
        }
    }
}

/// Work the coordinator hands to the frame scheduler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Directive {
    FreezeActor,
    UnfreezeActor,
    /// Actor back to start, pickups available, checkpoint baseline moved
    ResetLevel,
    SetSpeedMultiplier(f32),
    RerollPalette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sequence {
    Idle,
    Intro,
    Celebrate,
    LoopFadeToBlack,
    LoopFadeFromBlack,
    RetryFadeToBlack,
    RetryFadeFromBlack,
}

#[derive(Debug, Clone)]
pub struct Session {
    params: SessionTuning,
    run: RunState,
    ui: UiState,
    sequence: Sequence,
    camera: CameraRig,
    fader: ScreenFader,
    celebration_orbit: bool,
    highscores: HighScores,
    directives: Vec<Directive>,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(tuning: &Tuning, celebration_orbit: bool) -> Self {
        Self {
            params: tuning.session.clone(),
            run: RunState::default(),
            ui: UiState::default(),
            sequence: Sequence::Idle,
            camera: CameraRig::new(tuning.camera.clone()),
            fader: ScreenFader::new(tuning.session.fade_duration),
            celebration_orbit,
            highscores: HighScores::new(),
            directives: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn phase(&self) -> Phase {
        self.run.phase
    }

    pub fn is_playing(&self) -> bool {
        self.run.phase == Phase::Playing
    }

    /// True while a timed sequence is still running
    pub fn is_busy(&self) -> bool {
        self.sequence != Sequence::Idle
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn fader(&self) -> &ScreenFader {
        &self.fader
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn drain_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Put the camera behind a freshly reset actor
    pub fn snap_camera(&mut self, target: Pose) {
        self.camera.snap_follow(target);
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.run.phase;
        if from == to {
            return;
        }
        log::info!("Phase {from:?} -> {to:?}");
        self.run.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    fn set_score(&mut self, score: u64) {
        self.run.score = score;
        self.ui.score_text = score.to_string();
        self.events.push(GameEvent::ScoreChanged { score });
    }

    fn record_high_score(&mut self) {
        self.run.high_score = self.run.high_score.max(self.run.score);
        self.ui.final_score_text = format!("Score : {}", self.run.score);
        self.ui.high_score_text = format!("Highscore : {}", self.run.high_score);
    }

    /// Start a fresh run from the menu
    pub fn play_game(&mut self) -> bool {
        if self.run.phase != Phase::Menu || self.is_busy() {
            return false;
        }
        self.run.speed_multiplier = 1.0;
        self.run.score_multiplier = 1.0;
        self.run.loop_count = 0;
        self.set_score(0);
        self.directives.push(Directive::SetSpeedMultiplier(1.0));

        self.ui.menu_visible = false;
        self.set_phase(Phase::Transitioning);
        self.camera.transition_to_play(self.params.camera_transition);
        self.sequence = Sequence::Intro;
        true
    }

    /// Add `points` scaled by the score multiplier, rounded per call.
    /// Returns the amount actually added (0 outside of play).
    pub fn add_score(&mut self, points: u32) -> u64 {
        if self.run.phase != Phase::Playing || points == 0 {
            return 0;
        }
        // Float-to-int casts saturate, so a runaway multiplier caps at u64::MAX
        let added = (points as f32 * self.run.score_multiplier).round() as u64;
        self.set_score(self.run.score.saturating_add(added));
        added
    }

    pub fn on_player_death(&mut self) {
        if self.run.phase != Phase::Playing {
            return;
        }
        self.set_phase(Phase::Dead);
        self.directives.push(Directive::FreezeActor);
        self.record_high_score();
        if let Some(rank) = self
            .highscores
            .add_score(self.run.score, self.run.loop_count)
        {
            log::info!("Run placed #{rank} on the leaderboard");
        }
        self.ui.death_visible = true;
        self.events.push(GameEvent::PlayerDied {
            score: self.run.score,
            high_score: self.run.high_score,
        });
    }

    /// Goal reached. `focus` is the actor pose the camera celebrates around.
    pub fn on_level_complete(&mut self, focus: Pose) {
        if self.run.phase != Phase::Playing {
            return;
        }
        self.set_phase(Phase::LoopTransition);
        self.directives.push(Directive::FreezeActor);
        self.record_high_score();
        self.events.push(GameEvent::LevelCompleted {
            loop_index: self.run.loop_count,
        });

        if self.celebration_orbit && self.params.celebration_duration > 0.0 {
            self.camera.orbit(focus, self.params.celebration_duration);
            self.sequence = Sequence::Celebrate;
        } else {
            self.fader.fade_in();
            self.sequence = Sequence::LoopFadeToBlack;
        }
    }

    /// Restart after death with difficulty back at the start
    pub fn retry_game(&mut self) -> bool {
        if self.run.phase != Phase::Dead || self.is_busy() {
            return false;
        }
        self.fader.fade_in();
        self.sequence = Sequence::RetryFadeToBlack;
        true
    }

    fn begin_next_loop(&mut self) {
        self.run.loop_count += 1;
        self.run.speed_multiplier *= self.params.speed_growth;
        self.run.score_multiplier *= self.params.score_growth;
        log::info!(
            "Loop {} speed x{:.3} score x{:.3}",
            self.run.loop_count,
            self.run.speed_multiplier,
            self.run.score_multiplier
        );
        self.directives.push(Directive::ResetLevel);
        self.directives
            .push(Directive::SetSpeedMultiplier(self.run.speed_multiplier));
        self.directives.push(Directive::RerollPalette);
    }

    fn restart_run(&mut self) {
        self.run.speed_multiplier = 1.0;
        self.run.score_multiplier = 1.0;
        self.run.loop_count = 0;
        self.set_score(0);
        self.ui.death_visible = false;
        self.ui.score_visible = true;
        self.directives.push(Directive::ResetLevel);
        self.directives.push(Directive::SetSpeedMultiplier(1.0));
        self.directives.push(Directive::RerollPalette);
    }

    /// Advance fades, camera and whichever sequence is running
    pub fn advance(&mut self, dt: f32, focus: Pose) {
        self.fader.advance(dt);
        self.camera.advance(dt, focus);

        match self.sequence {
            Sequence::Idle => {}
            Sequence::Intro => {
                if self.camera.is_settled() {
                    self.camera.follow();
                    self.ui.score_visible = true;
                    self.set_phase(Phase::Playing);
                    self.directives.push(Directive::UnfreezeActor);
                    self.sequence = Sequence::Idle;
                }
            }
            Sequence::Celebrate => {
                if self.camera.is_settled() {
                    self.camera.follow();
                    self.fader.fade_in();
                    self.sequence = Sequence::LoopFadeToBlack;
                }
            }
            Sequence::LoopFadeToBlack => {
                if self.fader.is_settled() {
                    self.begin_next_loop();
                    self.fader.fade_out();
                    self.sequence = Sequence::LoopFadeFromBlack;
                }
            }
            Sequence::LoopFadeFromBlack => {
                if self.fader.is_settled() {
                    self.set_phase(Phase::Playing);
                    self.directives.push(Directive::UnfreezeActor);
                    self.events.push(GameEvent::LoopStarted {
                        loop_count: self.run.loop_count,
                        speed_multiplier: self.run.speed_multiplier,
                        score_multiplier: self.run.score_multiplier,
                    });
                    self.sequence = Sequence::Idle;
                }
            }
            Sequence::RetryFadeToBlack => {
                if self.fader.is_settled() {
                    self.restart_run();
                    self.set_phase(Phase::Playing);
                    self.directives.push(Directive::UnfreezeActor);
                    self.fader.fade_out();
                    self.sequence = Sequence::RetryFadeFromBlack;
                }
            }
            Sequence::RetryFadeFromBlack => {
                if self.fader.is_settled() {
                    self.sequence = Sequence::Idle;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 0.1;

    fn run_for(session: &mut Session, seconds: f32) {
        let frames = (seconds / DT).ceil() as usize;
        for _ in 0..frames {
            session.advance(DT, Pose::IDENTITY);
        }
    }

    fn playing() -> Session {
        let mut session = Session::new(&Tuning::default(), true);
        assert!(session.play_game());
        run_for(&mut session, 2.0);
        assert_eq!(session.phase(), Phase::Playing);
        session.drain_directives();
        session.drain_events();
        session
    }

    fn complete_loop(session: &mut Session) {
        session.on_level_complete(Pose::IDENTITY);
        run_for(session, 7.0);
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_play_game_intro_then_playing() {
        let mut session = Session::new(&Tuning::default(), true);
        assert_eq!(session.phase(), Phase::Menu);
        assert!(session.ui().menu_visible);
        assert!(session.play_game());
        assert!(!session.play_game());
        assert_eq!(session.phase(), Phase::Transitioning);
        assert!(!session.ui().menu_visible);

        run_for(&mut session, 1.0);
        assert_eq!(session.phase(), Phase::Transitioning);
        run_for(&mut session, 1.0);
        assert_eq!(session.phase(), Phase::Playing);
        assert!(session.ui().score_visible);
        assert!(session.camera().is_following());
        assert!(session.drain_directives().contains(&Directive::UnfreezeActor));
    }

    #[test]
    fn test_score_only_while_playing() {
        let mut session = Session::new(&Tuning::default(), true);
        assert_eq!(session.add_score(5), 0);
        assert_eq!(session.run().score, 0);

        let mut session = playing();
        assert_eq!(session.add_score(2), 2);
        session.on_player_death();
        assert_eq!(session.add_score(2), 0);
        assert_eq!(session.run().score, 2);
    }

    #[test]
    fn test_death_is_idempotent() {
        let mut session = playing();
        session.add_score(7);
        session.drain_events();

        session.on_player_death();
        let run_once = session.run().clone();
        let ui_once = session.ui().clone();
        session.on_player_death();

        assert_eq!(session.run(), &run_once);
        assert_eq!(session.ui(), &ui_once);
        assert_eq!(run_once.phase, Phase::Dead);
        assert_eq!(run_once.high_score, 7);
        assert_eq!(ui_once.final_score_text, "Score : 7");
        assert_eq!(ui_once.high_score_text, "Highscore : 7");
        assert!(ui_once.death_visible);

        let deaths = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PlayerDied { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert_eq!(session.highscores().top_score(), Some(7));
    }

    #[test]
    fn test_level_complete_is_idempotent() {
        let mut session = playing();
        session.on_level_complete(Pose::IDENTITY);
        let run_once = session.run().clone();
        let ui_once = session.ui().clone();
        session.on_level_complete(Pose::IDENTITY);
        session.on_player_death();
        assert_eq!(session.run(), &run_once);
        assert_eq!(session.ui(), &ui_once);
        assert_eq!(run_once.phase, Phase::LoopTransition);
    }

    #[test]
    fn test_completed_loop_escalates() {
        let mut session = playing();
        session.add_score(3);
        complete_loop(&mut session);

        let run = session.run();
        assert_eq!(run.loop_count, 1);
        assert!((run.speed_multiplier - 1.1).abs() < 1e-6);
        assert!((run.score_multiplier - 1.5).abs() < 1e-6);
        assert_eq!(run.score, 3);
        assert_eq!(run.high_score, 3);

        let directives = session.drain_directives();
        assert!(directives.contains(&Directive::ResetLevel));
        assert!(directives.contains(&Directive::SetSpeedMultiplier(1.1)));
        assert!(directives.contains(&Directive::RerollPalette));
        assert_eq!(directives.last(), Some(&Directive::UnfreezeActor));

        complete_loop(&mut session);
        let run = session.run();
        assert_eq!(run.loop_count, 2);
        assert!((run.speed_multiplier - 1.1 * 1.1).abs() < 1e-5);
        assert!((run.score_multiplier - 1.5 * 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_loop_without_orbit_goes_straight_to_fade() {
        let mut session = Session::new(&Tuning::default(), false);
        session.play_game();
        run_for(&mut session, 2.0);
        session.on_level_complete(Pose::IDENTITY);
        run_for(&mut session, 2.5);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.run().loop_count, 1);
    }

    #[test]
    fn test_retry_resets_everything() {
        let mut session = playing();
        complete_loop(&mut session);
        session.add_score(4);
        session.on_player_death();
        session.drain_directives();

        assert!(session.retry_game());
        assert!(!session.retry_game());
        assert_eq!(session.phase(), Phase::Dead);
        run_for(&mut session, 1.1);

        let run = session.run();
        assert_eq!(run.phase, Phase::Playing);
        assert_eq!(run.score, 0);
        assert_eq!(run.loop_count, 0);
        assert_eq!(run.speed_multiplier, 1.0);
        assert_eq!(run.score_multiplier, 1.0);
        assert_eq!(run.high_score, 6);
        assert!(!session.ui().death_visible);
        assert!(session.fader().is_blocking());

        let directives = session.drain_directives();
        assert!(directives.contains(&Directive::ResetLevel));
        assert!(directives.contains(&Directive::SetSpeedMultiplier(1.0)));

        run_for(&mut session, 1.1);
        assert!(!session.fader().is_blocking());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_huge_multiplier_saturates_score() {
        let mut tuning = Tuning::default();
        tuning.session.score_growth = 1e20;
        let mut session = Session::new(&tuning, false);
        session.play_game();
        run_for(&mut session, 2.0);
        session.on_level_complete(Pose::IDENTITY);
        run_for(&mut session, 2.5);
        assert_eq!(session.phase(), Phase::Playing);

        assert_eq!(session.add_score(1), u64::MAX);
        session.add_score(1);
        assert_eq!(session.run().score, u64::MAX);
    }

    #[test]
    fn test_retry_ignored_unless_dead() {
        let mut session = playing();
        assert!(!session.retry_game());
        assert_eq!(session.phase(), Phase::Playing);
    }

    proptest! {
        #[test]
        fn score_rounds_per_event(n in 0u32..60, loops in 0u32..5) {
            let mut session = playing();
            for _ in 0..loops {
                complete_loop(&mut session);
            }
            let m = session.run().score_multiplier;
            let before = session.run().score;
            for _ in 0..n {
                session.add_score(1);
            }
            let expected = n as u64 * m.round() as u64;
            prop_assert_eq!(session.run().score - before, expected);
        }
    }
}
