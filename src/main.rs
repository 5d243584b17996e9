//! Zigzag Run headless demo
//!
//! Builds a seeded zigzag track and lets the autopilot play it, logging the
//! run as it goes.
//!
//! Usage:
//!   zigzag-run [--tuning tuning.json] [--settings settings.json]
//!              [--frames N] [--seed S] [--segments N] [--crash-loop L]

use zigzag_run::sim::{Autopilot, FrameInput, Game, GameEvent, Phase, Track};
use zigzag_run::{Settings, Tuning};

const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames the death screen stays up before the demo presses Retry
const RETRY_DELAY: u32 = 60;

struct Options {
    tuning: Option<String>,
    settings: Option<String>,
    frames: u32,
    seed: u64,
    segments: usize,
    /// Stop steering once this many loops are done
    crash_loop: Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tuning: None,
            settings: None,
            frames: 60 * 90,
            seed: 2024,
            segments: 8,
            crash_loop: Some(2),
        }
    }
}

fn parse_args() -> Options {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let value = args.next();
        match (arg.as_str(), value) {
            ("--tuning", Some(v)) => options.tuning = Some(v),
            ("--settings", Some(v)) => options.settings = Some(v),
            ("--frames", Some(v)) => options.frames = v.parse().unwrap_or(options.frames),
            ("--seed", Some(v)) => options.seed = v.parse().unwrap_or(options.seed),
            ("--segments", Some(v)) => options.segments = v.parse().unwrap_or(options.segments),
            ("--crash-loop", Some(v)) => options.crash_loop = v.parse().ok(),
            (other, _) => log::warn!("Ignoring argument {other}"),
        }
    }
    options
}

fn load_settings(path: Option<&str>) -> Settings {
    let Some(path) = path else {
        return Settings::default();
    };
    match Settings::load(path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Using default settings: {e}");
            Settings::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let options = parse_args();
    let tuning = match options.tuning.as_deref() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let settings = load_settings(options.settings.as_deref());

    log::info!(
        "Zigzag Run (headless) seed={} segments={}",
        options.seed,
        options.segments
    );

    let mut track = Track::zigzag(options.seed, options.segments);
    let mut game = Game::new(tuning, settings, track.start(), options.seed);
    track.register_pickups(&mut game);
    let mut pilot = Autopilot::new(options.seed).with_jumps(0.01);

    game.play();
    let mut dead_frames = 0;
    let mut deaths = 0;
    let mut pickups = 0;

    for _ in 0..options.frames {
        let steering = options
            .crash_loop
            .is_none_or(|crash| game.run().loop_count < crash);
        pilot.set_steering(steering);

        let input = if game.phase() == Phase::Playing {
            pilot.input(&track, &game)
        } else {
            FrameInput::default()
        };
        game.frame(FRAME_DT, &input, &mut track);

        for event in game.drain_events() {
            match event {
                GameEvent::LevelReset => pilot.reset(),
                GameEvent::PickupCollected { points, .. } => {
                    pickups += 1;
                    log::debug!("Crystal +{points}");
                }
                GameEvent::PlayerDied { score, high_score } => {
                    deaths += 1;
                    log::info!("Died with {score} (best {high_score})");
                }
                GameEvent::LoopStarted {
                    loop_count,
                    speed_multiplier,
                    ..
                } => log::info!("Loop {loop_count} at x{speed_multiplier:.2} speed"),
                GameEvent::Sound { .. } | GameEvent::ScoreChanged { .. } => {}
                other => log::debug!("{other:?}"),
            }
        }

        if game.phase() == Phase::Dead {
            dead_frames += 1;
            if dead_frames >= RETRY_DELAY && game.retry() {
                dead_frames = 0;
            }
        }
    }

    let run = game.run();
    println!("phase       {:?}", run.phase);
    println!("score       {}", run.score);
    println!("high score  {}", run.high_score);
    println!("loops       {}", run.loop_count);
    println!("deaths      {deaths}");
    println!("crystals    {pickups}");
    match game.highscores().to_json() {
        Ok(json) => println!("leaderboard {json}"),
        Err(e) => log::warn!("Could not serialize leaderboard: {e}"),
    }
}
