//! Gameplay simulation
//!
//! All gameplay logic lives here. It is driven one rendered frame at a time by
//! [`Game::frame`] and must stay engine-agnostic:
//! - Physics, probes and triggers only through the [`Host`] / [`Body`] traits
//! - Fixed physics substeps
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod body;
pub mod camera;
pub mod contact;
pub mod events;
pub mod fader;
pub mod game;
pub mod locomotion;
pub mod palette;
pub mod pickups;
pub mod score;
pub mod session;
pub mod squash;
pub mod track;
pub mod tween;

pub use body::{Body, BodyCommand, BodySample, Host, ProbeHit};
pub use camera::CameraRig;
pub use contact::{Aabb, Contact, ContactKind, Volume, VolumeId};
pub use events::{GameEvent, SoundCue};
pub use fader::ScreenFader;
pub use game::{FrameInput, Game};
pub use locomotion::{ActorEvent, ActorInput, Facing, Locomotion, MotionState};
pub use palette::{LevelPalette, Palette};
pub use pickups::PickupSet;
pub use score::ScoreAccumulator;
pub use session::{Directive, Phase, RunState, Session, UiState};
pub use squash::{ScaleShape, SquashAnimator};
pub use track::{Autopilot, Track};
pub use tween::{Easing, Ramp, Timer, Tween};
