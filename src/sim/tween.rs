//! Resumable multi-frame tasks
//!
//! Each task holds its own progress and is advanced once per frame by whoever
//! owns it. Nothing blocks; a finished task just reports `is_done`.

use serde::{Deserialize, Serialize};

use crate::{lerp, smoothstep};

/// Progress curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    SmoothStep,
}

impl Easing {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t.clamp(0.0, 1.0),
            Easing::SmoothStep => smoothstep(t),
        }
    }
}

/// Normalized progress over a fixed duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        }
    }

    /// Advance and return the eased fraction
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    /// Eased fraction in [0, 1]
    pub fn value(&self) -> f32 {
        self.easing.apply(self.fraction())
    }

    /// Raw fraction in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Countdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    remaining: f32,
}

impl Timer {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Advance; returns true once the timer has run out
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Scalar interpolated between two values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    from: f32,
    to: f32,
    tween: Tween,
}

impl Ramp {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            tween: Tween::new(duration, easing),
        }
    }

    /// Value at the current progress
    pub fn value(&self) -> f32 {
        lerp(self.from, self.to, self.tween.value())
    }

    /// Advance and return the new value
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.tween.advance(dt);
        self.value()
    }

    pub fn is_done(&self) -> bool {
        self.tween.is_done()
    }
}
