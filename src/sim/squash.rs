//! Squash and stretch for the ball visual
//!
//! Purely cosmetic. A routine eases toward its target shape, then back to the
//! base scale. Starting a new routine replaces the running one.

use glam::Vec3;

use crate::consts::SETTLE_EPSILON;
use crate::tuning::SquashTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleShape {
    /// Wide and flat before take-off
    Squash,
    /// Tall and thin on launch
    Stretch,
    /// Flattened on a hard landing
    Impact,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Leg {
    Out,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Routine {
    target: Vec3,
    out_speed: f32,
    leg: Leg,
}

#[derive(Debug, Clone)]
pub struct SquashAnimator {
    params: SquashTuning,
    base: Vec3,
    current: Vec3,
    routine: Option<Routine>,
}

impl SquashAnimator {
    pub fn new(params: SquashTuning, base: Vec3) -> Self {
        Self {
            params,
            base,
            current: base,
            routine: None,
        }
    }

    pub fn scale(&self) -> Vec3 {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.routine.is_some()
    }

    /// Start a routine, cancelling whatever was playing
    pub fn play(&mut self, shape: ScaleShape) {
        let p = &self.params;
        let b = self.base;
        let (target, out_speed) = match shape {
            ScaleShape::Squash => (
                Vec3::new(b.x * 1.2, b.y * p.squash_scale, b.z * 1.2),
                p.animation_speed,
            ),
            ScaleShape::Stretch => (
                Vec3::new(b.x * 0.8, b.y * p.stretch_scale, b.z * 0.8),
                p.animation_speed,
            ),
            ScaleShape::Impact => (
                Vec3::new(b.x * 1.3, b.y * p.impact_scale, b.z * 1.3),
                p.animation_speed * 2.0,
            ),
        };
        self.routine = Some(Routine {
            target,
            out_speed,
            leg: Leg::Out,
        });
    }

    /// Snap back to the base scale
    pub fn cancel(&mut self) {
        self.routine = None;
        self.current = self.base;
    }

    pub fn advance(&mut self, dt: f32) {
        let Some(routine) = self.routine.as_mut() else {
            return;
        };
        match routine.leg {
            Leg::Out => {
                let t = (dt * routine.out_speed).clamp(0.0, 1.0);
                self.current = self.current.lerp(routine.target, t);
                if self.current.distance(routine.target) <= SETTLE_EPSILON {
                    routine.leg = Leg::Back;
                }
            }
            Leg::Back => {
                let t = (dt * self.params.animation_speed).clamp(0.0, 1.0);
                self.current = self.current.lerp(self.base, t);
                if self.current.distance(self.base) <= SETTLE_EPSILON {
                    self.current = self.base;
                    self.routine = None;
                }
            }
        }
    }
}
