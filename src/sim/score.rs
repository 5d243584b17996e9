//! Distance checkpoints
//!
//! Every `step` units of straight-line distance from the run start is worth a
//! checkpoint. Multipliers are the session's business; this only counts.

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAccumulator {
    step: f32,
    start: Vec3,
    /// Checkpoints already paid out since the last reset
    reached: u32,
}

impl ScoreAccumulator {
    pub fn new(step: f32, start: Vec3) -> Self {
        Self {
            step,
            start,
            reached: 0,
        }
    }

    /// Move the baseline (level reset, retry)
    pub fn reset(&mut self, start: Vec3) {
        self.start = start;
        self.reached = 0;
    }

    pub fn checkpoints_reached(&self) -> u32 {
        self.reached
    }

    /// Distance of the next checkpoint from the start
    pub fn next_checkpoint(&self) -> f32 {
        (self.reached + 1) as f32 * self.step
    }

    /// Number of checkpoints newly crossed at `position`
    pub fn update(&mut self, position: Vec3) -> u32 {
        if self.step <= 0.0 {
            return 0;
        }
        let distance = self.start.distance(position);
        let total = (distance / self.step).floor() as u32;
        if total <= self.reached {
            return 0;
        }
        let crossed = total - self.reached;
        self.reached = total;
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_units_is_two_checkpoints() {
        let mut score = ScoreAccumulator::new(5.0, Vec3::ZERO);
        let mut fired = 0;
        for i in 1..=120 {
            fired += score.update(Vec3::new(0.0, 0.0, i as f32 * 0.1));
        }
        assert_eq!(fired, 2);
        assert_eq!(score.next_checkpoint(), 15.0);
    }

    #[test]
    fn test_large_jump_pays_every_step() {
        let mut score = ScoreAccumulator::new(5.0, Vec3::ZERO);
        assert_eq!(score.update(Vec3::new(12.0, 0.0, 0.0)), 2);
        assert_eq!(score.update(Vec3::new(12.5, 0.0, 0.0)), 0);
    }

    #[test]
    fn test_moving_back_does_not_repay() {
        let mut score = ScoreAccumulator::new(5.0, Vec3::ZERO);
        assert_eq!(score.update(Vec3::new(0.0, 0.0, 6.0)), 1);
        assert_eq!(score.update(Vec3::new(0.0, 0.0, 1.0)), 0);
        assert_eq!(score.update(Vec3::new(0.0, 0.0, 6.0)), 0);
    }

    #[test]
    fn test_reset_moves_baseline() {
        let mut score = ScoreAccumulator::new(5.0, Vec3::ZERO);
        score.update(Vec3::new(0.0, 0.0, 11.0));
        score.reset(Vec3::new(0.0, 0.0, 11.0));
        assert_eq!(score.checkpoints_reached(), 0);
        assert_eq!(score.update(Vec3::new(0.0, 0.0, 15.0)), 0);
        assert_eq!(score.update(Vec3::new(0.0, 0.0, 16.5)), 1);
    }
}
