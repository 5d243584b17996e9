//! Full-screen fade overlay

use super::tween::{Easing, Ramp};

#[derive(Debug, Clone)]
pub struct ScreenFader {
    alpha: f32,
    duration: f32,
    fade: Option<Ramp>,
}

impl ScreenFader {
    /// Starts opaque and immediately fades from black
    pub fn new(duration: f32) -> Self {
        let mut fader = Self {
            alpha: 1.0,
            duration,
            fade: None,
        };
        fader.fade_out();
        fader
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Overlay is on screen and eats input
    pub fn is_blocking(&self) -> bool {
        self.alpha > 0.0
    }

    pub fn is_settled(&self) -> bool {
        self.fade.is_none()
    }

    /// Fade to black
    pub fn fade_in(&mut self) {
        self.fade = Some(Ramp::new(self.alpha, 1.0, self.duration, Easing::Linear));
    }

    /// Fade back to clear
    pub fn fade_out(&mut self) {
        self.fade = Some(Ramp::new(self.alpha, 0.0, self.duration, Easing::Linear));
    }

    pub fn advance(&mut self, dt: f32) {
        if let Some(ramp) = self.fade.as_mut() {
            self.alpha = ramp.advance(dt);
            if ramp.is_done() {
                self.fade = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_from_black() {
        let mut fader = ScreenFader::new(1.0);
        assert_eq!(fader.alpha(), 1.0);
        assert!(fader.is_blocking());
        fader.advance(0.5);
        assert!((fader.alpha() - 0.5).abs() < 1e-6);
        fader.advance(0.6);
        assert_eq!(fader.alpha(), 0.0);
        assert!(fader.is_settled());
        assert!(!fader.is_blocking());
    }

    #[test]
    fn test_fade_in_replaces_running_fade() {
        let mut fader = ScreenFader::new(1.0);
        fader.advance(0.75);
        fader.fade_in();
        fader.advance(0.5);
        assert!((fader.alpha() - 0.625).abs() < 1e-5);
        fader.advance(0.5);
        assert_eq!(fader.alpha(), 1.0);
        assert!(fader.is_settled());
    }
}
