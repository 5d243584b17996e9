//! Per-level colour scheme
//!
//! A random base hue is rolled for every level start; road, actor and
//! background are darker shades of it.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::PaletteTuning;

/// Linear RGB colour
pub type Rgb = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub base: Rgb,
    pub road: Rgb,
    pub actor: Rgb,
    pub background: Rgb,
}

/// HSV (all components in [0, 1]) to RGB
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

fn scaled(c: Rgb, k: f32) -> Rgb {
    [c[0] * k, c[1] * k, c[2] * k]
}

#[derive(Debug, Clone)]
pub struct LevelPalette {
    params: PaletteTuning,
    rng: Pcg32,
    current: Palette,
}

impl LevelPalette {
    pub fn new(params: PaletteTuning, seed: u64) -> Self {
        let mut palette = Self {
            params,
            rng: Pcg32::seed_from_u64(seed),
            current: Palette {
                base: [1.0; 3],
                road: [1.0; 3],
                actor: [1.0; 3],
                background: [1.0; 3],
            },
        };
        palette.reroll();
        palette
    }

    pub fn current(&self) -> Palette {
        self.current
    }

    /// Roll a new scheme
    pub fn reroll(&mut self) -> Palette {
        let (s_lo, s_hi) = self.params.saturation;
        let (v_lo, v_hi) = self.params.value;
        let hue = self.rng.random_range(0.0..1.0);
        let saturation = if s_hi > s_lo {
            self.rng.random_range(s_lo..s_hi)
        } else {
            s_lo
        };
        let value = if v_hi > v_lo {
            self.rng.random_range(v_lo..v_hi)
        } else {
            v_lo
        };

        let base = hsv_to_rgb(hue, saturation, value);
        self.current = Palette {
            base,
            road: scaled(base, self.params.road_darken),
            actor: scaled(base, self.params.actor_darken),
            background: scaled(base, self.params.background_darken),
        };
        log::debug!("Level palette hue={hue:.3} s={saturation:.3} v={value:.3}");
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_hsv_primaries() {
        assert!(close(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]));
        assert!(close(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0.0, 1.0, 0.0]));
        assert!(close(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0.0, 0.0, 1.0]));
        assert!(close(hsv_to_rgb(0.5, 0.0, 0.4), [0.4, 0.4, 0.4]));
    }

    #[test]
    fn test_same_seed_same_palette() {
        let mut a = LevelPalette::new(PaletteTuning::default(), 42);
        let mut b = LevelPalette::new(PaletteTuning::default(), 42);
        assert_eq!(a.current(), b.current());
        assert_eq!(a.reroll(), b.reroll());
    }

    #[test]
    fn test_shades_are_darker() {
        let palette = LevelPalette::new(PaletteTuning::default(), 7).current();
        let max = palette.base.iter().cloned().fold(0.0f32, f32::max);
        assert!((0.6..0.9).contains(&max));
        for i in 0..3 {
            assert!(palette.background[i] <= palette.actor[i]);
            assert!(palette.actor[i] <= palette.road[i]);
            assert!(palette.road[i] <= palette.base[i]);
        }
    }
}
