//! Trigger volumes and the contacts they produce

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What touching a volume means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// Death zone
    Hazard,
    /// Finish line
    Goal,
    /// Collectible crystal
    Pickup,
}

/// Identifies a trigger volume within a level
pub type VolumeId = u32;

/// The actor entered a trigger volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub kind: ContactKind,
    pub volume: VolumeId,
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Does a sphere overlap this box
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Is (x, z) inside the box footprint grown by `margin`
    pub fn contains_xz(&self, x: f32, z: f32, margin: f32) -> bool {
        x >= self.min.x - margin
            && x <= self.max.x + margin
            && z >= self.min.z - margin
            && z <= self.max.z + margin
    }
}

/// A tagged trigger volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: VolumeId,
    pub kind: ContactKind,
    pub bounds: Aabb,
}
