//! Collectible crystals
//!
//! Availability only; placement and rendering stay with the host.

use serde::{Deserialize, Serialize};

use super::contact::VolumeId;

/// Default points per crystal
pub const DEFAULT_PICKUP_VALUE: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: VolumeId,
    pub value: u32,
    pub available: bool,
}

/// All pickups in the level, sorted by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickupSet {
    pickups: Vec<Pickup>,
}

impl PickupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pickup (re-registering an id replaces its value)
    pub fn register(&mut self, id: VolumeId, value: u32) {
        match self.pickups.binary_search_by_key(&id, |p| p.id) {
            Ok(i) => self.pickups[i].value = value,
            Err(i) => self.pickups.insert(
                i,
                Pickup {
                    id,
                    value,
                    available: true,
                },
            ),
        }
    }

    /// Deactivate an available pickup and return its value
    pub fn collect(&mut self, id: VolumeId) -> Option<u32> {
        let i = self.pickups.binary_search_by_key(&id, |p| p.id).ok()?;
        let pickup = &mut self.pickups[i];
        if !pickup.available {
            return None;
        }
        pickup.available = false;
        Some(pickup.value)
    }

    pub fn is_available(&self, id: VolumeId) -> bool {
        self.pickups
            .binary_search_by_key(&id, |p| p.id)
            .map(|i| self.pickups[i].available)
            .unwrap_or(false)
    }

    /// Make every pickup available again
    pub fn reset_all(&mut self) {
        for pickup in &mut self.pickups {
            pickup.available = true;
        }
    }

    pub fn available_count(&self) -> usize {
        self.pickups.iter().filter(|p| p.available).count()
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }
}
