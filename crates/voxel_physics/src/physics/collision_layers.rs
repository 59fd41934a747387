//! Collision layers for filtering entity pairs
//!
//! Every body sits on one or more layers and carries a mask of the layers it
//! reacts to. A pair is considered only when each body's layer appears in the
//! other's mask.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Collision layer bit set
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CollisionLayers: u32 {
        /// Player characters
        const PLAYER = 1 << 0;
        /// Non-player characters
        const ENEMY = 1 << 1;
        /// Thrown or fired objects
        const PROJECTILE = 1 << 2;
        /// Static props and placed geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (events only, no physical response)
        const TRIGGER = 1 << 4;
        /// Loose physics objects
        const DEBRIS = 1 << 5;
        /// Vehicles
        const VEHICLE = 1 << 6;
        /// Pickups and collectibles
        const PICKUP = 1 << 7;
        /// Every layer, including user-defined bits
        const ALL = u32::MAX;
    }
}

impl CollisionLayers {
    /// No layer
    pub const NONE: Self = Self::empty();

    /// Check if two bodies should collide based on their layers and masks
    ///
    /// # Arguments
    /// * `layer_a` - Body A's layer
    /// * `mask_a` - Layers body A collides with
    /// * `layer_b` - Body B's layer
    /// * `mask_b` - Layers body B collides with
    ///
    /// # Example
    /// ```
    /// use voxel_physics::physics::CollisionLayers;
    ///
    /// let player_mask = CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT;
    /// let enemy_mask = CollisionLayers::PLAYER | CollisionLayers::PROJECTILE;
    ///
    /// assert!(CollisionLayers::should_collide(
    ///     CollisionLayers::PLAYER, player_mask,
    ///     CollisionLayers::ENEMY, enemy_mask,
    /// ));
    /// ```
    pub const fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }

    /// Combine several layers into one mask
    pub fn mask(layers: &[Self]) -> Self {
        layers.iter().fold(Self::NONE, |acc, &layer| acc | layer)
    }

    /// Custom layer for game-specific bits 8..=31
    ///
    /// Returns `None` for bits reserved by the built-in layers or out of range.
    pub const fn custom(bit: u32) -> Option<Self> {
        if bit >= 8 && bit < 32 {
            Some(Self::from_bits_retain(1 << bit))
        } else {
            None
        }
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        assert!(CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            CollisionLayers::ENEMY,
            CollisionLayers::ENEMY,
            CollisionLayers::PLAYER,
        ));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        // Player wants the enemy, the enemy only reacts to projectiles
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            CollisionLayers::ENEMY,
            CollisionLayers::ENEMY,
            CollisionLayers::PROJECTILE,
        ));
    }

    #[test]
    fn test_mask_creation() {
        let mask = CollisionLayers::mask(&[
            CollisionLayers::PLAYER,
            CollisionLayers::ENEMY,
            CollisionLayers::ENVIRONMENT,
        ]);
        assert_eq!(
            mask,
            CollisionLayers::PLAYER | CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT
        );
    }

    #[test]
    fn test_custom_layers() {
        assert_eq!(CollisionLayers::custom(8).map(|l| l.bits()), Some(1 << 8));
        assert!(CollisionLayers::custom(3).is_none());
        assert!(CollisionLayers::custom(32).is_none());
        assert!(CollisionLayers::ALL.contains(CollisionLayers::custom(31).unwrap_or(CollisionLayers::NONE)));
    }
}
