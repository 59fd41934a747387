//! Transform component for the in-memory scene
//!
//! Pure data: the local position relative to the parent plus the dirty flag
//! the physics engine raises after moving an entity.

use crate::ecs::Entity;
use crate::foundation::math::Vec3;

/// Local transform of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// Position relative to the parent, or world space for top-level entities
    pub local_position: Vec3,

    /// Parent entity, if attached
    pub parent: Option<Entity>,

    /// Set when the world position needs recomputation
    pub dirty: bool,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            local_position: Vec3::zeros(),
            parent: None,
            dirty: false,
        }
    }
}

impl TransformComponent {
    /// Create from position only
    pub fn from_position(local_position: Vec3) -> Self {
        Self {
            local_position,
            ..Default::default()
        }
    }

    /// Move to a new local position and flag for recomputation
    pub fn set_position(&mut self, local_position: Vec3) {
        self.local_position = local_position;
        self.dirty = true;
    }
}
