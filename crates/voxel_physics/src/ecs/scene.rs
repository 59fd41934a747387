//! Scene access contract consumed by the physics engine
//!
//! The engine does not own entities or their transforms. Everything it needs
//! from the scene graph goes through [`PhysicsScene`], which keeps the seam
//! narrow enough for a game to back it with its own ECS.

use crate::ecs::{components::PhysicsBody, Entity, EntityKind};
use crate::foundation::math::Vec3;

/// Read/write view of the scene used by the physics engine
pub trait PhysicsScene {
    /// All live entities in a stable order
    fn entities(&self) -> Vec<Entity>;

    /// Check if an entity is alive
    fn contains(&self, entity: Entity) -> bool;

    /// Position relative to the parent (or the world for top-level entities)
    fn local_position(&self, entity: Entity) -> Option<Vec3>;

    /// Overwrite the local position
    fn set_local_position(&mut self, entity: Entity, position: Vec3);

    /// Derived world-space position
    fn world_position(&self, entity: Entity) -> Option<Vec3>;

    /// Flag the entity's transform for recomputation
    fn mark_dirty(&mut self, entity: Entity);

    /// Parent entity, if attached
    fn parent(&self, entity: Entity) -> Option<Entity>;

    /// Classification tag
    fn kind(&self, entity: Entity) -> EntityKind;

    /// Whether the entity is exempt from gravity and collision (free-fly / no-clip)
    fn is_exempt(&self, entity: Entity) -> bool;

    /// Physics body attached to the entity
    fn body(&self, entity: Entity) -> Option<&PhysicsBody>;

    /// Mutable physics body attached to the entity
    fn body_mut(&mut self, entity: Entity) -> Option<&mut PhysicsBody>;

    /// Attach or replace the physics body; returns `false` for dead entities
    fn set_body(&mut self, entity: Entity, body: PhysicsBody) -> bool;

    /// Whether one entity is the direct parent of the other
    fn is_parent_or_child(&self, a: Entity, b: Entity) -> bool {
        self.parent(a) == Some(b) || self.parent(b) == Some(a)
    }

    /// Whether the entity takes part in simulation independently of a parent
    fn is_top_level(&self, entity: Entity) -> bool {
        self.parent(entity).is_none()
    }
}
