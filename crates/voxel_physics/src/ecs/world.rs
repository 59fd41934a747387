//! In-memory scene implementing [`PhysicsScene`]
//!
//! Used by tests and the sandbox binary. Games with their own ECS implement
//! [`PhysicsScene`] over their storage instead.

use super::{
    components::{PhysicsBody, TransformComponent},
    Entity, EntityKind, PhysicsScene,
};
use crate::foundation::math::Vec3;
use slotmap::SlotMap;

/// Parent chains longer than this are treated as cycles
const MAX_HIERARCHY_DEPTH: usize = 64;

#[derive(Debug, Clone, Default)]
struct EntityRecord {
    transform: TransformComponent,
    body: Option<PhysicsBody>,
    kind: EntityKind,
    free_fly: bool,
}

/// World containing all entities and their physics-relevant components
#[derive(Debug, Default)]
pub struct World {
    entities: SlotMap<Entity, EntityRecord>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity at the origin
    pub fn create_entity(&mut self) -> Entity {
        self.create_entity_at(Vec3::zeros())
    }

    /// Create a new entity at a position
    pub fn create_entity_at(&mut self, position: Vec3) -> Entity {
        self.create_entity_with_kind(EntityKind::Prop, position)
    }

    /// Create a new entity with an explicit classification
    pub fn create_entity_with_kind(&mut self, kind: EntityKind, position: Vec3) -> Entity {
        self.entities.insert(EntityRecord {
            transform: TransformComponent::from_position(position),
            kind,
            ..Default::default()
        })
    }

    /// Remove an entity; its children are detached and become top-level
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        if self.entities.remove(entity).is_none() {
            return false;
        }
        for record in self.entities.values_mut() {
            if record.transform.parent == Some(entity) {
                record.transform.parent = None;
                record.transform.dirty = true;
            }
        }
        true
    }

    /// Attach `child` to `parent`, or detach it with `None`
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> bool {
        if parent.is_some_and(|p| p == child || !self.entities.contains_key(p)) {
            return false;
        }
        match self.entities.get_mut(child) {
            Some(record) => {
                record.transform.parent = parent;
                record.transform.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Toggle free-fly (no-clip) mode for an entity
    pub fn set_free_fly(&mut self, entity: Entity, enabled: bool) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.free_fly = enabled;
        }
    }

    /// Check whether an entity's transform is flagged dirty
    pub fn is_dirty(&self, entity: Entity) -> bool {
        self.entities.get(entity).is_some_and(|r| r.transform.dirty)
    }

    /// Collect and clear all dirty flags (what a transform system would consume)
    pub fn take_dirty(&mut self) -> Vec<Entity> {
        self.entities
            .iter_mut()
            .filter(|(_, record)| record.transform.dirty)
            .map(|(entity, record)| {
                record.transform.dirty = false;
                entity
            })
            .collect()
    }

    /// Transform component of an entity
    pub fn transform(&self, entity: Entity) -> Option<&TransformComponent> {
        self.entities.get(entity).map(|r| &r.transform)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl PhysicsScene for World {
    fn entities(&self) -> Vec<Entity> {
        self.entities.keys().collect()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    fn local_position(&self, entity: Entity) -> Option<Vec3> {
        self.entities.get(entity).map(|r| r.transform.local_position)
    }

    fn set_local_position(&mut self, entity: Entity, position: Vec3) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.transform.local_position = position;
        }
    }

    fn world_position(&self, entity: Entity) -> Option<Vec3> {
        let mut record = self.entities.get(entity)?;
        let mut position = record.transform.local_position;
        for _ in 0..MAX_HIERARCHY_DEPTH {
            let Some(parent) = record.transform.parent else {
                return Some(position);
            };
            record = self.entities.get(parent)?;
            position += record.transform.local_position;
        }
        log::warn!("Parent chain of {:?} exceeds {} levels", entity, MAX_HIERARCHY_DEPTH);
        None
    }

    fn mark_dirty(&mut self, entity: Entity) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.transform.dirty = true;
        }
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.entities.get(entity).and_then(|r| r.transform.parent)
    }

    fn kind(&self, entity: Entity) -> EntityKind {
        self.entities.get(entity).map(|r| r.kind).unwrap_or_default()
    }

    fn is_exempt(&self, entity: Entity) -> bool {
        self.entities.get(entity).is_some_and(|r| r.free_fly)
    }

    fn body(&self, entity: Entity) -> Option<&PhysicsBody> {
        self.entities.get(entity).and_then(|r| r.body.as_ref())
    }

    fn body_mut(&mut self, entity: Entity) -> Option<&mut PhysicsBody> {
        self.entities.get_mut(entity).and_then(|r| r.body.as_mut())
    }

    fn set_body(&mut self, entity: Entity, body: PhysicsBody) -> bool {
        match self.entities.get_mut(entity) {
            Some(record) => {
                record.body = Some(body);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove_entity() {
        let mut world = World::new();
        let entity = world.create_entity();
        assert_eq!(world.len(), 1);
        assert!(world.remove_entity(entity));
        assert!(!world.contains(entity));
        assert!(!world.remove_entity(entity));
    }

    #[test]
    fn test_world_position_follows_parent_chain() {
        let mut world = World::new();
        let root = world.create_entity_at(Vec3::new(10.0, 0.0, 0.0));
        let child = world.create_entity_at(Vec3::new(1.0, 2.0, 0.0));
        let grandchild = world.create_entity_at(Vec3::new(0.0, 0.0, 3.0));
        assert!(world.set_parent(child, Some(root)));
        assert!(world.set_parent(grandchild, Some(child)));

        assert_eq!(world.world_position(grandchild), Some(Vec3::new(11.0, 2.0, 3.0)));
        assert!(world.is_parent_or_child(root, child));
        assert!(!world.is_parent_or_child(root, grandchild));
        assert!(!world.is_top_level(child));
    }

    #[test]
    fn test_removing_parent_detaches_children() {
        let mut world = World::new();
        let parent = world.create_entity();
        let child = world.create_entity();
        world.set_parent(child, Some(parent));
        world.remove_entity(parent);
        assert!(world.is_top_level(child));
    }

    #[test]
    fn test_self_parenting_rejected() {
        let mut world = World::new();
        let entity = world.create_entity();
        assert!(!world.set_parent(entity, Some(entity)));
    }

    #[test]
    fn test_take_dirty_clears_flags() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.mark_dirty(entity);
        assert!(world.is_dirty(entity));
        assert_eq!(world.take_dirty(), vec![entity]);
        assert!(!world.is_dirty(entity));
    }

    #[test]
    fn test_kind_and_free_fly() {
        let mut world = World::new();
        let player = world.create_entity_with_kind(EntityKind::Player, Vec3::zeros());
        assert_eq!(world.kind(player), EntityKind::Player);
        assert!(!world.is_exempt(player));
        world.set_free_fly(player, true);
        assert!(world.is_exempt(player));
    }
}
