//! Collision event dispatch
//!
//! Routes each [`CollisionEvent`] to the listeners registered for its subject
//! entity, then to global listeners. Delivery is immediate and in
//! registration order.

use super::collision::CollisionEvent;
use crate::ecs::Entity;
use std::collections::HashMap;
use std::fmt;

/// Collision callback
pub type CollisionCallback = Box<dyn FnMut(&CollisionEvent)>;

/// Handle returned on registration, used to remove a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Per-entity and global collision listener registry
#[derive(Default)]
pub struct CollisionDispatcher {
    next_id: u64,
    entity_listeners: HashMap<Entity, Vec<(ListenerId, CollisionCallback)>>,
    global_listeners: Vec<(ListenerId, CollisionCallback)>,
    dispatched: u64,
}

impl CollisionDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a listener for events about one entity
    pub fn add_entity_listener(&mut self, entity: Entity, callback: CollisionCallback) -> ListenerId {
        let id = self.allocate_id();
        self.entity_listeners.entry(entity).or_default().push((id, callback));
        id
    }

    /// Register a listener for every event
    pub fn add_global_listener(&mut self, callback: CollisionCallback) -> ListenerId {
        let id = self.allocate_id();
        self.global_listeners.push((id, callback));
        id
    }

    /// Remove a listener; returns `false` if it was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.global_listeners.len();
        self.global_listeners.retain(|(listener, _)| *listener != id);
        if self.global_listeners.len() != before {
            return true;
        }

        let mut removed = false;
        self.entity_listeners.retain(|_, listeners| {
            let count = listeners.len();
            listeners.retain(|(listener, _)| *listener != id);
            removed |= listeners.len() != count;
            !listeners.is_empty()
        });
        removed
    }

    /// Drop every listener registered for an entity; returns how many were removed
    pub fn forget_entity(&mut self, entity: Entity) -> usize {
        self.entity_listeners.remove(&entity).map_or(0, |listeners| listeners.len())
    }

    /// Deliver an event to its subject's listeners, then to global listeners
    pub fn dispatch(&mut self, event: &CollisionEvent) {
        if let Some(listeners) = self.entity_listeners.get_mut(&event.entity) {
            for (_, callback) in listeners.iter_mut() {
                callback(event);
            }
        }
        for (_, callback) in &mut self.global_listeners {
            callback(event);
        }
        self.dispatched += 1;
    }

    /// Total registered listeners
    pub fn listener_count(&self) -> usize {
        self.global_listeners.len() + self.entity_listeners.values().map(Vec::len).sum::<usize>()
    }

    /// Events delivered since creation
    pub const fn dispatched_count(&self) -> u64 {
        self.dispatched
    }
}

impl fmt::Debug for CollisionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionDispatcher")
            .field("entity_listeners", &self.entity_listeners.len())
            .field("global_listeners", &self.global_listeners.len())
            .field("dispatched", &self.dispatched)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::foundation::math::{up, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn terrain_event(entity: Entity) -> CollisionEvent {
        CollisionEvent::with_terrain(entity, Vec3::zeros(), up(), Vec3::zeros(), 1.0)
    }

    #[test]
    fn test_entity_and_global_delivery() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = CollisionDispatcher::new();

        let sink = Rc::clone(&log);
        dispatcher.add_entity_listener(a, Box::new(move |e| sink.borrow_mut().push(("a", e.entity))));
        let sink = Rc::clone(&log);
        dispatcher.add_global_listener(Box::new(move |e| sink.borrow_mut().push(("global", e.entity))));

        dispatcher.dispatch(&terrain_event(a));
        dispatcher.dispatch(&terrain_event(b));

        assert_eq!(*log.borrow(), vec![("a", a), ("global", a), ("global", b)]);
        assert_eq!(dispatcher.dispatched_count(), 2);
    }

    #[test]
    fn test_remove_listener() {
        let mut world = World::new();
        let a = world.create_entity();
        let hits = Rc::new(RefCell::new(0));
        let mut dispatcher = CollisionDispatcher::new();

        let sink = Rc::clone(&hits);
        let id = dispatcher.add_entity_listener(a, Box::new(move |_| *sink.borrow_mut() += 1));
        assert!(dispatcher.remove_listener(id));
        assert!(!dispatcher.remove_listener(id));

        dispatcher.dispatch(&terrain_event(a));
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn test_forget_entity() {
        let mut world = World::new();
        let a = world.create_entity();
        let mut dispatcher = CollisionDispatcher::new();
        dispatcher.add_entity_listener(a, Box::new(|_| {}));
        dispatcher.add_entity_listener(a, Box::new(|_| {}));
        dispatcher.add_global_listener(Box::new(|_| {}));

        assert_eq!(dispatcher.forget_entity(a), 2);
        assert_eq!(dispatcher.listener_count(), 1);
    }
}
