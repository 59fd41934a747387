//! Short-lived memo of recently checked entity pairs
//!
//! The narrow phase consults this before testing a pair; a pair checked less
//! than one timeout ago is skipped. A genuine new contact can therefore be
//! reported up to one timeout late.

use crate::ecs::Entity;
use std::collections::HashMap;

/// Unordered entity pair, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// Smaller entity id
    pub entity_a: Entity,
    /// Larger entity id
    pub entity_b: Entity,
}

impl CollisionPair {
    /// Create a canonical pair; argument order does not matter
    pub fn new(entity_a: Entity, entity_b: Entity) -> Self {
        if entity_a <= entity_b {
            Self { entity_a, entity_b }
        } else {
            Self { entity_a: entity_b, entity_b: entity_a }
        }
    }

    /// Whether the pair involves an entity
    pub fn involves(&self, entity: Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }
}

/// Pair key to last-checked timestamp
#[derive(Debug, Clone)]
pub struct CollisionPairCache {
    timeout_ms: f64,
    entries: HashMap<CollisionPair, f64>,
    last_sweep_ms: f64,
}

impl CollisionPairCache {
    /// Create an empty cache
    pub fn new(timeout_ms: f64) -> Self {
        Self {
            timeout_ms: timeout_ms.max(0.0),
            entries: HashMap::new(),
            last_sweep_ms: 0.0,
        }
    }

    /// Suppression window
    pub const fn timeout_ms(&self) -> f64 {
        self.timeout_ms
    }

    /// Change the suppression window; existing entries are kept
    pub fn set_timeout_ms(&mut self, timeout_ms: f64) {
        self.timeout_ms = timeout_ms.max(0.0);
    }

    /// Whether the pair was checked within the timeout
    pub fn should_skip(&self, a: Entity, b: Entity, now_ms: f64) -> bool {
        self.entries
            .get(&CollisionPair::new(a, b))
            .is_some_and(|&checked| now_ms - checked < self.timeout_ms)
    }

    /// Record that the pair was checked at `now_ms`
    pub fn record(&mut self, a: Entity, b: Entity, now_ms: f64) {
        self.entries.insert(CollisionPair::new(a, b), now_ms);
    }

    /// Evict entries older than twice the timeout; returns how many were dropped
    pub fn sweep(&mut self, now_ms: f64) -> usize {
        let before = self.entries.len();
        let horizon = self.timeout_ms * 2.0;
        self.entries.retain(|_, checked| now_ms - *checked <= horizon);
        self.last_sweep_ms = now_ms;
        before - self.entries.len()
    }

    /// Sweep only if `interval_ms` has passed since the last sweep
    pub fn maybe_sweep(&mut self, now_ms: f64, interval_ms: f64) -> Option<usize> {
        if now_ms - self.last_sweep_ms >= interval_ms {
            Some(self.sweep(now_ms))
        } else {
            None
        }
    }

    /// Drop every entry involving an entity
    pub fn forget(&mut self, entity: Entity) {
        self.entries.retain(|pair, _| !pair.involves(entity));
    }

    /// Number of cached pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no pairs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
