//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// Keys are generational, so a removed entity's id is never handed out
    /// again while stale references exist. Keys are totally ordered, which
    /// the collision pair cache relies on to canonicalize pairs.
    pub struct Entity;
}

/// Classification resolved once when an entity is created
///
/// Replaces per-tick "does this object look like a player" inspection with
/// an explicit tag the physics code can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityKind {
    /// Ordinary simulated object
    #[default]
    Prop,
    /// Player-controlled character
    Player,
    /// Non-player character
    Npc,
    /// Spawn point marker; never takes part in entity-vs-entity collision
    SpawnMarker,
    /// Trigger volume
    Trigger,
}

impl EntityKind {
    /// Whether entities of this kind may collide with other entities
    pub const fn collides_with_entities(self) -> bool {
        !matches!(self, Self::SpawnMarker)
    }
}
