//! Entity and scene types
//!
//! Defines the entity identifier, the scene access contract the physics
//! engine consumes, and a minimal in-memory scene implementing it.

pub mod components;
pub mod entity;
pub mod scene;
pub mod world;

pub use entity::{Entity, EntityKind};
pub use scene::PhysicsScene;
pub use world::World;
