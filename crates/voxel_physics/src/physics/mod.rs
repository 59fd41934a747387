//! Physics module for collision detection and response
//!
//! Kinematics, entity and terrain collision resolution, ray casting and
//! trigger volumes, driven by [`PhysicsEngine`].

pub mod collision;
pub mod collision_layers;
pub mod engine;
pub mod error;
pub mod events;
pub mod kinematics;
pub mod narrow_phase;
pub mod raycast;
pub mod settings;
pub mod stats;
pub mod terrain_collision;
pub mod trigger;

#[cfg(test)]
mod tests;

pub use collision::{BoundingSphere, CollisionEvent, CollisionKind, Ray};
pub use collision_layers::CollisionLayers;
pub use engine::PhysicsEngine;
pub use error::PhysicsError;
pub use events::{CollisionCallback, CollisionDispatcher, ListenerId};
pub use raycast::{RaycastOptions, RaycastResult};
pub use settings::{PhysicsConfig, QualitySettings, QualityTier};
pub use stats::PhysicsStats;
pub use trigger::{TriggerCallback, TriggerEvent, TriggerShape, TriggerVolume};
