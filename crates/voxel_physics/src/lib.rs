//! # Voxel Physics
//!
//! Real-time collision and rigid-motion engine for voxel worlds.
//!
//! ## Features
//!
//! - **Kinematics**: Gravity, ground friction, air resistance and velocity clamping
//! - **Broad Phase**: Spatial hash grid rebuilt on a throttled interval
//! - **Narrow Phase**: Sphere-sphere separation with restitution impulses
//! - **Terrain Collision**: Per-axis voxel boundary correction and bounce
//! - **Ray Casting**: Voxel DDA traversal merged with entity sphere hits
//! - **Trigger Volumes**: Box, sphere and cylinder volumes with enter/stay/exit callbacks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voxel_physics::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let mut engine = PhysicsEngine::new(PhysicsConfig::default())?;
//!     let mut world = World::new();
//!     let mut terrain = DenseVolume::new(32, 32, 32);
//!     terrain.fill_box([0, 0, 0], [31, 0, 31], 1);
//!     terrain.set_ready(true);
//!
//!     let player = world.create_entity_at(Vec3::new(16.0, 4.0, 16.0));
//!     engine.configure_entity(&mut world, player, PhysicsBody::new(0.4).with_height(1.8));
//!
//!     for _ in 0..60 {
//!         engine.update(&mut world, Some(&terrain), 16.0);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod spatial;
pub mod terrain;

pub use physics::{PhysicsEngine, PhysicsError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        ecs::{
            components::{PhysicsBody, TransformComponent},
            Entity, EntityKind, PhysicsScene, World,
        },
        foundation::math::Vec3,
        physics::{
            CollisionEvent, CollisionKind, CollisionLayers, ListenerId, PhysicsConfig,
            PhysicsEngine, PhysicsError, PhysicsStats, QualityTier, RaycastOptions,
            RaycastResult, TriggerEvent, TriggerShape,
        },
        terrain::{DenseVolume, TerrainQuery, VoxelValue, VoxelVolume},
    };
}
