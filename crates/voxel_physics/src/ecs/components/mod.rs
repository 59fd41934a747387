//! ECS Components module
//!
//! Data carried per entity by the in-memory scene

pub mod physics_body;
pub mod transform;

pub use physics_body::PhysicsBody;
pub use transform::TransformComponent;
