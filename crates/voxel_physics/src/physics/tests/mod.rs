//! Whole-engine scenario tests

mod trigger_scenarios;

use crate::ecs::components::PhysicsBody;
use crate::ecs::{Entity, PhysicsScene, World};
use crate::foundation::math::Vec3;
use crate::physics::{PhysicsConfig, PhysicsEngine};

/// Route `log` output through the test harness
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Engine without air resistance so velocities stay exact across ticks
fn frictionless_engine() -> PhysicsEngine {
    let config = PhysicsConfig { air_resistance: 0.0, ..PhysicsConfig::default() };
    PhysicsEngine::new(config).expect("default-derived config is valid")
}

fn spawn(engine: &mut PhysicsEngine, world: &mut World, position: Vec3, body: PhysicsBody) -> Entity {
    let entity = world.create_entity_at(position);
    engine.configure_entity(world, entity, body);
    entity
}

fn position_of(world: &World, entity: Entity) -> Vec3 {
    world.world_position(entity).expect("entity is alive")
}
