//! Kinematics stage: gravity, damping, speed clamp and integration
//!
//! These functions operate on a single body and know nothing about the scene;
//! the engine decides grounding and whether gravity is active.

use super::settings::PhysicsConfig;
use crate::ecs::components::PhysicsBody;
use crate::foundation::math::{utils, Vec3};

/// Per-body facts the engine resolves before stepping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepContext {
    /// Terrain directly below the base
    pub grounded: bool,
    /// Gravity applies: body has gravity, is not exempt, and terrain is ready
    pub gravity_active: bool,
}

/// Apply gravity to the vertical component
///
/// Airborne bodies accelerate downward. Grounded bodies only lose downward
/// velocity; upward velocity (a jump) is preserved.
pub fn apply_gravity(velocity: &mut Vec3, gravity: f32, grounded: bool, dt: f32) {
    if grounded {
        if velocity.y < 0.0 {
            velocity.y = 0.0;
        }
    } else {
        velocity.y -= gravity * dt;
    }
}

/// Damp velocity by a per-second resistance coefficient
///
/// Negligible speeds are zeroed first; a damping factor of one or more stops
/// the body instead of reversing it.
pub fn apply_resistance(velocity: &mut Vec3, resistance: f32, config: &PhysicsConfig, dt: f32) {
    if velocity.magnitude() < config.velocity_epsilon {
        *velocity = Vec3::zeros();
        return;
    }

    let factor = resistance * dt;
    if factor >= 1.0 {
        *velocity = Vec3::zeros();
        return;
    }
    *velocity *= 1.0 - factor;

    if velocity.magnitude() < config.jitter_threshold {
        *velocity = Vec3::zeros();
    }
}

/// Rescale velocity down to `max_speed` if it exceeds it
pub fn clamp_velocity(velocity: &mut Vec3, max_speed: f32) {
    let speed = velocity.magnitude();
    if speed > max_speed && speed > 0.0 {
        *velocity *= max_speed / speed;
    }
}

/// Run one kinematics step and return the new position
///
/// Non-finite velocities are discarded rather than propagated into the
/// position.
pub fn integrate(
    body: &mut PhysicsBody,
    position: Vec3,
    context: StepContext,
    config: &PhysicsConfig,
    dt: f32,
) -> Vec3 {
    if !utils::is_finite(&body.velocity) {
        log::warn!("Discarding non-finite velocity {:?}", body.velocity);
        body.velocity = Vec3::zeros();
        return position;
    }

    if context.gravity_active {
        apply_gravity(&mut body.velocity, config.gravity, context.grounded, dt);
    }

    let resistance = if context.grounded {
        config.ground_friction
    } else {
        config.air_resistance
    };
    apply_resistance(&mut body.velocity, resistance, config, dt);
    clamp_velocity(&mut body.velocity, config.max_velocity);

    position + body.velocity * dt
}
