//! Entity narrow phase: pair filtering and sphere-sphere resolution
//!
//! Resolution is pairwise and order dependent. The entity currently being
//! processed is pushed out by the full penetration while the other stays
//! put; there is no global contact solver.

use super::collision::{BoundingSphere, CollisionEvent};
use super::collision_layers::CollisionLayers;
use crate::ecs::{Entity, PhysicsScene};
use crate::foundation::math::{up, utils, Vec3};

/// Snapshot of one side of a pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereState {
    /// Entity id
    pub entity: Entity,
    /// World-space centre
    pub position: Vec3,
    /// Sphere radius
    pub radius: f32,
    /// Velocity before resolution
    pub velocity: Vec3,
}

impl SphereState {
    /// Bounding sphere of this state
    pub const fn sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.position, self.radius)
    }
}

/// Outcome of resolving an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit separation normal pointing from `a` towards `b`
    pub normal: Vec3,
    /// Overlap depth before correction
    pub penetration: f32,
    /// Approach speed along the normal, negative when separating
    pub closing_speed: f32,
    /// Corrected centre of `a`
    pub position_a: Vec3,
    /// Velocity of `a` after the bounce impulse
    pub velocity_a: Vec3,
    /// Velocity of `b` after the bounce impulse
    pub velocity_b: Vec3,
}

impl Contact {
    /// One event per entity, each with its own outward normal and velocity snapshot
    pub fn events(&self, a: &SphereState, b: &SphereState) -> [CollisionEvent; 2] {
        let force = self.closing_speed.max(0.0);
        [
            CollisionEvent::with_entity(
                a.entity,
                b.entity,
                a.position + self.normal * a.radius,
                -self.normal,
                a.velocity,
                force,
            ),
            CollisionEvent::with_entity(
                b.entity,
                a.entity,
                b.position - self.normal * b.radius,
                self.normal,
                b.velocity,
                force,
            ),
        ]
    }
}

/// Whether a candidate pair should reach the sphere test
///
/// Rejects self pairs, parent/child pairs, bodies without collision,
/// spawn markers, incompatible layers and exempt (free-fly) entities. The
/// pair cache is checked separately by the engine.
pub fn should_test_pair(scene: &dyn PhysicsScene, a: Entity, b: Entity) -> bool {
    if a == b || scene.is_parent_or_child(a, b) {
        return false;
    }
    if !scene.kind(a).collides_with_entities() || !scene.kind(b).collides_with_entities() {
        return false;
    }
    if scene.is_exempt(a) || scene.is_exempt(b) {
        return false;
    }
    let (Some(body_a), Some(body_b)) = (scene.body(a), scene.body(b)) else {
        return false;
    };
    body_a.is_collidable()
        && body_b.is_collidable()
        && CollisionLayers::should_collide(body_a.layer, body_a.mask, body_b.layer, body_b.mask)
}

/// Detect and resolve overlap between two spheres
///
/// Returns `None` when the spheres do not overlap, so re-running on a
/// separated pair changes nothing. With `physical_response` off (trigger
/// pairs) the contact reports positions and velocities unchanged.
pub fn resolve_sphere_pair(
    a: &SphereState,
    b: &SphereState,
    restitution: f32,
    physical_response: bool,
) -> Option<Contact> {
    if !a.sphere().intersects(&b.sphere()) {
        return None;
    }

    let offset = b.position - a.position;
    let distance = offset.magnitude();
    let normal = utils::normalize_or(offset, up());
    let penetration = a.radius + b.radius - distance;
    let closing_speed = (a.velocity - b.velocity).dot(&normal);

    let mut contact = Contact {
        normal,
        penetration,
        closing_speed,
        position_a: a.position,
        velocity_a: a.velocity,
        velocity_b: b.velocity,
    };

    if physical_response {
        contact.position_a = a.position - normal * penetration;
        if closing_speed > 0.0 {
            let impulse = (1.0 + restitution) * closing_speed * 0.5;
            contact.velocity_a -= normal * impulse;
            contact.velocity_b += normal * impulse;
        }
    }

    log::trace!(
        "Contact {:?} <-> {:?}: depth {:.4}, closing {:.4}",
        a.entity,
        b.entity,
        penetration,
        closing_speed
    );
    Some(contact)
}
