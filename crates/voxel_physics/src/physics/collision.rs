//! Collision primitives and event records
//!
//! Entities are approximated by bounding spheres for entity-vs-entity tests
//! and ray picking. Every resolved contact produces a [`CollisionEvent`].

use crate::ecs::Entity;
use crate::foundation::math::{utils, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized, world up for zero input)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: utils::normalize_or_up(direction),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Centre in world space
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a new bounding sphere
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Overlap test; compares squared distances so no root is taken
    pub fn intersects(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).magnitude_squared() < reach * reach
    }

    /// Depth of overlap, zero when separated
    pub fn penetration_depth(&self, other: &Self) -> f32 {
        let distance = (other.center - self.center).magnitude();
        (self.radius + other.radius - distance).max(0.0)
    }

    /// Distance along the ray to the first surface crossing, if within `max_distance`
    ///
    /// Spheres whose centre projects behind the origin or beyond
    /// `max_distance` are rejected outright. A ray starting inside the sphere
    /// reports distance zero.
    pub fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<f32> {
        let to_center = self.center - ray.origin;
        let projection = to_center.dot(&ray.direction);
        if projection < 0.0 || projection > max_distance {
            return None;
        }

        let perpendicular_sq = to_center.magnitude_squared() - projection * projection;
        let radius_sq = self.radius * self.radius;
        if perpendicular_sq > radius_sq {
            return None;
        }

        let half_chord = (radius_sq - perpendicular_sq).max(0.0).sqrt();
        let distance = (projection - half_chord).max(0.0);
        (distance <= max_distance).then_some(distance)
    }
}

/// What a body collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// Another entity
    Entity,
    /// Voxel terrain
    Terrain,
}

/// Record of a single resolved contact, from one entity's point of view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// Entity or terrain contact
    pub kind: CollisionKind,
    /// Entity the event is about
    pub entity: Entity,
    /// Other entity for entity contacts
    pub other: Option<Entity>,
    /// World-space contact point
    pub position: Vec3,
    /// Surface normal pointing away from the obstacle, towards `entity`
    pub normal: Vec3,
    /// Velocity of `entity` before resolution
    pub velocity: Vec3,
    /// Impact magnitude
    pub force: f32,
}

impl CollisionEvent {
    /// Event for a contact between two entities
    pub const fn with_entity(
        entity: Entity,
        other: Entity,
        position: Vec3,
        normal: Vec3,
        velocity: Vec3,
        force: f32,
    ) -> Self {
        Self {
            kind: CollisionKind::Entity,
            entity,
            other: Some(other),
            position,
            normal,
            velocity,
            force,
        }
    }

    /// Event for a terrain contact
    pub const fn with_terrain(
        entity: Entity,
        position: Vec3,
        normal: Vec3,
        velocity: Vec3,
        force: f32,
    ) -> Self {
        Self {
            kind: CollisionKind::Terrain,
            entity,
            other: None,
            position,
            normal,
            velocity,
            force,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(ray.direction.magnitude(), 1.0);
        assert_relative_eq!(ray.point_at(5.0), Vec3::new(3.0, 0.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_ray_hit_distance() {
        let sphere = BoundingSphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(sphere.intersect_ray(&ray, 100.0).unwrap(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_behind_or_beyond_ray() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        let behind = BoundingSphere::new(Vec3::new(-5.0, 0.0, 0.0), 1.0);
        let beyond = BoundingSphere::new(Vec3::new(50.0, 0.0, 0.0), 1.0);
        let beside = BoundingSphere::new(Vec3::new(5.0, 2.0, 0.0), 1.0);
        assert!(behind.intersect_ray(&ray, 100.0).is_none());
        assert!(beyond.intersect_ray(&ray, 10.0).is_none());
        assert!(beside.intersect_ray(&ray, 100.0).is_none());
    }

    #[test]
    fn test_sphere_overlap() {
        let a = BoundingSphere::new(Vec3::zeros(), 0.5);
        let b = BoundingSphere::new(Vec3::new(0.6, 0.0, 0.0), 0.5);
        let c = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 0.5);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_relative_eq!(a.penetration_depth(&b), 0.4, epsilon = 1e-6);
        assert_eq!(a.penetration_depth(&c), 0.0);
    }
}
