//! Physics body component for entities that move and collide
//!
//! Bodies are approximated by a sphere of `radius` for entity-vs-entity
//! tests and by a column of `radius` x `height` standing on the entity's
//! position for terrain tests.

use crate::foundation::math::Vec3;
use crate::physics::collision_layers::CollisionLayers;

/// Component for entities simulated by the physics engine
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    /// Linear velocity in units per second
    pub velocity: Vec3,

    /// Sphere approximation radius
    pub radius: f32,

    /// Vertical extent above the entity's position, used for terrain checks
    pub height: f32,

    /// Whether gravity accelerates this body
    pub has_gravity: bool,

    /// Whether this body takes part in collision resolution
    pub has_collision: bool,

    /// Layer this body is on
    pub layer: CollisionLayers,

    /// Layers this body collides with
    pub mask: CollisionLayers,
}

impl PhysicsBody {
    /// Create a body with the given radius and default settings
    ///
    /// Defaults: gravity and collision enabled, height equal to the diameter,
    /// on the `DEBRIS` layer colliding with everything.
    pub fn new(radius: f32) -> Self {
        let radius = radius.max(0.0);
        Self {
            velocity: Vec3::zeros(),
            radius,
            height: radius * 2.0,
            has_gravity: true,
            has_collision: true,
            layer: CollisionLayers::DEBRIS,
            mask: CollisionLayers::ALL,
        }
    }

    /// Set the terrain height
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height.max(0.0);
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Disable gravity
    pub fn without_gravity(mut self) -> Self {
        self.has_gravity = false;
        self
    }

    /// Disable collision resolution
    pub fn without_collision(mut self) -> Self {
        self.has_collision = false;
        self
    }

    /// Set layer and mask
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Configure as a trigger volume body: static, collidable, `TRIGGER` layer
    pub fn as_trigger(mut self) -> Self {
        self.has_gravity = false;
        self.has_collision = true;
        self.velocity = Vec3::zeros();
        self.layer = CollisionLayers::TRIGGER;
        self.mask = CollisionLayers::ALL;
        self
    }

    /// Set velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Add to velocity
    pub fn add_velocity(&mut self, delta_velocity: Vec3) {
        self.velocity += delta_velocity;
    }

    /// Stop all movement
    pub fn stop(&mut self) {
        self.velocity = Vec3::zeros();
    }

    /// Current speed
    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }

    /// Whether the body can take part in collision tests
    ///
    /// A collision-enabled body with a non-positive radius is treated as
    /// non-collidable rather than rejected.
    pub fn is_collidable(&self) -> bool {
        self.has_collision && self.radius > 0.0
    }

    /// Whether this body is a trigger (events only, no physical response)
    pub fn is_trigger(&self) -> bool {
        self.layer.contains(CollisionLayers::TRIGGER)
    }
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_body_creation() {
        let body = PhysicsBody::new(0.4);

        assert_eq!(body.velocity, Vec3::zeros());
        assert_eq!(body.height, 0.8);
        assert!(body.has_gravity);
        assert!(body.is_collidable());
        assert!(!body.is_trigger());
    }

    #[test]
    fn test_velocity_operations() {
        let mut body = PhysicsBody::default();

        body.set_velocity(Vec3::new(1.0, 2.0, 3.0));
        body.add_velocity(Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(body.velocity, Vec3::new(1.5, 2.5, 3.5));

        body.stop();
        assert_eq!(body.speed(), 0.0);
    }

    #[test]
    fn test_zero_radius_is_not_collidable() {
        let body = PhysicsBody::new(0.0);
        assert!(body.has_collision);
        assert!(!body.is_collidable());
    }

    #[test]
    fn test_trigger_builder() {
        let body = PhysicsBody::new(1.0).with_velocity(Vec3::new(1.0, 0.0, 0.0)).as_trigger();
        assert!(body.is_trigger());
        assert!(!body.has_gravity);
        assert_eq!(body.velocity, Vec3::zeros());
    }
}
