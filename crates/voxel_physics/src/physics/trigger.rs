//! Trigger volumes
//!
//! A trigger is a collidable entity on the `TRIGGER` layer that never pushes
//! anything. Entry is detected from collision events naming the trigger;
//! stay and exit are found by re-testing containment once per tick.

use crate::ecs::Entity;
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Containment shape in trigger-local space (centred on the trigger entity)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerShape {
    /// Axis-aligned box
    Box {
        /// Half size along each axis
        half_extents: Vec3,
    },
    /// Sphere
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Upright cylinder
    Cylinder {
        /// Horizontal radius
        radius: f32,
        /// Half of the vertical extent
        half_height: f32,
    },
}

impl TriggerShape {
    /// Whether a trigger-local point lies inside (boundary counts as inside)
    pub fn contains(&self, local: Vec3) -> bool {
        match *self {
            Self::Box { half_extents } => {
                local.x.abs() <= half_extents.x
                    && local.y.abs() <= half_extents.y
                    && local.z.abs() <= half_extents.z
            }
            Self::Sphere { radius } => local.magnitude_squared() <= radius * radius,
            Self::Cylinder { radius, half_height } => {
                local.x * local.x + local.z * local.z <= radius * radius
                    && local.y.abs() <= half_height
            }
        }
    }

    /// Radius of a sphere enclosing the shape, used for the trigger's body
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Self::Box { half_extents } => half_extents.magnitude(),
            Self::Sphere { radius } => radius,
            Self::Cylinder { radius, half_height } => radius.hypot(half_height),
        }
    }
}

/// Trigger callback payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// Entity entered the volume
    Enter(Entity),
    /// Entity is still inside at the end of a tick
    Stay(Entity),
    /// Entity left the volume (or stopped existing)
    Exit(Entity),
}

/// Trigger callback
pub type TriggerCallback = Box<dyn FnMut(TriggerEvent)>;

/// Trigger state owned by the engine
pub struct TriggerVolume {
    shape: TriggerShape,
    inside: BTreeSet<Entity>,
    listener: TriggerCallback,
}

impl TriggerVolume {
    /// Create a trigger with an empty inside-set
    pub fn new(shape: TriggerShape, listener: TriggerCallback) -> Self {
        Self {
            shape,
            inside: BTreeSet::new(),
            listener,
        }
    }

    /// Entities currently inside
    pub fn inside(&self) -> impl Iterator<Item = Entity> + '_ {
        self.inside.iter().copied()
    }

    /// Check if an entity is recorded as inside
    pub fn is_inside(&self, entity: Entity) -> bool {
        self.inside.contains(&entity)
    }

    /// Handle a contact with `other`, whose offset from the trigger is `local`
    ///
    /// Fires enter once, the first time the entity is both touching and
    /// contained. Returns whether enter fired.
    pub fn on_contact(&mut self, other: Entity, local: Vec3) -> bool {
        if self.inside.contains(&other) || !self.shape.contains(local) {
            return false;
        }
        self.inside.insert(other);
        (self.listener)(TriggerEvent::Enter(other));
        true
    }

    /// Re-test every inside entity; `locate` returns its trigger-local offset
    /// or `None` if the entity no longer exists
    ///
    /// Failures are removed and fire exit; the rest fire stay.
    pub fn refresh(&mut self, mut locate: impl FnMut(Entity) -> Option<Vec3>) {
        let inside: Vec<Entity> = self.inside.iter().copied().collect();
        for entity in inside {
            let still_inside = locate(entity).is_some_and(|local| self.shape.contains(local));
            if still_inside {
                (self.listener)(TriggerEvent::Stay(entity));
            } else {
                self.inside.remove(&entity);
                (self.listener)(TriggerEvent::Exit(entity));
            }
        }
    }

    /// Drop an entity from the inside-set without firing exit
    pub fn forget(&mut self, entity: Entity) -> bool {
        self.inside.remove(&entity)
    }
}

impl fmt::Debug for TriggerVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerVolume")
            .field("shape", &self.shape)
            .field("inside", &self.inside)
            .finish_non_exhaustive()
    }
}
