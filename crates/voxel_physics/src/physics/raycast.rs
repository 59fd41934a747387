//! Ray casting against voxel terrain and entity spheres
//!
//! Terrain is traversed with a 3D DDA: the ray steps one voxel at a time
//! along whichever axis reaches its next voxel boundary first. Entities are
//! tested as spheres. The nearer of the two hits wins.

use super::collision::{BoundingSphere, Ray};
use super::collision_layers::CollisionLayers;
use crate::ecs::{Entity, PhysicsScene};
use crate::foundation::math::{constants, utils, IVec3, Vec3};
use crate::terrain::{VoxelValue, VoxelVolume};

/// Ray cast parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastOptions {
    /// Maximum ray length; the engine default is used when `None`
    pub max_distance: Option<f32>,
    /// Skip the terrain traversal
    pub ignore_terrain: bool,
    /// Skip entity spheres
    pub ignore_entities: bool,
    /// Entity never reported as a hit (usually the caster)
    pub exclude: Option<Entity>,
    /// Only entities on one of these layers can be hit
    pub layer_mask: CollisionLayers,
    /// Report trigger volumes; they are invisible to rays by default
    pub include_triggers: bool,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            max_distance: None,
            ignore_terrain: false,
            ignore_entities: false,
            exclude: None,
            layer_mask: CollisionLayers::ALL,
            include_triggers: false,
        }
    }
}

impl RaycastOptions {
    /// Options hitting everything up to the default distance
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum distance
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    /// Skip terrain
    pub fn ignoring_terrain(mut self) -> Self {
        self.ignore_terrain = true;
        self
    }

    /// Skip entities
    pub fn ignoring_entities(mut self) -> Self {
        self.ignore_entities = true;
        self
    }

    /// Never report this entity
    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Restrict entity hits to these layers
    pub fn with_layer_mask(mut self, mask: CollisionLayers) -> Self {
        self.layer_mask = mask;
        self
    }

    /// Let trigger volumes be hit (still subject to the layer mask)
    pub fn including_triggers(mut self) -> Self {
        self.include_triggers = true;
        self
    }
}

/// Outcome of a ray cast
///
/// A miss still carries a position and distance: the end of the ray at
/// `max_distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
    /// Whether anything was hit
    pub hit: bool,
    /// Hit point, or the ray end on a miss
    pub position: Vec3,
    /// Surface normal at the hit, zero on a miss
    pub normal: Vec3,
    /// Distance from the origin
    pub distance: f32,
    /// Entity hit, if any
    pub entity: Option<Entity>,
    /// Raw voxel value for terrain hits
    pub voxel_value: Option<VoxelValue>,
}

impl RaycastResult {
    /// A miss at the full ray length
    pub fn miss(ray: &Ray, max_distance: f32) -> Self {
        Self {
            hit: false,
            position: ray.point_at(max_distance),
            normal: Vec3::zeros(),
            distance: max_distance,
            entity: None,
            voxel_value: None,
        }
    }
}

/// First solid voxel along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainHit {
    /// Integer coordinates of the voxel
    pub voxel: IVec3,
    /// Raw voxel value
    pub value: VoxelValue,
    /// Entry point on the voxel face
    pub position: Vec3,
    /// Face normal, opposite to the step direction
    pub normal: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Nearest entity sphere along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityHit {
    /// Entity hit
    pub entity: Entity,
    /// Surface point
    pub position: Vec3,
    /// Sphere normal at the surface point
    pub normal: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Walk the voxel grid from the origin's voxel until a solid voxel is entered
///
/// The voxel containing the origin is not tested, so a ray starting inside
/// terrain reports the next solid voxel it steps into. A ray starting
/// outside is first clipped to the volume's bounds and the voxel it enters
/// through is tested. Ties between axes go to X, then Y, then Z. The walk
/// ends with `None` past `max_distance` or once the ray is outside the
/// volume and moving further away.
pub fn cast_terrain(volume: &dyn VoxelVolume, ray: &Ray, max_distance: f32) -> Option<TerrainHit> {
    let size = volume.size();
    if size.iter().any(|&extent| extent <= 0) {
        return None;
    }

    let (entry, entry_axis) = clip_to_bounds(ray, size)?;
    if entry > max_distance {
        return None;
    }

    let start = ray.point_at(entry);
    let mut voxel = utils::voxel_of(start);
    let mut step = [0i32; 3];
    let mut t_max = [0f32; 3];
    let mut t_delta = [0f32; 3];

    for axis in 0..3 {
        let d = utils::safe_direction_component(ray.direction[axis]);
        step[axis] = if d > 0.0 { 1 } else { -1 };
        if entry_axis.is_some() {
            // The entry point sits on the boundary; rounding may land one voxel outside
            voxel[axis] = voxel[axis].clamp(0, size[axis] - 1);
        }
        let boundary = if d > 0.0 {
            (voxel[axis] + 1) as f32
        } else {
            voxel[axis] as f32
        };
        t_max[axis] = entry + (boundary - start[axis]) / d;
        t_delta[axis] = 1.0 / d.abs();
    }

    if let Some(axis) = entry_axis {
        if volume.is_solid_voxel(voxel) {
            return Some(terrain_hit(volume, ray, voxel, axis, step[axis], entry));
        }
    }

    loop {
        let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
            0
        } else if t_max[1] <= t_max[2] {
            1
        } else {
            2
        };

        let distance = t_max[axis];
        if !distance.is_finite() || distance > max_distance {
            return None;
        }
        voxel[axis] += step[axis];
        t_max[axis] += t_delta[axis];

        if volume.contains_voxel(voxel) {
            if volume.is_solid_voxel(voxel) {
                return Some(terrain_hit(volume, ray, voxel, axis, step[axis], distance));
            }
        } else if moving_away(voxel, step, size) {
            return None;
        }
    }
}

/// Distance at which the ray enters the volume's bounds
///
/// Returns `(0.0, None)` when the origin is already inside, the entry
/// distance and the axis of the entered face when it starts outside, and
/// `None` when the ray never reaches the volume.
fn clip_to_bounds(ray: &Ray, size: [i32; 3]) -> Option<(f32, Option<usize>)> {
    let mut near = f32::NEG_INFINITY;
    let mut near_axis = 0;
    let mut far = f32::INFINITY;
    for axis in 0..3 {
        let d = ray.direction[axis];
        let extent = size[axis] as f32;
        if d.abs() < constants::DIRECTION_EPSILON {
            // Parallel to this slab
            if ray.origin[axis] < 0.0 || ray.origin[axis] > extent {
                return None;
            }
            continue;
        }
        let a = -ray.origin[axis] / d;
        let b = (extent - ray.origin[axis]) / d;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo > near {
            near = lo;
            near_axis = axis;
        }
        far = far.min(hi);
    }

    if far < near.max(0.0) {
        None
    } else if near <= 0.0 {
        Some((0.0, None))
    } else {
        Some((near, Some(near_axis)))
    }
}

fn terrain_hit(
    volume: &dyn VoxelVolume,
    ray: &Ray,
    voxel: IVec3,
    axis: usize,
    step: i32,
    distance: f32,
) -> TerrainHit {
    let mut normal = Vec3::zeros();
    normal[axis] = -(step as f32);
    TerrainHit {
        voxel,
        value: volume.sample_voxel(voxel.x, voxel.y, voxel.z),
        position: ray.point_at(distance),
        normal,
        distance,
    }
}

/// Whether a voxel outside the volume is on the far side of some axis the ray is leaving along
fn moving_away(voxel: IVec3, step: [i32; 3], size: [i32; 3]) -> bool {
    (0..3).any(|axis| {
        (voxel[axis] < 0 && step[axis] < 0) || (voxel[axis] >= size[axis] && step[axis] > 0)
    })
}

/// Nearest entity sphere hit among `candidates`
///
/// Only collidable top-level bodies on a layer in `options.layer_mask` are
/// considered; `options.exclude` is skipped. Triggers need
/// `options.include_triggers`.
pub fn cast_entities(
    scene: &dyn PhysicsScene,
    candidates: impl IntoIterator<Item = Entity>,
    ray: &Ray,
    max_distance: f32,
    options: &RaycastOptions,
) -> Option<EntityHit> {
    let mut nearest: Option<EntityHit> = None;

    for entity in candidates {
        if options.exclude == Some(entity) || !scene.is_top_level(entity) {
            continue;
        }
        let Some(body) = scene.body(entity) else {
            continue;
        };
        if !body.is_collidable() || !body.layer.intersects(options.layer_mask) {
            continue;
        }
        if body.is_trigger() && !options.include_triggers {
            continue;
        }
        let Some(center) = scene.world_position(entity) else {
            continue;
        };

        let sphere = BoundingSphere::new(center, body.radius);
        let Some(distance) = sphere.intersect_ray(ray, max_distance) else {
            continue;
        };
        if nearest.is_some_and(|hit| hit.distance <= distance) {
            continue;
        }

        let position = ray.point_at(distance);
        nearest = Some(EntityHit {
            entity,
            position,
            normal: utils::normalize_or(position - center, -ray.direction),
            distance,
        });
    }
    nearest
}

/// Merge the terrain and entity sub-results into the final answer
pub fn merge_hits(
    ray: &Ray,
    max_distance: f32,
    terrain: Option<TerrainHit>,
    entity: Option<EntityHit>,
) -> RaycastResult {
    let entity_first = match (&terrain, &entity) {
        (Some(t), Some(e)) => e.distance < t.distance,
        (None, Some(_)) => true,
        _ => false,
    };

    if entity_first {
        if let Some(hit) = entity {
            return RaycastResult {
                hit: true,
                position: hit.position,
                normal: hit.normal,
                distance: hit.distance,
                entity: Some(hit.entity),
                voxel_value: None,
            };
        }
    }

    terrain.map_or_else(
        || RaycastResult::miss(ray, max_distance),
        |hit| RaycastResult {
            hit: true,
            position: hit.position,
            normal: hit.normal,
            distance: hit.distance,
            entity: None,
            voxel_value: Some(hit.value),
        },
    )
}
