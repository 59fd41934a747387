//! Spatial hash grid for broad-phase collision detection
//!
//! Entities are bucketed into fixed-size cubic cells keyed by a hash of the
//! integer cell coordinates. The grid is rebuilt wholesale on a throttled
//! interval instead of being updated incrementally, so candidates reflect
//! positions as of the last rebuild.

use crate::ecs::Entity;
use crate::foundation::math::{utils, IVec3, Vec3};
use std::collections::{HashMap, HashSet};

/// Hash multipliers for the three cell axes
const HASH_PRIMES: [i64; 3] = [73_856_093, 19_349_663, 83_492_791];

/// Most cells a ray query walks; longer rays report `None` from [`SpatialHashGrid::query_ray`]
const MAX_RAY_CELLS: usize = 4096;

/// Entity snapshot inserted into the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEntry {
    /// Entity id
    pub entity: Entity,
    /// World position at rebuild time
    pub position: Vec3,
    /// Bounding radius
    pub radius: f32,
}

/// Hash key of a cell's integer coordinates
///
/// Distinct cells may share a key; that only adds false candidates, which
/// the narrow phase rejects.
pub fn cell_key(cell: IVec3) -> i64 {
    i64::from(cell.x).wrapping_mul(HASH_PRIMES[0])
        ^ i64::from(cell.y).wrapping_mul(HASH_PRIMES[1])
        ^ i64::from(cell.z).wrapping_mul(HASH_PRIMES[2])
}

/// Uniform spatial hash grid
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    cell_size: f32,
    cells: HashMap<i64, Vec<Entity>>,
    entity_count: usize,
    last_rebuild_ms: Option<f64>,
}

impl SpatialHashGrid {
    /// Create an empty grid; non-positive sizes fall back to one voxel
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: Self::sanitize_cell_size(cell_size),
            cells: HashMap::new(),
            entity_count: 0,
            last_rebuild_ms: None,
        }
    }

    fn sanitize_cell_size(cell_size: f32) -> f32 {
        if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        }
    }

    /// Edge length of a cell
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Change the cell size; the grid is cleared and must be rebuilt
    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.cell_size = Self::sanitize_cell_size(cell_size);
        self.clear();
    }

    /// Integer coordinates of the cell containing a point
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        utils::voxel_of(position / self.cell_size)
    }

    /// Whether the grid is due for a rebuild at `now_ms`
    pub fn needs_rebuild(&self, now_ms: f64, interval_ms: f64) -> bool {
        self.last_rebuild_ms
            .map_or(true, |last| now_ms - last >= interval_ms)
    }

    /// Time of the last rebuild, if any
    pub const fn last_rebuild_ms(&self) -> Option<f64> {
        self.last_rebuild_ms
    }

    /// Clear and repopulate the grid
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = GridEntry>, now_ms: f64) {
        self.cells.clear();
        self.entity_count = 0;
        for entry in entries {
            self.insert(entry);
        }
        self.last_rebuild_ms = Some(now_ms);
    }

    /// Insert one entity
    ///
    /// Entities wider than half a cell are also inserted into the six
    /// axis-adjacent cells so boundary overlaps are not missed.
    pub fn insert(&mut self, entry: GridEntry) {
        if !utils::is_finite(&entry.position) {
            log::warn!("Skipping {:?} in spatial grid: non-finite position", entry.entity);
            return;
        }
        let cell = self.cell_of(entry.position);
        self.push(cell, entry.entity);

        if entry.radius > self.cell_size * 0.5 {
            for offset in [
                IVec3::new(1, 0, 0),
                IVec3::new(-1, 0, 0),
                IVec3::new(0, 1, 0),
                IVec3::new(0, -1, 0),
                IVec3::new(0, 0, 1),
                IVec3::new(0, 0, -1),
            ] {
                self.push(cell + offset, entry.entity);
            }
        }
        self.entity_count += 1;
    }

    fn push(&mut self, cell: IVec3, entity: Entity) {
        self.cells.entry(cell_key(cell)).or_default().push(entity);
    }

    /// Remove everything and forget the rebuild time
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_count = 0;
        self.last_rebuild_ms = None;
    }

    /// Number of entities inserted since the last rebuild
    pub const fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if no entity is indexed
    pub const fn is_empty(&self) -> bool {
        self.entity_count == 0
    }

    /// Candidates around a position: its cell plus the 26 neighbours
    pub fn query_nearby(&self, position: Vec3) -> Vec<Entity> {
        let center = self.cell_of(position);
        let mut keys = HashSet::with_capacity(27);
        Self::collect_neighbourhood(center, &mut keys);
        self.entities_in(&keys)
    }

    /// Candidates along a ray, walking grid cells with a DDA
    ///
    /// Each visited cell contributes its full 3x3x3 neighbourhood so bodies
    /// centred in an adjacent cell but reaching across the ray are included.
    /// Returns `None` when the ray crosses more than `MAX_RAY_CELLS` cells;
    /// the caller has to consider every entity instead.
    pub fn query_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec<Entity>> {
        let direction = utils::normalize_or_up(direction);
        let size = self.cell_size;

        // Upper bound on boundary crossings within `max_distance`
        let crossings: f32 = (0..3)
            .map(|axis| (direction[axis].abs() * max_distance.max(0.0) / size).ceil() + 1.0)
            .sum();
        if !crossings.is_finite() || crossings >= MAX_RAY_CELLS as f32 {
            return None;
        }
        let budget = crossings as usize + 1;

        let mut cell = self.cell_of(origin);
        let mut keys = HashSet::new();
        let mut step = [0i32; 3];
        let mut t_max = [0f32; 3];
        let mut t_delta = [0f32; 3];
        for axis in 0..3 {
            let d = utils::safe_direction_component(direction[axis]);
            step[axis] = if d > 0.0 { 1 } else { -1 };
            let boundary = if d > 0.0 {
                (cell[axis] + 1) as f32 * size
            } else {
                cell[axis] as f32 * size
            };
            t_max[axis] = (boundary - origin[axis]) / d;
            t_delta[axis] = size / d.abs();
        }

        let mut travelled = 0.0f32;
        for _ in 0..budget {
            Self::collect_neighbourhood(cell, &mut keys);
            if travelled > max_distance {
                break;
            }
            let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };
            travelled = t_max[axis];
            t_max[axis] += t_delta[axis];
            cell[axis] += step[axis];
        }
        Some(self.entities_in(&keys))
    }

    fn collect_neighbourhood(center: IVec3, keys: &mut HashSet<i64>) {
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    keys.insert(cell_key(center + IVec3::new(x, y, z)));
                }
            }
        }
    }

    fn entities_in(&self, keys: &HashSet<i64>) -> Vec<Entity> {
        let mut found: Vec<Entity> = keys
            .iter()
            .filter_map(|key| self.cells.get(key))
            .flatten()
            .copied()
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }
}
