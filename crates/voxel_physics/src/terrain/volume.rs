//! Voxel volume contract and a dense in-memory implementation

use crate::foundation::math::{utils, IVec3, Vec3};

/// Raw voxel value as stored by the terrain
pub type VoxelValue = u16;

/// Read-only view of the voxel terrain consumed by the physics engine
///
/// Terrain storage and streaming live outside the engine; it only needs
/// occupancy tests, raw samples for ray hit reporting, and the extents.
pub trait VoxelVolume {
    /// Whether the terrain has finished loading
    ///
    /// Gravity and terrain collision stay disabled until this reports `true`.
    fn is_ready(&self) -> bool;

    /// Volume extents in voxels along X, Y and Z
    fn size(&self) -> [i32; 3];

    /// Value stored in empty voxels
    fn empty_value(&self) -> VoxelValue;

    /// Raw value of the voxel at integer coordinates; empty outside the volume
    fn sample_voxel(&self, x: i32, y: i32, z: i32) -> VoxelValue;

    /// Occupancy test for a world-space point (floor rounding per axis)
    fn is_solid_at(&self, x: f32, y: f32, z: f32) -> bool {
        let voxel = utils::voxel_of(Vec3::new(x, y, z));
        self.is_solid_voxel(voxel)
    }

    /// Occupancy test for integer voxel coordinates
    fn is_solid_voxel(&self, voxel: IVec3) -> bool {
        self.sample_voxel(voxel.x, voxel.y, voxel.z) != self.empty_value()
    }

    /// Whether integer voxel coordinates lie inside the volume
    fn contains_voxel(&self, voxel: IVec3) -> bool {
        let [sx, sy, sz] = self.size();
        (0..sx).contains(&voxel.x) && (0..sy).contains(&voxel.y) && (0..sz).contains(&voxel.z)
    }
}

/// Dense voxel grid stored as a flat X-major array
#[derive(Debug, Clone)]
pub struct DenseVolume {
    size: [i32; 3],
    voxels: Vec<VoxelValue>,
    empty: VoxelValue,
    ready: bool,
}

impl DenseVolume {
    /// Create an empty, not-yet-ready volume using 0 as the empty value
    pub fn new(size_x: usize, size_y: usize, size_z: usize) -> Self {
        Self::with_empty_value(size_x, size_y, size_z, 0)
    }

    /// Create an empty volume with a custom empty sentinel
    pub fn with_empty_value(size_x: usize, size_y: usize, size_z: usize, empty: VoxelValue) -> Self {
        let clamp = |s: usize| i32::try_from(s).unwrap_or(i32::MAX);
        Self {
            size: [clamp(size_x), clamp(size_y), clamp(size_z)],
            voxels: vec![empty; size_x * size_y * size_z],
            empty,
            ready: false,
        }
    }

    /// Mark the volume as fully loaded (or not)
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Set a single voxel; out-of-range coordinates are ignored
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, value: VoxelValue) {
        if let Some(index) = self.index(x, y, z) {
            self.voxels[index] = value;
        }
    }

    /// Fill the inclusive box `min..=max` with a value
    pub fn fill_box(&mut self, min: [i32; 3], max: [i32; 3], value: VoxelValue) {
        for x in min[0]..=max[0] {
            for y in min[1]..=max[1] {
                for z in min[2]..=max[2] {
                    self.set_voxel(x, y, z, value);
                }
            }
        }
    }

    /// Reset every voxel to empty
    pub fn clear(&mut self) {
        self.voxels.fill(self.empty);
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.contains_voxel(IVec3::new(x, y, z)) {
            return None;
        }
        let [sx, sy, _] = self.size;
        usize::try_from(x + sx * (y + sy * z)).ok()
    }
}

impl VoxelVolume for DenseVolume {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn size(&self) -> [i32; 3] {
        self.size
    }

    fn empty_value(&self) -> VoxelValue {
        self.empty
    }

    fn sample_voxel(&self, x: i32, y: i32, z: i32) -> VoxelValue {
        self.index(x, y, z).map_or(self.empty, |i| self.voxels[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_volume_is_empty_and_not_ready() {
        let volume = DenseVolume::new(4, 4, 4);
        assert!(!volume.is_ready());
        assert!(!volume.is_solid_at(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_set_and_sample_voxel() {
        let mut volume = DenseVolume::new(4, 4, 4);
        volume.set_voxel(1, 2, 3, 7);
        assert_eq!(volume.sample_voxel(1, 2, 3), 7);
        assert!(volume.is_solid_at(1.0, 2.999, 3.5));
        assert!(!volume.is_solid_at(1.0, 3.0, 3.5));
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let mut volume = DenseVolume::new(2, 2, 2);
        volume.fill_box([0, 0, 0], [1, 1, 1], 1);
        volume.set_voxel(5, 0, 0, 9);
        assert_eq!(volume.sample_voxel(-1, 0, 0), 0);
        assert!(!volume.is_solid_at(-0.1, 0.5, 0.5));
        assert!(volume.is_solid_at(0.0, 0.5, 0.5));
    }

    #[test]
    fn test_custom_empty_value() {
        let mut volume = DenseVolume::with_empty_value(2, 2, 2, 255);
        assert!(!volume.is_solid_voxel(IVec3::new(0, 0, 0)));
        volume.set_voxel(0, 0, 0, 0);
        assert!(volume.is_solid_voxel(IVec3::new(0, 0, 0)));
        volume.clear();
        assert_eq!(volume.sample_voxel(0, 0, 0), 255);
    }
}
