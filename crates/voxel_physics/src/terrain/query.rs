//! Terrain query adapter
//!
//! Wraps an optional [`VoxelVolume`] so callers never branch on presence or
//! readiness themselves: an absent or loading terrain answers every
//! occupancy question with "empty".

use super::volume::VoxelVolume;
use crate::foundation::math::Vec3;

/// Read-only, readiness-gated view over the terrain
#[derive(Clone, Copy)]
pub struct TerrainQuery<'a> {
    volume: Option<&'a dyn VoxelVolume>,
}

impl<'a> TerrainQuery<'a> {
    /// Wrap an optional terrain source
    pub fn new(volume: Option<&'a dyn VoxelVolume>) -> Self {
        Self { volume }
    }

    /// Adapter with no terrain at all
    pub const fn absent() -> Self {
        Self { volume: None }
    }

    /// Whether terrain is present and reports itself fully loaded
    pub fn is_ready(&self) -> bool {
        self.volume.is_some_and(|volume| volume.is_ready())
    }

    /// The underlying volume, only once it is ready
    pub fn ready_volume(&self) -> Option<&'a dyn VoxelVolume> {
        self.volume.filter(|volume| volume.is_ready())
    }

    /// Occupancy test at a world-space point; `false` while not ready
    pub fn is_solid(&self, point: Vec3) -> bool {
        self.ready_volume()
            .is_some_and(|volume| volume.is_solid_at(point.x, point.y, point.z))
    }

    /// Whether a body standing at `base` is supported by terrain within `probe` below it
    pub fn is_grounded(&self, base: Vec3, probe: f32) -> bool {
        self.is_solid(Vec3::new(base.x, base.y - probe, base.z))
    }
}

impl std::fmt::Debug for TerrainQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainQuery")
            .field("present", &self.volume.is_some())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::DenseVolume;

    fn floor_volume(ready: bool) -> DenseVolume {
        let mut volume = DenseVolume::new(8, 8, 8);
        volume.fill_box([0, 0, 0], [7, 0, 7], 1);
        volume.set_ready(ready);
        volume
    }

    #[test]
    fn test_absent_terrain_is_empty() {
        let query = TerrainQuery::absent();
        assert!(!query.is_ready());
        assert!(!query.is_solid(Vec3::new(1.0, 0.5, 1.0)));
    }

    #[test]
    fn test_unready_terrain_is_empty() {
        let volume = floor_volume(false);
        let query = TerrainQuery::new(Some(&volume));
        assert!(!query.is_ready());
        assert!(!query.is_solid(Vec3::new(1.0, 0.5, 1.0)));
    }

    #[test]
    fn test_grounded_on_floor() {
        let volume = floor_volume(true);
        let query = TerrainQuery::new(Some(&volume));
        assert!(query.is_grounded(Vec3::new(2.5, 1.0, 2.5), 0.05));
        assert!(!query.is_grounded(Vec3::new(2.5, 1.5, 2.5), 0.05));
    }
}
