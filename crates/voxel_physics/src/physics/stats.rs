//! Performance counters

use std::fmt;

/// Counters accumulated since creation or the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsStats {
    /// Simulation ticks processed
    pub ticks: u64,
    /// Candidate pairs that reached the sphere test
    pub collision_checks: u64,
    /// Pairs found overlapping
    pub collisions: u64,
    /// Candidate pairs suppressed by the pair cache
    pub cache_skips: u64,
    /// Ray casts performed
    pub raycasts: u64,
    /// Spatial grid rebuilds
    pub grid_rebuilds: u64,
    /// Duration of the most recent grid rebuild
    pub last_grid_rebuild_ms: f64,
    /// Terrain faces corrected
    pub terrain_contacts: u64,
}

impl PhysicsStats {
    /// Fraction of candidate pairs that were actually colliding
    pub fn hit_ratio(&self) -> f64 {
        if self.collision_checks == 0 {
            0.0
        } else {
            self.collisions as f64 / self.collision_checks as f64
        }
    }
}

impl fmt::Display for PhysicsStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} checks={} collisions={} (hit ratio {:.2}) cache_skips={} raycasts={} rebuilds={} (last {:.3} ms) terrain={}",
            self.ticks,
            self.collision_checks,
            self.collisions,
            self.hit_ratio(),
            self.cache_skips,
            self.raycasts,
            self.grid_rebuilds,
            self.last_grid_rebuild_ms,
            self.terrain_contacts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let mut stats = PhysicsStats::default();
        assert_eq!(stats.hit_ratio(), 0.0);

        stats.collision_checks = 8;
        stats.collisions = 2;
        assert_eq!(stats.hit_ratio(), 0.25);
        assert!(stats.to_string().contains("collisions=2 (hit ratio 0.25)"));
    }
}
