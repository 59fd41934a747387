//! Physics tuning and quality tiers

use super::error::PhysicsError;
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Performance/accuracy trade-off for the broad phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Coarse grid, infrequent rebuilds, long pair suppression
    Low,
    /// Balanced default
    #[default]
    Medium,
    /// Fine grid, frequent rebuilds, short pair suppression
    High,
}

impl QualityTier {
    /// Broad-phase settings for this tier
    pub const fn settings(self) -> QualitySettings {
        match self {
            Self::Low => QualitySettings {
                cell_size: 8.0,
                grid_rebuild_interval_ms: 250.0,
                pair_cache_timeout_ms: 50.0,
            },
            Self::Medium => QualitySettings {
                cell_size: 4.0,
                grid_rebuild_interval_ms: 100.0,
                pair_cache_timeout_ms: 33.0,
            },
            Self::High => QualitySettings {
                cell_size: 3.0,
                grid_rebuild_interval_ms: 50.0,
                pair_cache_timeout_ms: 16.0,
            },
        }
    }
}

impl FromStr for QualityTier {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(PhysicsError::InvalidQualityTier(s.to_string())),
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}

/// Broad-phase parameters derived from a [`QualityTier`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySettings {
    /// Spatial grid cell edge length
    pub cell_size: f32,
    /// Minimum time between grid rebuilds
    pub grid_rebuild_interval_ms: f64,
    /// How long a checked pair is suppressed
    pub pair_cache_timeout_ms: f64,
}

/// Physics engine configuration
///
/// Loadable from `.toml` or `.ron` through [`Config`]; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in units/s²
    pub gravity: f32,
    /// Speed cap applied after every kinematics step
    pub max_velocity: f32,
    /// Velocity damping coefficient while grounded (per second)
    pub ground_friction: f32,
    /// Velocity damping coefficient while airborne (per second)
    pub air_resistance: f32,
    /// Speeds below this are zeroed before damping
    pub velocity_epsilon: f32,
    /// Speeds below this are zeroed after damping
    pub jitter_threshold: f32,
    /// Restitution for entity-entity bounces
    pub restitution: f32,
    /// Restitution for entity-terrain bounces
    pub terrain_restitution: f32,
    /// Vertical floor bounces slower than this are zeroed
    pub bounce_threshold: f32,
    /// Distance below the base probed for ground contact
    pub ground_probe: f32,
    /// Upper bound on a single tick's time step
    pub max_timestep_ms: f32,
    /// Minimum time between pair cache sweeps
    pub cache_sweep_interval_ms: f32,
    /// Ray length used when a cast does not specify one
    pub ray_max_distance: f32,
    /// Broad-phase quality tier
    pub quality: QualityTier,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            max_velocity: 50.0,
            ground_friction: 8.0,
            air_resistance: 0.1,
            velocity_epsilon: 0.001,
            jitter_threshold: 0.01,
            restitution: 0.5,
            terrain_restitution: 0.3,
            bounce_threshold: 0.5,
            ground_probe: 0.05,
            max_timestep_ms: 100.0,
            cache_sweep_interval_ms: 100.0,
            ray_max_distance: 100.0,
            quality: QualityTier::Medium,
        }
    }
}

impl PhysicsConfig {
    /// Set the quality tier
    pub fn with_quality(mut self, quality: QualityTier) -> Self {
        self.quality = quality;
        self
    }

    /// Set entity and terrain restitution
    pub fn with_restitution(mut self, entity: f32, terrain: f32) -> Self {
        self.restitution = entity;
        self.terrain_restitution = terrain;
        self
    }

    /// Broad-phase settings of the configured tier
    pub const fn quality_settings(&self) -> QualitySettings {
        self.quality.settings()
    }

    /// Reject non-finite or out-of-range values
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let non_negative = [
            ("gravity", self.gravity),
            ("ground_friction", self.ground_friction),
            ("air_resistance", self.air_resistance),
            ("velocity_epsilon", self.velocity_epsilon),
            ("jitter_threshold", self.jitter_threshold),
            ("restitution", self.restitution),
            ("terrain_restitution", self.terrain_restitution),
            ("bounce_threshold", self.bounce_threshold),
            ("ground_probe", self.ground_probe),
            ("cache_sweep_interval_ms", self.cache_sweep_interval_ms),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let positive = [
            ("max_velocity", self.max_velocity),
            ("max_timestep_ms", self.max_timestep_ms),
            ("ray_max_distance", self.ray_max_distance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        for (name, value) in [
            ("restitution", self.restitution),
            ("terrain_restitution", self.terrain_restitution),
        ] {
            if value > 1.0 {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{name} must not exceed 1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Config for PhysicsConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_quality_tier_parsing() {
        assert_eq!("HIGH".parse::<QualityTier>().unwrap(), QualityTier::High);
        assert_eq!(" low ".parse::<QualityTier>().unwrap(), QualityTier::Low);
        assert!(matches!(
            "ultra".parse::<QualityTier>(),
            Err(PhysicsError::InvalidQualityTier(name)) if name == "ultra"
        ));
    }

    #[test]
    fn test_quality_settings_scale_with_tier() {
        let low = QualityTier::Low.settings();
        let high = QualityTier::High.settings();
        assert!(low.cell_size > high.cell_size);
        assert!(low.grid_rebuild_interval_ms > high.grid_rebuild_interval_ms);
        assert!(low.pair_cache_timeout_ms > high.pair_cache_timeout_ms);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PhysicsConfig { max_velocity: 0.0, ..PhysicsConfig::default() };
        assert!(matches!(config.validate(), Err(PhysicsError::InvalidConfig(_))));

        let config = PhysicsConfig { gravity: f32::NAN, ..PhysicsConfig::default() };
        assert!(config.validate().is_err());

        let config = PhysicsConfig::default().with_restitution(1.5, 0.3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_toml() {
        let config = PhysicsConfig::from_toml_str("gravity = 1.62\nquality = \"high\"").unwrap();
        assert_eq!(config.gravity, 1.62);
        assert_eq!(config.quality, QualityTier::High);
        assert_eq!(config.max_velocity, 50.0);
    }

    #[test]
    fn test_load_partial_ron() {
        let config = PhysicsConfig::from_ron_str("(restitution: 0.8, quality: low)").unwrap();
        assert_eq!(config.restitution, 0.8);
        assert_eq!(config.quality, QualityTier::Low);
    }
}
