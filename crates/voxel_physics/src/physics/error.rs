//! Setup-time physics errors
//!
//! Per-tick failures are absorbed by the engine; only configuration problems
//! surface to the caller.

use crate::config::ConfigError;

/// Errors returned while configuring the physics engine
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// Quality tier name not recognised
    #[error("Invalid quality tier: {0} (expected low, medium or high)")]
    InvalidQualityTier(String),

    /// Numeric setting out of range
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read or parsed
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
