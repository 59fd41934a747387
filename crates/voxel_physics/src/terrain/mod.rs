//! Voxel terrain access
//!
//! The engine consults terrain only through point and voxel queries; storage
//! and loading belong to the caller.

pub mod query;
pub mod volume;

pub use query::TerrainQuery;
pub use volume::{DenseVolume, VoxelValue, VoxelVolume};
