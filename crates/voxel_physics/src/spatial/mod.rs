//! Broad-phase spatial structures
//!
//! A uniform hash grid shortlists candidate pairs and ray query
//! targets; the pair cache suppresses repeated narrow-phase checks.

pub mod grid;
pub mod pair_cache;

pub use grid::{cell_key, GridEntry, SpatialHashGrid};
pub use pair_cache::{CollisionPair, CollisionPairCache};
