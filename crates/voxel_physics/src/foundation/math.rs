//! Math utilities and types
//!
//! Provides the vector types and small numeric helpers shared by the
//! kinematics, collision and ray casting code.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Integer voxel coordinate
pub type IVec3 = Vector3<i32>;

/// World up direction (Y-up, right-handed)
pub fn up() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// A principal axis of the voxel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal X axis
    X,
    /// Vertical Y axis
    Y,
    /// Horizontal Z axis
    Z,
}

impl Axis {
    /// All axes in traversal priority order
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along this axis scaled by `sign`
    pub fn unit(self, sign: f32) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = sign;
        v
    }
}

/// Math constants
pub mod constants {
    /// Smallest direction component magnitude used as a divisor
    pub const DIRECTION_EPSILON: f32 = 1.0e-8;

    /// Tolerance for treating a vector as zero length
    pub const LENGTH_EPSILON: f32 = 1.0e-6;

    /// Gap left between a body and a voxel face it was pushed away from
    pub const SURFACE_SKIN: f32 = 1.0e-3;

    /// Largest magnitude of an integer voxel or cell coordinate
    ///
    /// Leaves headroom below `i32::MAX` for neighbour offsets and traversal steps.
    pub const MAX_GRID_COORD: i32 = 1 << 30;
}

/// Math utility functions
pub mod utils {
    use super::{constants, up, IVec3, Vec3};

    /// Replace near-zero direction components so they can be used as divisors
    pub fn safe_direction_component(value: f32) -> f32 {
        if value.abs() < constants::DIRECTION_EPSILON {
            if value.is_sign_negative() {
                -constants::DIRECTION_EPSILON
            } else {
                constants::DIRECTION_EPSILON
            }
        } else {
            value
        }
    }

    /// Normalize a direction, falling back to `fallback` for zero-length input
    pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
        let length = v.magnitude();
        if length > constants::LENGTH_EPSILON && length.is_finite() {
            v / length
        } else {
            fallback
        }
    }

    /// Normalize a direction, falling back to world up
    pub fn normalize_or_up(v: Vec3) -> Vec3 {
        normalize_or(v, up())
    }

    /// Voxel containing a world-space point (floor rounding on every axis)
    ///
    /// Coordinates are clamped to `±MAX_GRID_COORD`; NaN maps to 0.
    pub fn voxel_of(point: Vec3) -> IVec3 {
        let limit = constants::MAX_GRID_COORD as f32;
        point.map(|v| v.floor().clamp(-limit, limit) as i32)
    }

    /// Check that every component of a vector is finite
    pub fn is_finite(v: &Vec3) -> bool {
        v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_direction_component_keeps_sign() {
        assert_eq!(utils::safe_direction_component(0.0), constants::DIRECTION_EPSILON);
        assert_eq!(utils::safe_direction_component(-0.0), -constants::DIRECTION_EPSILON);
        assert_eq!(utils::safe_direction_component(0.5), 0.5);
    }

    #[test]
    fn test_voxel_of_negative_coordinates() {
        assert_eq!(utils::voxel_of(Vec3::new(-0.5, 1.0, 2.999)), IVec3::new(-1, 1, 2));
    }

    #[test]
    fn test_voxel_of_clamps_far_points() {
        let limit = constants::MAX_GRID_COORD;
        let voxel = utils::voxel_of(Vec3::new(1.0e10, -3.0e9, f32::NAN));
        assert_eq!(voxel, IVec3::new(limit, -limit, 0));
        // Neighbour offsets stay in range
        assert_eq!(voxel.x + 1, limit + 1);
    }

    #[test]
    fn test_normalize_or_up_zero_vector() {
        assert_eq!(utils::normalize_or_up(Vec3::zeros()), up());
    }

    #[test]
    fn test_axis_unit() {
        assert_eq!(Axis::Z.unit(-1.0), Vec3::new(0.0, 0.0, -1.0));
    }
}
