//! Entity-vs-terrain collision resolution
//!
//! A body is treated as a column of `radius` x `height` standing on its
//! position. Each axis is tested independently by sampling the voxel volume
//! at the column's faces and snapping the position back to the voxel
//! boundary it crossed.

use crate::ecs::components::PhysicsBody;
use crate::foundation::math::{constants::SURFACE_SKIN, up, Vec3};
use crate::terrain::TerrainQuery;

/// Floor impact, reported as a terrain collision event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorImpact {
    /// Corrected base position
    pub position: Vec3,
    /// Surface normal (always world up)
    pub normal: Vec3,
    /// Velocity before the correction
    pub velocity: Vec3,
    /// Absolute vertical speed at impact
    pub force: f32,
}

/// Result of resolving one body against the terrain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainResolution {
    /// Position after all corrections
    pub position: Vec3,
    /// Number of faces that needed correcting
    pub contacts: u32,
    /// Floor impact, if the base was inside a solid voxel
    pub floor: Option<FloorImpact>,
}

impl TerrainResolution {
    const fn untouched(position: Vec3) -> Self {
        Self { position, contacts: 0, floor: None }
    }

    /// Whether any correction was applied
    pub const fn corrected(&self) -> bool {
        self.contacts > 0
    }
}

/// Reflect or zero a velocity component after hitting a surface
///
/// `into_surface` is true when the component was moving towards the
/// obstruction. Anything else is hard-zeroed.
fn bounce_or_zero(component: f32, into_surface: bool, restitution: f32) -> f32 {
    if restitution > 0.0 && into_surface {
        -component * restitution
    } else {
        0.0
    }
}

/// Push a body out of terrain along each axis and adjust its velocity
///
/// Does nothing while terrain is not ready or the body is not collidable.
pub fn resolve_terrain(
    terrain: &TerrainQuery<'_>,
    body: &mut PhysicsBody,
    position: Vec3,
    restitution: f32,
    bounce_threshold: f32,
) -> TerrainResolution {
    if !terrain.is_ready() || !body.is_collidable() {
        return TerrainResolution::untouched(position);
    }

    let mut resolution = TerrainResolution::untouched(position);
    let r = body.radius;
    let pre_velocity = body.velocity;

    // Horizontal faces, sampled at mid-height
    let mid = position.y + body.height * 0.5;
    let pos = &mut resolution.position;

    if terrain.is_solid(Vec3::new(pos.x + r, mid, pos.z)) {
        pos.x = (pos.x + r).floor() - r - SURFACE_SKIN;
        body.velocity.x = bounce_or_zero(body.velocity.x, body.velocity.x > 0.0, restitution);
        resolution.contacts += 1;
    }
    if terrain.is_solid(Vec3::new(pos.x - r, mid, pos.z)) {
        pos.x = (pos.x - r).floor() + 1.0 + r;
        body.velocity.x = bounce_or_zero(body.velocity.x, body.velocity.x < 0.0, restitution);
        resolution.contacts += 1;
    }
    if terrain.is_solid(Vec3::new(pos.x, mid, pos.z + r)) {
        pos.z = (pos.z + r).floor() - r - SURFACE_SKIN;
        body.velocity.z = bounce_or_zero(body.velocity.z, body.velocity.z > 0.0, restitution);
        resolution.contacts += 1;
    }
    if terrain.is_solid(Vec3::new(pos.x, mid, pos.z - r)) {
        pos.z = (pos.z - r).floor() + 1.0 + r;
        body.velocity.z = bounce_or_zero(body.velocity.z, body.velocity.z < 0.0, restitution);
        resolution.contacts += 1;
    }

    // Floor
    if terrain.is_solid(*pos) {
        pos.y = pos.y.floor() + 1.0;
        let bounced = bounce_or_zero(body.velocity.y, body.velocity.y < 0.0, restitution);
        body.velocity.y = if bounced.abs() < bounce_threshold { 0.0 } else { bounced };
        resolution.contacts += 1;
        resolution.floor = Some(FloorImpact {
            position: *pos,
            normal: up(),
            velocity: pre_velocity,
            force: pre_velocity.y.abs(),
        });
    }

    // Ceiling
    let top = pos.y + body.height;
    if terrain.is_solid(Vec3::new(pos.x, top, pos.z)) {
        pos.y = top.floor() - body.height - SURFACE_SKIN;
        body.velocity.y = bounce_or_zero(body.velocity.y, body.velocity.y > 0.0, restitution);
        resolution.contacts += 1;
    }

    resolution
}

/// Whether a body standing at `position` would overlap solid terrain
///
/// Samples the column's axis at the base, mid-height and just under the top,
/// plus its four horizontal faces at mid-height.
pub fn body_overlaps_terrain(terrain: &TerrainQuery<'_>, body: &PhysicsBody, position: Vec3) -> bool {
    let top = (body.height - SURFACE_SKIN).max(0.0);
    let mid = body.height * 0.5;
    let r = body.radius;
    let axis = [0.0, mid, top].map(|offset| Vec3::new(0.0, offset, 0.0));
    let faces = [
        Vec3::new(r, mid, 0.0),
        Vec3::new(-r, mid, 0.0),
        Vec3::new(0.0, mid, r),
        Vec3::new(0.0, mid, -r),
    ];
    axis.iter()
        .chain(faces.iter())
        .any(|offset| terrain.is_solid(position + offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::DenseVolume;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// 16^3 volume with a floor slab at y = 0 and a wall at x = 10
    fn room() -> DenseVolume {
        let mut volume = DenseVolume::new(16, 16, 16);
        volume.fill_box([0, 0, 0], [15, 0, 15], 1);
        volume.fill_box([10, 1, 0], [10, 15, 15], 1);
        volume.set_ready(true);
        volume
    }

    #[test]
    fn test_floor_snap_and_event() {
        let volume = room();
        let terrain = TerrainQuery::new(Some(&volume));
        let mut body = PhysicsBody::new(0.4).with_height(1.8).with_velocity(Vec3::new(0.0, -6.0, 0.0));

        let result = resolve_terrain(&terrain, &mut body, Vec3::new(4.5, 0.7, 4.5), 0.3, 0.5);

        assert_relative_eq!(result.position.y, 1.0);
        // 6 * 0.3 = 1.8, above the bounce threshold
        assert_relative_eq!(body.velocity.y, 1.8, epsilon = 1e-6);
        let floor = result.floor.unwrap();
        assert_eq!(floor.velocity, Vec3::new(0.0, -6.0, 0.0));
        assert_relative_eq!(floor.force, 6.0);
        assert_eq!(floor.normal, up());
    }

    #[test]
    fn test_small_floor_bounce_is_zeroed() {
        let volume = room();
        let terrain = TerrainQuery::new(Some(&volume));
        let mut body = PhysicsBody::new(0.4).with_velocity(Vec3::new(0.0, -1.0, 0.0));
        resolve_terrain(&terrain, &mut body, Vec3::new(4.5, 0.95, 4.5), 0.3, 0.5);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_wall_push_back() {
        let volume = room();
        let terrain = TerrainQuery::new(Some(&volume));
        let mut body = PhysicsBody::new(0.4).with_height(1.8).with_velocity(Vec3::new(3.0, 0.0, 0.0));

        let result = resolve_terrain(&terrain, &mut body, Vec3::new(9.8, 1.0, 4.5), 0.0, 0.5);

        assert!(result.position.x + 0.4 < 10.0);
        assert_eq!(body.velocity.x, 0.0);
        assert!(result.floor.is_none());
    }

    /// Walled pocket: floor at y = 0, walls at x = 2, x = 10, z = 2, z = 10, ceiling at y = 6
    fn pocket() -> DenseVolume {
        let mut volume = DenseVolume::new(16, 16, 16);
        volume.fill_box([0, 0, 0], [15, 0, 15], 1);
        volume.fill_box([2, 1, 0], [2, 5, 15], 1);
        volume.fill_box([10, 1, 0], [10, 5, 15], 1);
        volume.fill_box([0, 1, 2], [15, 5, 2], 1);
        volume.fill_box([0, 1, 10], [15, 5, 10], 1);
        volume.fill_box([0, 6, 0], [15, 6, 15], 1);
        volume.set_ready(true);
        volume
    }

    /// (start, velocity, snapped position, velocity when moving into the face)
    fn face_cases() -> [(Vec3, Vec3, Vec3, Vec3); 5] {
        [
            // +X wall
            (Vec3::new(9.8, 1.0, 6.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(9.599, 1.0, 6.0), Vec3::new(-1.5, 0.0, 0.0)),
            // -X wall
            (Vec3::new(3.2, 1.0, 6.0), Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.4, 1.0, 6.0), Vec3::new(1.5, 0.0, 0.0)),
            // +Z wall
            (Vec3::new(6.0, 1.0, 9.8), Vec3::new(0.0, 0.0, 2.0), Vec3::new(6.0, 1.0, 9.599), Vec3::new(0.0, 0.0, -1.0)),
            // -Z wall
            (Vec3::new(6.0, 1.0, 3.2), Vec3::new(0.0, 0.0, -2.0), Vec3::new(6.0, 1.0, 3.4), Vec3::new(0.0, 0.0, 1.0)),
            // Ceiling
            (Vec3::new(6.0, 4.5, 6.0), Vec3::new(0.0, 4.0, 0.0), Vec3::new(6.0, 4.199, 6.0), Vec3::new(0.0, -2.0, 0.0)),
        ]
    }

    #[test]
    fn test_faces_bounce_when_moving_into_them() {
        let volume = pocket();
        let terrain = TerrainQuery::new(Some(&volume));

        for (start, velocity, snapped, bounced) in face_cases() {
            let mut body = PhysicsBody::new(0.4).with_height(1.8).with_velocity(velocity);
            let result = resolve_terrain(&terrain, &mut body, start, 0.5, 0.5);

            assert_relative_eq!(result.position, snapped, epsilon = 1e-5);
            assert_relative_eq!(body.velocity, bounced, epsilon = 1e-5);
            assert_eq!(result.contacts, 1);
            assert!(result.floor.is_none());
        }
    }

    #[test]
    fn test_faces_zero_velocity_when_moving_away() {
        let volume = pocket();
        let terrain = TerrainQuery::new(Some(&volume));

        for (start, velocity, snapped, _) in face_cases() {
            let mut body = PhysicsBody::new(0.4).with_height(1.8).with_velocity(-velocity);
            let result = resolve_terrain(&terrain, &mut body, start, 0.5, 0.5);

            assert_relative_eq!(result.position, snapped, epsilon = 1e-5);
            assert_eq!(body.velocity, Vec3::zeros());
        }
    }

    #[test]
    fn test_ceiling_snap() {
        let mut volume = room();
        volume.fill_box([0, 4, 0], [9, 4, 15], 1);
        let terrain = TerrainQuery::new(Some(&volume));
        let mut body = PhysicsBody::new(0.4).with_height(1.8).with_velocity(Vec3::new(0.0, 4.0, 0.0));

        let result = resolve_terrain(&terrain, &mut body, Vec3::new(4.5, 2.5, 4.5), 0.0, 0.5);

        assert!(result.position.y + 1.8 < 4.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(result.floor.is_none());
    }

    #[test]
    fn test_unready_terrain_is_ignored() {
        let mut volume = room();
        volume.set_ready(false);
        let terrain = TerrainQuery::new(Some(&volume));
        let mut body = PhysicsBody::new(0.4).with_velocity(Vec3::new(0.0, -3.0, 0.0));
        let result = resolve_terrain(&terrain, &mut body, Vec3::new(4.5, 0.5, 4.5), 0.3, 0.5);
        assert!(!result.corrected());
        assert_eq!(body.velocity.y, -3.0);
    }

    #[test]
    fn test_body_overlaps_terrain() {
        let volume = room();
        let terrain = TerrainQuery::new(Some(&volume));
        let body = PhysicsBody::new(0.4).with_height(1.8);
        assert!(!body_overlaps_terrain(&terrain, &body, Vec3::new(4.5, 1.0, 4.5)));
        assert!(body_overlaps_terrain(&terrain, &body, Vec3::new(10.5, 1.0, 4.5)));
        assert!(body_overlaps_terrain(&terrain, &body, Vec3::new(4.5, 0.5, 4.5)));
    }

    proptest! {
        #[test]
        fn prop_floor_correction_is_monotonic(depth in 0.001f32..0.99, vy in -20.0f32..0.0) {
            let volume = room();
            let terrain = TerrainQuery::new(Some(&volume));
            let mut body = PhysicsBody::new(0.4).with_height(1.8).with_velocity(Vec3::new(0.0, vy, 0.0));
            let result = resolve_terrain(&terrain, &mut body, Vec3::new(4.5, 1.0 - depth, 4.5), 0.3, 0.5);
            prop_assert!(result.position.y >= 1.0);
        }

        #[test]
        fn prop_non_colliding_body_is_untouched(
            x in 0.0f32..15.0,
            y in 0.0f32..15.0,
            z in 0.0f32..15.0,
            vy in -20.0f32..20.0,
        ) {
            let volume = room();
            let terrain = TerrainQuery::new(Some(&volume));
            let mut body = PhysicsBody::new(0.4).without_collision().with_velocity(Vec3::new(1.0, vy, 1.0));
            let before = body.clone();
            let position = Vec3::new(x, y, z);
            let result = resolve_terrain(&terrain, &mut body, position, 0.3, 0.5);
            prop_assert_eq!(result.position, position);
            prop_assert_eq!(body, before);
        }
    }
}
