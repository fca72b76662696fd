//! Spherical block scan
//!
//! Rays leave the avatar's eyes along a fixed pattern of pitch bands. Each band
//! sweeps azimuth in its own step, coarse near the poles and fine around the
//! horizon, so every frame samples the same 222 directions in the same order.

use super::BlockSample;
use crate::core::types::Vec3;
use crate::host::{AvatarState, WorldSensor};
use ahash::AHashSet;

/// (pitch in degrees, azimuth step in degrees), scanned in this order
pub const PITCH_BANDS: [(f64, f64); 13] = [
    (-90.0, 360.0),
    (-60.0, 45.0),
    (-40.0, 20.0),
    (-30.0, 15.0),
    (-20.0, 15.0),
    (-10.0, 15.0),
    (0.0, 15.0),
    (10.0, 15.0),
    (20.0, 15.0),
    (30.0, 15.0),
    (40.0, 20.0),
    (60.0, 45.0),
    (90.0, 360.0),
];

/// Unit ray directions of the scan pattern, in scan order
pub fn scan_directions() -> Vec<Vec3> {
    let mut directions = Vec::with_capacity(222);
    for &(pitch, step) in PITCH_BANDS.iter() {
        let phi = pitch.to_radians();
        let mut theta = 0.0_f64;
        while theta < 360.0 {
            let t = theta.to_radians();
            directions.push(Vec3::new(phi.cos() * t.cos(), phi.sin(), phi.cos() * t.sin()));
            theta += step;
        }
    }
    directions
}

/// Cast the scan pattern and collect at most `max_blocks` unique hits.
///
/// Hits are keyed by (offset from the feet cell, material); the first ray to
/// report a key wins and later duplicates are dropped.
pub fn scan_blocks(
    world: &dyn WorldSensor,
    avatar: &AvatarState,
    max_distance: f64,
    eye_height: f64,
    max_blocks: usize,
) -> Vec<BlockSample> {
    let mut samples = Vec::new();
    if max_blocks == 0 {
        return samples;
    }

    let feet = avatar.position.cell();
    let eye = avatar.position + Vec3::new(0.0, eye_height, 0.0);
    let mut seen = AHashSet::new();

    for direction in scan_directions() {
        let Some(hit) = world.raycast(eye, direction, max_distance) else {
            continue;
        };
        let offset = hit.cell.offset_from(feet);
        if !seen.insert((offset, hit.material.clone())) {
            continue;
        }
        samples.push(BlockSample {
            x: offset.x,
            y: offset.y,
            z: offset.z,
            distance: hit.distance,
            solid: true,
            name: hit.material,
        });
        if samples.len() >= max_blocks {
            break;
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BlockPos, Rotation};
    use crate::host::ScriptedWorld;

    #[test]
    fn test_pattern_has_222_rays() {
        let directions = scan_directions();
        assert_eq!(directions.len(), 222);
        for d in &directions {
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
        // Straight down first
        assert!((directions[0].y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_below_is_found() {
        let mut world = ScriptedWorld::with_avatar(Vec3::new(0.5, 64.0, 0.5), Rotation::default());
        world.set_block(BlockPos::new(0, 63, 0), "grass");
        let avatar = world.avatar.clone().unwrap();

        let blocks = scan_blocks(&world, &avatar, 20.0, 1.62, 50);
        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].x, blocks[0].y, blocks[0].z), (0, -1, 0));
        assert_eq!(blocks[0].name, "grass");
        assert!((blocks[0].distance - 1.62).abs() < 1e-9);
    }

    #[test]
    fn test_hits_are_unique_and_bounded() {
        let mut world = ScriptedWorld::with_avatar(Vec3::new(0.5, 64.0, 0.5), Rotation::default());
        world.fill(BlockPos::new(-6, 63, -6), BlockPos::new(6, 63, 6), "stone");
        world.fill(BlockPos::new(-6, 64, 4), BlockPos::new(6, 68, 4), "brick");
        let avatar = world.avatar.clone().unwrap();

        let blocks = scan_blocks(&world, &avatar, 20.0, 1.62, 50);
        assert!(blocks.len() <= 50);
        let mut keys = AHashSet::new();
        for b in &blocks {
            assert!(keys.insert((b.x, b.y, b.z, b.name.clone())));
        }

        let few = scan_blocks(&world, &avatar, 20.0, 1.62, 5);
        assert_eq!(few.len(), 5);
        assert_eq!(few[..], blocks[..5]);
    }

    #[test]
    fn test_empty_world_has_no_blocks() {
        let world = ScriptedWorld::with_avatar(Vec3::new(0.5, 64.0, 0.5), Rotation::default());
        let avatar = world.avatar.clone().unwrap();
        assert!(scan_blocks(&world, &avatar, 20.0, 1.62, 50).is_empty());
    }
}
