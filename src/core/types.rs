//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Host-assigned identifier for a loaded entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Wall-clock milliseconds as reported by the host frame
pub type Millis = u64;

/// 3D position or direction in world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn horizontal_length(&self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Integer cell containing this point
    pub fn cell(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// Integer block coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset_from(&self, origin: BlockPos) -> BlockPos {
        BlockPos::new(self.x - origin.x, self.y - origin.y, self.z - origin.z)
    }
}

/// Facing in degrees.
///
/// Yaw 0 looks towards +Z and grows clockwise seen from above (yaw -90 looks
/// towards +X). Pitch is positive when looking down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Rotation that looks from the origin along `delta`
    pub fn bearing(delta: Vec3) -> Self {
        let yaw = -delta.x.atan2(delta.z).to_degrees();
        let pitch = -delta.y.atan2(delta.horizontal_length()).to_degrees();
        Self::new(yaw as f32, pitch as f32)
    }

    /// Unit vector this rotation looks along
    pub fn direction(&self) -> Vec3 {
        let yaw = (self.yaw as f64).to_radians();
        let pitch = (self.pitch as f64).to_radians();
        Vec3::new(
            -yaw.sin() * pitch.cos(),
            -pitch.sin(),
            yaw.cos() * pitch.cos(),
        )
    }
}

/// Wrap an angle into [-180, 180]
pub fn normalize_degrees(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    angle %= 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle < -180.0 {
        angle += 360.0;
    }
    angle
}
