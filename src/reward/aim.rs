//! Aim scoring

use crate::core::types::{normalize_degrees, Rotation, Vec3};

/// Angular offset between where the avatar looks and where a target is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimError {
    pub yaw_diff: f64,
    pub pitch_diff: f64,
    pub distance: f64,
}

impl AimError {
    pub fn measure(from: Vec3, facing: Rotation, target: Vec3) -> Self {
        let delta = target - from;
        let bearing = Rotation::bearing(delta);
        Self {
            yaw_diff: normalize_degrees(bearing.yaw as f64 - facing.yaw as f64),
            pitch_diff: normalize_degrees(bearing.pitch as f64 - facing.pitch as f64),
            distance: delta.length(),
        }
    }

    /// Larger of the two axis errors, in degrees
    pub fn angle(&self) -> f64 {
        self.yaw_diff.abs().max(self.pitch_diff.abs())
    }
}

/// Step table from angular error to a score in [0, 1]
pub fn aim_score(error_deg: f64) -> f64 {
    let error = error_deg.abs();
    if error < 5.0 {
        1.0
    } else if error < 10.0 {
        0.8
    } else if error < 20.0 {
        0.5
    } else if error < 45.0 {
        0.2
    } else if error < 90.0 {
        0.05
    } else {
        0.0
    }
}
