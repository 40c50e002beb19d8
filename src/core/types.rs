//! Core data types for the simulated rigid body.
//!
//! Key types:
//! - [`Pose`]: Position + orientation, the value published every tick
//! - [`KinematicState`]: Velocity, acceleration and angular velocity
//! - [`PoseReport`]: Pose stamped for a sink, quaternion in `(x, y, z, w)` order

use super::rotation::Quaternion;
use serde::{Deserialize, Serialize};

/// Three-component vector `[x, y, z]`.
pub type Vector3 = [f64; 3];

/// Position and orientation of the tracked body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in world frame (meters)
    pub position: Vector3,
    /// Orientation, scalar-first, unit length at observation points
    pub orientation: Quaternion,
}

impl Pose {
    pub fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new([0.0; 3], Quaternion::identity())
    }
}

/// Free-standing motion fields.
///
/// Only read as inputs in kinematic-integration mode. In the planar modes
/// x/y velocity and acceleration are overwritten with the analytic
/// derivatives; otherwise they are telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// Linear velocity (m/s)
    pub velocity: Vector3,
    /// Linear acceleration (m/s²)
    pub acceleration: Vector3,
    /// Angular velocity (degrees/s)
    pub angular_velocity: Vector3,
}

/// Pose stamped for publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseReport {
    /// Tracked object name
    pub object_name: String,
    /// Monotonically increasing report counter
    pub sequence: u64,
    /// Wall-clock timestamp in microseconds since epoch
    pub timestamp_us: u64,
    /// Position (meters)
    pub position: Vector3,
    /// Orientation as `[x, y, z, w]`
    pub quaternion: [f64; 4],
}

impl PoseReport {
    /// Build a report from an engine pose, stamping it with the current time.
    pub fn from_pose(object_name: &str, sequence: u64, pose: &Pose) -> Self {
        Self {
            object_name: object_name.to_string(),
            sequence,
            timestamp_us: now_micros(),
            position: pose.position,
            quaternion: pose.orientation.to_xyzw(),
        }
    }

    /// Orientation back in scalar-first form.
    pub fn orientation(&self) -> Quaternion {
        let [x, y, z, w] = self.quaternion;
        Quaternion::new(w, x, y, z)
    }
}

/// Current wall-clock time in microseconds since the Unix epoch.
#[inline]
pub fn now_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
