//! Trajectory modes and their parameter block.

use crate::core::rotation::{Quaternion, euler_to_quaternion};
use crate::core::types::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Algorithm currently generating motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryMode {
    /// Pose only changes through explicit setters
    #[default]
    Static,
    /// Planar Lissajous figure in x/y
    Lissajous,
    /// Planar circle in x/y
    Circular,
    /// Integrate acceleration and angular velocity
    KinematicIntegration,
}

impl TrajectoryMode {
    /// All modes, in menu order.
    pub const ALL: [TrajectoryMode; 4] = [
        Self::Static,
        Self::Lissajous,
        Self::Circular,
        Self::KinematicIntegration,
    ];

    /// Parse mode from a config or command string.
    ///
    /// Accepts the snake_case name plus a few short aliases.
    pub fn from_config(mode: &str) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "static" | "hold" => Some(Self::Static),
            "lissajous" => Some(Self::Lissajous),
            "circular" | "circle" => Some(Self::Circular),
            "kinematic_integration" | "kinematic" | "integrate" => {
                Some(Self::KinematicIntegration)
            }
            _ => None,
        }
    }

    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Lissajous => "lissajous",
            Self::Circular => "circular",
            Self::KinematicIntegration => "kinematic_integration",
        }
    }

    /// Whether the engine advances state on its own in this mode.
    #[inline]
    pub fn is_moving(&self) -> bool {
        !matches!(self, Self::Static)
    }
}

impl fmt::Display for TrajectoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lissajous constants: `x = A·sin(a·t)`, `y = B·sin(b·t + δ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LissajousParams {
    /// A (meters)
    pub amplitude_x: f64,
    /// B (meters)
    pub amplitude_y: f64,
    /// a (rad/s)
    pub frequency_x: f64,
    /// b (rad/s)
    pub frequency_y: f64,
    /// δ (radians)
    pub phase: f64,
}

impl Default for LissajousParams {
    fn default() -> Self {
        Self {
            amplitude_x: 1.0,
            amplitude_y: 1.0,
            frequency_x: 1.0,
            frequency_y: 1.0,
            phase: 0.0,
        }
    }
}

/// Circle constants: `x = r·cos(ω·t)`, `y = r·sin(ω·t)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularParams {
    /// r (meters)
    pub radius: f64,
    /// ω (rad/s)
    pub speed: f64,
}

impl Default for CircularParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            speed: 1.0,
        }
    }
}

/// Pose restored by resets and by entering kinematic integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialPose {
    /// Position (meters)
    pub position: Vector3,
    /// (yaw, pitch, roll) in degrees
    pub euler_degrees: Vector3,
}

impl InitialPose {
    /// Orientation built from the Euler angles.
    pub fn orientation(&self) -> Quaternion {
        let [yaw, pitch, roll] = self.euler_degrees;
        euler_to_quaternion(yaw, pitch, roll)
    }
}

impl Default for InitialPose {
    fn default() -> Self {
        Self {
            position: [1.0, -2.0, 1.5],
            euler_degrees: [0.0, 0.0, 0.0],
        }
    }
}

/// Immutable parameter block handed to `set_mode` and `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryParams {
    /// Autonomous restart period for moving modes (seconds)
    pub reset_interval: f64,
    pub lissajous: LissajousParams,
    pub circular: CircularParams,
    pub initial: InitialPose,
}

impl Default for TrajectoryParams {
    fn default() -> Self {
        Self {
            reset_interval: 120.0,
            lissajous: LissajousParams::default(),
            circular: CircularParams::default(),
            initial: InitialPose::default(),
        }
    }
}
