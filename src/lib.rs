//! SimTracker - simulated motion-capture pose source
//!
//! Generates the pose of one virtual rigid body and publishes it at a fixed
//! rate, standing in for a camera-based tracking system during development.
//!
//! ## Components
//!
//! - `engine`: trajectory engine (static, Lissajous, circular, kinematic integration)
//! - `sink`: pose publication (UDP datagrams, console, in-process channel)
//! - `control`: operator commands and the console front-end
//! - `driver`: fixed-rate tick and publish thread

pub mod config;
pub mod control;
pub mod core;
pub mod driver;
pub mod engine;
pub mod error;
pub mod sink;

// Re-export commonly used types
pub use config::Config;
pub use crate::core::rotation::{Quaternion, euler_to_quaternion, quaternion_to_rotation_matrix};
pub use crate::core::types::{KinematicState, Pose, PoseReport};
pub use engine::{SharedEngine, TrajectoryEngine, TrajectoryMode, TrajectoryParams};
pub use error::{Error, Result};
