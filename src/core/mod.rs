//! Core data types and rotation math.
//!
//! - [`types`]: Pose, kinematic state, and the outbound pose report
//! - [`rotation`]: Quaternion type plus Euler/matrix conversions

pub mod rotation;
pub mod types;
