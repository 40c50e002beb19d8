//! Motion generators used by the trajectory engine.
//!
//! Two families:
//! - Closed-form planar trajectories ([`lissajous`], [`circular`]) evaluated at
//!   an absolute time since epoch. They produce x/y only.
//! - Step integrators ([`integrate_linear`], [`integrate_angular`]) that
//!   advance state by a small `dt`.

use super::mode::{CircularParams, LissajousParams};
use crate::core::rotation::Quaternion;
use crate::core::types::Vector3;

/// Angular rates below this magnitude (rad/s) are treated as exactly zero.
pub const ANGULAR_RATE_EPSILON: f64 = 1e-6;

/// Planar position with its first and second time derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarSample {
    /// [x, y] (meters)
    pub position: [f64; 2],
    /// [vx, vy] (m/s)
    pub velocity: [f64; 2],
    /// [ax, ay] (m/s²)
    pub acceleration: [f64; 2],
}

/// Evaluate the Lissajous figure at time `t`.
pub fn lissajous(params: &LissajousParams, t: f64) -> PlanarSample {
    let LissajousParams {
        amplitude_x: a_x,
        amplitude_y: a_y,
        frequency_x: w_x,
        frequency_y: w_y,
        phase,
    } = *params;

    let (sx, cx) = (w_x * t).sin_cos();
    let (sy, cy) = (w_y * t + phase).sin_cos();

    PlanarSample {
        position: [a_x * sx, a_y * sy],
        velocity: [a_x * w_x * cx, a_y * w_y * cy],
        acceleration: [-a_x * w_x * w_x * sx, -a_y * w_y * w_y * sy],
    }
}

/// Evaluate the circle at time `t`.
pub fn circular(params: &CircularParams, t: f64) -> PlanarSample {
    let r = params.radius;
    let w = params.speed;
    let (s, c) = (w * t).sin_cos();

    PlanarSample {
        position: [r * c, r * s],
        velocity: [-r * w * s, r * w * c],
        acceleration: [-r * w * w * c, -r * w * w * s],
    }
}

/// Semi-implicit Euler step on all three axes.
///
/// Velocity is updated first and the new velocity moves the position.
pub fn integrate_linear(
    position: &mut Vector3,
    velocity: &mut Vector3,
    acceleration: &Vector3,
    dt: f64,
) {
    for axis in 0..3 {
        velocity[axis] += acceleration[axis] * dt;
        position[axis] += velocity[axis] * dt;
    }
}

/// Exponential-map orientation step.
///
/// `angular_velocity_deg` is in degrees/second. Returns `None` when the rate
/// is below [`ANGULAR_RATE_EPSILON`], in which case the caller keeps the
/// orientation as is. Otherwise the delta rotation is left-multiplied onto
/// `orientation` and the result renormalized (a zero norm is left alone).
pub fn integrate_angular(
    orientation: &Quaternion,
    angular_velocity_deg: &Vector3,
    dt: f64,
) -> Option<Quaternion> {
    let rate = angular_velocity_deg.map(f64::to_radians);
    let omega = (rate[0] * rate[0] + rate[1] * rate[1] + rate[2] * rate[2]).sqrt();
    if omega <= ANGULAR_RATE_EPSILON {
        return None;
    }

    let axis = rate.map(|r| r / omega);
    let (s, c) = (omega * dt * 0.5).sin_cos();
    let delta = Quaternion::new(c, axis[0] * s, axis[1] * s, axis[2] * s);

    Some(delta.hamilton_product(orientation).normalized())
}
