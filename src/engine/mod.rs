//! Pose-trajectory engine.
//!
//! [`TrajectoryEngine`] owns the body's kinematic state, the active
//! [`TrajectoryMode`] with its [`TrajectoryParams`], and an epoch on a
//! [`Clock`]. A periodic driver calls [`TrajectoryEngine::tick`]; a control
//! front-end calls the setters, [`TrajectoryEngine::set_mode`] and
//! [`TrajectoryEngine::reset`].
//!
//! # Tick
//!
//! ```text
//! t = now - epoch
//! if mode != Static and t >= reset_interval:
//!     reset(params); t = 0
//! dt = t - last_update_time
//! if dt > 0:
//!     Lissajous / Circular  -> closed form at t (x, y only)
//!     KinematicIntegration  -> v += a·dt; p += v·dt; q = exp(ω·dt) ⊗ q
//! last_update_time = t
//! ```
//!
//! The planar modes never touch z or the orientation; whatever the body held
//! when the mode was entered is kept.
//!
//! The engine itself is not synchronized. Share it between threads through
//! [`SharedEngine`], which holds one lock for the full duration of every
//! operation.

pub mod clock;
pub mod mode;
pub mod motion;
pub mod shared;

pub use clock::{Clock, ClockState, ManualClock, MonotonicClock};
pub use mode::{CircularParams, InitialPose, LissajousParams, TrajectoryMode, TrajectoryParams};
pub use shared::SharedEngine;

use crate::core::rotation::Quaternion;
use crate::core::types::{KinematicState, Pose, Vector3};
use motion::{PlanarSample, circular, integrate_angular, integrate_linear, lissajous};

/// Read-only view of the engine for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSnapshot {
    pub pose: Pose,
    pub kinematics: KinematicState,
    pub mode: TrajectoryMode,
    /// Seconds since the current epoch
    pub elapsed: f64,
    /// Epoch-relative time of the previous tick
    pub last_update_time: f64,
}

/// Rigid-body trajectory state machine.
pub struct TrajectoryEngine<C: Clock = MonotonicClock> {
    pose: Pose,
    kinematics: KinematicState,
    mode: TrajectoryMode,
    params: TrajectoryParams,
    clock: C,
    clock_state: ClockState,
}

impl TrajectoryEngine<MonotonicClock> {
    /// Create an engine in `Static` mode on the monotonic clock.
    pub fn new(initial_pose: Pose, initial_kinematics: KinematicState) -> Self {
        Self::with_clock(initial_pose, initial_kinematics, MonotonicClock::new())
    }
}

impl<C: Clock> TrajectoryEngine<C> {
    /// Create an engine in `Static` mode on a caller-supplied clock.
    ///
    /// Parameters start at [`TrajectoryParams::default`] until the first
    /// `set_mode` or `reset` supplies a block.
    pub fn with_clock(initial_pose: Pose, initial_kinematics: KinematicState, clock: C) -> Self {
        let clock_state = ClockState::started_at(clock.now());
        Self {
            pose: initial_pose,
            kinematics: initial_kinematics,
            mode: TrajectoryMode::Static,
            params: TrajectoryParams::default(),
            clock,
            clock_state,
        }
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    #[inline]
    pub fn set_pose(&mut self, position: Vector3) {
        self.pose.position = position;
    }

    /// Overwrite the orientation. No normalization is applied.
    #[inline]
    pub fn set_orientation(&mut self, orientation: Quaternion) {
        self.pose.orientation = orientation;
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: Vector3) {
        self.kinematics.velocity = velocity;
    }

    #[inline]
    pub fn set_acceleration(&mut self, acceleration: Vector3) {
        self.kinematics.acceleration = acceleration;
    }

    /// Overwrite the angular velocity (degrees/second).
    #[inline]
    pub fn set_angular_velocity(&mut self, angular_velocity: Vector3) {
        self.kinematics.angular_velocity = angular_velocity;
    }

    /// Switch trajectory mode and adopt a new parameter block.
    ///
    /// Always restarts the epoch. Entering `KinematicIntegration` also zeroes
    /// the velocity and moves the body to the initial pose, so integration
    /// never starts from a stale velocity or a jump in position.
    pub fn set_mode(&mut self, mode: TrajectoryMode, params: &TrajectoryParams) {
        if mode != self.mode {
            log::info!("Trajectory mode: {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        self.params = *params;
        self.clock_state.restart(self.clock.now());

        if mode == TrajectoryMode::KinematicIntegration {
            self.kinematics.velocity = [0.0; 3];
            self.pose.position = params.initial.position;
            self.pose.orientation = params.initial.orientation();
        }
    }

    /// Restore the initial pose, zero all motion, and re-enter the current mode.
    pub fn reset(&mut self, params: &TrajectoryParams) {
        self.clock_state.restart(self.clock.now());
        self.pose = Pose::new(params.initial.position, params.initial.orientation());
        self.kinematics = KinematicState::default();
        self.set_mode(self.mode, params);
    }

    // ------------------------------------------------------------------
    // Time step
    // ------------------------------------------------------------------

    /// Advance the state to the current clock reading and return the pose.
    pub fn tick(&mut self) -> Pose {
        let mut t = self.elapsed();

        if self.mode.is_moving() && t >= self.params.reset_interval {
            log::info!(
                "Trajectory restart: {:.2}s elapsed in {} mode (interval {:.2}s)",
                t,
                self.mode,
                self.params.reset_interval
            );
            let params = self.params;
            self.reset(&params);
            t = 0.0;
        }

        let dt = t - self.clock_state.last_update_time;
        if dt > 0.0 {
            match self.mode {
                TrajectoryMode::Static => {}
                TrajectoryMode::Lissajous => {
                    let sample = lissajous(&self.params.lissajous, t);
                    self.apply_planar(&sample);
                }
                TrajectoryMode::Circular => {
                    let sample = circular(&self.params.circular, t);
                    self.apply_planar(&sample);
                }
                TrajectoryMode::KinematicIntegration => {
                    integrate_linear(
                        &mut self.pose.position,
                        &mut self.kinematics.velocity,
                        &self.kinematics.acceleration,
                        dt,
                    );
                    if let Some(q) = integrate_angular(
                        &self.pose.orientation,
                        &self.kinematics.angular_velocity,
                        dt,
                    ) {
                        self.pose.orientation = q;
                    }
                }
            }
        }

        self.clock_state.last_update_time = t;
        self.pose
    }

    /// Write x/y of a planar sample; z and orientation are left alone.
    fn apply_planar(&mut self, sample: &PlanarSample) {
        for axis in 0..2 {
            self.pose.position[axis] = sample.position[axis];
            self.kinematics.velocity[axis] = sample.velocity[axis];
            self.kinematics.acceleration[axis] = sample.acceleration[axis];
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn kinematics(&self) -> KinematicState {
        self.kinematics
    }

    #[inline]
    pub fn mode(&self) -> TrajectoryMode {
        self.mode
    }

    #[inline]
    pub fn params(&self) -> &TrajectoryParams {
        &self.params
    }

    /// Seconds since the last mode set or reset.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.clock_state.elapsed(self.clock.now())
    }

    #[inline]
    pub fn last_update_time(&self) -> f64 {
        self.clock_state.last_update_time
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            pose: self.pose,
            kinematics: self.kinematics,
            mode: self.mode,
            elapsed: self.elapsed(),
            last_update_time: self.clock_state.last_update_time,
        }
    }
}
