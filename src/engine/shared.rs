//! Thread-safe handle to a trajectory engine.
//!
//! Shared between:
//! - Driver thread: calls `tick()` at the publish rate
//! - Control front-end: setters, `set_mode`, `reset`, and display snapshots
//!
//! Every method takes the lock once and holds it for the whole operation, so
//! a tick observes either all of a `reset`/`set_mode` or none of it.

use super::{
    Clock, EngineSnapshot, MonotonicClock, TrajectoryEngine, TrajectoryMode, TrajectoryParams,
};
use crate::core::rotation::Quaternion;
use crate::core::types::{Pose, Vector3};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-protected engine handle.
pub struct SharedEngine<C: Clock = MonotonicClock> {
    inner: Arc<Mutex<TrajectoryEngine<C>>>,
}

impl<C: Clock> Clone for SharedEngine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedEngine<C> {
    pub fn new(engine: TrajectoryEngine<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// Use this to make several operations atomic with respect to `tick()`.
    pub fn with<R>(&self, f: impl FnOnce(&mut TrajectoryEngine<C>) -> R) -> R {
        let mut engine = self.inner.lock();
        f(&mut engine)
    }

    pub fn tick(&self) -> Pose {
        self.inner.lock().tick()
    }

    pub fn set_pose(&self, position: Vector3) {
        self.inner.lock().set_pose(position);
    }

    pub fn set_orientation(&self, orientation: Quaternion) {
        self.inner.lock().set_orientation(orientation);
    }

    pub fn set_velocity(&self, velocity: Vector3) {
        self.inner.lock().set_velocity(velocity);
    }

    pub fn set_acceleration(&self, acceleration: Vector3) {
        self.inner.lock().set_acceleration(acceleration);
    }

    pub fn set_angular_velocity(&self, angular_velocity: Vector3) {
        self.inner.lock().set_angular_velocity(angular_velocity);
    }

    pub fn set_mode(&self, mode: TrajectoryMode, params: &TrajectoryParams) {
        self.inner.lock().set_mode(mode, params);
    }

    pub fn reset(&self, params: &TrajectoryParams) {
        self.inner.lock().reset(params);
    }

    pub fn mode(&self) -> TrajectoryMode {
        self.inner.lock().mode()
    }

    pub fn pose(&self) -> Pose {
        self.inner.lock().pose()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.inner.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::KinematicState;
    use crate::engine::ManualClock;
    use std::thread;

    fn shared() -> (SharedEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let engine = TrajectoryEngine::with_clock(
            Pose::default(),
            KinematicState::default(),
            clock.clone(),
        );
        (SharedEngine::new(engine), clock)
    }

    #[test]
    fn test_clones_share_state() {
        let (engine, _) = shared();
        let other = engine.clone();
        engine.set_pose([1.0, 2.0, 3.0]);
        assert_eq!(other.pose().position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reset_is_atomic_against_ticks() {
        let (engine, clock) = shared();
        let params = TrajectoryParams::default();
        engine.set_mode(TrajectoryMode::KinematicIntegration, &params);

        let ticker = {
            let engine = engine.clone();
            let clock = clock.clone();
            thread::spawn(move || {
                for _ in 0..2000 {
                    clock.advance(0.001);
                    engine.tick();
                }
            })
        };

        for _ in 0..200 {
            engine.set_acceleration([5.0, 0.0, 0.0]);
            // Immediately after a reset nothing may have moved yet
            let snap = engine.with(|e| {
                e.reset(&params);
                e.snapshot()
            });
            assert_eq!(snap.pose.position, params.initial.position);
            assert_eq!(snap.kinematics, KinematicState::default());
        }

        ticker.join().unwrap();
    }
}
