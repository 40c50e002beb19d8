//! Fixed-rate driver thread.
//!
//! Every interval: lock the engine, `tick()`, unlock, stamp a [`PoseReport`]
//! and hand it to the sink outside the engine lock. Publish errors are logged
//! and the loop carries on.

use crate::core::types::PoseReport;
use crate::engine::{Clock, SharedEngine};
use crate::error::{Error, Result};
use crate::sink::PoseSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Consecutive publish failures are logged once per this many ticks.
const ERROR_LOG_EVERY: u64 = 200;

/// Driver settings
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Name stamped on every report
    pub object_name: String,
    /// Tick rate in Hz (0 is treated as 1)
    pub frequency_hz: u32,
}

impl DriverConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frequency_hz.max(1)))
    }
}

/// Driver thread handle.
pub struct DriverThread {
    handle: JoinHandle<u64>,
}

impl DriverThread {
    /// Spawn the tick loop. It runs until `running` is cleared.
    pub fn spawn<C>(
        engine: SharedEngine<C>,
        sink: Box<dyn PoseSink>,
        config: DriverConfig,
        running: Arc<AtomicBool>,
    ) -> Result<Self>
    where
        C: Clock + 'static,
    {
        let handle = thread::Builder::new()
            .name("driver".into())
            .spawn(move || run_driver_loop(engine, sink, config, running))
            .map_err(|e| Error::Other(format!("Failed to spawn driver thread: {}", e)))?;

        Ok(Self { handle })
    }

    /// Wait for the loop to exit. Returns the number of reports published.
    pub fn join(self) -> thread::Result<u64> {
        self.handle.join()
    }
}

fn run_driver_loop<C: Clock>(
    engine: SharedEngine<C>,
    mut sink: Box<dyn PoseSink>,
    config: DriverConfig,
    running: Arc<AtomicBool>,
) -> u64 {
    let interval = config.interval();
    let mut sequence: u64 = 0;
    let mut failures: u64 = 0;

    log::info!(
        "Driver started: object={}, rate={}Hz, interval={:?}",
        config.object_name,
        config.frequency_hz,
        interval
    );

    while running.load(Ordering::Relaxed) {
        let loop_start = Instant::now();

        let pose = engine.tick();
        sequence += 1;
        let report = PoseReport::from_pose(&config.object_name, sequence, &pose);

        match sink.publish(&report) {
            Ok(()) => {
                if failures > 0 {
                    log::info!("Pose publishing recovered after {} failure(s)", failures);
                    failures = 0;
                }
                log::trace!(
                    "Published seq {} position=({:.3}, {:.3}, {:.3})",
                    sequence,
                    pose.position[0],
                    pose.position[1],
                    pose.position[2]
                );
            }
            Err(e) => {
                if failures % ERROR_LOG_EVERY == 0 {
                    log::warn!("Failed to publish pose (seq {}): {}", sequence, e);
                }
                failures += 1;
            }
        }

        let elapsed = loop_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }

    log::info!("Driver stopped after {} tick(s)", sequence);
    sequence
}
