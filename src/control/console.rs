//! Line-oriented console front-end.
//!
//! Reads one command per line from stdin, applies it through a
//! [`ControlPanel`], and writes replies to stdout. `quit` clears the shared
//! running flag; end of input only stops this reader.

use super::{ControlCommand, ControlOutcome, ControlPanel, HELP};
use crate::core::rotation::quaternion_to_rotation_matrix;
use crate::engine::{Clock, EngineSnapshot};
use crate::error::{Error, Result};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Human-readable engine state for `show`.
pub fn format_snapshot(snap: &EngineSnapshot) -> String {
    let p = snap.pose.position;
    let q = snap.pose.orientation;
    let m = quaternion_to_rotation_matrix(q.w, q.x, q.y, q.z);
    let v = snap.kinematics.velocity;
    let a = snap.kinematics.acceleration;
    let w = snap.kinematics.angular_velocity;

    let mut out = format!(
        "mode: {} (t = {:.3}s)\n\
         position: ({:.3}, {:.3}, {:.3})\n\
         quaternion (x, y, z, w): ({:.3}, {:.3}, {:.3}, {:.3})\n\
         velocity: ({:.3}, {:.3}, {:.3})\n\
         acceleration: ({:.3}, {:.3}, {:.3})\n\
         angular velocity (deg/s): ({:.3}, {:.3}, {:.3})\n\
         rotation matrix:\n",
        snap.mode,
        snap.elapsed,
        p[0],
        p[1],
        p[2],
        q.x,
        q.y,
        q.z,
        q.w,
        v[0],
        v[1],
        v[2],
        a[0],
        a[1],
        a[2],
        w[0],
        w[1],
        w[2]
    );
    for row in &m {
        out.push_str(&format!(
            "  [{:>7.3} {:>7.3} {:>7.3}]\n",
            row[0], row[1], row[2]
        ));
    }
    out
}

/// Process command lines until `quit`, end of input, or shutdown.
pub fn run<C, R, W>(
    panel: &mut ControlPanel<C>,
    input: R,
    mut output: W,
    running: &AtomicBool,
) -> Result<()>
where
    C: Clock,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("help") {
            writeln!(output, "{}", HELP)?;
            continue;
        }

        let cmd = match ControlCommand::parse_line(trimmed) {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(output, "{} (type 'help')", e)?;
                continue;
            }
        };

        match panel.apply(cmd) {
            ControlOutcome::Applied => writeln!(output, "ok")?,
            ControlOutcome::Snapshot(snap) => write!(output, "{}", format_snapshot(&snap))?,
            ControlOutcome::Shutdown => {
                log::info!("Shutdown requested from console");
                running.store(false, Ordering::Relaxed);
                break;
            }
        }
        output.flush()?;
    }
    Ok(())
}

/// Spawn the stdin front-end on a named thread.
pub fn spawn<C>(mut panel: ControlPanel<C>, running: Arc<AtomicBool>) -> Result<JoinHandle<()>>
where
    C: Clock + 'static,
{
    thread::Builder::new()
        .name("control-console".to_string())
        .spawn(move || {
            log::info!("Console control started (type 'help' for commands)");
            let stdin = io::stdin();
            if let Err(e) = run(&mut panel, stdin.lock(), io::stdout(), &running) {
                log::error!("Console control failed: {}", e);
            }
            log::info!("Console control stopped");
        })
        .map_err(|e| Error::Other(format!("Failed to spawn console thread: {}", e)))
}
