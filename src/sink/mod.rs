//! Pose sinks
//!
//! A [`PoseSink`] receives one [`PoseReport`] per driver tick. The driver owns
//! its sink exclusively, so implementations need `Send` but not `Sync`.

pub mod channel;
pub mod console;
pub mod udp;

pub use channel::ChannelSink;
pub use console::{ConsoleSink, format_pose};
pub use udp::UdpPoseSink;

use crate::config::Config;
use crate::core::types::PoseReport;
use crate::error::{Error, Result};

/// Pose publication trait
pub trait PoseSink: Send {
    /// Publish one report. Errors are reported to the driver, which logs them
    /// and keeps ticking.
    fn publish(&mut self, report: &PoseReport) -> Result<()>;
}

/// Publishes every report to several sinks in order.
///
/// All sinks are tried even if one fails; the first error is returned.
pub struct FanOutSink {
    sinks: Vec<Box<dyn PoseSink>>,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Box<dyn PoseSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl PoseSink for FanOutSink {
    fn publish(&mut self, report: &PoseReport) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.publish(report) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Create the pose sink selected by configuration
///
/// `udp` streams to the network and, when `print_every > 0`, also dumps the
/// pose to the console. `console` only dumps, and stays silent at 0.
pub fn create_sink(config: &Config) -> Result<Box<dyn PoseSink>> {
    match config.sink.kind.as_str() {
        "udp" => {
            let udp = UdpPoseSink::bind(
                &config.tracker.server_identifier,
                config.sink.port,
                &config.sink.destinations,
            )?;
            if config.sink.print_every == 0 {
                return Ok(Box::new(udp));
            }
            let console = ConsoleSink::stdout(config.sink.print_every);
            Ok(Box::new(FanOutSink::new(vec![
                Box::new(udp),
                Box::new(console),
            ])))
        }
        "console" => Ok(Box::new(ConsoleSink::stdout(config.sink.print_every))),
        _ => Err(Error::UnknownSink(config.sink.kind.clone())),
    }
}
