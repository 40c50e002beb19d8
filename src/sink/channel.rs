//! In-process pose sink backed by a crossbeam channel.
//!
//! Used by tests and by embedders that consume poses on another thread.

use super::PoseSink;
use crate::core::types::PoseReport;
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Forwards each report into a channel without blocking the driver.
pub struct ChannelSink {
    tx: Sender<PoseReport>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: Sender<PoseReport>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Create a sink with a bounded queue and return its receiving end.
    pub fn bounded(capacity: usize) -> (Self, Receiver<PoseReport>) {
        let (tx, rx) = bounded(capacity);
        (Self::new(tx), rx)
    }

    /// Reports discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl PoseSink for ChannelSink {
    fn publish(&mut self, report: &PoseReport) -> Result<()> {
        match self.tx.try_send(report.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                // Consumer is behind; drop rather than stall the tick loop
                self.dropped += 1;
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                Err(Error::Other("pose channel disconnected".to_string()))
            }
        }
    }
}
