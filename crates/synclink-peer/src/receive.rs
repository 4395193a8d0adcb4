use std::time::Instant;

use synclink_frame::{CodecRegistryHandle, Index};

use crate::monitor::ConnectionMonitor;

/// Applies decoded state segments to the external application store.
pub trait StateWriter<I, S> {
    fn apply_update(&mut self, index: I, segment: S);
}

/// The inbound half of a link: decode, apply, feed the monitor.
///
/// Decode failures are expected from a noisy or mismatched-version peer;
/// they are logged and discarded so subsequent frames keep flowing.
pub struct Receiver<I, S, W> {
    registry: CodecRegistryHandle<I, S>,
    writer: W,
}

impl<I: Index, S, W> std::fmt::Debug for Receiver<I, S, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<I, S, W> Receiver<I, S, W>
where
    I: Index,
    W: StateWriter<I, S>,
{
    pub fn new(registry: CodecRegistryHandle<I, S>, writer: W) -> Self {
        Self { registry, writer }
    }

    /// Handle one inbound frame.
    ///
    /// Returns true when the frame decoded and was applied; a discarded
    /// frame does not count as contact for the monitor.
    pub fn on_frame(&mut self, bytes: &[u8], monitor: &mut ConnectionMonitor, now: Instant) -> bool {
        match self.registry.decode(bytes) {
            Ok((index, segment)) => {
                tracing::trace!(index = ?index, len = bytes.len(), "state update received");
                self.writer.apply_update(index, segment);
                monitor.record_contact(now);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, len = bytes.len(), "discarding undecodable frame");
                false
            }
        }
    }

    /// Borrow the state writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Mutably borrow the state writer.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}
