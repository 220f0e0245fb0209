//! Display bus contract
//!
//! The bus accepts one band at a time as an ordered batch of six
//! transactions (see [`BandFrame::transactions`]) and reports completion
//! through a bounded wait. The pixel payload is moved into the bus on
//! enqueue and handed back by the wait, so the transport cannot touch a
//! buffer while it is on the wire.

use alloc::vec::Vec;

use visage_protocol::BandFrame;

/// Bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Batch could not be queued
    Queue,
    /// Transmission failed
    Transfer,
    /// Wait expired before the batch completed
    Timeout,
    /// Wait called with nothing outstanding
    Idle,
}

/// Result of a bus wait
///
/// The payload is `None` when the bus lost the buffer.
pub type Completion = (Result<(), BusError>, Option<Vec<u16>>);

/// Asynchronous display bus
pub trait DisplayBus {
    /// Queue one band; returns immediately
    ///
    /// The six transactions are sent in order and never split. On failure
    /// the payload comes back with the error.
    fn enqueue(&mut self, frame: BandFrame<Vec<u16>>) -> Result<(), (BusError, Vec<u16>)>;

    /// Block until the last queued band completes or fails
    ///
    /// [`BusError::Timeout`] is fatal to the caller.
    fn wait(&mut self, timeout_ms: u32) -> Completion;
}

impl<T: DisplayBus + ?Sized> DisplayBus for &mut T {
    fn enqueue(&mut self, frame: BandFrame<Vec<u16>>) -> Result<(), (BusError, Vec<u16>)> {
        T::enqueue(self, frame)
    }

    fn wait(&mut self, timeout_ms: u32) -> Completion {
        T::wait(self, timeout_ms)
    }
}
