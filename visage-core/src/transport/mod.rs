//! Double-buffered band transport
//!
//! Two slot buffers alternate between being rendered into and being on the
//! bus. A slot is only rendered into again after the bus has handed its
//! buffer back from a wait, so at most one band is ever in flight.
//!
//! ```text
//!  band:      0        1        2        3
//!  slot A:  render ─► queued ─────────► render ─► queued ...
//!  slot B:           render ─► wait(A) ─► queued ─► wait(B) ...
//! ```

mod pipeline;
mod slot;

pub use pipeline::DoubleBufferedTransport;
pub use slot::SlotState;

use visage_protocol::lcd::FrameError;

use crate::config::ConfigError;
use crate::image::{AllocError, RenderBandError};
use crate::traits::BusError;

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Configuration rejected
    Config(ConfigError),
    /// Canvas does not match the configured panel
    GeometryMismatch,
    /// Slot buffer could not be allocated
    NoMemory,
    /// Band could not be rendered into its slot
    Render(RenderBandError),
    /// Band could not be framed
    Frame(FrameError),
    /// Bus failed or timed out on a band
    Transfer {
        /// First row of the failed band
        band_top: u16,
        error: BusError,
    },
}

impl From<AllocError> for TransportError {
    fn from(_: AllocError) -> Self {
        TransportError::NoMemory
    }
}

impl From<RenderBandError> for TransportError {
    fn from(e: RenderBandError) -> Self {
        TransportError::Render(e)
    }
}

impl From<FrameError> for TransportError {
    fn from(e: FrameError) -> Self {
        TransportError::Frame(e)
    }
}
