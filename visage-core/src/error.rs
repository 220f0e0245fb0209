//! Render errors
//!
//! Every failure a render session can end with. Lower layers have their
//! own error enums; the session maps them onto this one.

use crate::config::ConfigError;
use crate::image::AllocError;
use crate::jpeg::DecodeError;
use crate::traits::BusError;
use crate::transport::TransportError;

/// Render session errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// Canvas rows, decoder scratch or a slot could not be allocated
    NoMemory,
    /// Decoder rejected the asset
    DecodeUnsupported(DecodeError),
    /// A band failed on the bus
    TransferFailed {
        /// First row of the failed band
        band_top: u16,
        /// Bus error
        error: BusError,
    },
    /// Configuration rejected
    Config(ConfigError),
    /// Internal invariant broken (band or frame sizing)
    Internal,
}

impl From<AllocError> for RenderError {
    fn from(_: AllocError) -> Self {
        RenderError::NoMemory
    }
}

impl From<DecodeError> for RenderError {
    fn from(e: DecodeError) -> Self {
        RenderError::DecodeUnsupported(e)
    }
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> Self {
        RenderError::Config(e)
    }
}

impl From<TransportError> for RenderError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::NoMemory => RenderError::NoMemory,
            TransportError::Config(e) => RenderError::Config(e),
            TransportError::Transfer { band_top, error } => {
                RenderError::TransferFailed { band_top, error }
            }
            TransportError::GeometryMismatch
            | TransportError::Render(_)
            | TransportError::Frame(_) => RenderError::Internal,
        }
    }
}
