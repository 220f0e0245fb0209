//! Display bus parameters

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ConfigError, DisplayGeometry};
use visage_protocol::TRANSACTIONS_PER_BAND;

/// Default bus clock
pub const BUS_CLOCK_HZ: u32 = 10_000_000;

/// Overclocked bus clock; works on most panels but is out of datasheet
pub const BUS_CLOCK_OVERCLOCK_HZ: u32 = 26_000_000;

/// Default depth of the bus transaction queue
pub const BUS_QUEUE_DEPTH: u8 = 7;

/// Slack added to the largest band transfer
const TRANSFER_SLACK_BYTES: usize = 8;

/// Clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// Clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// Combined polarity and phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

/// Display bus configuration
///
/// The bus itself is brought up by the board; these values describe what
/// the panel expects of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// Clock frequency in Hz
    pub clock_hz: u32,
    /// Clock mode
    pub mode: Mode,
    /// Transactions the bus can hold in flight
    pub queue_depth: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            clock_hz: BUS_CLOCK_HZ,
            mode: Mode::Mode0,
            queue_depth: BUS_QUEUE_DEPTH,
        }
    }
}

impl BusConfig {
    /// Default configuration at the overclocked rate
    pub fn overclocked() -> Self {
        Self {
            clock_hz: BUS_CLOCK_OVERCLOCK_HZ,
            ..Self::default()
        }
    }

    /// Largest single transfer the bus must accept for `geometry`
    pub fn max_transfer_bytes(geometry: &DisplayGeometry) -> usize {
        geometry.band_words() * 2 + TRANSFER_SLACK_BYTES
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_hz == 0 {
            return Err(ConfigError::InvalidClock);
        }
        if (self.queue_depth as usize) < TRANSACTIONS_PER_BAND {
            return Err(ConfigError::QueueTooShallow);
        }
        Ok(())
    }
}
