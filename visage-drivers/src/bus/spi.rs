//! Blocking SPI display bus
//!
//! Sends each band as soon as it is queued and keeps the outcome for the
//! next wait. The D/C line is driven low for command bytes and high for
//! parameters and pixels.
//!
//! The board opens the SPI device at [`BusConfig::clock_hz`] in
//! [`spi_mode`]`(config.mode)`; the adapter checks every transfer against
//! the size the configuration allows.
//!
//! ```ignore
//! let render = RenderConfig::default();
//! let bus_config = BusConfig::default();
//! let bus = SpiDisplayBus::with_config(spi_device, dc_pin, &bus_config, &render.geometry)?;
//! let mut pipeline = ImagePipeline::with_defaults(bus, &render)?;
//! pipeline.show(FACE)?;
//! ```

use alloc::vec::Vec;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use heapless::Vec as BoundedVec;
use visage_core::config::{BusConfig, ConfigError, DisplayGeometry, Mode};
use visage_core::traits::{BusError, Completion, DisplayBus};
use visage_protocol::{BandFrame, Transaction};

/// Pixel bytes per SPI write
const CHUNK_BYTES: usize = 64;

/// `embedded-hal` form of a configured clock mode
pub fn spi_mode(mode: Mode) -> embedded_hal::spi::Mode {
    use embedded_hal::spi::{Phase, Polarity};
    use visage_core::config::{Phase as ClockPhase, Polarity as ClockPolarity};

    let (polarity, phase): (ClockPolarity, ClockPhase) = mode.into();
    embedded_hal::spi::Mode {
        polarity: match polarity {
            ClockPolarity::IdleLow => Polarity::IdleLow,
            ClockPolarity::IdleHigh => Polarity::IdleHigh,
        },
        phase: match phase {
            ClockPhase::CaptureOnFirstTransition => Phase::CaptureOnFirstTransition,
            ClockPhase::CaptureOnSecondTransition => Phase::CaptureOnSecondTransition,
        },
    }
}

/// SPI device plus data/command pin
pub struct SpiDisplayBus<SPI, DC> {
    spi: SPI,
    dc: DC,
    config: BusConfig,
    /// Largest transaction accepted, in bytes
    max_transfer: usize,
    /// Result and buffer of the last band, held until `wait`
    outcome: Option<Completion>,
    bands_sent: u32,
}

impl<SPI: SpiDevice, DC: OutputPin> SpiDisplayBus<SPI, DC> {
    /// Create a bus over an already configured device, with no transfer limit
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self {
            spi,
            dc,
            config: BusConfig::default(),
            max_transfer: usize::MAX,
            outcome: None,
            bands_sent: 0,
        }
    }

    /// Create a bus that accepts bands up to the size of `geometry`
    pub fn with_config(
        spi: SPI,
        dc: DC,
        config: &BusConfig,
        geometry: &DisplayGeometry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        geometry.validate()?;
        Ok(Self {
            config: *config,
            max_transfer: BusConfig::max_transfer_bytes(geometry),
            ..Self::new(spi, dc)
        })
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Bands transmitted without error
    pub fn bands_sent(&self) -> u32 {
        self.bands_sent
    }

    /// Get the device and pin back
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }

    fn send(&mut self, transaction: &Transaction<'_>) -> Result<(), BusError> {
        if transaction.is_data() {
            self.dc.set_high().map_err(|_| BusError::Transfer)?;
        } else {
            self.dc.set_low().map_err(|_| BusError::Transfer)?;
        }

        match transaction {
            Transaction::Command(code) => self.write(&[*code]),
            Transaction::Parameters(params) => self.write(params),
            Transaction::Pixels(words) => {
                let mut chunk: BoundedVec<u8, CHUNK_BYTES> = BoundedVec::new();
                for word in words.iter() {
                    // Cells are byte-swapped, so little-endian is wire order
                    if chunk.extend_from_slice(&word.to_le_bytes()).is_err() {
                        self.write(&chunk)?;
                        chunk.clear();
                        chunk
                            .extend_from_slice(&word.to_le_bytes())
                            .map_err(|_| BusError::Transfer)?;
                    }
                }
                if !chunk.is_empty() {
                    self.write(&chunk)?;
                }
                Ok(())
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        self.spi.write(bytes).map_err(|_| BusError::Transfer)
    }
}

impl<SPI: SpiDevice, DC: OutputPin> DisplayBus for SpiDisplayBus<SPI, DC> {
    fn enqueue(&mut self, frame: BandFrame<Vec<u16>>) -> Result<(), (BusError, Vec<u16>)> {
        if self.outcome.is_some() {
            return Err((BusError::Queue, frame.into_payload()));
        }
        let oversized = frame
            .transactions()
            .iter()
            .any(|t| t.wire_len() > self.max_transfer);
        if oversized {
            return Err((BusError::Queue, frame.into_payload()));
        }

        let mut status = Ok(());
        for transaction in frame.transactions().iter() {
            if let Err(e) = self.send(transaction) {
                status = Err(e);
                break;
            }
        }
        if status.is_ok() {
            self.bands_sent += 1;
        }

        self.outcome = Some((status, Some(frame.into_payload())));
        Ok(())
    }

    fn wait(&mut self, _timeout_ms: u32) -> Completion {
        self.outcome.take().unwrap_or((Err(BusError::Idle), None))
    }
}
