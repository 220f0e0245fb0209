//! Display bus adapters

mod spi;

pub use spi::{spi_mode, SpiDisplayBus};
