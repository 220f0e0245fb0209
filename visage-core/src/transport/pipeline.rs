//! Band loop

use visage_protocol::BandFrame;

use super::slot::{Slot, SlotState};
use super::TransportError;
use crate::config::{Band, DisplayGeometry, RenderConfig};
use crate::image::{render_band, PixelAllocator, PixelBuffer};
use crate::traits::DisplayBus;

/// Streams a canvas to the bus band by band, rendering the next band while
/// the previous one is on the wire
///
/// Owns the bus for its lifetime; [`release`](Self::release) gives it back.
pub struct DoubleBufferedTransport<B: DisplayBus> {
    bus: B,
    geometry: DisplayGeometry,
    wait_timeout_ms: u32,
    slots: [Slot; 2],
}

impl<B: DisplayBus> DoubleBufferedTransport<B> {
    /// Take the bus and allocate both slots
    pub fn new(bus: B, config: &RenderConfig) -> Result<Self, TransportError> {
        config.validate().map_err(TransportError::Config)?;
        let words = config.geometry.band_words();
        let slots = [Slot::new(words)?, Slot::new(words)?];

        debug!(
            "transport ready, {} bands of {} words",
            config.geometry.band_count(),
            words
        );

        Ok(Self {
            bus,
            geometry: config.geometry,
            wait_timeout_ms: config.wait_timeout_ms,
            slots,
        })
    }

    /// Send every visible row of `canvas`, top band first
    ///
    /// Returns once the last band has completed. On the first bus failure
    /// nothing further is rendered or queued. If a band cannot be rendered,
    /// the band already in flight is waited for before the error returns, so
    /// the bus is idle again either way.
    pub fn stream<A: PixelAllocator + ?Sized>(
        &mut self,
        canvas: &PixelBuffer<'_, A>,
    ) -> Result<(), TransportError> {
        if canvas.width() != self.geometry.width || canvas.height() != self.geometry.height {
            return Err(TransportError::GeometryMismatch);
        }
        for slot in self.slots.iter_mut() {
            slot.reset();
        }

        let mut free = 0;
        let mut in_flight: Option<(usize, u16)> = None;

        for band in self.geometry.bands() {
            let words = match self.render(free, canvas, band) {
                Ok(words) => words,
                Err(e) => {
                    // Drain the bus before giving up; a failure there is logged by settle
                    if let Some((busy, top)) = in_flight.take() {
                        let _ = self.settle(busy, top);
                    }
                    return Err(e);
                }
            };

            if let Some((busy, top)) = in_flight.take() {
                self.settle(busy, top)?;
            }

            self.dispatch(free, band, words)?;
            in_flight = Some((free, band.top));
            free ^= 1;
        }

        if let Some((busy, top)) = in_flight {
            self.settle(busy, top)?;
        }

        trace!("frame sent");
        Ok(())
    }

    fn render<A: PixelAllocator + ?Sized>(
        &mut self,
        index: usize,
        canvas: &PixelBuffer<'_, A>,
        band: Band,
    ) -> Result<usize, TransportError> {
        let slot = &mut self.slots[index];
        let out = slot.begin_render(canvas.allocator())?;
        match render_band(canvas, band.top, band.rows, out) {
            Ok(words) => {
                slot.finish_render();
                Ok(words)
            }
            Err(e) => {
                slot.abort();
                error!("band at row {} not rendered", band.top);
                Err(e.into())
            }
        }
    }

    fn dispatch(&mut self, index: usize, band: Band, words: usize) -> Result<(), TransportError> {
        let slot = &mut self.slots[index];
        let payload = slot.hand_off(words);

        let frame = match BandFrame::new(self.geometry.width, band.top, band.rows, payload) {
            Ok(frame) => frame,
            Err(e) => {
                slot.fail(None);
                return Err(e.into());
            }
        };

        if let Err((error, payload)) = self.bus.enqueue(frame) {
            slot.fail(Some(payload));
            error!("band at row {} not queued: {}", band.top, error);
            return Err(TransportError::Transfer {
                band_top: band.top,
                error,
            });
        }
        Ok(())
    }

    /// Wait for the band in slot `index`; its buffer comes back to the slot
    fn settle(&mut self, index: usize, band_top: u16) -> Result<(), TransportError> {
        let (status, payload) = self.bus.wait(self.wait_timeout_ms);
        let slot = &mut self.slots[index];
        match status {
            Ok(()) => {
                slot.complete(payload);
                slot.release();
                Ok(())
            }
            Err(error) => {
                slot.fail(payload);
                error!("band at row {} failed: {}", band_top, error);
                Err(TransportError::Transfer { band_top, error })
            }
        }
    }

    /// Current state of both slots
    pub fn slot_states(&self) -> [SlotState; 2] {
        [self.slots[0].state(), self.slots[1].state()]
    }

    pub fn geometry(&self) -> &DisplayGeometry {
        &self.geometry
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }
}
