//! Render sessions
//!
//! [`ImagePipeline`] owns the transport and the decoder and runs one image
//! at a time: allocate the canvas, decode into it, release the decoder
//! scratch, then stream the bands. The canvas is dropped, and its rows
//! released, before `show` returns on every path.

use visage_protocol::{Mood, MOOD_COUNT};

use crate::config::{DisplayGeometry, RenderConfig};
use crate::error::RenderError;
use crate::image::{HeapAllocator, PixelAllocator, PixelBuffer};
use crate::jpeg::{decode_into, BaselineDecoder, DecodeStatus, StreamDecoder};
use crate::traits::DisplayBus;
use crate::transport::DoubleBufferedTransport;

/// One face asset per mood
#[derive(Debug, Clone, Copy)]
pub struct FaceSet<'a> {
    assets: [&'a [u8]; MOOD_COUNT],
}

impl<'a> FaceSet<'a> {
    /// Assets in [`Mood::ALL`] order
    pub const fn new(assets: [&'a [u8]; MOOD_COUNT]) -> Self {
        Self { assets }
    }

    pub fn asset(&self, mood: Mood) -> &'a [u8] {
        self.assets[mood.index()]
    }
}

/// Decode-then-stream pipeline bound to one display bus
pub struct ImagePipeline<B: DisplayBus, D = BaselineDecoder, A = HeapAllocator> {
    transport: DoubleBufferedTransport<B>,
    decoder: D,
    allocator: A,
    geometry: DisplayGeometry,
}

impl<B: DisplayBus> ImagePipeline<B> {
    /// Pipeline with the baseline decoder on the global heap
    pub fn with_defaults(bus: B, config: &RenderConfig) -> Result<Self, RenderError> {
        Self::new(bus, BaselineDecoder::new(), HeapAllocator, config)
    }
}

impl<B, D, A> ImagePipeline<B, D, A>
where
    B: DisplayBus,
    D: StreamDecoder,
    A: PixelAllocator,
{
    pub fn new(
        bus: B,
        decoder: D,
        allocator: A,
        config: &RenderConfig,
    ) -> Result<Self, RenderError> {
        let transport = DoubleBufferedTransport::new(bus, config)?;
        Ok(Self {
            transport,
            decoder,
            allocator,
            geometry: config.geometry,
        })
    }

    /// Decode `asset` and send it to the panel
    ///
    /// The asset must be exactly the canvas size, margins included. A
    /// restart-marker mismatch is reported through the returned status;
    /// every other decoder complaint fails the render before anything is
    /// sent.
    pub fn show(&mut self, asset: &[u8]) -> Result<DecodeStatus, RenderError> {
        let mut canvas = PixelBuffer::allocate(&self.geometry, &self.allocator).map_err(|e| {
            error!("no memory for canvas");
            e
        })?;

        let status = {
            let mut scratch = self.allocator.allocate_scratch().map_err(|e| {
                error!("no memory for decoder scratch");
                e
            })?;
            decode_into(&mut self.decoder, scratch.workspace(), asset, &mut canvas).map_err(
                |e| {
                    error!("decode failed: {}", e);
                    e
                },
            )?
        };
        if status == DecodeStatus::RestartMismatch {
            warn!("restart markers out of sequence, image kept");
        }

        self.transport.stream(&canvas)?;
        debug!("image shown, {} bytes", asset.len());
        Ok(status)
    }

    /// Show the face for `mood`
    pub fn show_mood(
        &mut self,
        mood: Mood,
        faces: &FaceSet<'_>,
    ) -> Result<DecodeStatus, RenderError> {
        debug!("mood {}", mood);
        self.show(faces.asset(mood))
    }

    pub fn transport(&self) -> &DoubleBufferedTransport<B> {
        &self.transport
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.transport.release()
    }
}
