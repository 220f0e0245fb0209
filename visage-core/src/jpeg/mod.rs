//! Streaming baseline JPEG decoding
//!
//! The decoder pulls compressed bytes from a [`ByteSource`] and pushes
//! decoded rectangles of RGB888 samples into a [`RectSink`], one MCU at a
//! time. All of its working memory lives in a caller-provided
//! [`Workspace`], so decoding never allocates.
//!
//! Decoding happens in two steps, mirroring how the stream is laid out:
//! [`StreamDecoder::prepare`] parses the header segments up to the start
//! of scan, and [`StreamDecoder::decompress`] runs the entropy-coded data.

mod bits;
mod decoder;
mod huffman;
mod idct;
mod source;
mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use decoder::BaselineDecoder;
pub use source::{ByteSource, SliceSource};
pub use workspace::{Scratch, Workspace, WORKSPACE_SIZE};

use crate::image::{PixelAllocator, PixelBuffer};

/// Rectangle of image pixels, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

impl Rect {
    /// Columns covered
    pub fn width(&self) -> usize {
        (self.right as usize + 1).saturating_sub(self.left as usize)
    }

    /// Rows covered
    pub fn height(&self) -> usize {
        (self.bottom as usize + 1).saturating_sub(self.top as usize)
    }
}

/// The sink refused a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SinkRejected;

/// Receiver of decoded pixels
pub trait RectSink {
    /// Take one rectangle of RGB888 samples in row-major order
    ///
    /// Returning an error stops decoding with [`DecodeError::Interrupted`].
    fn write(&mut self, rect: Rect, rgb: &[u8]) -> Result<(), SinkRejected>;
}

/// Frame parameters found by [`StreamDecoder::prepare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    pub width: u16,
    pub height: u16,
    pub components: u8,
    /// MCU size in pixels
    pub mcu_width: u16,
    pub mcu_height: u16,
    /// MCUs between restart markers, 0 when disabled
    pub restart_interval: u16,
}

/// Successful decode outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeStatus {
    /// Every MCU decoded cleanly
    Complete,
    /// A restart marker was out of sequence; decoding resynchronized on it
    /// and the image is complete
    RestartMismatch,
}

/// Stream features the decoder does not implement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unsupported {
    Progressive,
    Lossless,
    Hierarchical,
    Arithmetic,
    /// Sample precision other than 8 bits
    Precision,
    /// Component count other than 1 or 3
    Components,
    /// Chroma subsampling other than 4:4:4, 4:2:2 and 4:2:0
    Sampling,
    /// Scan does not carry every component
    MultipleScans,
    /// Height deferred to a DNL segment
    DeferredHeight,
}

/// Malformed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Corrupt {
    /// Unexpected or missing marker
    Marker,
    /// Segment length or content invalid
    Segment,
    /// Scan starts before the frame header
    MissingFrame,
    /// Scan references a table that was never defined
    MissingTable,
    /// Table definition invalid
    Table,
    /// Entropy-coded data does not match the Huffman tables
    Huffman,
    /// Non-restart marker where a restart was due
    Restart,
}

/// Decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Stream does not start with SOI
    NotJpeg,
    /// Stream ended early
    Truncated,
    Unsupported(Unsupported),
    Corrupt(Corrupt),
    /// Frame size differs from the target canvas
    DimensionMismatch,
    /// Sink stopped the decode
    Interrupted,
    /// `decompress` without a successful `prepare`
    NotPrepared,
}

impl From<Unsupported> for DecodeError {
    fn from(u: Unsupported) -> Self {
        DecodeError::Unsupported(u)
    }
}

impl From<Corrupt> for DecodeError {
    fn from(c: Corrupt) -> Self {
        DecodeError::Corrupt(c)
    }
}

/// Two-step streaming decoder
pub trait StreamDecoder {
    /// Parse header segments up to the start of scan
    fn prepare<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
        workspace: &mut Workspace,
    ) -> Result<FrameHeader, DecodeError>;

    /// Decode the scan, pushing every MCU into `sink`
    ///
    /// `source` and `workspace` must be the ones given to `prepare`.
    fn decompress<S: ByteSource + ?Sized, K: RectSink + ?Sized>(
        &mut self,
        source: &mut S,
        workspace: &mut Workspace,
        sink: &mut K,
    ) -> Result<DecodeStatus, DecodeError>;
}

/// Decode `asset` into `canvas`
///
/// The frame must be exactly the canvas size, margins included, so that
/// every cell is written.
pub fn decode_into<D, A>(
    decoder: &mut D,
    workspace: &mut Workspace,
    asset: &[u8],
    canvas: &mut PixelBuffer<'_, A>,
) -> Result<DecodeStatus, DecodeError>
where
    D: StreamDecoder + ?Sized,
    A: PixelAllocator + ?Sized,
{
    let mut source = SliceSource::new(asset);
    let header = decoder.prepare(&mut source, workspace)?;

    if header.width as usize != canvas.canvas_width()
        || header.height as usize != canvas.canvas_height()
    {
        warn!(
            "asset is {}x{}, canvas is {}x{}",
            header.width,
            header.height,
            canvas.canvas_width(),
            canvas.canvas_height()
        );
        return Err(DecodeError::DimensionMismatch);
    }

    decoder.decompress(&mut source, workspace, canvas)
}
