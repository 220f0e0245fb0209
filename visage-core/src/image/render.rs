//! Band rendering

use super::canvas::PixelBuffer;
use super::memory::PixelAllocator;

/// Band rendering errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderBandError {
    /// Output holds fewer than `rows * width` words
    OutputTooSmall,
    /// Band reaches past the last visible row
    RowsOutOfRange,
}

/// Copy visible rows `first_row..first_row + rows` into `out`
///
/// Row-major, `width` words per row, margins excluded. Word `r * width + c`
/// equals `canvas.get(c, first_row + r)`; whole visible rows are copied at
/// once instead of looking up each cell. Returns the number of words
/// written. On error nothing is written.
pub fn render_band<A: PixelAllocator + ?Sized>(
    canvas: &PixelBuffer<'_, A>,
    first_row: u16,
    rows: u16,
    out: &mut [u16],
) -> Result<usize, RenderBandError> {
    if first_row as u32 + rows as u32 > canvas.height() as u32 {
        return Err(RenderBandError::RowsOutOfRange);
    }
    let width = canvas.width() as usize;
    let words = rows as usize * width;
    if out.len() < words {
        return Err(RenderBandError::OutputTooSmall);
    }

    for (y, dst) in (first_row..first_row + rows).zip(out[..words].chunks_exact_mut(width)) {
        dst.copy_from_slice(canvas.visible_row(y));
    }
    Ok(words)
}
