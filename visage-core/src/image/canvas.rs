//! Margin-aware pixel canvas

use alloc::vec::Vec;

use super::color::pack_wire;
use super::memory::{AllocError, PixelAllocator};
use crate::config::DisplayGeometry;
use crate::jpeg::{Rect, RectSink, SinkRejected};

/// Decoded bitmap with a border on every side
///
/// Logical coordinates run from `-margin` to `width + margin - 1`
/// horizontally and likewise vertically; `(0, 0)` is the top-left visible
/// pixel. Cells are byte-swapped RGB565 (see [`super::color`]).
///
/// Rows come from a [`PixelAllocator`] one at a time and are handed back to
/// it when the buffer is dropped, including when allocation stops partway.
pub struct PixelBuffer<'a, A: PixelAllocator + ?Sized> {
    rows: Vec<Vec<u16>>,
    width: u16,
    height: u16,
    margin: u16,
    allocator: &'a A,
}

impl<'a, A: PixelAllocator + ?Sized> PixelBuffer<'a, A> {
    /// Allocate a zeroed canvas for `geometry`
    pub fn allocate(geometry: &DisplayGeometry, allocator: &'a A) -> Result<Self, AllocError> {
        let canvas_width = geometry.canvas_width();
        let canvas_height = geometry.canvas_height();

        let mut rows = Vec::new();
        rows.try_reserve_exact(canvas_height).map_err(|_| AllocError)?;

        let mut buffer = Self {
            rows,
            width: geometry.width,
            height: geometry.height,
            margin: geometry.margin,
            allocator,
        };

        for y in 0..canvas_height {
            match allocator.allocate_row(canvas_width) {
                Ok(row) => buffer.rows.push(row),
                Err(e) => {
                    warn!("canvas row {} of {} not allocated", y, canvas_height);
                    return Err(e);
                }
            }
        }

        trace!("canvas {}x{} allocated", canvas_width, canvas_height);
        Ok(buffer)
    }

    /// Cell at logical `(x, y)`
    ///
    /// # Panics
    ///
    /// If the coordinate is outside the extended canvas.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u16 {
        let m = self.margin as i32;
        self.rows[(y + m) as usize][(x + m) as usize]
    }

    /// Cell at logical `(x, y)`, or `None` outside the extended canvas
    pub fn checked_get(&self, x: i32, y: i32) -> Option<u16> {
        let m = self.margin as i32;
        let px = usize::try_from(x.checked_add(m)?).ok()?;
        let py = usize::try_from(y.checked_add(m)?).ok()?;
        self.rows.get(py)?.get(px).copied()
    }

    /// Visible cells of logical row `y` (columns `0..width`)
    ///
    /// # Panics
    ///
    /// If `y` is not a visible row.
    pub fn visible_row(&self, y: u16) -> &[u16] {
        assert!(y < self.height, "row {} outside the panel", y);
        let m = self.margin as usize;
        &self.rows[y as usize + m][m..m + self.width as usize]
    }

    /// Whole physical row, margins included
    pub fn row_mut(&mut self, physical: usize) -> Option<&mut [u16]> {
        self.rows.get_mut(physical).map(Vec::as_mut_slice)
    }

    /// Visible width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Visible height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Border width
    pub fn margin(&self) -> u16 {
        self.margin
    }

    /// Width including both margins
    pub fn canvas_width(&self) -> usize {
        self.width as usize + 2 * self.margin as usize
    }

    /// Height including both margins
    pub fn canvas_height(&self) -> usize {
        self.rows.len()
    }

    /// Allocator the rows came from
    pub fn allocator(&self) -> &'a A {
        self.allocator
    }
}

impl<A: PixelAllocator + ?Sized> RectSink for PixelBuffer<'_, A> {
    fn write(&mut self, rect: Rect, rgb: &[u8]) -> Result<(), SinkRejected> {
        if rect.right < rect.left || rect.bottom < rect.top {
            return Err(SinkRejected);
        }
        let (left, right) = (rect.left as usize, rect.right as usize);
        let (top, bottom) = (rect.top as usize, rect.bottom as usize);
        if right >= self.canvas_width() || bottom >= self.canvas_height() {
            return Err(SinkRejected);
        }

        let stride = (right - left + 1) * 3;
        if rgb.len() < stride * (bottom - top + 1) {
            return Err(SinkRejected);
        }

        for (row, samples) in self.rows[top..=bottom].iter_mut().zip(rgb.chunks_exact(stride)) {
            for (cell, px) in row[left..=right].iter_mut().zip(samples.chunks_exact(3)) {
                *cell = pack_wire(px[0], px[1], px[2]);
            }
        }
        Ok(())
    }
}

impl<A: PixelAllocator + ?Sized> Drop for PixelBuffer<'_, A> {
    fn drop(&mut self) {
        let allocator = self.allocator;
        for row in self.rows.drain(..) {
            allocator.release_row(row);
        }
    }
}
