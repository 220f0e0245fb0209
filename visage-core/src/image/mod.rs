//! Decoded pixels
//!
//! The decoder fills a [`PixelBuffer`] whose cells are already in bus byte
//! order; [`render_band`] copies the visible part of it one band at a time.

mod canvas;
pub mod color;
mod memory;
mod render;

pub use canvas::PixelBuffer;
pub use memory::{AllocError, HeapAllocator, PixelAllocator};
pub use render::{render_band, RenderBandError};

pub(crate) use memory::try_zeroed_words;
