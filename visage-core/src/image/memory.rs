//! Fallible pixel memory
//!
//! Row and scratch allocations go through [`PixelAllocator`] so that
//! out-of-memory is an error the session reports instead of an abort, and
//! so tests can fail the Nth allocation and count releases.

use alloc::vec::Vec;

use crate::jpeg::Scratch;

/// Allocation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocError;

/// Source of canvas rows and decoder scratch
pub trait PixelAllocator {
    /// Allocate a zeroed row of `len` cells
    fn allocate_row(&self, len: usize) -> Result<Vec<u16>, AllocError>;

    /// Give a row back
    fn release_row(&self, row: Vec<u16>) {
        drop(row);
    }

    /// Allocate decoder scratch
    fn allocate_scratch(&self) -> Result<Scratch, AllocError> {
        Scratch::try_new()
    }
}

impl<A: PixelAllocator + ?Sized> PixelAllocator for &A {
    fn allocate_row(&self, len: usize) -> Result<Vec<u16>, AllocError> {
        A::allocate_row(self, len)
    }

    fn release_row(&self, row: Vec<u16>) {
        A::release_row(self, row)
    }

    fn allocate_scratch(&self) -> Result<Scratch, AllocError> {
        A::allocate_scratch(self)
    }
}

/// Global heap allocator
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl PixelAllocator for HeapAllocator {
    fn allocate_row(&self, len: usize) -> Result<Vec<u16>, AllocError> {
        try_zeroed_words(len)
    }
}

/// Allocate `len` zeroed words, reporting failure instead of aborting
pub(crate) fn try_zeroed_words(len: usize) -> Result<Vec<u16>, AllocError> {
    let mut words = Vec::new();
    words.try_reserve_exact(len).map_err(|_| AllocError)?;
    words.resize(len, 0);
    Ok(words)
}
