//! Transfer slots

use alloc::vec::Vec;

use crate::image::{try_zeroed_words, AllocError, PixelAllocator};

/// Lifecycle of a slot within one frame
///
/// `Idle → Rendering → Rendered → Queued → Complete → Idle`, or
/// `Queued → Failed`. `Failed` holds until the next frame starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    Idle,
    Rendering,
    Rendered,
    /// Owned by the bus, queued or on the wire
    Queued,
    Complete,
    Failed,
}

/// One reusable band buffer
#[derive(Debug)]
pub(super) struct Slot {
    /// `None` while the bus holds the buffer, or after the bus lost it
    buffer: Option<Vec<u16>>,
    capacity: usize,
    state: SlotState,
}

impl Slot {
    pub fn new(capacity: usize) -> Result<Self, AllocError> {
        Ok(Self {
            buffer: Some(try_zeroed_words(capacity)?),
            capacity,
            state: SlotState::Idle,
        })
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Start of a frame
    pub fn reset(&mut self) {
        self.state = SlotState::Idle;
    }

    /// Full-size buffer to render into
    ///
    /// A buffer the bus never handed back is replaced from `allocator`.
    pub fn begin_render<A: PixelAllocator + ?Sized>(
        &mut self,
        allocator: &A,
    ) -> Result<&mut [u16], AllocError> {
        debug_assert!(matches!(self.state, SlotState::Idle));
        let buffer = match self.buffer.take() {
            Some(buffer) => buffer,
            None => {
                warn!("slot buffer lost, reallocating");
                allocator.allocate_row(self.capacity)?
            }
        };
        let buffer = self.buffer.insert(buffer);
        // Shortened by the previous hand-off; capacity is kept
        buffer.resize(self.capacity, 0);
        self.state = SlotState::Rendering;
        Ok(buffer.as_mut_slice())
    }

    pub fn finish_render(&mut self) {
        self.state = SlotState::Rendered;
    }

    /// Rendering failed
    pub fn abort(&mut self) {
        self.state = SlotState::Failed;
    }

    /// Give the first `words` of the buffer to the bus
    pub fn hand_off(&mut self, words: usize) -> Vec<u16> {
        let mut buffer = self.buffer.take().unwrap_or_default();
        buffer.truncate(words);
        self.state = SlotState::Queued;
        buffer
    }

    /// The bus finished with the buffer
    pub fn complete(&mut self, payload: Option<Vec<u16>>) {
        self.buffer = payload;
        self.state = SlotState::Complete;
    }

    /// The bus failed with the buffer
    pub fn fail(&mut self, payload: Option<Vec<u16>>) {
        self.buffer = payload;
        self.state = SlotState::Failed;
    }

    /// Back to idle once completion has been observed
    pub fn release(&mut self) {
        if self.state == SlotState::Complete {
            self.state = SlotState::Idle;
        }
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }
}
