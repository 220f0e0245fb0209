//! Mocks shared by the unit tests

use alloc::vec::Vec;
use core::cell::Cell;

use visage_protocol::{BandFrame, Transaction};

use crate::image::{AllocError, PixelAllocator};
use crate::jpeg::Scratch;
use crate::traits::{BusError, Completion, DisplayBus};

/// Allocator that counts rows and can fail the Nth row (1-based)
pub struct CountingAllocator {
    fail_at: Option<usize>,
    fail_scratch: bool,
    attempts: Cell<usize>,
    allocated: Cell<usize>,
    released: Cell<usize>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self {
            fail_at: None,
            fail_scratch: false,
            attempts: Cell::new(0),
            allocated: Cell::new(0),
            released: Cell::new(0),
        }
    }

    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::new()
        }
    }

    pub fn without_scratch() -> Self {
        Self {
            fail_scratch: true,
            ..Self::new()
        }
    }

    pub fn allocated(&self) -> usize {
        self.allocated.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }
}

impl PixelAllocator for CountingAllocator {
    fn allocate_row(&self, len: usize) -> Result<Vec<u16>, AllocError> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if self.fail_at == Some(attempt) {
            return Err(AllocError);
        }
        self.allocated.set(self.allocated.get() + 1);
        Ok(alloc::vec![0; len])
    }

    fn release_row(&self, row: Vec<u16>) {
        self.released.set(self.released.get() + 1);
        drop(row);
    }

    fn allocate_scratch(&self) -> Result<Scratch, AllocError> {
        if self.fail_scratch {
            return Err(AllocError);
        }
        Scratch::try_new()
    }
}

fn checksum(acc: u32, words: &[u16]) -> u32 {
    words
        .iter()
        .fold(acc, |acc, &w| acc.rotate_left(5) ^ w as u32)
}

/// Bus that records every band and completes it on the next wait
///
/// Each payload is checksummed when queued and again, chunk by chunk, while
/// it drains over `latency` polls; a difference counts as a violation. A
/// band queued in the same buffer as the band before it counts as aliased.
pub struct RecordingBus {
    pub tops: heapless::Vec<u16, 64>,
    pub rows: heapless::Vec<u16, 64>,
    /// First pixel word of each band
    pub first_words: heapless::Vec<u16, 64>,
    pub enqueues: usize,
    pub completions: usize,
    pub violations: usize,
    /// Enqueue while a band was still outstanding
    pub overlaps: usize,
    pub aliased: usize,
    /// Polls a band spends on the wire; one poll per millisecond of timeout
    pub latency: usize,
    pub polls: usize,
    /// Fail the wait for this band index
    pub fail_wait_at: Option<usize>,
    /// Refuse to queue this band index
    pub fail_enqueue_at: Option<usize>,
    pub error: BusError,
    /// Keep payloads instead of handing them back
    pub lose_payloads: bool,
    pending: Option<(usize, u32, BandFrame<Vec<u16>>)>,
    last_buffer: Option<usize>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self {
            tops: heapless::Vec::new(),
            rows: heapless::Vec::new(),
            first_words: heapless::Vec::new(),
            enqueues: 0,
            completions: 0,
            violations: 0,
            overlaps: 0,
            aliased: 0,
            latency: 1,
            polls: 0,
            fail_wait_at: None,
            fail_enqueue_at: None,
            error: BusError::Transfer,
            lose_payloads: false,
            pending: None,
            last_buffer: None,
        }
    }

    pub fn failing_wait(band: usize, error: BusError) -> Self {
        Self {
            fail_wait_at: Some(band),
            error,
            ..Self::new()
        }
    }

    /// A band is queued and not yet waited for
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl DisplayBus for RecordingBus {
    fn enqueue(&mut self, frame: BandFrame<Vec<u16>>) -> Result<(), (BusError, Vec<u16>)> {
        let index = self.enqueues;
        self.enqueues += 1;
        if self.fail_enqueue_at == Some(index) {
            return Err((self.error, frame.into_payload()));
        }
        if self.pending.is_some() {
            self.overlaps += 1;
        }

        let tx = frame.transactions();
        assert_eq!(tx[0], Transaction::Command(0x2A));
        assert!(matches!(tx[1], Transaction::Parameters(_)));
        assert_eq!(tx[2], Transaction::Command(0x2B));
        assert!(matches!(tx[3], Transaction::Parameters(_)));
        assert_eq!(tx[4], Transaction::Command(0x2C));
        assert!(matches!(tx[5], Transaction::Pixels(_)));

        let _ = self.tops.push(frame.first_row());
        let _ = self.rows.push(frame.rows());
        let _ = self
            .first_words
            .push(frame.payload().first().copied().unwrap_or_default());
        let buffer = frame.payload().as_ptr() as usize;
        if !self.lose_payloads && self.last_buffer == Some(buffer) {
            self.aliased += 1;
        }
        self.last_buffer = Some(buffer);

        let sum = checksum(0, frame.payload());
        self.pending = Some((index, sum, frame));
        Ok(())
    }

    fn wait(&mut self, timeout_ms: u32) -> Completion {
        let Some((index, sum, frame)) = self.pending.take() else {
            return (Err(BusError::Idle), None);
        };

        let latency = self.latency.max(1);
        if latency > timeout_ms as usize {
            self.polls += timeout_ms as usize;
            return (Err(BusError::Timeout), Some(frame.into_payload()));
        }
        let words = frame.payload();
        let step = words.len().div_ceil(latency).max(1);
        let mut drained = 0;
        for chunk in words.chunks(step) {
            self.polls += 1;
            drained = checksum(drained, chunk);
        }
        if drained != sum {
            self.violations += 1;
        }
        let payload = if self.lose_payloads {
            None
        } else {
            Some(frame.into_payload())
        };
        if self.fail_wait_at == Some(index) {
            return (Err(self.error), payload);
        }
        self.completions += 1;
        (Ok(()), payload)
    }
}
