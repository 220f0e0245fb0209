//! Compressed input

use super::DecodeError;

/// Pull side of the decoder
pub trait ByteSource {
    /// Copy up to `buf.len()` of the next bytes into `buf`
    ///
    /// Returns how many were copied; 0 means the stream is exhausted.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        S::read(self, buf)
    }
}

/// Cursor over an in-memory asset
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n
    }
}

/// Size of the decoder's input window
pub const INPUT_CHUNK: usize = 512;

/// Buffered window over a [`ByteSource`]
pub struct InputBuffer {
    data: [u8; INPUT_CHUNK],
    pos: usize,
    len: usize,
}

impl InputBuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; INPUT_CHUNK],
            pos: 0,
            len: 0,
        }
    }

    /// Forget buffered bytes
    pub fn reset(&mut self) {
        self.pos = 0;
        self.len = 0;
    }

    /// Next byte, or `None` at end of stream
    pub fn next_byte<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Option<u8> {
        if self.pos == self.len {
            self.len = source.read(&mut self.data);
            self.pos = 0;
            if self.len == 0 {
                return None;
            }
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Some(byte)
    }

    /// Next byte, failing at end of stream
    pub fn byte<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<u8, DecodeError> {
        self.next_byte(source).ok_or(DecodeError::Truncated)
    }

    /// Next big-endian word
    pub fn word<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<u16, DecodeError> {
        let hi = self.byte(source)?;
        let lo = self.byte(source)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Discard `n` bytes
    pub fn skip<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
        mut n: usize,
    ) -> Result<(), DecodeError> {
        while n > 0 {
            if self.pos == self.len {
                self.len = source.read(&mut self.data);
                self.pos = 0;
                if self.len == 0 {
                    return Err(DecodeError::Truncated);
                }
            }
            let step = n.min(self.len - self.pos);
            self.pos += step;
            n -= step;
        }
        Ok(())
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
