//! Canonical Huffman tables

use super::bits::BitReader;
use super::source::ByteSource;
use super::{Corrupt, DecodeError};

/// Longest code length in a JPEG Huffman table
const MAX_CODE_LEN: usize = 16;

/// Most symbols a table can carry
const MAX_SYMBOLS: usize = 256;

/// One decoding table built from a DHT segment
pub struct HuffmanTable {
    values: [u8; MAX_SYMBOLS],
    /// Largest code of each length, -1 when the length is unused
    maxcode: [i32; MAX_CODE_LEN],
    /// Smallest code of each length
    mincode: [i32; MAX_CODE_LEN],
    /// Index into `values` of the first symbol of each length
    valptr: [i32; MAX_CODE_LEN],
    loaded: bool,
}

impl HuffmanTable {
    pub const fn new() -> Self {
        Self {
            values: [0; MAX_SYMBOLS],
            maxcode: [-1; MAX_CODE_LEN],
            mincode: [0; MAX_CODE_LEN],
            valptr: [0; MAX_CODE_LEN],
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn clear(&mut self) {
        self.loaded = false;
    }

    /// Build from per-length code counts and the symbols in code order
    pub fn build(&mut self, counts: &[u8; MAX_CODE_LEN], values: &[u8]) -> Result<(), DecodeError> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total == 0 || total > MAX_SYMBOLS || values.len() != total {
            return Err(Corrupt::Table.into());
        }

        let mut code: i32 = 0;
        let mut k: i32 = 0;
        for (len, &count) in counts.iter().enumerate() {
            let count = count as i32;
            if count > 0 {
                self.valptr[len] = k;
                self.mincode[len] = code;
                code += count;
                k += count;
                self.maxcode[len] = code - 1;
            } else {
                self.maxcode[len] = -1;
            }
            // Over-subscribed: more codes than the length can hold
            if code > (1 << (len + 1)) {
                return Err(Corrupt::Table.into());
            }
            code <<= 1;
        }

        self.values[..total].copy_from_slice(values);
        self.loaded = true;
        Ok(())
    }

    /// Decode one symbol
    pub fn decode<S: ByteSource + ?Sized>(
        &self,
        reader: &mut BitReader<'_, S>,
    ) -> Result<u8, DecodeError> {
        let mut code = reader.bits(1)? as i32;
        for len in 0..MAX_CODE_LEN {
            if code <= self.maxcode[len] {
                let index = self.valptr[len] + code - self.mincode[len];
                return Ok(self.values[index as usize]);
            }
            code = (code << 1) | reader.bits(1)? as i32;
        }
        Err(Corrupt::Huffman.into())
    }
}

impl Default for HuffmanTable {
    fn default() -> Self {
        Self::new()
    }
}
