//! Entropy-coded bit stream
//!
//! Reads MSB-first bits out of the scan data, dropping stuffed zero bytes
//! after `0xFF`. When a marker or the end of the stream is reached, the
//! reader pads with zero bits; consuming any of that padding is an error.

use super::source::{ByteSource, InputBuffer};
use super::{Corrupt, DecodeError};

/// First restart marker (RST0)
pub const RST0: u8 = 0xD0;

pub struct BitReader<'a, S: ByteSource + ?Sized> {
    input: &'a mut InputBuffer,
    source: &'a mut S,
    /// Pending bits, MSB aligned
    acc: u32,
    count: u32,
    /// Trailing bits of `acc` that are padding
    padding: u32,
    /// Marker that stopped the scan data
    marker: Option<u8>,
    exhausted: bool,
}

impl<'a, S: ByteSource + ?Sized> BitReader<'a, S> {
    pub fn new(input: &'a mut InputBuffer, source: &'a mut S) -> Self {
        Self {
            input,
            source,
            acc: 0,
            count: 0,
            padding: 0,
            marker: None,
            exhausted: false,
        }
    }

    /// Next data byte, or `None` once a marker or the end is hit
    fn data_byte(&mut self) -> Option<u8> {
        if self.marker.is_some() || self.exhausted {
            return None;
        }
        let Some(byte) = self.input.next_byte(self.source) else {
            self.exhausted = true;
            return None;
        };
        if byte != 0xFF {
            return Some(byte);
        }
        loop {
            match self.input.next_byte(self.source) {
                Some(0x00) => return Some(0xFF),
                Some(0xFF) => continue,
                Some(code) => {
                    self.marker = Some(code);
                    return None;
                }
                None => {
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }

    fn fill(&mut self) {
        while self.count <= 24 {
            let byte = match self.data_byte() {
                Some(b) => b,
                None => {
                    self.padding += 8;
                    0
                }
            };
            self.acc |= (byte as u32) << (24 - self.count);
            self.count += 8;
        }
    }

    /// Read `n` bits (at most 16)
    pub fn bits(&mut self, n: u32) -> Result<u32, DecodeError> {
        debug_assert!(n <= 16);
        if n == 0 {
            return Ok(0);
        }
        if self.count < n {
            self.fill();
        }
        if n > self.count - self.padding {
            return Err(if self.exhausted {
                DecodeError::Truncated
            } else {
                Corrupt::Marker.into()
            });
        }
        let value = self.acc >> (32 - n);
        self.acc <<= n;
        self.count -= n;
        Ok(value)
    }

    /// Read an `s`-bit magnitude and sign-extend it
    pub fn receive_extend(&mut self, s: u8) -> Result<i32, DecodeError> {
        if s == 0 {
            return Ok(0);
        }
        let v = self.bits(s as u32)? as i32;
        if v < 1 << (s - 1) {
            Ok(v - (1 << s) + 1)
        } else {
            Ok(v)
        }
    }

    /// Skip to the next restart marker
    ///
    /// Returns whether it carried the expected number (0..=7). Any other
    /// marker is an error.
    pub fn restart(&mut self, expected: u8) -> Result<bool, DecodeError> {
        self.acc = 0;
        self.count = 0;
        self.padding = 0;

        while self.marker.is_none() {
            if self.exhausted {
                return Err(DecodeError::Truncated);
            }
            let _ = self.data_byte();
        }

        match self.marker.take() {
            Some(code) if (RST0..RST0 + 8).contains(&code) => Ok(code == RST0 + expected),
            _ => Err(Corrupt::Restart.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg::source::SliceSource;

    #[test]
    fn test_bits_msb_first() {
        let data = [0b1010_1100, 0b0101_0011];
        let mut source = SliceSource::new(&data);
        let mut input = InputBuffer::new();
        let mut reader = BitReader::new(&mut input, &mut source);

        assert_eq!(reader.bits(1), Ok(1));
        assert_eq!(reader.bits(3), Ok(0b010));
        assert_eq!(reader.bits(0), Ok(0));
        assert_eq!(reader.bits(8), Ok(0b1100_0101));
        assert_eq!(reader.bits(4), Ok(0b0011));
        assert_eq!(reader.bits(1), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_stuffed_byte() {
        let data = [0xFF, 0x00, 0x12];
        let mut source = SliceSource::new(&data);
        let mut input = InputBuffer::new();
        let mut reader = BitReader::new(&mut input, &mut source);

        assert_eq!(reader.bits(16), Ok(0xFF12));
    }

    #[test]
    fn test_marker_stops_data() {
        let data = [0xAB, 0xFF, 0xD9];
        let mut source = SliceSource::new(&data);
        let mut input = InputBuffer::new();
        let mut reader = BitReader::new(&mut input, &mut source);

        assert_eq!(reader.bits(8), Ok(0xAB));
        assert_eq!(reader.bits(1), Err(DecodeError::Corrupt(Corrupt::Marker)));
    }

    #[test]
    fn test_receive_extend() {
        // 3-bit fields: 000 -> -7, 011 -> -4, 100 -> 4, 111 -> 7
        let data = [0b000_011_10, 0b0_111_0000];
        let mut source = SliceSource::new(&data);
        let mut input = InputBuffer::new();
        let mut reader = BitReader::new(&mut input, &mut source);

        assert_eq!(reader.receive_extend(3), Ok(-7));
        assert_eq!(reader.receive_extend(3), Ok(-4));
        assert_eq!(reader.receive_extend(3), Ok(4));
        assert_eq!(reader.receive_extend(3), Ok(7));
        assert_eq!(reader.receive_extend(0), Ok(0));
    }

    #[test]
    fn test_restart_sequence() {
        let data = [0b1011_1111, 0xFF, 0xD0, 0x80, 0xFF, 0xD5, 0x40, 0xFF, 0xD9];
        let mut source = SliceSource::new(&data);
        let mut input = InputBuffer::new();
        let mut reader = BitReader::new(&mut input, &mut source);

        assert_eq!(reader.bits(3), Ok(0b101));
        assert_eq!(reader.restart(0), Ok(true));
        assert_eq!(reader.bits(1), Ok(1));
        // RST5 where RST1 was due
        assert_eq!(reader.restart(1), Ok(false));
        assert_eq!(reader.bits(2), Ok(0b01));
        assert_eq!(
            reader.restart(2),
            Err(DecodeError::Corrupt(Corrupt::Restart))
        );
    }
}
