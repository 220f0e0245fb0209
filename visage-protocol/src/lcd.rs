//! Panel controller framing for one band of pixel rows.
//!
//! The panel speaks the MIPI DCS subset used by ILI9341-class controllers:
//! - `0x2A` column address set: start/end column, 16-bit big-endian each
//! - `0x2B` page (row) address set: start/end row, 16-bit big-endian each
//! - `0x2C` memory write: pixel data follows until the next command
//!
//! Both address ranges are inclusive.

/// Column address set
pub const CMD_COLUMN_ADDRESS_SET: u8 = 0x2A;

/// Page (row) address set
pub const CMD_PAGE_ADDRESS_SET: u8 = 0x2B;

/// Memory write
pub const CMD_MEMORY_WRITE: u8 = 0x2C;

/// Number of bus transactions that make up one band
pub const TRANSACTIONS_PER_BAND: usize = 6;

/// Errors from building a band frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Band has zero rows or zero columns
    EmptyBand,
    /// Payload word count does not equal rows × width
    PayloadLength,
    /// Band extends past the 16-bit address space
    AddressOverflow,
}

/// One ordered bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction<'a> {
    /// Single command byte, sent with D/C low
    Command(u8),
    /// Four parameter bytes, sent with D/C high
    Parameters([u8; 4]),
    /// Pixel words, sent with D/C high
    ///
    /// Each word holds a byte-swapped RGB565 value, so its little-endian
    /// byte image is the big-endian wire order.
    Pixels(&'a [u16]),
}

impl Transaction<'_> {
    /// Whether the D/C line must be high (data) for this transaction
    pub fn is_data(&self) -> bool {
        !matches!(self, Transaction::Command(_))
    }

    /// Number of bytes this transaction puts on the wire
    pub fn wire_len(&self) -> usize {
        match self {
            Transaction::Command(_) => 1,
            Transaction::Parameters(_) => 4,
            Transaction::Pixels(words) => words.len() * 2,
        }
    }
}

/// Encode an inclusive address range as the four parameter bytes
pub const fn encode_range(start: u16, end: u16) -> [u8; 4] {
    let s = start.to_be_bytes();
    let e = end.to_be_bytes();
    [s[0], s[1], e[0], e[1]]
}

/// A full-width band of rows together with its pixel payload
///
/// `P` is whatever owns the pixel words. The transport hands ownership of
/// its slot buffer to the bus through this type and gets it back through
/// [`BandFrame::into_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandFrame<P> {
    first_column: u16,
    last_column: u16,
    first_row: u16,
    last_row: u16,
    payload: P,
}

impl<P: AsRef<[u16]>> BandFrame<P> {
    /// Frame `rows` rows starting at `top`, spanning columns `0..width`
    pub fn new(width: u16, top: u16, rows: u16, payload: P) -> Result<Self, FrameError> {
        if width == 0 || rows == 0 {
            return Err(FrameError::EmptyBand);
        }
        let last_row = top
            .checked_add(rows - 1)
            .ok_or(FrameError::AddressOverflow)?;
        if payload.as_ref().len() != width as usize * rows as usize {
            return Err(FrameError::PayloadLength);
        }

        Ok(Self {
            first_column: 0,
            last_column: width - 1,
            first_row: top,
            last_row,
            payload,
        })
    }

    /// The six transactions of this band, in transmission order
    pub fn transactions(&self) -> [Transaction<'_>; TRANSACTIONS_PER_BAND] {
        [
            Transaction::Command(CMD_COLUMN_ADDRESS_SET),
            Transaction::Parameters(encode_range(self.first_column, self.last_column)),
            Transaction::Command(CMD_PAGE_ADDRESS_SET),
            Transaction::Parameters(encode_range(self.first_row, self.last_row)),
            Transaction::Command(CMD_MEMORY_WRITE),
            Transaction::Pixels(self.payload.as_ref()),
        ]
    }

    /// Total bytes the band puts on the wire, commands included
    pub fn wire_len(&self) -> usize {
        self.transactions().iter().map(Transaction::wire_len).sum()
    }
}

impl<P> BandFrame<P> {
    /// First row of the band
    pub fn first_row(&self) -> u16 {
        self.first_row
    }

    /// Last row of the band (inclusive)
    pub fn last_row(&self) -> u16 {
        self.last_row
    }

    /// Number of rows in the band
    pub fn rows(&self) -> u16 {
        self.last_row - self.first_row + 1
    }

    /// Columns covered by the band (inclusive)
    pub fn columns(&self) -> (u16, u16) {
        (self.first_column, self.last_column)
    }

    /// Borrow the pixel payload
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Give back the pixel payload
    pub fn into_payload(self) -> P {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_range_big_endian() {
        assert_eq!(encode_range(0, 319), [0x00, 0x00, 0x01, 0x3F]);
        assert_eq!(encode_range(0x1234, 0xABCD), [0x12, 0x34, 0xAB, 0xCD]);
    }

    #[test]
    fn test_band_transactions_in_order() {
        let pixels = [0xAAAAu16; 4 * 2];
        let frame = BandFrame::new(4, 16, 2, &pixels[..]).unwrap();
        let tx = frame.transactions();

        assert_eq!(tx[0], Transaction::Command(0x2A));
        assert_eq!(tx[1], Transaction::Parameters([0, 0, 0, 3]));
        assert_eq!(tx[2], Transaction::Command(0x2B));
        assert_eq!(tx[3], Transaction::Parameters([0, 16, 0, 17]));
        assert_eq!(tx[4], Transaction::Command(0x2C));
        assert_eq!(tx[5], Transaction::Pixels(&pixels[..]));
    }

    #[test]
    fn test_data_flags() {
        let pixels = [0u16; 1];
        let frame = BandFrame::new(1, 0, 1, &pixels[..]).unwrap();
        let flags = frame.transactions().map(|t| t.is_data());
        assert_eq!(flags, [false, true, false, true, false, true]);
    }

    #[test]
    fn test_wire_len() {
        let pixels = [0u16; 320 * 16];
        let frame = BandFrame::new(320, 0, 16, &pixels[..]).unwrap();
        // 3 commands + 2 × 4 parameter bytes + 2 bytes per pixel
        assert_eq!(frame.wire_len(), 3 + 8 + 320 * 16 * 2);
    }

    #[test]
    fn test_payload_length_checked() {
        let pixels = [0u16; 7];
        assert_eq!(
            BandFrame::new(4, 0, 2, &pixels[..]),
            Err(FrameError::PayloadLength)
        );
    }

    #[test]
    fn test_empty_band_rejected() {
        let pixels: [u16; 0] = [];
        assert_eq!(
            BandFrame::new(0, 0, 1, &pixels[..]),
            Err(FrameError::EmptyBand)
        );
        assert_eq!(
            BandFrame::new(4, 0, 0, &pixels[..]),
            Err(FrameError::EmptyBand)
        );
    }

    #[test]
    fn test_row_overflow_rejected() {
        let pixels = [0u16; 2];
        assert_eq!(
            BandFrame::new(1, u16::MAX, 2, &pixels[..]),
            Err(FrameError::AddressOverflow)
        );
    }

    #[test]
    fn test_payload_roundtrip() {
        let pixels = [1u16, 2, 3, 4];
        let frame = BandFrame::new(2, 8, 2, pixels).unwrap();
        assert_eq!(frame.first_row(), 8);
        assert_eq!(frame.last_row(), 9);
        assert_eq!(frame.rows(), 2);
        assert_eq!(frame.columns(), (0, 1));
        assert_eq!(frame.into_payload(), [1, 2, 3, 4]);
    }

    proptest::proptest! {
        #[test]
        fn prop_row_range_covers_band(top in 0u16..1000, rows in 1u16..64, width in 1u16..32) {
            let pixels = [0u16; 64 * 32];
            let payload = &pixels[..rows as usize * width as usize];
            let frame = BandFrame::new(width, top, rows, payload).unwrap();
            let tx = frame.transactions();
            let rows_range = encode_range(top, top + rows - 1);
            proptest::prop_assert_eq!(tx[3], Transaction::Parameters(rows_range));
            proptest::prop_assert_eq!(tx[1], Transaction::Parameters(encode_range(0, width - 1)));
        }
    }
}
