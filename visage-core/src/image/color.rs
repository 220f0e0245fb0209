//! RGB565 packing
//!
//! Canvas cells hold RGB565 with the two bytes swapped. On a little-endian
//! core the in-memory bytes of such a word are the big-endian wire order
//! the panel expects, so a band can be sent without another pass.

/// Pack 8-bit channels into RGB565 (native order)
#[inline]
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Pack 8-bit channels into a byte-swapped RGB565 cell
#[inline]
pub const fn pack_wire(r: u8, g: u8, b: u8) -> u16 {
    rgb565(r, g, b).swap_bytes()
}

/// Bytes of a cell as they go on the wire
#[inline]
pub const fn wire_bytes(cell: u16) -> [u8; 2] {
    cell.to_le_bytes()
}
