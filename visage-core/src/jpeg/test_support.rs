//! Minimal baseline JPEG writer for tests
//!
//! By default every 8x8 block is flat (DC only) and all quantizers are 1,
//! so each MCU decodes to exactly the YCbCr value it was given. `detail`
//! adds the same AC coefficients to every luma block, coded with run/size
//! symbols against the `quant` table.

use alloc::vec::Vec;

/// Stream layout knobs
#[derive(Debug, Clone, Copy)]
pub struct TestImage {
    pub width: u16,
    pub height: u16,
    /// Luma sampling factors (h, v); chroma is always 1x1
    pub sampling: (u8, u8),
    pub grayscale: bool,
    pub restart_interval: u16,
    /// Number the first restart marker wrongly
    pub bad_restart: bool,
    /// Add a COM segment before the tables
    pub comment: bool,
    /// Leave out the Huffman tables
    pub omit_huffman: bool,
    /// Quantizers in zigzag order
    pub quant: [u8; 64],
    /// Quantized AC coefficients `(zigzag index, value)` for every luma
    /// block, ascending by index
    pub detail: &'static [(usize, i16)],
}

impl TestImage {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            sampling: (1, 1),
            grayscale: false,
            restart_interval: 0,
            bad_restart: false,
            comment: false,
            omit_huffman: false,
            quant: [1; 64],
            detail: &[],
        }
    }

    pub fn mcu_size(&self) -> (usize, usize) {
        if self.grayscale {
            (8, 8)
        } else {
            (8 * self.sampling.0 as usize, 8 * self.sampling.1 as usize)
        }
    }

    /// Whole image in one color
    pub fn solid(&self, ycc: [u8; 3]) -> Vec<u8> {
        self.encode(|_, _| ycc)
    }

    /// Each MCU `(column, row)` in its own color
    pub fn encode(&self, color: impl Fn(usize, usize) -> [u8; 3]) -> Vec<u8> {
        let components: usize = if self.grayscale { 1 } else { 3 };
        let mut out = Vec::new();

        out.extend_from_slice(&[0xFF, 0xD8]);

        if self.comment {
            out.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x07]);
            out.extend_from_slice(b"hello");
        }

        // DQT: table 0, 8-bit
        out.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
        out.extend_from_slice(&self.quant);

        // SOF0
        let len = 8 + 3 * components as u16;
        out.extend_from_slice(&[0xFF, 0xC0]);
        out.extend_from_slice(&len.to_be_bytes());
        out.push(8);
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.width.to_be_bytes());
        out.push(components as u8);
        let (h, v) = self.sampling;
        out.extend_from_slice(&[1, (h << 4) | v, 0]);
        if !self.grayscale {
            out.extend_from_slice(&[2, 0x11, 0, 3, 0x11, 0]);
        }

        if !self.omit_huffman {
            // DC: twelve 4-bit codes, code == category
            out.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x1F, 0x00]);
            let mut counts = [0u8; 16];
            counts[3] = 12;
            out.extend_from_slice(&counts);
            out.extend(0u8..12);

            if self.detail.is_empty() {
                // AC: a single 1-bit code for end-of-block
                out.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x10]);
                let mut counts = [0u8; 16];
                counts[0] = 1;
                out.extend_from_slice(&counts);
                out.push(0x00);
            } else {
                // AC: every run/size symbol as an 8-bit code, see `ac_code`
                let symbols = ac_symbols();
                let len = 3 + 16 + symbols.len() as u16;
                out.extend_from_slice(&[0xFF, 0xC4]);
                out.extend_from_slice(&len.to_be_bytes());
                out.push(0x10);
                let mut counts = [0u8; 16];
                counts[7] = symbols.len() as u8;
                out.extend_from_slice(&counts);
                out.extend_from_slice(&symbols);
            }
        }

        if self.restart_interval > 0 {
            out.extend_from_slice(&[0xFF, 0xDD, 0x00, 0x04]);
            out.extend_from_slice(&self.restart_interval.to_be_bytes());
        }

        // SOS
        let len = 6 + 2 * components as u16;
        out.extend_from_slice(&[0xFF, 0xDA]);
        out.extend_from_slice(&len.to_be_bytes());
        out.push(components as u8);
        for id in 1..=components as u8 {
            out.extend_from_slice(&[id, 0x00]);
        }
        out.extend_from_slice(&[0, 63, 0]);

        let (mcu_w, mcu_h) = self.mcu_size();
        let mcus_x = (self.width as usize).div_ceil(mcu_w);
        let mcus_y = (self.height as usize).div_ceil(mcu_h);
        let luma_blocks = if self.grayscale { 1 } else { (h * v) as usize };

        let mut bits = BitWriter::new(out);
        let mut pred = [0i32; 3];
        let mut restarts = 0u8;
        for index in 0..mcus_x * mcus_y {
            let interval = self.restart_interval as usize;
            if interval > 0 && index > 0 && index % interval == 0 {
                bits.flush();
                let mut n = restarts & 7;
                if self.bad_restart && restarts == 0 {
                    n = 5;
                }
                bits.out.extend_from_slice(&[0xFF, 0xD0 + n]);
                restarts = restarts.wrapping_add(1);
                pred = [0; 3];
            }

            let ycc = color(index % mcus_x, index / mcus_x);
            for c in 0..components {
                let dc = 8 * (ycc[c] as i32 - 128) / self.quant[0] as i32;
                let blocks = if c == 0 { luma_blocks } else { 1 };
                for _ in 0..blocks {
                    bits.dc(dc - pred[c]);
                    pred[c] = dc;
                    if self.detail.is_empty() {
                        // end of block
                        bits.put(0, 1);
                    } else if c == 0 {
                        bits.ac(self.detail);
                    } else {
                        bits.put(ac_code(0x00), 8);
                    }
                }
            }
        }
        bits.flush();

        let mut out = bits.out;
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }
}

struct BitWriter {
    out: Vec<u8>,
    acc: u8,
    count: u8,
}

impl BitWriter {
    fn new(out: Vec<u8>) -> Self {
        Self { out, acc: 0, count: 0 }
    }

    fn put(&mut self, value: u32, len: u8) {
        for i in (0..len).rev() {
            self.acc = (self.acc << 1) | ((value >> i) & 1) as u8;
            self.count += 1;
            if self.count == 8 {
                self.out.push(self.acc);
                if self.acc == 0xFF {
                    self.out.push(0x00);
                }
                self.acc = 0;
                self.count = 0;
            }
        }
    }

    /// Magnitude category and its raw bits
    fn amplitude(value: i32) -> (u32, u32) {
        let size = 32 - value.unsigned_abs().leading_zeros();
        let raw = if value < 0 { value + (1 << size) - 1 } else { value };
        (size, raw as u32)
    }

    fn dc(&mut self, diff: i32) {
        let (size, raw) = Self::amplitude(diff);
        self.put(size, 4);
        if size > 0 {
            self.put(raw, size as u8);
        }
    }

    fn ac(&mut self, coefficients: &[(usize, i16)]) {
        let mut last = 0;
        for &(k, value) in coefficients {
            let mut run = k - last - 1;
            while run >= 16 {
                self.put(ac_code(0xF0), 8);
                run -= 16;
            }
            let (size, raw) = Self::amplitude(value as i32);
            self.put(ac_code(((run as u8) << 4) | size as u8), 8);
            self.put(raw, size as u8);
            last = k;
        }
        if last < 63 {
            self.put(ac_code(0x00), 8);
        }
    }

    fn flush(&mut self) {
        while self.count != 0 {
            self.put(1, 1);
        }
    }
}

/// AC symbols in code order: EOB, ZRL, then run 0..=15 by size 1..=10
fn ac_symbols() -> Vec<u8> {
    let mut symbols = alloc::vec![0x00, 0xF0];
    for run in 0..16u8 {
        for size in 1..=10u8 {
            symbols.push((run << 4) | size);
        }
    }
    symbols
}

/// 8-bit code of an AC symbol in the table from [`ac_symbols`]
fn ac_code(symbol: u8) -> u32 {
    match symbol {
        0x00 => 0,
        0xF0 => 1,
        _ => 2 + (symbol >> 4) as u32 * 10 + (symbol & 0x0F) as u32 - 1,
    }
}
