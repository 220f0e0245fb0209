//! Baseline sequential decoder

use super::bits::{BitReader, RST0};
use super::huffman::HuffmanTable;
use super::idct::{idct_block, ycbcr_to_rgb, ZIGZAG};
use super::source::{ByteSource, InputBuffer};
use super::workspace::{Workspace, MAX_BLOCKS, QUANT_TABLES};
use super::{
    Corrupt, DecodeError, DecodeStatus, FrameHeader, Rect, RectSink, StreamDecoder, Unsupported,
};

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOF0: u8 = 0xC0;
const SOF1: u8 = 0xC1;
const DHT: u8 = 0xC4;
const DAC: u8 = 0xCC;
const DQT: u8 = 0xDB;
const DRI: u8 = 0xDD;
const SOS: u8 = 0xDA;
const TEM: u8 = 0x01;

/// Largest DC magnitude category for 8-bit samples
const MAX_DC_CATEGORY: u8 = 11;

/// Largest AC magnitude category for 8-bit samples
const MAX_AC_CATEGORY: u8 = 10;

#[derive(Debug, Clone, Copy, Default)]
struct Component {
    id: u8,
    h: u8,
    v: u8,
    quant: u8,
    dc_table: u8,
    ac_table: u8,
    pred: i32,
}

/// Decoder for baseline (and extended 8-bit) Huffman JPEG
///
/// Supports one interleaved scan of one (grayscale) or three (YCbCr)
/// components, luma sampling of 1 or 2 in either direction with
/// full-size-block chroma, and restart intervals.
#[derive(Debug, Default)]
pub struct BaselineDecoder {
    components: [Component; 3],
    component_count: u8,
    frame: Option<(u16, u16)>,
    restart_interval: u16,
    quant_loaded: u8,
    /// Set once the scan header is parsed
    header: Option<FrameHeader>,
}

impl BaselineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, workspace: &mut Workspace) {
        *self = Self::default();
        workspace.input.reset();
        for table in workspace.huffman.iter_mut() {
            table.clear();
        }
    }

    fn read_frame<S: ByteSource + ?Sized>(
        &mut self,
        input: &mut InputBuffer,
        source: &mut S,
        len: usize,
    ) -> Result<(), DecodeError> {
        if self.frame.is_some() {
            return Err(Corrupt::Segment.into());
        }
        if len < 6 {
            return Err(Corrupt::Segment.into());
        }
        let precision = input.byte(source)?;
        let height = input.word(source)?;
        let width = input.word(source)?;
        let count = input.byte(source)?;

        if precision != 8 {
            return Err(Unsupported::Precision.into());
        }
        if count != 1 && count != 3 {
            return Err(Unsupported::Components.into());
        }
        if len != 6 + 3 * count as usize {
            return Err(Corrupt::Segment.into());
        }
        if height == 0 {
            return Err(Unsupported::DeferredHeight.into());
        }
        if width == 0 {
            return Err(Corrupt::Segment.into());
        }

        for i in 0..count as usize {
            let id = input.byte(source)?;
            let sampling = input.byte(source)?;
            let quant = input.byte(source)?;
            if quant as usize >= QUANT_TABLES {
                return Err(Corrupt::Table.into());
            }
            self.components[i] = Component {
                id,
                h: sampling >> 4,
                v: sampling & 0x0F,
                quant,
                ..Component::default()
            };
        }

        if count == 1 {
            // A lone component is never interleaved: one block per MCU
            self.components[0].h = 1;
            self.components[0].v = 1;
        } else {
            let luma = self.components[0];
            if !(1..=2).contains(&luma.h) || !(1..=2).contains(&luma.v) {
                return Err(Unsupported::Sampling.into());
            }
            if self.components[1..3].iter().any(|c| c.h != 1 || c.v != 1) {
                return Err(Unsupported::Sampling.into());
            }
        }

        self.component_count = count;
        self.frame = Some((width, height));
        Ok(())
    }

    fn read_quant<S: ByteSource + ?Sized>(
        &mut self,
        workspace: &mut Workspace,
        source: &mut S,
        mut len: usize,
    ) -> Result<(), DecodeError> {
        let input = &mut workspace.input;
        while len > 0 {
            let spec = input.byte(source)?;
            let (precision, id) = (spec >> 4, (spec & 0x0F) as usize);
            if precision > 1 || id >= QUANT_TABLES {
                return Err(Corrupt::Table.into());
            }
            let size = 1 + 64 * (precision as usize + 1);
            if len < size {
                return Err(Corrupt::Segment.into());
            }
            for q in workspace.quant[id].iter_mut() {
                *q = if precision == 0 {
                    input.byte(source)? as u16
                } else {
                    input.word(source)?
                };
            }
            self.quant_loaded |= 1 << id;
            len -= size;
        }
        Ok(())
    }

    fn read_huffman<S: ByteSource + ?Sized>(
        workspace: &mut Workspace,
        source: &mut S,
        mut len: usize,
    ) -> Result<(), DecodeError> {
        let input = &mut workspace.input;
        while len > 0 {
            let spec = input.byte(source)?;
            let (class, id) = (spec >> 4, spec & 0x0F);
            if class > 1 || id > 1 {
                return Err(Corrupt::Table.into());
            }
            let mut counts = [0u8; 16];
            for c in counts.iter_mut() {
                *c = input.byte(source)?;
            }
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            if total > 256 || len < 17 + total {
                return Err(Corrupt::Segment.into());
            }
            let mut values = [0u8; 256];
            for v in values[..total].iter_mut() {
                *v = input.byte(source)?;
            }
            workspace.huffman[Workspace::huffman_slot(class, id)]
                .build(&counts, &values[..total])?;
            len -= 17 + total;
        }
        Ok(())
    }

    fn read_scan<S: ByteSource + ?Sized>(
        &mut self,
        workspace: &mut Workspace,
        source: &mut S,
        len: usize,
    ) -> Result<FrameHeader, DecodeError> {
        let (width, height) = self.frame.ok_or(Corrupt::MissingFrame)?;
        let input = &mut workspace.input;

        let count = input.byte(source)?;
        if len != 4 + 2 * count as usize {
            return Err(Corrupt::Segment.into());
        }
        if count != self.component_count {
            return Err(Unsupported::MultipleScans.into());
        }
        for component in self.components[..count as usize].iter_mut() {
            let id = input.byte(source)?;
            let tables = input.byte(source)?;
            if id != component.id {
                return Err(Corrupt::Segment.into());
            }
            component.dc_table = tables >> 4;
            component.ac_table = tables & 0x0F;
            if component.dc_table > 1 || component.ac_table > 1 {
                return Err(Corrupt::Table.into());
            }
        }

        let start = input.byte(source)?;
        let end = input.byte(source)?;
        let approx = input.byte(source)?;
        if start != 0 || end != 63 || approx != 0 {
            return Err(Unsupported::Progressive.into());
        }

        for component in self.components[..count as usize].iter() {
            let dc = &workspace.huffman[Workspace::huffman_slot(0, component.dc_table)];
            let ac = &workspace.huffman[Workspace::huffman_slot(1, component.ac_table)];
            if self.quant_loaded & (1 << component.quant) == 0 || !dc.is_loaded() || !ac.is_loaded()
            {
                return Err(Corrupt::MissingTable.into());
            }
        }

        let luma = self.components[0];
        Ok(FrameHeader {
            width,
            height,
            components: count,
            mcu_width: 8 * luma.h as u16,
            mcu_height: 8 * luma.v as u16,
            restart_interval: self.restart_interval,
        })
    }
}

/// Next marker code, skipping fill bytes
fn next_marker<S: ByteSource + ?Sized>(
    input: &mut InputBuffer,
    source: &mut S,
) -> Result<u8, DecodeError> {
    if input.byte(source)? != 0xFF {
        return Err(Corrupt::Marker.into());
    }
    loop {
        match input.byte(source)? {
            0xFF => continue,
            code => return Ok(code),
        }
    }
}

/// Payload length of the segment that starts here
fn segment_len<S: ByteSource + ?Sized>(
    input: &mut InputBuffer,
    source: &mut S,
) -> Result<usize, DecodeError> {
    let len = input.word(source)? as usize;
    len.checked_sub(2).ok_or(Corrupt::Segment.into())
}

fn dequantize(value: i32, q: u16) -> i32 {
    value
        .saturating_mul(q as i32)
        .clamp(i16::MIN as i32, i16::MAX as i32)
}

/// Decode one block's coefficients into `block` (natural order)
fn decode_block<S: ByteSource + ?Sized>(
    reader: &mut BitReader<'_, S>,
    dc: &HuffmanTable,
    ac: &HuffmanTable,
    quant: &[u16; 64],
    pred: &mut i32,
    block: &mut [i32; 64],
) -> Result<(), DecodeError> {
    block.fill(0);

    let category = dc.decode(reader)?;
    if category > MAX_DC_CATEGORY {
        return Err(Corrupt::Huffman.into());
    }
    *pred = pred.saturating_add(reader.receive_extend(category)?);
    block[0] = dequantize(*pred, quant[0]);

    let mut k = 1;
    while k < 64 {
        let symbol = ac.decode(reader)?;
        let run = (symbol >> 4) as usize;
        let size = symbol & 0x0F;
        if size == 0 {
            if run == 15 {
                k += 16;
                continue;
            }
            break;
        }
        k += run;
        if k > 63 || size > MAX_AC_CATEGORY {
            return Err(Corrupt::Huffman.into());
        }
        block[ZIGZAG[k] as usize] = dequantize(reader.receive_extend(size)?, quant[k]);
        k += 1;
    }
    Ok(())
}

impl StreamDecoder for BaselineDecoder {
    fn prepare<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
        workspace: &mut Workspace,
    ) -> Result<FrameHeader, DecodeError> {
        self.reset(workspace);

        let input = &mut workspace.input;
        if input.next_byte(source) != Some(0xFF) || input.next_byte(source) != Some(SOI) {
            return Err(DecodeError::NotJpeg);
        }

        loop {
            let marker = next_marker(&mut workspace.input, source)?;
            match marker {
                SOF0 | SOF1 => {
                    let len = segment_len(&mut workspace.input, source)?;
                    self.read_frame(&mut workspace.input, source, len)?;
                }
                0xC2 => return Err(Unsupported::Progressive.into()),
                0xC3 => return Err(Unsupported::Lossless.into()),
                0xC5..=0xC7 => return Err(Unsupported::Hierarchical.into()),
                0xC9..=0xCB | 0xCD..=0xCF | DAC => return Err(Unsupported::Arithmetic.into()),
                DHT => {
                    let len = segment_len(&mut workspace.input, source)?;
                    Self::read_huffman(workspace, source, len)?;
                }
                DQT => {
                    let len = segment_len(&mut workspace.input, source)?;
                    self.read_quant(workspace, source, len)?;
                }
                DRI => {
                    let len = segment_len(&mut workspace.input, source)?;
                    if len != 2 {
                        return Err(Corrupt::Segment.into());
                    }
                    self.restart_interval = workspace.input.word(source)?;
                }
                SOS => {
                    let len = segment_len(&mut workspace.input, source)?;
                    let header = self.read_scan(workspace, source, len)?;
                    debug!(
                        "jpeg {}x{}, {} components, mcu {}x{}, restart {}",
                        header.width,
                        header.height,
                        header.components,
                        header.mcu_width,
                        header.mcu_height,
                        header.restart_interval
                    );
                    self.header = Some(header);
                    return Ok(header);
                }
                SOI | EOI | TEM => return Err(Corrupt::Marker.into()),
                code if (RST0..RST0 + 8).contains(&code) => return Err(Corrupt::Marker.into()),
                _ => {
                    // APPn, COM and anything else with a length
                    let len = segment_len(&mut workspace.input, source)?;
                    workspace.input.skip(source, len)?;
                }
            }
        }
    }

    fn decompress<S: ByteSource + ?Sized, K: RectSink + ?Sized>(
        &mut self,
        source: &mut S,
        workspace: &mut Workspace,
        sink: &mut K,
    ) -> Result<DecodeStatus, DecodeError> {
        let header = self.header.take().ok_or(DecodeError::NotPrepared)?;

        let Workspace {
            input,
            quant,
            huffman,
            block,
            planes,
            rgb,
        } = workspace;
        let mut reader = BitReader::new(input, source);

        let count = header.components as usize;
        let (h, v) = (self.components[0].h as usize, self.components[0].v as usize);
        let luma_blocks = h * v;
        debug_assert!(luma_blocks + count - 1 <= MAX_BLOCKS);

        let (mcu_w, mcu_h) = (header.mcu_width as usize, header.mcu_height as usize);
        let (width, height) = (header.width as usize, header.height as usize);
        let mcus_x = width.div_ceil(mcu_w);
        let mcus_y = height.div_ceil(mcu_h);

        let mut status = DecodeStatus::Complete;
        let mut next_restart = 0u8;
        let mut until_restart = header.restart_interval;

        for my in 0..mcus_y {
            for mx in 0..mcus_x {
                if header.restart_interval > 0 {
                    if until_restart == 0 {
                        if !reader.restart(next_restart)? {
                            warn!("restart marker out of sequence at mcu {},{}", mx, my);
                            status = DecodeStatus::RestartMismatch;
                        }
                        next_restart = (next_restart + 1) & 7;
                        for component in self.components.iter_mut() {
                            component.pred = 0;
                        }
                        until_restart = header.restart_interval;
                    }
                    until_restart -= 1;
                }

                let mut plane = 0;
                for (index, component) in self.components[..count].iter_mut().enumerate() {
                    let dc = &huffman[Workspace::huffman_slot(0, component.dc_table)];
                    let ac = &huffman[Workspace::huffman_slot(1, component.ac_table)];
                    let blocks = if index == 0 { luma_blocks } else { 1 };
                    for _ in 0..blocks {
                        decode_block(
                            &mut reader,
                            dc,
                            ac,
                            &quant[component.quant as usize],
                            &mut component.pred,
                            block,
                        )?;
                        idct_block(block, &mut planes[plane]);
                        plane += 1;
                    }
                }

                let left = mx * mcu_w;
                let top = my * mcu_h;
                let w = mcu_w.min(width - left);
                let rows = mcu_h.min(height - top);
                for y in 0..rows {
                    for x in 0..w {
                        let luma = planes[(y / 8) * h + x / 8][(y % 8) * 8 + x % 8];
                        let pixel = if count == 3 {
                            let c = (y / v) * 8 + x / h;
                            ycbcr_to_rgb(luma, planes[luma_blocks][c], planes[luma_blocks + 1][c])
                        } else {
                            [luma; 3]
                        };
                        let o = (y * w + x) * 3;
                        rgb[o..o + 3].copy_from_slice(&pixel);
                    }
                }

                let rect = Rect {
                    left: left as u16,
                    top: top as u16,
                    right: (left + w - 1) as u16,
                    bottom: (top + rows - 1) as u16,
                };
                sink.write(rect, &rgb[..w * rows * 3]).map_err(|_| {
                    warn!("sink rejected mcu {},{}", mx, my);
                    DecodeError::Interrupted
                })?;
            }
        }

        trace!("jpeg decoded, {} mcus", mcus_x * mcus_y);
        Ok(status)
    }
}
