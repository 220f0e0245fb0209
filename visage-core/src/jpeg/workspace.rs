//! Decoder working memory

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use super::huffman::HuffmanTable;
use super::source::InputBuffer;
use crate::image::AllocError;

/// Quantization table slots
pub const QUANT_TABLES: usize = 4;

/// Huffman table slots: DC 0, DC 1, AC 0, AC 1
pub const HUFFMAN_TABLES: usize = 4;

/// Blocks in the largest MCU: four luma plus two chroma
pub const MAX_BLOCKS: usize = 6;

/// Largest MCU in pixels per side
pub const MAX_MCU: usize = 16;

/// Everything the decoder needs besides the source and the sink
pub struct Workspace {
    pub(super) input: InputBuffer,
    /// Quantizers in zigzag order
    pub(super) quant: [[u16; 64]; QUANT_TABLES],
    pub(super) huffman: [HuffmanTable; HUFFMAN_TABLES],
    pub(super) block: [i32; 64],
    pub(super) planes: [[u8; 64]; MAX_BLOCKS],
    pub(super) rgb: [u8; MAX_MCU * MAX_MCU * 3],
}

/// Bytes of decoder scratch memory
pub const WORKSPACE_SIZE: usize = core::mem::size_of::<Workspace>();

impl Workspace {
    pub const fn new() -> Self {
        Self {
            input: InputBuffer::new(),
            quant: [[0; 64]; QUANT_TABLES],
            huffman: [
                HuffmanTable::new(),
                HuffmanTable::new(),
                HuffmanTable::new(),
                HuffmanTable::new(),
            ],
            block: [0; 64],
            planes: [[0; 64]; MAX_BLOCKS],
            rgb: [0; MAX_MCU * MAX_MCU * 3],
        }
    }

    /// Table slot for class `tc` (0 DC, 1 AC) and id `th`
    pub(super) fn huffman_slot(tc: u8, th: u8) -> usize {
        tc as usize * 2 + th as usize
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Heap-allocated [`Workspace`]
pub struct Scratch(Box<[Workspace]>);

impl Scratch {
    /// Allocate a workspace, reporting failure instead of aborting
    pub fn try_new() -> Result<Self, AllocError> {
        let mut slot = Vec::new();
        slot.try_reserve_exact(1).map_err(|_| AllocError)?;
        slot.push(Workspace::new());
        Ok(Self(slot.into_boxed_slice()))
    }

    pub fn workspace(&mut self) -> &mut Workspace {
        &mut self.0[0]
    }
}

impl Deref for Scratch {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        &self.0[0]
    }
}

impl DerefMut for Scratch {
    fn deref_mut(&mut self) -> &mut Workspace {
        self.workspace()
    }
}
