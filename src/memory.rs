use crate::{MachineError, Result};

pub const MEMORY_SIZE: usize = 4096;
pub const START_ROM: usize = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - START_ROM;
/// Glyphs live in the reserved interpreter area, below the program image.
pub const FONT_START: usize = 0x050;
pub const FONT_GLYPH_SIZE: usize = 5;

const ADDRESS_MASK: usize = MEMORY_SIZE - 1;

const FONT_DATA: &[u8] = &[
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// 4KB of byte addressable RAM. All accesses wrap at 12 bits, so no address computed by a
/// program can reach outside the array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Memory([u8; MEMORY_SIZE]);

impl Memory {
    /// Zeroed memory with the font table installed.
    pub fn new() -> Self {
        let mut memory = Memory([0; MEMORY_SIZE]);
        memory.0[FONT_START..FONT_START + FONT_DATA.len()].copy_from_slice(FONT_DATA);
        memory
    }

    /// Copies `bytes` verbatim to 0x200. Oversized images are rejected before anything is written.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        let rom_size = bytes.len();
        if rom_size > MAX_ROM_SIZE {
            return Err(MachineError::RomTooLarge {
                size: rom_size,
                max: MAX_ROM_SIZE,
            });
        }

        self.0[START_ROM..START_ROM + rom_size].copy_from_slice(bytes);
        Ok(())
    }

    pub fn read(&self, address: usize) -> u8 {
        self.0[address & ADDRESS_MASK]
    }

    pub fn write(&mut self, address: usize, value: u8) {
        self.0[address & ADDRESS_MASK] = value;
    }

    /// Big-endian instruction word at `address`.
    pub fn read_word(&self, address: usize) -> u16 {
        u16::from_be_bytes([self.read(address), self.read(address + 1)])
    }

    pub fn font_address(digit: u8) -> u16 {
        (FONT_START + FONT_GLYPH_SIZE * (digit & 0xF) as usize) as u16
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}
