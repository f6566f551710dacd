//! Decoding of raw 16-bit instruction words.
//!
//! Chip-8 instructions are 16 bits each, stored big-endian. The first nibble selects the
//! instruction family; the `0`, `8`, `E` and `F` families use the last nibble or the low
//! byte to pick the concrete instruction. The remaining nibbles carry the operands:
//! - `nnn`: 12-bit address, the lowest 12 bits of the instruction
//! - `n`: 4-bit value, the lowest 4 bits of the instruction
//! - `x`: 4-bit register index, the lower 4 bits of the high byte
//! - `y`: 4-bit register index, the upper 4 bits of the low byte
//! - `kk`: 8-bit immediate, the lowest 8 bits of the instruction

use std::fmt;

/// Register index, always in `0x0..=0xF`.
pub type Reg = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - CLS
    Clear,
    /// 00EE - RET
    Return,
    /// 1nnn - JP addr
    Jump(u16),
    /// 2nnn - CALL addr
    Call(u16),
    /// 3xkk - SE Vx, byte
    SkipEqualImmediate(Reg, u8),
    /// 4xkk - SNE Vx, byte
    SkipNotEqualImmediate(Reg, u8),
    /// 5xy0 - SE Vx, Vy
    SkipEqualRegister(Reg, Reg),
    /// 6xkk - LD Vx, byte
    LoadImmediate(Reg, u8),
    /// 7xkk - ADD Vx, byte
    AddImmediate(Reg, u8),
    /// 8xy0 - LD Vx, Vy
    Load(Reg, Reg),
    /// 8xy1 - OR Vx, Vy
    Or(Reg, Reg),
    /// 8xy2 - AND Vx, Vy
    And(Reg, Reg),
    /// 8xy3 - XOR Vx, Vy
    Xor(Reg, Reg),
    /// 8xy4 - ADD Vx, Vy
    Add(Reg, Reg),
    /// 8xy5 - SUB Vx, Vy
    Sub(Reg, Reg),
    /// 8xy6 - SHR Vx {, Vy}
    ShiftRight(Reg, Reg),
    /// 8xy7 - SUBN Vx, Vy
    SubNegated(Reg, Reg),
    /// 8xyE - SHL Vx {, Vy}
    ShiftLeft(Reg, Reg),
    /// 9xy0 - SNE Vx, Vy
    SkipNotEqualRegister(Reg, Reg),
    /// Annn - LD I, addr
    LoadIndex(u16),
    /// Bnnn - JP V0, addr
    JumpOffset(u16),
    /// Cxkk - RND Vx, byte
    Random(Reg, u8),
    /// Dxyn - DRW Vx, Vy, nibble
    Draw(Reg, Reg, u8),
    /// Ex9E - SKP Vx
    SkipKeyPressed(Reg),
    /// ExA1 - SKNP Vx
    SkipKeyNotPressed(Reg),
    /// Fx07 - LD Vx, DT
    LoadDelay(Reg),
    /// Fx0A - LD Vx, K
    WaitKey(Reg),
    /// Fx15 - LD DT, Vx
    SetDelay(Reg),
    /// Fx18 - LD ST, Vx
    SetSound(Reg),
    /// Fx1E - ADD I, Vx
    AddIndex(Reg),
    /// Fx29 - LD F, Vx
    LoadFont(Reg),
    /// Fx33 - LD B, Vx
    StoreBcd(Reg),
    /// Fx55 - LD [I], Vx
    StoreRegisters(Reg),
    /// Fx65 - LD Vx, [I]
    LoadRegisters(Reg),
    /// Any word that is not part of the instruction set. Executes as a no-op.
    Unknown(u16),
}

impl Instruction {
    pub fn decode(word: u16) -> Self {
        let nibbles = (
            ((word & 0xF000) >> 12) as u8,
            ((word & 0x0F00) >> 8) as u8,
            ((word & 0x00F0) >> 4) as u8,
            (word & 0x000F) as u8,
        );
        let nnn = word & 0x0FFF;
        let kk = (word & 0x00FF) as u8;

        match nibbles {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Clear,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x1, ..) => Instruction::Jump(nnn),
            (0x2, ..) => Instruction::Call(nnn),
            (0x3, x, ..) => Instruction::SkipEqualImmediate(x, kk),
            (0x4, x, ..) => Instruction::SkipNotEqualImmediate(x, kk),
            (0x5, x, y, 0x0) => Instruction::SkipEqualRegister(x, y),
            (0x6, x, ..) => Instruction::LoadImmediate(x, kk),
            (0x7, x, ..) => Instruction::AddImmediate(x, kk),
            (0x8, x, y, 0x0) => Instruction::Load(x, y),
            (0x8, x, y, 0x1) => Instruction::Or(x, y),
            (0x8, x, y, 0x2) => Instruction::And(x, y),
            (0x8, x, y, 0x3) => Instruction::Xor(x, y),
            (0x8, x, y, 0x4) => Instruction::Add(x, y),
            (0x8, x, y, 0x5) => Instruction::Sub(x, y),
            (0x8, x, y, 0x6) => Instruction::ShiftRight(x, y),
            (0x8, x, y, 0x7) => Instruction::SubNegated(x, y),
            (0x8, x, y, 0xE) => Instruction::ShiftLeft(x, y),
            (0x9, x, y, 0x0) => Instruction::SkipNotEqualRegister(x, y),
            (0xA, ..) => Instruction::LoadIndex(nnn),
            (0xB, ..) => Instruction::JumpOffset(nnn),
            (0xC, x, ..) => Instruction::Random(x, kk),
            (0xD, x, y, n) => Instruction::Draw(x, y, n),
            (0xE, x, 0x9, 0xE) => Instruction::SkipKeyPressed(x),
            (0xE, x, 0xA, 0x1) => Instruction::SkipKeyNotPressed(x),
            (0xF, x, 0x0, 0x7) => Instruction::LoadDelay(x),
            (0xF, x, 0x0, 0xA) => Instruction::WaitKey(x),
            (0xF, x, 0x1, 0x5) => Instruction::SetDelay(x),
            (0xF, x, 0x1, 0x8) => Instruction::SetSound(x),
            (0xF, x, 0x1, 0xE) => Instruction::AddIndex(x),
            (0xF, x, 0x2, 0x9) => Instruction::LoadFont(x),
            (0xF, x, 0x3, 0x3) => Instruction::StoreBcd(x),
            (0xF, x, 0x5, 0x5) => Instruction::StoreRegisters(x),
            (0xF, x, 0x6, 0x5) => Instruction::LoadRegisters(x),
            _ => Instruction::Unknown(word),
        }
    }
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        Instruction::decode(word)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP {:#05X}", nnn),
            Call(nnn) => write!(f, "CALL {:#05X}", nnn),
            SkipEqualImmediate(x, kk) => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipNotEqualImmediate(x, kk) => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipEqualRegister(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImmediate(x, kk) => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddImmediate(x, kk) => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Load(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x, _) => write!(f, "SHR V{:X}", x),
            SubNegated(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, _) => write!(f, "SHL V{:X}", x),
            SkipNotEqualRegister(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD I, {:#05X}", nnn),
            JumpOffset(nnn) => write!(f, "JP V0, {:#05X}", nnn),
            Random(x, kk) => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed(x) => write!(f, "SKP V{:X}", x),
            SkipKeyNotPressed(x) => write!(f, "SKNP V{:X}", x),
            LoadDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            LoadFont(x) => write!(f, "LD F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegisters(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegisters(x) => write!(f, "LD V{:X}, [I]", x),
            Unknown(word) => write!(f, "DW {:#06X}", word),
        }
    }
}

/// Decodes a ROM image into `(address, instruction)` pairs, two bytes at a time from 0x200.
/// A trailing odd byte is decoded as if padded with zero.
pub fn disassemble(rom: &[u8]) -> Vec<(u16, Instruction)> {
    rom.chunks(2)
        .enumerate()
        .map(|(idx, chunk)| {
            let word = u16::from_be_bytes([chunk[0], chunk.get(1).copied().unwrap_or(0)]);
            let address = (crate::memory::START_ROM + 2 * idx) as u16;
            (address, Instruction::decode(word))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use test_case::test_case;

    #[test_case(0x00E0, Instruction::Clear ; "CLS")]
    #[test_case(0x00EE, Instruction::Return ; "RET")]
    #[test_case(0x1789, Instruction::Jump(0x789) ; "JP")]
    #[test_case(0x2123, Instruction::Call(0x123) ; "CALL")]
    #[test_case(0x3A42, Instruction::SkipEqualImmediate(0xA, 0x42) ; "SE immediate")]
    #[test_case(0x4B13, Instruction::SkipNotEqualImmediate(0xB, 0x13) ; "SNE immediate")]
    #[test_case(0x5120, Instruction::SkipEqualRegister(0x1, 0x2) ; "SE register")]
    #[test_case(0x6123, Instruction::LoadImmediate(0x1, 0x23) ; "LD immediate")]
    #[test_case(0x7321, Instruction::AddImmediate(0x3, 0x21) ; "ADD immediate")]
    #[test_case(0x8AC0, Instruction::Load(0xA, 0xC) ; "LD register")]
    #[test_case(0x8BD1, Instruction::Or(0xB, 0xD) ; "OR")]
    #[test_case(0x8E12, Instruction::And(0xE, 0x1) ; "AND")]
    #[test_case(0x8973, Instruction::Xor(0x9, 0x7) ; "XOR")]
    #[test_case(0x8234, Instruction::Add(0x2, 0x3) ; "ADD register")]
    #[test_case(0x8C25, Instruction::Sub(0xC, 0x2) ; "SUB")]
    #[test_case(0x80A6, Instruction::ShiftRight(0x0, 0xA) ; "SHR")]
    #[test_case(0x8D47, Instruction::SubNegated(0xD, 0x4) ; "SUBN")]
    #[test_case(0x85FE, Instruction::ShiftLeft(0x5, 0xF) ; "SHL")]
    #[test_case(0x9750, Instruction::SkipNotEqualRegister(0x7, 0x5) ; "SNE register")]
    #[test_case(0xA678, Instruction::LoadIndex(0x678) ; "LD I")]
    #[test_case(0xB300, Instruction::JumpOffset(0x300) ; "JP V0")]
    #[test_case(0xC40F, Instruction::Random(0x4, 0x0F) ; "RND")]
    #[test_case(0xD125, Instruction::Draw(0x1, 0x2, 0x5) ; "DRW")]
    #[test_case(0xE29E, Instruction::SkipKeyPressed(0x2) ; "SKP")]
    #[test_case(0xE3A1, Instruction::SkipKeyNotPressed(0x3) ; "SKNP")]
    #[test_case(0xF407, Instruction::LoadDelay(0x4) ; "LD Vx DT")]
    #[test_case(0xF50A, Instruction::WaitKey(0x5) ; "LD Vx K")]
    #[test_case(0xF615, Instruction::SetDelay(0x6) ; "LD DT Vx")]
    #[test_case(0xF718, Instruction::SetSound(0x7) ; "LD ST Vx")]
    #[test_case(0xF81E, Instruction::AddIndex(0x8) ; "ADD I Vx")]
    #[test_case(0xF929, Instruction::LoadFont(0x9) ; "LD F Vx")]
    #[test_case(0xFA33, Instruction::StoreBcd(0xA) ; "LD B Vx")]
    #[test_case(0xFB55, Instruction::StoreRegisters(0xB) ; "LD [I] Vx")]
    #[test_case(0xFC65, Instruction::LoadRegisters(0xC) ; "LD Vx [I]")]
    fn test_decode(word: u16, expected: Instruction) {
        assert_eq!(Instruction::decode(word), expected);
    }

    #[test_case(0x0000 ; "SYS 0")]
    #[test_case(0x0123 ; "SYS addr")]
    #[test_case(0x00E1 ; "near CLS")]
    #[test_case(0x5121 ; "SE register with tail")]
    #[test_case(0x8008 ; "unknown ALU op")]
    #[test_case(0x900F ; "SNE register with tail")]
    #[test_case(0xE19F ; "unknown key op")]
    #[test_case(0xF0FF ; "unknown misc op")]
    fn test_decode_unknown(word: u16) {
        assert_eq!(Instruction::decode(word), Instruction::Unknown(word));
    }

    #[quickcheck]
    fn test_decode_operands_are_in_range(word: u16) -> bool {
        match Instruction::decode(word) {
            Instruction::Jump(nnn) | Instruction::Call(nnn) | Instruction::LoadIndex(nnn) | Instruction::JumpOffset(nnn) => {
                nnn <= 0xFFF
            }
            Instruction::Draw(x, y, n) => x <= 0xF && y <= 0xF && n <= 0xF,
            Instruction::Unknown(raw) => raw == word,
            _ => true,
        }
    }

    #[test_case(Instruction::LoadImmediate(0x3, 0x2A), "LD V3, 0x2A" ; "load immediate")]
    #[test_case(Instruction::Draw(0x0, 0x1, 5), "DRW V0, V1, 5" ; "draw")]
    #[test_case(Instruction::Jump(0x228), "JP 0x228" ; "jump")]
    #[test_case(Instruction::StoreRegisters(0xE), "LD [I], VE" ; "store registers")]
    #[test_case(Instruction::Unknown(0xFFFF), "DW 0xFFFF" ; "unknown")]
    fn test_mnemonic(instruction: Instruction, expected: &str) {
        assert_eq!(instruction.to_string(), expected);
    }

    #[test]
    fn test_disassemble() {
        let rom: &[u8] = &[0x60, 0x05, 0x70, 0x03, 0x12];

        let listing = disassemble(rom);

        assert_eq!(
            listing,
            vec![
                (0x200, Instruction::LoadImmediate(0, 5)),
                (0x202, Instruction::AddImmediate(0, 3)),
                (0x204, Instruction::Jump(0x200)),
            ]
        );
    }
}
