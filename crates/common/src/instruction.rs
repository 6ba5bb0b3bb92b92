//! Instruction records for the stackvm instruction set.
//!
//! Every instruction is exactly 8 bytes in a program binary, little-endian:
//! ```text
//! Bytes 0-3: opcode tag (i32)
//! Bytes 4-7: operand (i32)
//! ```

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// Encoded size of one instruction record.
pub const INSTRUCTION_SIZE: usize = 8;

/// A single stackvm instruction.
///
/// The raw tag is kept as loaded so that a program carrying an unknown tag
/// still decodes; resolving it is deferred to [`Instruction::opcode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Opcode tag as stored in the binary.
    pub tag: i32,
    /// The operand. Unused by opcodes that take none.
    pub operand: i32,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, operand: i32) -> Self {
        Self {
            tag: opcode.tag(),
            operand,
        }
    }

    /// Create an instruction whose opcode takes no operand.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, 0)
    }

    /// Create an instruction from a raw tag, valid or not.
    pub fn from_raw(tag: i32, operand: i32) -> Self {
        Self { tag, operand }
    }

    /// Resolve the tag to an opcode.
    pub fn opcode(&self) -> Result<Opcode, DecodeError> {
        Opcode::try_from(self.tag)
    }

    /// Encode this instruction to 8 bytes (little-endian).
    pub fn encode(&self) -> [u8; INSTRUCTION_SIZE] {
        let mut bytes = [0u8; INSTRUCTION_SIZE];
        bytes[0..4].copy_from_slice(&self.tag.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.operand.to_le_bytes());
        bytes
    }

    /// Decode 8 bytes into an instruction (little-endian).
    pub fn decode(bytes: [u8; INSTRUCTION_SIZE]) -> Self {
        let tag = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let operand = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Self { tag, operand }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_encoding() {
        let instr = Instruction::new(Opcode::Push, 0x1234_5678);
        assert_eq!(instr.encode(), [0, 0, 0, 0, 0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn tag_is_first_word() {
        let instr = Instruction::bare(Opcode::Exit);
        assert_eq!(&instr.encode()[0..4], &[28, 0, 0, 0]);
    }

    #[test]
    fn negative_operand_encoding() {
        let instr = Instruction::new(Opcode::Push, -1);
        assert_eq!(&instr.encode()[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(Instruction::decode(instr.encode()).operand, -1);
    }

    #[test]
    fn decode_keeps_unknown_tags() {
        let bytes = [0x63, 0, 0, 0, 7, 0, 0, 0];
        let instr = Instruction::decode(bytes);
        assert_eq!(instr, Instruction::from_raw(99, 7));
        assert_eq!(instr.opcode(), Err(DecodeError::UnknownOpcode(99)));
    }

    #[test]
    fn opcode_resolves_known_tags() {
        let instr = Instruction::new(Opcode::Call, 12);
        assert_eq!(instr.opcode(), Ok(Opcode::Call));
        assert_eq!(instr.operand, 12);
    }

    #[test]
    fn bare_has_zero_operand() {
        assert_eq!(Instruction::bare(Opcode::Add).operand, 0);
    }
}
