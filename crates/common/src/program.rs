//! Program representation and the binary program format.
//!
//! A program binary is a sequence of little-endian 32-bit words:
//! ```text
//! magic (u32) = 0x00565343
//! instruction count K (u32)
//! K records of (tag: i32, operand: i32)
//! memory image: remaining words (i32), a trailing partial word is ignored
//! ```

use crate::error::DecodeError;
use crate::instruction::{Instruction, INSTRUCTION_SIZE};

/// Magic number at the start of every program binary.
pub const MAGIC: u32 = 0x0056_5343;

/// Largest instruction count the header can carry.
pub const MAX_INSTRUCTIONS: usize = u32::MAX as usize;

const HEADER_SIZE: usize = 8;
const WORD_SIZE: usize = 4;

/// A stackvm program: instructions plus the initial memory image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
    /// Words preloaded into `memory[0..]` before execution starts.
    pub memory_image: Vec<i32>,
}

impl Program {
    /// Create a new program with an empty memory image.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            memory_image: Vec::new(),
        }
    }

    /// Create a new program with a memory image.
    pub fn with_memory(instructions: Vec<Instruction>, memory_image: Vec<i32>) -> Self {
        Self {
            instructions,
            memory_image,
        }
    }

    /// Encode the program to its binary form.
    ///
    /// # Panics
    ///
    /// Panics if the program has more than [`MAX_INSTRUCTIONS`] instructions.
    pub fn encode(&self) -> Vec<u8> {
        let count = u32::try_from(self.instructions.len())
            .expect("instruction count exceeds the u32 header field");
        let mut bytes = Vec::with_capacity(
            HEADER_SIZE
                + self.instructions.len() * INSTRUCTION_SIZE
                + self.memory_image.len() * WORD_SIZE,
        );
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        for instr in &self.instructions {
            bytes.extend_from_slice(&instr.encode());
        }
        for word in &self.memory_image {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Decode a program binary.
    ///
    /// Unknown opcode tags are not rejected here; they fault when executed.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < WORD_SIZE {
            return Err(DecodeError::TruncatedHeader(bytes.len()));
        }
        let magic = read_u32(&bytes[0..4]);
        if magic != MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }
        if bytes.len() < HEADER_SIZE {
            return Err(DecodeError::TruncatedHeader(bytes.len()));
        }

        let count = read_u32(&bytes[4..8]) as usize;
        let body = &bytes[HEADER_SIZE..];
        let available = body.len() / INSTRUCTION_SIZE;
        if available < count {
            return Err(DecodeError::TruncatedInstructions {
                expected: count,
                available,
            });
        }

        let (code, data) = body.split_at(count * INSTRUCTION_SIZE);
        let instructions = code
            .chunks_exact(INSTRUCTION_SIZE)
            .map(|chunk| {
                let mut record = [0u8; INSTRUCTION_SIZE];
                record.copy_from_slice(chunk);
                Instruction::decode(record)
            })
            .collect();
        let memory_image = data
            .chunks_exact(WORD_SIZE)
            .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self {
            instructions,
            memory_image,
        })
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

fn read_u32(word: &[u8]) -> u32 {
    u32::from_le_bytes([word[0], word[1], word[2], word[3]])
}
