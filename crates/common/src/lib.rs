//! stackvm common types and program encoding.
//!
//! This crate provides the foundational data structures shared by the VM,
//! the assembler and the CLI:
//!
//! - [`Opcode`]: the closed set of 29 opcodes
//! - [`Instruction`]: an opcode tag plus one 32-bit operand
//! - [`Program`]: instructions plus a memory image, with the binary format
//! - [`DecodeError`]: errors from decoding program binaries

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::{Program, MAGIC, MAX_INSTRUCTIONS};
