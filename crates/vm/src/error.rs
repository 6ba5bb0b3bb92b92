//! Runtime faults and load errors for the stackvm machine.
//!
//! Every fault carries the index of the instruction that raised it (`at`).
//! A fault is terminal: the driver stops and reports it.

use std::fmt;
use thiserror::Error;

/// Which of the two machine stacks a stack fault refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    /// The operand stack.
    Operand,
    /// The call-return stack.
    Call,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Operand => f.write_str("operand stack"),
            StackKind::Call => f.write_str("call stack"),
        }
    }
}

/// Errors that halt program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// A push would exceed the stack capacity.
    #[error("stack overflow ({stack}) at instruction {at}")]
    StackOverflow { at: usize, stack: StackKind },

    /// An instruction needs more entries than the stack holds.
    #[error("stack underflow ({stack}) at instruction {at}")]
    StackUnderflow { at: usize, stack: StackKind },

    /// The opcode tag is outside the instruction set.
    #[error("illegal instruction (tag {tag}) at instruction {at}")]
    IllegalInstruction { at: usize, tag: i32 },

    /// A memory address outside `[0, memory_cells)`.
    #[error("illegal memory access (address {address}) at instruction {at}")]
    IllegalMemoryAccess { at: usize, address: i64 },

    /// A jump or call to a negative target.
    #[error("illegal jump target {target} at instruction {at}")]
    IllegalJump { at: usize, target: i32 },

    /// DIVMOD with a zero divisor.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// Writing to the output stream failed.
    #[error("output error at instruction {at}: {message}")]
    Output { at: usize, message: String },
}

impl Fault {
    /// Index of the faulting instruction.
    pub fn at(&self) -> usize {
        match self {
            Fault::StackOverflow { at, .. }
            | Fault::StackUnderflow { at, .. }
            | Fault::IllegalInstruction { at, .. }
            | Fault::IllegalMemoryAccess { at, .. }
            | Fault::IllegalJump { at, .. }
            | Fault::DivisionByZero { at }
            | Fault::Output { at, .. } => *at,
        }
    }
}

/// Errors raised while setting up a machine for a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The memory image does not fit in the configured memory.
    #[error("memory image of {words} words does not fit in {cells} memory cells")]
    MemoryImageTooLarge { words: usize, cells: usize },

    /// The configured memory size cannot be allocated.
    #[error("cannot allocate {cells} memory cells")]
    MemoryTooLarge { cells: usize },
}
