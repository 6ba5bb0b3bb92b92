//! Error types for the stackvm assembler.

use thiserror::Error;

/// Errors produced while assembling text into a program.
///
/// Every variant carries the 1-based source line it was found on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A word in statement position is not a mnemonic or directive.
    #[error("line {line}: unknown mnemonic '{token}'")]
    UnknownMnemonic { line: usize, token: String },

    /// An instruction or directive needs an operand on the same line.
    #[error("line {line}: {mnemonic} expects an operand")]
    MissingOperand { line: usize, mnemonic: &'static str },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// A numeric literal could not be parsed or does not fit in 32 bits.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A character or string literal has no closing quote.
    #[error("line {line}: unterminated literal")]
    UnterminatedLiteral { line: usize },

    /// A character literal is empty, too long, or uses an unknown escape.
    #[error("line {line}: invalid character literal '{token}'")]
    InvalidCharLiteral { line: usize, token: String },

    #[error("line {line}: undefined label '{name}'")]
    UndefinedLabel { line: usize, name: String },

    #[error("line {line}: label '{name}' already defined on line {first}")]
    DuplicateLabel {
        line: usize,
        name: String,
        first: usize,
    },

    /// A `memory` block reached the end of input without `end`.
    #[error("line {line}: memory block is missing 'end'")]
    UnterminatedMemoryBlock { line: usize },
}

impl AsmError {
    /// Source line the error was found on.
    pub fn line(&self) -> usize {
        match self {
            AsmError::UnknownMnemonic { line, .. }
            | AsmError::MissingOperand { line, .. }
            | AsmError::UnexpectedToken { line, .. }
            | AsmError::InvalidNumber { line, .. }
            | AsmError::UnterminatedLiteral { line }
            | AsmError::InvalidCharLiteral { line, .. }
            | AsmError::UndefinedLabel { line, .. }
            | AsmError::DuplicateLabel { line, .. }
            | AsmError::UnterminatedMemoryBlock { line } => *line,
        }
    }
}
