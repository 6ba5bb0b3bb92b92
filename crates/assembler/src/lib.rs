//! stackvm assembler: assembly text ↔ program binary.
//!
//! # Syntax
//!
//! - `mnemonic [operand]`: one instruction; the operand must be on the same
//!   line. Operands are decimal or `0x` hex numbers (optionally negative),
//!   character literals like `'A'` or `'\n'`, or label names.
//! - `label name`: binds `name` to the index of the next instruction.
//! - `memory [name] items... end`: appends words to the memory image and
//!   binds `name` to the offset of the first one. Items are numbers,
//!   character literals, label names, or strings (`"hi"` is `104 105 0`).
//! - `;` starts a comment that runs to the end of the line.
//!
//! # Usage
//!
//! ```
//! use stackvm_assembler::{assemble, disassemble};
//!
//! let text = "push 65\nprintc\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for every program
//! produced by [`assemble`]. The disassembler emits canonical text: no
//! labels, decimal operands, and one unnamed memory block.

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use lexer::tokenize_line;
use parser::{parse, Spanned};
use stackvm_common::Program;

/// Assemble text into a program.
///
/// Returns the first error encountered.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut tokens = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        tokens.extend(
            tokenize_line(line, line_num)?
                .into_iter()
                .map(|token| Spanned {
                    token,
                    line: line_num,
                }),
        );
    }

    let program = parse(&tokens)?;
    log::debug!(
        "assembled {} instructions, {} memory words",
        program.len(),
        program.memory_image.len()
    );
    Ok(program)
}

/// Disassemble a program into canonical assembly text.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
