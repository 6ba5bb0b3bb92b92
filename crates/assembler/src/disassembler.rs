//! Disassembler: program → canonical assembly text.
//!
//! One instruction per line, lowercase mnemonics, decimal operands, no
//! labels. A non-empty memory image follows as a single `memory` block.

use stackvm_common::Program;

/// Memory words per line inside the `memory` block.
const WORDS_PER_LINE: usize = 8;

/// Disassemble a program into canonical assembly text.
///
/// For programs whose tags are all valid and whose operand-less
/// instructions carry a zero operand, the output reassembles to an
/// identical program. Anything else is kept visible as a comment.
pub fn disassemble(program: &Program) -> String {
    let mut lines = Vec::new();

    for instr in &program.instructions {
        let line = match instr.opcode() {
            Ok(opcode) if opcode.takes_operand() => {
                format!("{} {}", opcode.mnemonic(), instr.operand)
            }
            Ok(opcode) if instr.operand == 0 => opcode.mnemonic().to_string(),
            Ok(opcode) => format!("{} ; operand {}", opcode.mnemonic(), instr.operand),
            Err(_) => format!("; unknown tag {} operand {}", instr.tag, instr.operand),
        };
        lines.push(line);
    }

    if !program.memory_image.is_empty() {
        lines.push("memory".to_string());
        for chunk in program.memory_image.chunks(WORDS_PER_LINE) {
            let words: Vec<String> = chunk.iter().map(i32::to_string).collect();
            lines.push(words.join(" "));
        }
        lines.push("end".to_string());
    }

    let mut result = lines.join("\n");
    if !result.is_empty() {
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackvm_common::{Instruction, Opcode};

    #[test]
    fn empty_program() {
        assert_eq!(disassemble(&Program::default()), "");
    }

    #[test]
    fn bare_and_operand_instructions() {
        let program = Program::new(vec![
            Instruction::new(Opcode::Push, -12),
            Instruction::bare(Opcode::PrintNum),
            Instruction::new(Opcode::JmpIfLessOrEqual, 0),
            Instruction::bare(Opcode::Exit),
        ]);
        assert_eq!(disassemble(&program), "push -12\nprint\njle 0\nexit\n");
    }

    #[test]
    fn memory_block_wraps_every_eight_words() {
        let program = Program::with_memory(
            vec![Instruction::bare(Opcode::Dump)],
            (1..=10).collect(),
        );
        assert_eq!(
            disassemble(&program),
            "dump\nmemory\n1 2 3 4 5 6 7 8\n9 10\nend\n"
        );
    }

    #[test]
    fn memory_only_program() {
        let program = Program::with_memory(vec![], vec![-1]);
        assert_eq!(disassemble(&program), "memory\n-1\nend\n");
    }

    #[test]
    fn unknown_tag_becomes_comment() {
        let program = Program::new(vec![Instruction::from_raw(99, 3)]);
        assert_eq!(disassemble(&program), "; unknown tag 99 operand 3\n");
    }

    #[test]
    fn stray_operand_becomes_comment() {
        let program = Program::new(vec![Instruction::new(Opcode::Dup, 5)]);
        assert_eq!(disassemble(&program), "dup ; operand 5\n");
    }
}
