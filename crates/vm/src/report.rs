//! Stack dumps and fault reports.

use std::fmt::Display;
use std::io::{self, Write};

use crate::error::Fault;
use crate::machine::Machine;

/// Render a titled stack listing, one entry per line, top first.
pub(crate) fn render_stack<T: Display>(title: &str, entries: impl Iterator<Item = T>) -> String {
    let mut text = format!("{title}:\n");
    let mut empty = true;
    for entry in entries {
        empty = false;
        text.push_str(&format!("    {entry}\n"));
    }
    if empty {
        text.push_str("    [empty]\n");
    }
    text
}

impl<'a, W: Write> Machine<'a, W> {
    /// Write the operand stack listing, as the DUMP instruction prints it.
    pub fn dump_stack(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(render_stack("Stack", self.stack.iter_top_down()).as_bytes())
    }

    /// Write the call stack listing.
    pub fn dump_call_stack(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(render_stack("Call stack", self.call_stack.iter_top_down()).as_bytes())
    }

    /// Write the diagnostic report for a fault: the message, then both stacks.
    pub fn report_fault(&self, fault: &Fault, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "Error: {fault}.")?;
        self.dump_stack(w)?;
        self.dump_call_stack(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use stackvm_common::{Instruction, Opcode, Program};

    #[test]
    fn render_empty_stack() {
        let entries: [i64; 0] = [];
        assert_eq!(
            render_stack("Stack", entries.iter()),
            "Stack:\n    [empty]\n"
        );
    }

    #[test]
    fn render_top_first() {
        let entries = [3, 2, 1];
        assert_eq!(
            render_stack("Stack", entries.iter()),
            "Stack:\n    3\n    2\n    1\n"
        );
    }

    #[test]
    fn fault_report_lists_both_stacks() {
        let program = Program::new(vec![
            Instruction::new(Opcode::Push, 4),
            Instruction::new(Opcode::Call, 3),
            Instruction::bare(Opcode::Exit),
            Instruction::bare(Opcode::Swap),
        ]);
        let config = MachineConfig::default().with_memory_cells(4);
        let mut vm = Machine::with_config(&program, Vec::new(), config).unwrap();
        let fault = vm.run().unwrap_err();

        let mut report = Vec::new();
        vm.report_fault(&fault, &mut report).unwrap();
        assert_eq!(
            String::from_utf8(report).unwrap(),
            "Error: stack underflow (operand stack) at instruction 3.\n\
             Stack:\n    4\n\
             Call stack:\n    2\n"
        );
    }
}
