//! Fetch-execute loop and opcode dispatch.

use std::io::Write;

use crate::error::{Fault, StackKind};
use crate::machine::{Flow, Halt, Machine, State, Word};
use crate::report::render_stack;
use stackvm_common::{Instruction, Opcode};

impl<'a, W: Write> Machine<'a, W> {
    /// Run until the program falls off its end, executes EXIT, or faults.
    ///
    /// The output sink is flushed on every exit path.
    pub fn run(&mut self) -> Result<Halt, Fault> {
        let outcome = loop {
            match self.step() {
                Ok(Some(halt)) => break Ok(halt),
                Ok(None) => {}
                Err(fault) => break Err(fault),
            }
        };

        if let Err(e) = self.out.flush() {
            if outcome.is_ok() {
                let fault = Fault::Output {
                    at: self.at(),
                    message: e.to_string(),
                };
                self.state = State::HaltedOnFault(fault.clone());
                return Err(fault);
            }
        }

        match &outcome {
            Ok(halt) => log::debug!("halted: {halt:?} at ip {}", self.ip),
            Err(fault) => log::debug!("faulted: {fault}"),
        }
        outcome
    }

    /// Execute one instruction.
    ///
    /// Returns `Ok(Some(_))` once the machine has halted; a halted machine
    /// keeps reporting the same outcome.
    pub fn step(&mut self) -> Result<Option<Halt>, Fault> {
        match &self.state {
            State::Running => {}
            State::HaltedNormally => return Ok(Some(Halt::Completed)),
            State::Terminated(code) => return Ok(Some(Halt::Exited(*code))),
            State::HaltedOnFault(fault) => return Err(fault.clone()),
        }

        let Some(&instr) = self.program.instructions.get(self.ip) else {
            self.state = State::HaltedNormally;
            return Ok(Some(Halt::Completed));
        };

        log::trace!("{:>6}: tag {} operand {}", self.ip, instr.tag, instr.operand);

        match self.execute_one(&instr) {
            Ok(Flow::Continue) => Ok(None),
            Ok(Flow::Exit(code)) => {
                self.state = State::Terminated(code);
                Ok(Some(Halt::Exited(code)))
            }
            Err(fault) => {
                self.state = State::HaltedOnFault(fault.clone());
                Err(fault)
            }
        }
    }

    /// Apply one instruction to the machine.
    ///
    /// The instruction pointer is advanced before the effect is applied, so
    /// control transfers overwrite it afterwards. A fault leaves the stacks
    /// and memory as they were.
    pub fn execute_one(&mut self, instr: &Instruction) -> Result<Flow, Fault> {
        self.ip += 1;

        let opcode = match instr.opcode() {
            Ok(opcode) => opcode,
            Err(_) => {
                return Err(Fault::IllegalInstruction {
                    at: self.at(),
                    tag: instr.tag,
                })
            }
        };
        let operand = instr.operand;

        match opcode {
            Opcode::Push => self.push(Word::from(operand))?,

            // Arithmetic
            Opcode::Add => self.exec_arith(Word::overflowing_add)?,
            Opcode::Sub => self.exec_arith(Word::overflowing_sub)?,
            Opcode::Mul => self.exec_arith(Word::overflowing_mul)?,
            Opcode::DivMod => self.exec_divmod()?,

            // Stack manipulation
            Opcode::Dup => self.exec_dup()?,
            Opcode::Swap => self
                .stack
                .swap_top()
                .map_err(|e| self.stack_fault(e, StackKind::Operand))?,
            Opcode::Rot3 => self.exec_rot3()?,
            Opcode::Drop => {
                self.pop()?;
            }

            // Console
            Opcode::PrintNum => {
                let value = self.pop()?;
                self.write_output(format!("{value}\n").as_bytes())?;
            }
            Opcode::PrintChar => {
                let value = self.pop()?;
                self.write_output(&[value as u8])?;
            }
            Opcode::Dump => {
                let text = render_stack("Stack", self.stack.iter_top_down());
                self.write_output(text.as_bytes())?;
            }

            // Absolute memory
            Opcode::MemSetAbs => {
                self.require(1)?;
                let index = self.check_address(Word::from(operand))?;
                let value = self.pop()?;
                self.memory.set(index, value);
            }
            Opcode::MemGetAbs => {
                self.reserve(1)?;
                let index = self.check_address(Word::from(operand))?;
                self.push(self.memory.get(index))?;
            }

            Opcode::Compare => {
                let (a, b) = self.pop_pair()?;
                self.flags.equal = a == b;
                self.flags.less = a < b;
                self.flags.greater = a > b;
            }

            // Control transfer
            Opcode::Jmp => self.jump_if(true, operand)?,
            Opcode::JmpIfCarry => self.jump_if(self.flags.carry, operand)?,
            Opcode::JmpIfNotCarry => self.jump_if(!self.flags.carry, operand)?,
            Opcode::JmpIfEqual => self.jump_if(self.flags.equal, operand)?,
            Opcode::JmpIfNotEqual => self.jump_if(!self.flags.equal, operand)?,
            Opcode::JmpIfLess => self.jump_if(self.flags.less, operand)?,
            Opcode::JmpIfLessOrEqual => {
                self.jump_if(self.flags.less || self.flags.equal, operand)?
            }
            Opcode::JmpIfGreater => self.jump_if(self.flags.greater, operand)?,
            Opcode::JmpIfGreaterOrEqual => {
                self.jump_if(self.flags.greater || self.flags.equal, operand)?
            }

            // Indirect memory
            Opcode::MemSetIndirect => {
                self.require(2)?;
                let index = self.check_address(self.top()?)?;
                self.pop()?;
                let value = self.pop()?;
                self.memory.set(index, value);
            }
            Opcode::MemGetIndirect => {
                self.require(1)?;
                let index = self.check_address(self.top()?)?;
                self.pop()?;
                self.push(self.memory.get(index))?;
            }

            // Subroutines
            Opcode::Call => self.exec_call(operand)?,
            Opcode::Return => {
                self.ip = self
                    .call_stack
                    .pop()
                    .map_err(|e| self.stack_fault(e, StackKind::Call))?;
            }
            Opcode::Exit => {
                let code = if self.stack.is_empty() {
                    0
                } else {
                    self.pop()? as i32
                };
                return Ok(Flow::Exit(code));
            }
        }

        Ok(Flow::Continue)
    }

    fn top(&self) -> Result<Word, Fault> {
        self.stack
            .peek(0)
            .map_err(|e| self.stack_fault(e, StackKind::Operand))
    }

    /// Pop `b` and `a`, push the wrapped result and record the overflow in carry.
    fn exec_arith(&mut self, op: fn(Word, Word) -> (Word, bool)) -> Result<(), Fault> {
        let (a, b) = self.pop_pair()?;
        let (result, overflowed) = op(a, b);
        self.flags.carry = overflowed;
        self.push(result)
    }

    /// Remainder first, quotient on top.
    fn exec_divmod(&mut self) -> Result<(), Fault> {
        self.require(2)?;
        if self.top()? == 0 {
            return Err(Fault::DivisionByZero { at: self.at() });
        }
        let (a, b) = self.pop_pair()?;
        self.push(a.wrapping_rem(b))?;
        self.push(a.wrapping_div(b))
    }

    fn exec_dup(&mut self) -> Result<(), Fault> {
        self.reserve(1)?;
        let value = self.top()?;
        self.push(value)
    }

    // Pops a, b, c and pushes them back as a, b, c, reversing the top three.
    fn exec_rot3(&mut self) -> Result<(), Fault> {
        self.require(3)?;
        let a = self.pop()?;
        let b = self.pop()?;
        let c = self.pop()?;
        self.push(a)?;
        self.push(b)?;
        self.push(c)
    }

    fn exec_call(&mut self, operand: i32) -> Result<(), Fault> {
        self.call_stack
            .reserve(1)
            .map_err(|e| self.stack_fault(e, StackKind::Call))?;
        let target = self.jump_target(operand)?;
        self.call_stack
            .push(self.ip)
            .map_err(|e| self.stack_fault(e, StackKind::Call))?;
        self.ip = target;
        Ok(())
    }

    fn jump_if(&mut self, condition: bool, operand: i32) -> Result<(), Fault> {
        if condition {
            self.ip = self.jump_target(operand)?;
        }
        Ok(())
    }

    /// Targets past the end are allowed: the next fetch halts normally.
    fn jump_target(&self, operand: i32) -> Result<usize, Fault> {
        usize::try_from(operand).map_err(|_| Fault::IllegalJump {
            at: self.at(),
            target: operand,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::MachineConfig;
    use crate::error::{Fault, StackKind};
    use crate::machine::{Flow, Halt, Machine, State};
    use stackvm_common::{Instruction, Opcode, Program};

    fn config() -> MachineConfig {
        MachineConfig::default()
            .with_stack_capacity(8)
            .with_memory_cells(16)
    }

    #[test]
    fn execute_one_advances_ip_first() {
        let program = Program::default();
        let mut vm = Machine::with_config(&program, Vec::new(), config()).unwrap();
        let flow = vm.execute_one(&Instruction::new(Opcode::Push, 3)).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(vm.instruction_pointer(), 1);
        assert_eq!(vm.stack(), &[3]);
    }

    #[test]
    fn fault_still_advances_ip() {
        let program = Program::default();
        let mut vm = Machine::with_config(&program, Vec::new(), config()).unwrap();
        let fault = vm.execute_one(&Instruction::bare(Opcode::Add)).unwrap_err();
        assert_eq!(
            fault,
            Fault::StackUnderflow {
                at: 0,
                stack: StackKind::Operand
            }
        );
        assert_eq!(vm.instruction_pointer(), 1);
    }

    #[test]
    fn step_reports_halt_repeatedly() {
        let program = Program::new(vec![Instruction::new(Opcode::Push, 1)]);
        let mut vm = Machine::with_config(&program, Vec::new(), config()).unwrap();
        assert_eq!(vm.step(), Ok(None));
        assert_eq!(vm.step(), Ok(Some(Halt::Completed)));
        assert_eq!(vm.step(), Ok(Some(Halt::Completed)));
        assert_eq!(vm.state(), &State::HaltedNormally);
    }

    #[test]
    fn step_after_fault_repeats_fault() {
        let program = Program::new(vec![Instruction::bare(Opcode::Drop)]);
        let mut vm = Machine::with_config(&program, Vec::new(), config()).unwrap();
        let first = vm.step().unwrap_err();
        assert_eq!(vm.step().unwrap_err(), first);
        assert_eq!(vm.state(), &State::HaltedOnFault(first));
    }

    #[test]
    fn exit_code_truncates_to_i32() {
        let program = Program::default();
        let mut vm = Machine::with_config(&program, Vec::new(), config()).unwrap();
        vm.stack.push((1 << 32) | 7).unwrap();
        assert_eq!(
            vm.execute_one(&Instruction::bare(Opcode::Exit)),
            Ok(Flow::Exit(7))
        );
    }
}
