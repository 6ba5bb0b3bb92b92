//! VM state: operand stack, call stack, memory, flags, instruction pointer.

use std::io::Write;

use crate::config::MachineConfig;
use crate::error::{Fault, LoadError, StackKind};
use crate::memory::Memory;
use crate::stack::{Stack, StackError};
use stackvm_common::Program;

/// The machine's value type.
pub type Word = i64;

/// Condition flags.
///
/// `equal`, `less` and `greater` are written only by COMPARE; `carry` only by
/// ADD, SUB and MUL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub equal: bool,
    pub less: bool,
    pub greater: bool,
    pub carry: bool,
}

/// Where the fetch-execute loop stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    /// The instruction pointer ran past the last instruction.
    HaltedNormally,
    HaltedOnFault(Fault),
    /// An EXIT instruction ended the program with this code.
    Terminated(i32),
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// Fell off the end of the program.
    Completed,
    /// EXIT with the given code.
    Exited(i32),
}

impl Halt {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Halt::Completed => 0,
            Halt::Exited(code) => *code,
        }
    }
}

/// Result of executing one instruction without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

/// The stackvm virtual machine.
pub struct Machine<'a, W: Write> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    pub(crate) stack: Stack<Word>,
    /// Return addresses (instruction indices).
    pub(crate) call_stack: Stack<usize>,
    pub(crate) memory: Memory,
    /// Index of the next instruction to fetch.
    pub(crate) ip: usize,
    pub(crate) flags: Flags,
    pub(crate) state: State,
    pub(crate) out: W,
}

impl<'a, W: Write> Machine<'a, W> {
    /// Create a machine with the default sizes.
    pub fn new(program: &'a Program, out: W) -> Result<Self, LoadError> {
        Self::with_config(program, out, MachineConfig::default())
    }

    /// Create a machine and preload its memory from the program's image.
    pub fn with_config(
        program: &'a Program,
        out: W,
        config: MachineConfig,
    ) -> Result<Self, LoadError> {
        let mut memory = Memory::new(config.memory_cells)?;
        memory.preload(&program.memory_image)?;
        log::debug!(
            "loaded {} instructions, {} memory words",
            program.len(),
            program.memory_image.len()
        );

        Ok(Self {
            program,
            stack: Stack::new(config.stack_capacity),
            call_stack: Stack::new(config.stack_capacity),
            memory,
            ip: 0,
            flags: Flags::default(),
            state: State::Running,
            out,
        })
    }

    /// Operand stack contents, bottom first.
    pub fn stack(&self) -> &[Word] {
        self.stack.as_slice()
    }

    /// Call stack contents, bottom first.
    pub fn call_stack(&self) -> &[usize] {
        self.call_stack.as_slice()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Read a memory cell, `None` if the address is out of range.
    pub fn memory(&self, address: Word) -> Option<Word> {
        self.memory.load(address)
    }

    /// The output sink.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consume the machine, returning the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Index of the instruction being executed (the pointer is already advanced).
    pub(crate) fn at(&self) -> usize {
        self.ip.saturating_sub(1)
    }

    pub(crate) fn stack_fault(&self, error: StackError, stack: StackKind) -> Fault {
        let at = self.at();
        match error {
            StackError::Overflow => Fault::StackOverflow { at, stack },
            StackError::Underflow => Fault::StackUnderflow { at, stack },
        }
    }

    /// Fail unless the operand stack holds at least `count` entries.
    pub(crate) fn require(&self, count: usize) -> Result<(), Fault> {
        self.stack
            .require(count)
            .map_err(|e| self.stack_fault(e, StackKind::Operand))
    }

    /// Fail unless the operand stack has room for `count` more entries.
    pub(crate) fn reserve(&self, count: usize) -> Result<(), Fault> {
        self.stack
            .reserve(count)
            .map_err(|e| self.stack_fault(e, StackKind::Operand))
    }

    pub(crate) fn push(&mut self, value: Word) -> Result<(), Fault> {
        self.stack
            .push(value)
            .map_err(|e| self.stack_fault(e, StackKind::Operand))
    }

    pub(crate) fn pop(&mut self) -> Result<Word, Fault> {
        self.stack
            .pop()
            .map_err(|e| self.stack_fault(e, StackKind::Operand))
    }

    /// Pop `b` then `a`, returning `(a, b)`.
    pub(crate) fn pop_pair(&mut self) -> Result<(Word, Word), Fault> {
        self.require(2)?;
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    /// Map an address to a memory index or raise `IllegalMemoryAccess`.
    pub(crate) fn check_address(&self, address: Word) -> Result<usize, Fault> {
        self.memory
            .index(address)
            .ok_or(Fault::IllegalMemoryAccess {
                at: self.at(),
                address,
            })
    }

    pub(crate) fn write_output(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        let at = self.at();
        self.out.write_all(bytes).map_err(|e| Fault::Output {
            at,
            message: e.to_string(),
        })
    }
}
