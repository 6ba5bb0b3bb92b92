//! stackvm virtual machine, executing stackvm programs.
//!
//! The VM is a stack-based machine with:
//! - An operand stack of 64-bit words
//! - A separate call stack of return addresses
//! - A flat, bounds-checked word memory preloaded from the program image
//! - Four condition flags: equal, less, greater (from COMPARE) and carry
//!
//! # Usage
//!
//! ```
//! use stackvm_common::{Instruction, Opcode, Program};
//! use stackvm_vm::{run, Halt};
//!
//! let program = Program::new(vec![
//!     Instruction::new(Opcode::Push, 65),
//!     Instruction::bare(Opcode::PrintChar),
//! ]);
//!
//! let mut out = Vec::new();
//! let halt = run(&program, &mut out).unwrap();
//! assert_eq!(halt, Halt::Completed);
//! assert_eq!(out, b"A");
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod machine;
pub mod memory;
pub mod report;
pub mod stack;

pub use config::MachineConfig;
pub use error::{Fault, LoadError, StackKind};
pub use machine::{Flags, Flow, Halt, Machine, State, Word};

use std::io::Write;

use stackvm_common::Program;
use thiserror::Error;

/// Why [`run`] did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Fault(#[from] Fault),
}

/// Execute a program with the default machine sizes, writing console output to `out`.
///
/// # Errors
///
/// Returns [`RunError::Load`] if the machine cannot be set up, or
/// [`RunError::Fault`] if execution faults.
pub fn run<W: Write>(program: &Program, out: W) -> Result<Halt, RunError> {
    run_with_config(program, out, MachineConfig::default())
}

/// Execute a program on a machine of the given sizes.
pub fn run_with_config<W: Write>(
    program: &Program,
    out: W,
    config: MachineConfig,
) -> Result<Halt, RunError> {
    let mut vm = Machine::with_config(program, out, config)?;
    Ok(vm.run()?)
}
