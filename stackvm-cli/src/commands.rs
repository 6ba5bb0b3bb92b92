//! CLI command implementations.
//!
//! Each command reports its own errors on stderr and returns the process
//! exit code to use on failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stackvm_common::Program;
use stackvm_vm::{Machine, MachineConfig};

/// Load and execute a program binary.
///
/// Console output goes to stdout. A non-zero EXIT status is returned on the
/// error path so `main` hands it to the process.
pub fn run(path: &Path, config: MachineConfig) -> Result<(), i32> {
    let program = read_binary(path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut vm = Machine::with_config(&program, &mut out, config).map_err(|e| {
        eprintln!("error: cannot load '{}': {e}", path.display());
        1
    })?;

    match vm.run() {
        Ok(halt) => {
            log::info!("{}: {halt:?}", path.display());
            match halt.exit_code() {
                0 => Ok(()),
                code => Err(code),
            }
        }
        Err(fault) => {
            // A failed stderr write is ignored; exit code 3 still signals the fault.
            let _ = vm.report_fault(&fault, &mut io::stderr().lock());
            Err(3)
        }
    }
}

/// Assemble a text file into a program binary.
pub fn assemble(input: &Path, output: Option<&Path>) -> Result<(), i32> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", input.display());
        1
    })?;

    let program = stackvm_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {}: {e}", input.display());
        1
    })?;

    let bytes = program.encode();
    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{}': {e}", output.display());
        1
    })?;

    eprintln!(
        "assembled {} instructions, {} memory words ({} bytes) -> {}",
        program.len(),
        program.memory_image.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}

/// Print a program binary as assembly text.
pub fn disassemble(path: &Path) -> Result<(), i32> {
    let program = read_binary(path)?;
    print!("{}", stackvm_assembler::disassemble(&program));
    Ok(())
}

/// Input path without its extension, or with `.bin` if it has none.
fn default_output(input: &Path) -> PathBuf {
    if input.extension().is_some() {
        input.with_extension("")
    } else {
        input.with_extension("bin")
    }
}

fn read_binary(path: &Path) -> Result<Program, i32> {
    let bytes = fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        1
    })?;

    Program::decode(&bytes).map_err(|e| {
        eprintln!("error: invalid binary '{}': {e}", path.display());
        1
    })
}
