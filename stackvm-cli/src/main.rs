//! stackvm CLI: run, assemble and disassemble programs.
//!
//! Exit codes:
//! - 0: Success, or the program ended without an EXIT status
//! - N: The status the program passed to EXIT
//! - 1: Input/decode/load/assembly error
//! - 2: Command-line usage error (reported by clap)
//! - 3: Runtime fault
//!
//! A program that passes 1 or 3 to EXIT is indistinguishable from a load
//! error or a fault by exit code alone; the stderr report tells them apart.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use stackvm_vm::config::{DEFAULT_MEMORY_CELLS, DEFAULT_STACK_CAPACITY};
use stackvm_vm::MachineConfig;

#[derive(Parser, Debug)]
#[command(name = "stackvm", version)]
#[command(about = "Run, assemble and disassemble stackvm programs")]
struct Cli {
    /// Program binary to run when no subcommand is given
    program: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and execute a program binary
    Run(RunArgs),

    /// Assemble a text file into a program binary
    Assemble {
        /// Assembly source
        input: PathBuf,

        /// Output path (default: input without its extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a program binary as assembly text
    Disassemble {
        /// Program binary
        program: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Program binary
    program: PathBuf,

    /// Capacity of the operand and call stacks
    #[arg(long, default_value_t = DEFAULT_STACK_CAPACITY)]
    stack_capacity: usize,

    /// Number of memory cells
    #[arg(long, default_value_t = DEFAULT_MEMORY_CELLS)]
    memory_cells: usize,
}

impl RunArgs {
    fn config(&self) -> MachineConfig {
        MachineConfig::default()
            .with_stack_capacity(self.stack_capacity)
            .with_memory_cells(self.memory_cells)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match (cli.command, cli.program) {
        (Some(Command::Run(args)), None) => commands::run(&args.program, args.config()),
        (Some(Command::Assemble { input, output }), None) => {
            commands::assemble(&input, output.as_deref())
        }
        (Some(Command::Disassemble { program }), None) => commands::disassemble(&program),
        (None, Some(program)) => commands::run(&program, MachineConfig::default()),
        (Some(_), Some(program)) => {
            eprintln!(
                "error: unexpected argument '{}' before subcommand",
                program.display()
            );
            process::exit(1);
        }
        (None, None) => {
            eprintln!("error: a program to run is required");
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Warn by default; each `-v` raises the level. `RUST_LOG` takes precedence.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_program_argument() {
        let cli = Cli::try_parse_from(["stackvm", "prog.bin"]).unwrap();
        assert_eq!(cli.program, Some(PathBuf::from("prog.bin")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_subcommand_with_sizes() {
        let cli = Cli::try_parse_from([
            "stackvm",
            "-vv",
            "run",
            "prog.bin",
            "--stack-capacity",
            "8",
            "--memory-cells",
            "32",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Run(args)) => {
                assert_eq!(args.program, PathBuf::from("prog.bin"));
                assert_eq!(
                    args.config(),
                    MachineConfig::default()
                        .with_stack_capacity(8)
                        .with_memory_cells(32)
                );
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["stackvm", "run", "prog.bin"]).unwrap();
        match cli.command {
            Some(Command::Run(args)) => assert_eq!(args.config(), MachineConfig::default()),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn assemble_with_output() {
        let cli = Cli::try_parse_from(["stackvm", "assemble", "a.asm", "-o", "a.out"]).unwrap();
        match cli.command {
            Some(Command::Assemble { input, output }) => {
                assert_eq!(input, PathBuf::from("a.asm"));
                assert_eq!(output, Some(PathBuf::from("a.out")));
            }
            other => panic!("expected assemble, got {other:?}"),
        }
    }
}
