//! Opcode definitions for the stackvm instruction set.
//!
//! The binary tag of an opcode is its ordinal position in [`ALL_OPCODES`].

use crate::error::DecodeError;

/// Identifies the operation an instruction performs.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Push the operand.
    Push = 0,

    // Arithmetic
    /// Pop `b`, pop `a`, push `a + b` (wrapping), set carry on overflow.
    Add = 1,
    /// Pop `b`, pop `a`, push `a - b` (wrapping), set carry on overflow.
    Sub = 2,
    /// Pop `b`, pop `a`, push `a * b` (wrapping), set carry on overflow.
    Mul = 3,
    /// Pop `b`, pop `a`, push `a % b` then `a / b`.
    DivMod = 4,

    // Stack manipulation
    /// Duplicate the top value.
    Dup = 5,
    /// Exchange the top two values.
    Swap = 6,
    /// Reverse the top three values.
    Rot3 = 7,
    /// Discard the top value.
    Drop = 8,

    // Console
    /// Pop a value and print it in decimal followed by a newline.
    PrintNum = 9,
    /// Pop a value and print its low 8 bits as one character.
    PrintChar = 10,
    /// Print the whole operand stack, top first.
    Dump = 11,

    // Absolute memory
    /// Pop a value into `memory[operand]`.
    MemSetAbs = 12,
    /// Push `memory[operand]`.
    MemGetAbs = 13,

    /// Pop `b`, pop `a`, set exactly one of equal/less/greater.
    Compare = 14,

    // Control transfer
    /// Jump to the operand.
    Jmp = 15,
    JmpIfCarry = 16,
    JmpIfNotCarry = 17,
    JmpIfEqual = 18,
    JmpIfNotEqual = 19,
    JmpIfLess = 20,
    JmpIfLessOrEqual = 21,
    JmpIfGreater = 22,
    JmpIfGreaterOrEqual = 23,

    // Indirect memory
    /// Pop address `b`, pop value `a`, store `a` at `memory[b]`.
    MemSetIndirect = 24,
    /// Pop address `a`, push `memory[a]`.
    MemGetIndirect = 25,

    // Subroutines
    /// Push the return address on the call stack and jump to the operand.
    Call = 26,
    /// Pop a return address from the call stack and jump to it.
    Return = 27,
    /// Terminate with the popped value (or 0) as the exit code.
    Exit = 28,
}

/// All opcodes, in tag order. Useful for exhaustive testing and lookups.
pub const ALL_OPCODES: [Opcode; 29] = [
    Opcode::Push,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::DivMod,
    Opcode::Dup,
    Opcode::Swap,
    Opcode::Rot3,
    Opcode::Drop,
    Opcode::PrintNum,
    Opcode::PrintChar,
    Opcode::Dump,
    Opcode::MemSetAbs,
    Opcode::MemGetAbs,
    Opcode::Compare,
    Opcode::Jmp,
    Opcode::JmpIfCarry,
    Opcode::JmpIfNotCarry,
    Opcode::JmpIfEqual,
    Opcode::JmpIfNotEqual,
    Opcode::JmpIfLess,
    Opcode::JmpIfLessOrEqual,
    Opcode::JmpIfGreater,
    Opcode::JmpIfGreaterOrEqual,
    Opcode::MemSetIndirect,
    Opcode::MemGetIndirect,
    Opcode::Call,
    Opcode::Return,
    Opcode::Exit,
];

impl TryFrom<i32> for Opcode {
    type Error = DecodeError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        usize::try_from(tag)
            .ok()
            .and_then(|index| ALL_OPCODES.get(index))
            .copied()
            .ok_or(DecodeError::UnknownOpcode(tag))
    }
}

impl Opcode {
    /// The binary tag written to program files.
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "push",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::DivMod => "div",
            Opcode::Dup => "dup",
            Opcode::Swap => "swap",
            Opcode::Rot3 => "rot",
            Opcode::Drop => "drop",
            Opcode::PrintNum => "print",
            Opcode::PrintChar => "printc",
            Opcode::Dump => "dump",
            Opcode::MemSetAbs => "mset",
            Opcode::MemGetAbs => "mget",
            Opcode::Compare => "cmp",
            Opcode::Jmp => "jmp",
            Opcode::JmpIfCarry => "jc",
            Opcode::JmpIfNotCarry => "jnc",
            Opcode::JmpIfEqual => "je",
            Opcode::JmpIfNotEqual => "jne",
            Opcode::JmpIfLess => "jl",
            Opcode::JmpIfLessOrEqual => "jle",
            Opcode::JmpIfGreater => "jg",
            Opcode::JmpIfGreaterOrEqual => "jge",
            Opcode::MemSetIndirect => "setptr",
            Opcode::MemGetIndirect => "getptr",
            Opcode::Call => "call",
            Opcode::Return => "ret",
            Opcode::Exit => "exit",
        }
    }

    /// Look up an opcode by its assembly mnemonic (case-insensitive).
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic))
            .copied()
    }

    /// Whether the instruction's operand is meaningful for this opcode.
    pub fn takes_operand(&self) -> bool {
        matches!(
            self,
            Opcode::Push
                | Opcode::MemSetAbs
                | Opcode::MemGetAbs
                | Opcode::Call
                | Opcode::Jmp
                | Opcode::JmpIfCarry
                | Opcode::JmpIfNotCarry
                | Opcode::JmpIfEqual
                | Opcode::JmpIfNotEqual
                | Opcode::JmpIfLess
                | Opcode::JmpIfLessOrEqual
                | Opcode::JmpIfGreater
                | Opcode::JmpIfGreaterOrEqual
        )
    }
}
