//! Decode errors for stackvm program binaries.

use thiserror::Error;

/// Errors that occur while decoding a program binary or resolving an opcode tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The first four bytes are not the program magic.
    #[error("bad magic: {0:#010x} (expected {expected:#010x})", expected = crate::program::MAGIC)]
    BadMagic(u32),

    /// The byte stream ends before the magic and instruction count.
    #[error("truncated header: {0} byte(s), need 8")]
    TruncatedHeader(usize),

    /// The header announces more instruction records than the stream holds.
    #[error("truncated program: header declares {expected} instructions, found {available}")]
    TruncatedInstructions { expected: usize, available: usize },

    /// The tag is not one of the closed set of opcodes.
    #[error("unknown opcode tag: {0}")]
    UnknownOpcode(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_bad_magic() {
        assert_eq!(
            DecodeError::BadMagic(0xdead_beef).to_string(),
            "bad magic: 0xdeadbeef (expected 0x00565343)"
        );
    }

    #[test]
    fn display_truncated_header() {
        assert_eq!(
            DecodeError::TruncatedHeader(5).to_string(),
            "truncated header: 5 byte(s), need 8"
        );
    }

    #[test]
    fn display_truncated_instructions() {
        assert_eq!(
            DecodeError::TruncatedInstructions {
                expected: 4,
                available: 1
            }
            .to_string(),
            "truncated program: header declares 4 instructions, found 1"
        );
    }

    #[test]
    fn display_unknown_opcode() {
        assert_eq!(
            DecodeError::UnknownOpcode(99).to_string(),
            "unknown opcode tag: 99"
        );
    }
}
