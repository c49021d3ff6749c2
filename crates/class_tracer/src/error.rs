//! Contains the error type that can be emitted

use std::backtrace::Backtrace;
use std::fmt::{Debug, Display, Formatter};
use std::io;

/// The error type
pub struct Error {
    kind: ErrorKind,
    backtrace: Backtrace,
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{} at\n{}", self.kind, self.backtrace)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a new error from an an error kind
    pub fn new<E: Into<ErrorKind>>(kind: E) -> Self {
        Self {
            kind: kind.into(),
            backtrace: Backtrace::capture(),
        }
    }
    /// Gets the error kind
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

/// The error kind
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The input did not start with the class file magic number
    #[error("not a class file: found magic {0:#010x}")]
    NotAClassFile(u32),
    /// A read needed more bytes than were left in the input
    #[error("unexpected end of input at byte {position}, needed {needed} more bytes")]
    UnexpectedEndOfInput {
        /// where the read started
        position: usize,
        /// how many bytes the read required
        needed: usize,
    },
    /// An instruction's operands ran past the end of the code array
    #[error("truncated {mnemonic} instruction at offset {offset}")]
    TruncatedInstruction {
        /// offset of the instruction's opcode
        offset: u32,
        /// the instruction being decoded
        mnemonic: &'static str,
    },
    /// Constant pool index 0, past the end of the pool, or the slot after a long or double
    #[error("{0} is not a valid constant pool index")]
    InvalidConstantIndex(u16),
    /// A constant pool entry referred to an entry of the wrong kind
    #[error("constant pool entry {index} should be {expected}, found {found}")]
    MalformedConstantReference {
        /// the index that was followed
        index: u16,
        /// the kind of entry that was required
        expected: &'static str,
        /// the kind of entry that was found
        found: &'static str,
    },
    /// A utf8 constant whose bytes aren't valid modified utf-8
    #[error("invalid modified utf-8 in the constant starting at byte {position}")]
    InvalidModifiedUtf8 {
        /// where the constant's bytes start
        position: usize,
    },
    /// An unknown tag was found in the constant pool
    #[error("{0} is not a known constant pool tag")]
    UnknownConstantPoolInfoTag(u8),
    /// A byte in the code array that is not an instruction
    #[error("unknown opcode {opcode:#04x} at offset {offset}")]
    UnknownOpcode {
        /// the byte that was read
        opcode: u8,
        /// offset of the byte within the code array
        offset: u32,
    },
    /// A `wide` prefix applied to an instruction that cannot be widened
    #[error("opcode {opcode:#04x} at offset {offset} cannot follow wide")]
    InvalidWideTarget {
        /// the widened opcode
        opcode: u8,
        /// offset of the widened opcode
        offset: u32,
    },
    /// A branch whose absolute target would be before the start of the code array
    #[error("branch at offset {offset} jumps by {relative} before the start of the code")]
    InvalidBranchTarget {
        /// offset of the branching instruction
        offset: u32,
        /// the encoded relative offset
        relative: i32,
    },
    /// A switch with a negative number of cases
    #[error("switch at offset {offset} has a negative case count")]
    InvalidSwitch {
        /// offset of the switch instruction
        offset: u32,
    },
    /// A descriptor that does not follow the descriptor grammar
    #[error("{0:?} is not a valid descriptor")]
    MalformedDescriptor(String),
    /// Bytes remained after the class file's last attribute
    #[error("{0} unexpected bytes after the end of the class file")]
    TrailingBytes(usize),
    /// An io error occurred
    #[error(transparent)]
    IoError(#[from] io::Error),
    /// The trace could not be serialized
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
