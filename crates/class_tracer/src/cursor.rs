//! A positional reader over class file bytes

use crate::error::{Error, ErrorKind};
use byteorder::{BigEndian, ByteOrder};

/// Reads big-endian values from an immutable byte slice, tracking the current position.
///
/// Reads never go past the end of the slice. A failed read leaves the position untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// The current byte offset from the start of the slice
    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of bytes that can still be read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Whether every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < needed {
            return Err(ErrorKind::UnexpectedEndOfInput {
                position: self.position,
                needed,
            }
            .into());
        }
        let slice = &self.bytes[self.position..self.position + needed];
        self.position += needed;
        Ok(slice)
    }

    /// Reads the next byte without advancing
    pub fn peek_u8(&self) -> Result<u8, Error> {
        self.bytes
            .get(self.position)
            .copied()
            .ok_or_else(|| {
                ErrorKind::UnexpectedEndOfInput {
                    position: self.position,
                    needed: 1,
                }
                .into()
            })
    }

    /// Reads one unsigned byte
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    /// Reads one signed byte
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        self.read_u8().map(|byte| byte as i8)
    }

    /// Reads a big-endian `u16`
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.take(2).map(BigEndian::read_u16)
    }

    /// Reads a big-endian `i16`
    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.take(2).map(BigEndian::read_i16)
    }

    /// Reads a big-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.take(4).map(BigEndian::read_u32)
    }

    /// Reads a big-endian `i32`
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.take(4).map(BigEndian::read_i32)
    }

    /// Reads a big-endian `i64`
    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.take(8).map(BigEndian::read_i64)
    }

    /// Borrows the next `len` bytes and advances past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.take(len)
    }

    /// Advances past `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.take(len).map(|_| ())
    }

    /// Skips forward until the position is a multiple of `alignment`.
    ///
    /// Returns the number of padding bytes skipped.
    pub fn align_to(&mut self, alignment: usize) -> Result<usize, Error> {
        let padding = (alignment - self.position % alignment) % alignment;
        self.skip(padding)?;
        Ok(padding)
    }
}
