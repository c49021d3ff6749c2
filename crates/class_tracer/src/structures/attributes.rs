//! Parsed attributes

use crate::bytecode::{self, Instruction};
use crate::constant_pool::ConstantPool;
use crate::cursor::ByteCursor;
use crate::error::Error;
use crate::raw_java_class::RawAttributeInfo;
use std::fmt::{Debug, Formatter};

/// An attribute info piece. Can be parsed into usable data
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    attribute_name: &'a str,
    kind: AttributeKind<'a>,
}

/// The kind of attribute
#[derive(Debug, Clone)]
pub enum AttributeKind<'a> {
    /// Java bytecode
    Code(Code<'a>),
    /// An attribute that isn't interpreted, left as raw bytes
    Unknown(&'a [u8]),
}

impl<'a> Attribute<'a> {
    pub(crate) fn new(pool: &'a ConstantPool, raw: &'a RawAttributeInfo) -> Result<Self, Error> {
        let attribute_name = pool.utf8(raw.attribute_name_index)?;
        let kind = match attribute_name {
            "Code" => AttributeKind::Code(Code::parse(&raw.info)?),
            _ => AttributeKind::Unknown(&raw.info),
        };
        Ok(Self {
            attribute_name,
            kind,
        })
    }

    /// Gets the name of the attribute
    pub fn attribute_name(&self) -> &'a str {
        self.attribute_name
    }

    /// Gets the attribute kind.
    ///
    /// Known attributes are defined in section [§4.7](https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html#jvms-4.7)
    /// of the JVM specification. Only `Code` is interpreted, every other attribute is
    /// [unknown](AttributeKind::Unknown).
    pub fn kind(&self) -> &AttributeKind<'a> {
        &self.kind
    }
}

/// The code attribute
#[derive(Clone)]
pub struct Code<'a> {
    max_stack: u16,
    max_locals: u16,
    code: &'a [u8],
    exception_handlers: u16,
}

impl<'a> Code<'a> {
    /// Reads the body of a code attribute. The exception table and nested attributes are
    /// stepped over, not interpreted.
    fn parse(info: &'a [u8]) -> Result<Self, Error> {
        let mut cursor = ByteCursor::new(info);
        let max_stack = cursor.read_u16()?;
        let max_locals = cursor.read_u16()?;
        let code_length = cursor.read_u32()?;
        let code = cursor.read_bytes(code_length as usize)?;
        let exception_handlers = cursor.read_u16()?;
        cursor.skip(exception_handlers as usize * 8)?;
        let attributes_count = cursor.read_u16()?;
        for _ in 0..attributes_count {
            cursor.skip(2)?;
            let length = cursor.read_u32()?;
            cursor.skip(length as usize)?;
        }
        Ok(Self {
            max_stack,
            max_locals,
            code,
            exception_handlers,
        })
    }

    /// The maximum stack values
    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }
    /// The maximum numbers of locals used
    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }

    /// The bytecode
    pub fn code(&self) -> &'a [u8] {
        self.code
    }

    /// The number of entries in the exception table
    pub fn exception_handlers(&self) -> u16 {
        self.exception_handlers
    }

    /// Decodes the bytecode, resolving operands against `pool`
    pub fn instructions(&self, pool: &ConstantPool) -> Result<Vec<Instruction>, Error> {
        bytecode::decode(self.code, pool)
    }
}

impl Debug for Code<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Code")
            .field("max_stack", &self.max_stack)
            .field("max_locals", &self.max_locals)
            .field("code_length", &self.code.len())
            .field("exception_handlers", &self.exception_handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn code_info(code: &[u8], handlers: u16, trailer: &[u8]) -> Vec<u8> {
        let mut info = vec![0, 2, 0, 1];
        info.extend((code.len() as u32).to_be_bytes());
        info.extend(code);
        info.extend(handlers.to_be_bytes());
        info.extend(vec![0; handlers as usize * 8]);
        info.extend(trailer);
        info
    }

    #[test]
    fn parse_code_with_nested_attribute() {
        // one nested attribute, name index 9, three bytes long
        let info = code_info(&[0x2a, 0xb0], 1, &[0, 1, 0, 9, 0, 0, 0, 3, 1, 2, 3]);
        let code = Code::parse(&info).unwrap();
        assert_eq!(code.max_stack(), 2);
        assert_eq!(code.max_locals(), 1);
        assert_eq!(code.code(), &[0x2a, 0xb0]);
        assert_eq!(code.exception_handlers(), 1);
    }

    #[test]
    fn code_longer_than_attribute() {
        let mut info = code_info(&[0xb1], 0, &[0, 0]);
        info[7] = 40;
        let error = Code::parse(&info).unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::UnexpectedEndOfInput {
                position: 8,
                needed: 40
            }
        ));
    }
}
