//! Decodes the code array of a method into instructions.
//!
//! Decoding is a single pass over the code array. The only state carried between
//! instructions is the current offset and whether the previous instruction was a `wide`
//! prefix. Constant pool operands are resolved as they are read, and branch offsets are
//! turned into absolute offsets within the code array.

use crate::constant_pool::{ConstantPool, ConstantRef};
use crate::cursor::ByteCursor;
use crate::error::{Error, ErrorKind};
use log::trace;
use opcodes::{OpcodeInfo, OperandLayout};
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub mod opcodes;

/// An operand of an instruction, with constant pool references followed and branch
/// offsets made absolute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedOperand {
    /// A local variable slot
    LocalSlot(u16),
    /// A literal number embedded in the instruction
    Immediate(i64),
    /// A resolved constant pool entry
    ConstantPoolRef(ConstantRef),
    /// An absolute offset into the code array
    BranchTarget(u32),
}

impl Display for ResolvedOperand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedOperand::LocalSlot(slot) => write!(f, "%{}", slot),
            ResolvedOperand::Immediate(value) => write!(f, "{}", value),
            ResolvedOperand::ConstantPoolRef(constant) => write!(f, "{}", constant),
            ResolvedOperand::BranchTarget(target) => write!(f, "#{}", target),
        }
    }
}

/// A single decoded instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    /// The offset of the opcode within the code array
    pub offset: u32,
    /// The instruction's name, such as `invokevirtual`
    pub mnemonic: &'static str,
    /// The operands, in the order they are encoded
    pub operands: Vec<ResolvedOperand>,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.offset, self.mnemonic)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

/// Streams instructions out of a code array.
///
/// Stops after the first error.
#[derive(Debug)]
pub struct InstructionDecoder<'a> {
    cursor: ByteCursor<'a>,
    pool: &'a ConstantPool,
    /// offset of a `wide` prefix that applies to the next instruction
    wide: Option<u32>,
    failed: bool,
}

impl<'a> InstructionDecoder<'a> {
    /// Creates a decoder at the start of `code`
    pub fn new(code: &'a [u8], pool: &'a ConstantPool) -> Self {
        Self {
            cursor: ByteCursor::new(code),
            pool,
            wide: None,
            failed: false,
        }
    }

    /// The offset of the next instruction
    pub fn offset(&self) -> u32 {
        self.cursor.position() as u32
    }

    fn decode_next(&mut self) -> Result<Instruction, Error> {
        let offset = self.offset();
        let opcode = self.cursor.read_u8()?;
        let info = opcodes::lookup(opcode).ok_or(ErrorKind::UnknownOpcode { opcode, offset })?;

        let widened = self.wide.take().is_some();
        if widened && !info.layout.is_widenable() {
            return Err(ErrorKind::InvalidWideTarget { opcode, offset }.into());
        }

        let operands = self
            .read_operands(offset, info, widened)
            .map_err(|error| match error.kind() {
                ErrorKind::UnexpectedEndOfInput { .. } => ErrorKind::TruncatedInstruction {
                    offset,
                    mnemonic: info.mnemonic,
                }
                .into(),
                _ => error,
            })?;

        if info.layout == OperandLayout::Wide {
            self.wide = Some(offset);
        }

        let instruction = Instruction {
            offset,
            mnemonic: info.mnemonic,
            operands,
        };
        trace!("decoded {}", instruction);
        Ok(instruction)
    }

    fn read_operands(
        &mut self,
        offset: u32,
        info: &OpcodeInfo,
        widened: bool,
    ) -> Result<Vec<ResolvedOperand>, Error> {
        use ResolvedOperand::*;

        let operands = match info.layout {
            OperandLayout::NoOperands | OperandLayout::Wide => vec![],
            OperandLayout::LocalIndex => vec![LocalSlot(self.local_index(widened)?)],
            OperandLayout::Iinc => {
                let slot = self.local_index(widened)?;
                let increment = if widened {
                    self.cursor.read_i16()? as i64
                } else {
                    self.cursor.read_i8()? as i64
                };
                vec![LocalSlot(slot), Immediate(increment)]
            }
            OperandLayout::ConstantIndexU8 => {
                let index = self.cursor.read_u8()? as u16;
                vec![self.constant(index)?]
            }
            OperandLayout::ConstantIndexU16 => {
                let index = self.cursor.read_u16()?;
                vec![self.constant(index)?]
            }
            OperandLayout::InvokeInterface => {
                let index = self.cursor.read_u16()?;
                let count = self.cursor.read_u8()?;
                self.cursor.skip(1)?;
                vec![self.constant(index)?, Immediate(count as i64)]
            }
            OperandLayout::InvokeDynamic => {
                let index = self.cursor.read_u16()?;
                self.cursor.skip(2)?;
                vec![self.constant(index)?]
            }
            OperandLayout::MultiANewArray => {
                let index = self.cursor.read_u16()?;
                let dimensions = self.cursor.read_u8()?;
                vec![self.constant(index)?, Immediate(dimensions as i64)]
            }
            OperandLayout::ByteImmediate => vec![Immediate(self.cursor.read_i8()? as i64)],
            OperandLayout::ShortImmediate => vec![Immediate(self.cursor.read_i16()? as i64)],
            OperandLayout::ArrayType => vec![Immediate(self.cursor.read_u8()? as i64)],
            OperandLayout::Branch16 => {
                let relative = self.cursor.read_i16()? as i32;
                vec![BranchTarget(branch_target(offset, relative)?)]
            }
            OperandLayout::Branch32 => {
                let relative = self.cursor.read_i32()?;
                vec![BranchTarget(branch_target(offset, relative)?)]
            }
            OperandLayout::TableSwitch => self.table_switch(offset)?,
            OperandLayout::LookupSwitch => self.lookup_switch(offset)?,
        };
        Ok(operands)
    }

    fn local_index(&mut self, widened: bool) -> Result<u16, Error> {
        if widened {
            self.cursor.read_u16()
        } else {
            self.cursor.read_u8().map(u16::from)
        }
    }

    fn constant(&self, index: u16) -> Result<ResolvedOperand, Error> {
        self.pool.resolve(index).map(ResolvedOperand::ConstantPoolRef)
    }

    /// Caps preallocation by what the remaining bytes could hold
    fn capacity(&self, entries: usize, entry_size: usize) -> usize {
        entries.min(self.cursor.remaining() / entry_size)
    }

    fn table_switch(&mut self, offset: u32) -> Result<Vec<ResolvedOperand>, Error> {
        use ResolvedOperand::*;

        self.cursor.align_to(4)?;
        let default = self.cursor.read_i32()?;
        let low = self.cursor.read_i32()?;
        let high = self.cursor.read_i32()?;
        if high < low {
            return Err(ErrorKind::InvalidSwitch { offset }.into());
        }
        let cases = (high as i64 - low as i64 + 1) as usize;

        let mut operands = Vec::with_capacity(3 + self.capacity(cases, 4));
        operands.push(Immediate(low as i64));
        operands.push(Immediate(high as i64));
        operands.push(BranchTarget(branch_target(offset, default)?));
        for _ in 0..cases {
            let relative = self.cursor.read_i32()?;
            operands.push(BranchTarget(branch_target(offset, relative)?));
        }
        Ok(operands)
    }

    fn lookup_switch(&mut self, offset: u32) -> Result<Vec<ResolvedOperand>, Error> {
        use ResolvedOperand::*;

        self.cursor.align_to(4)?;
        let default = self.cursor.read_i32()?;
        let pairs = self.cursor.read_i32()?;
        if pairs < 0 {
            return Err(ErrorKind::InvalidSwitch { offset }.into());
        }
        let pairs = pairs as usize;

        let mut operands = Vec::with_capacity(1 + 2 * self.capacity(pairs, 8));
        operands.push(BranchTarget(branch_target(offset, default)?));
        for _ in 0..pairs {
            let key = self.cursor.read_i32()?;
            let relative = self.cursor.read_i32()?;
            operands.push(Immediate(key as i64));
            operands.push(BranchTarget(branch_target(offset, relative)?));
        }
        Ok(operands)
    }
}

fn branch_target(offset: u32, relative: i32) -> Result<u32, Error> {
    u32::try_from(offset as i64 + relative as i64)
        .map_err(|_| ErrorKind::InvalidBranchTarget { offset, relative }.into())
}

impl Iterator for InstructionDecoder<'_> {
    type Item = Result<Instruction, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.cursor.is_empty() {
            // a dangling wide prefix has nothing to widen
            return self.wide.take().map(|offset| {
                self.failed = true;
                Err(ErrorKind::TruncatedInstruction {
                    offset,
                    mnemonic: "wide",
                }
                .into())
            });
        }
        let result = self.decode_next();
        self.failed = result.is_err();
        Some(result)
    }
}

/// Decodes an entire code array.
///
/// # Error
/// Fails on the first instruction that can't be decoded; no partial result is returned.
pub fn decode(code: &[u8], pool: &ConstantPool) -> Result<Vec<Instruction>, Error> {
    InstructionDecoder::new(code, pool).collect()
}
