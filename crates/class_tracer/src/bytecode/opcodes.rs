//! The instruction set table, as listed in [§6.5](https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-6.html#jvms-6.5)
//! of the JVM specification.

use OperandLayout::*;

/// How the operand bytes following an opcode are laid out
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperandLayout {
    /// The opcode stands alone
    NoOperands,
    /// A `u1` local variable index, `u2` after `wide`
    LocalIndex,
    /// A local variable index followed by a signed increment, both doubled after `wide`
    Iinc,
    /// A `u1` constant pool index (`ldc`)
    ConstantIndexU8,
    /// A `u2` constant pool index
    ConstantIndexU16,
    /// A `u2` constant pool index, a `u1` argument count and a zero byte
    InvokeInterface,
    /// A `u2` constant pool index and two zero bytes
    InvokeDynamic,
    /// A `u2` constant pool index and a `u1` dimension count
    MultiANewArray,
    /// A signed byte
    ByteImmediate,
    /// A signed short
    ShortImmediate,
    /// A `u1` primitive array type code (`newarray`)
    ArrayType,
    /// A signed 16 bit offset from the start of the instruction
    Branch16,
    /// A signed 32 bit offset from the start of the instruction
    Branch32,
    /// Padding, then default, low, high and a jump table
    TableSwitch,
    /// Padding, then default, a pair count and match-offset pairs
    LookupSwitch,
    /// Widens the operands of the next instruction
    Wide,
}

impl OperandLayout {
    /// Whether the layout can follow a `wide` prefix
    pub fn is_widenable(&self) -> bool {
        matches!(self, LocalIndex | Iinc)
    }
}

/// An entry in the instruction set table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// The opcode byte
    pub opcode: u8,
    /// The lower case name of the instruction
    pub mnemonic: &'static str,
    /// The operands that follow the opcode
    pub layout: OperandLayout,
}

const fn op(opcode: u8, mnemonic: &'static str, layout: OperandLayout) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        mnemonic,
        layout,
    }
}

const DEFINITIONS: &[OpcodeInfo] = &[
    // constants
    op(0x00, "nop", NoOperands),
    op(0x01, "aconst_null", NoOperands),
    op(0x02, "iconst_m1", NoOperands),
    op(0x03, "iconst_0", NoOperands),
    op(0x04, "iconst_1", NoOperands),
    op(0x05, "iconst_2", NoOperands),
    op(0x06, "iconst_3", NoOperands),
    op(0x07, "iconst_4", NoOperands),
    op(0x08, "iconst_5", NoOperands),
    op(0x09, "lconst_0", NoOperands),
    op(0x0a, "lconst_1", NoOperands),
    op(0x0b, "fconst_0", NoOperands),
    op(0x0c, "fconst_1", NoOperands),
    op(0x0d, "fconst_2", NoOperands),
    op(0x0e, "dconst_0", NoOperands),
    op(0x0f, "dconst_1", NoOperands),
    op(0x10, "bipush", ByteImmediate),
    op(0x11, "sipush", ShortImmediate),
    op(0x12, "ldc", ConstantIndexU8),
    op(0x13, "ldc_w", ConstantIndexU16),
    op(0x14, "ldc2_w", ConstantIndexU16),
    // loads
    op(0x15, "iload", LocalIndex),
    op(0x16, "lload", LocalIndex),
    op(0x17, "fload", LocalIndex),
    op(0x18, "dload", LocalIndex),
    op(0x19, "aload", LocalIndex),
    op(0x1a, "iload_0", NoOperands),
    op(0x1b, "iload_1", NoOperands),
    op(0x1c, "iload_2", NoOperands),
    op(0x1d, "iload_3", NoOperands),
    op(0x1e, "lload_0", NoOperands),
    op(0x1f, "lload_1", NoOperands),
    op(0x20, "lload_2", NoOperands),
    op(0x21, "lload_3", NoOperands),
    op(0x22, "fload_0", NoOperands),
    op(0x23, "fload_1", NoOperands),
    op(0x24, "fload_2", NoOperands),
    op(0x25, "fload_3", NoOperands),
    op(0x26, "dload_0", NoOperands),
    op(0x27, "dload_1", NoOperands),
    op(0x28, "dload_2", NoOperands),
    op(0x29, "dload_3", NoOperands),
    op(0x2a, "aload_0", NoOperands),
    op(0x2b, "aload_1", NoOperands),
    op(0x2c, "aload_2", NoOperands),
    op(0x2d, "aload_3", NoOperands),
    op(0x2e, "iaload", NoOperands),
    op(0x2f, "laload", NoOperands),
    op(0x30, "faload", NoOperands),
    op(0x31, "daload", NoOperands),
    op(0x32, "aaload", NoOperands),
    op(0x33, "baload", NoOperands),
    op(0x34, "caload", NoOperands),
    op(0x35, "saload", NoOperands),
    // stores
    op(0x36, "istore", LocalIndex),
    op(0x37, "lstore", LocalIndex),
    op(0x38, "fstore", LocalIndex),
    op(0x39, "dstore", LocalIndex),
    op(0x3a, "astore", LocalIndex),
    op(0x3b, "istore_0", NoOperands),
    op(0x3c, "istore_1", NoOperands),
    op(0x3d, "istore_2", NoOperands),
    op(0x3e, "istore_3", NoOperands),
    op(0x3f, "lstore_0", NoOperands),
    op(0x40, "lstore_1", NoOperands),
    op(0x41, "lstore_2", NoOperands),
    op(0x42, "lstore_3", NoOperands),
    op(0x43, "fstore_0", NoOperands),
    op(0x44, "fstore_1", NoOperands),
    op(0x45, "fstore_2", NoOperands),
    op(0x46, "fstore_3", NoOperands),
    op(0x47, "dstore_0", NoOperands),
    op(0x48, "dstore_1", NoOperands),
    op(0x49, "dstore_2", NoOperands),
    op(0x4a, "dstore_3", NoOperands),
    op(0x4b, "astore_0", NoOperands),
    op(0x4c, "astore_1", NoOperands),
    op(0x4d, "astore_2", NoOperands),
    op(0x4e, "astore_3", NoOperands),
    op(0x4f, "iastore", NoOperands),
    op(0x50, "lastore", NoOperands),
    op(0x51, "fastore", NoOperands),
    op(0x52, "dastore", NoOperands),
    op(0x53, "aastore", NoOperands),
    op(0x54, "bastore", NoOperands),
    op(0x55, "castore", NoOperands),
    op(0x56, "sastore", NoOperands),
    // stack
    op(0x57, "pop", NoOperands),
    op(0x58, "pop2", NoOperands),
    op(0x59, "dup", NoOperands),
    op(0x5a, "dup_x1", NoOperands),
    op(0x5b, "dup_x2", NoOperands),
    op(0x5c, "dup2", NoOperands),
    op(0x5d, "dup2_x1", NoOperands),
    op(0x5e, "dup2_x2", NoOperands),
    op(0x5f, "swap", NoOperands),
    // math
    op(0x60, "iadd", NoOperands),
    op(0x61, "ladd", NoOperands),
    op(0x62, "fadd", NoOperands),
    op(0x63, "dadd", NoOperands),
    op(0x64, "isub", NoOperands),
    op(0x65, "lsub", NoOperands),
    op(0x66, "fsub", NoOperands),
    op(0x67, "dsub", NoOperands),
    op(0x68, "imul", NoOperands),
    op(0x69, "lmul", NoOperands),
    op(0x6a, "fmul", NoOperands),
    op(0x6b, "dmul", NoOperands),
    op(0x6c, "idiv", NoOperands),
    op(0x6d, "ldiv", NoOperands),
    op(0x6e, "fdiv", NoOperands),
    op(0x6f, "ddiv", NoOperands),
    op(0x70, "irem", NoOperands),
    op(0x71, "lrem", NoOperands),
    op(0x72, "frem", NoOperands),
    op(0x73, "drem", NoOperands),
    op(0x74, "ineg", NoOperands),
    op(0x75, "lneg", NoOperands),
    op(0x76, "fneg", NoOperands),
    op(0x77, "dneg", NoOperands),
    op(0x78, "ishl", NoOperands),
    op(0x79, "lshl", NoOperands),
    op(0x7a, "ishr", NoOperands),
    op(0x7b, "lshr", NoOperands),
    op(0x7c, "iushr", NoOperands),
    op(0x7d, "lushr", NoOperands),
    op(0x7e, "iand", NoOperands),
    op(0x7f, "land", NoOperands),
    op(0x80, "ior", NoOperands),
    op(0x81, "lor", NoOperands),
    op(0x82, "ixor", NoOperands),
    op(0x83, "lxor", NoOperands),
    op(0x84, "iinc", Iinc),
    // conversions
    op(0x85, "i2l", NoOperands),
    op(0x86, "i2f", NoOperands),
    op(0x87, "i2d", NoOperands),
    op(0x88, "l2i", NoOperands),
    op(0x89, "l2f", NoOperands),
    op(0x8a, "l2d", NoOperands),
    op(0x8b, "f2i", NoOperands),
    op(0x8c, "f2l", NoOperands),
    op(0x8d, "f2d", NoOperands),
    op(0x8e, "d2i", NoOperands),
    op(0x8f, "d2l", NoOperands),
    op(0x90, "d2f", NoOperands),
    op(0x91, "i2b", NoOperands),
    op(0x92, "i2c", NoOperands),
    op(0x93, "i2s", NoOperands),
    // comparisons
    op(0x94, "lcmp", NoOperands),
    op(0x95, "fcmpl", NoOperands),
    op(0x96, "fcmpg", NoOperands),
    op(0x97, "dcmpl", NoOperands),
    op(0x98, "dcmpg", NoOperands),
    op(0x99, "ifeq", Branch16),
    op(0x9a, "ifne", Branch16),
    op(0x9b, "iflt", Branch16),
    op(0x9c, "ifge", Branch16),
    op(0x9d, "ifgt", Branch16),
    op(0x9e, "ifle", Branch16),
    op(0x9f, "if_icmpeq", Branch16),
    op(0xa0, "if_icmpne", Branch16),
    op(0xa1, "if_icmplt", Branch16),
    op(0xa2, "if_icmpge", Branch16),
    op(0xa3, "if_icmpgt", Branch16),
    op(0xa4, "if_icmple", Branch16),
    op(0xa5, "if_acmpeq", Branch16),
    op(0xa6, "if_acmpne", Branch16),
    // control
    op(0xa7, "goto", Branch16),
    op(0xa8, "jsr", Branch16),
    op(0xa9, "ret", LocalIndex),
    op(0xaa, "tableswitch", TableSwitch),
    op(0xab, "lookupswitch", LookupSwitch),
    op(0xac, "ireturn", NoOperands),
    op(0xad, "lreturn", NoOperands),
    op(0xae, "freturn", NoOperands),
    op(0xaf, "dreturn", NoOperands),
    op(0xb0, "areturn", NoOperands),
    op(0xb1, "return", NoOperands),
    // references
    op(0xb2, "getstatic", ConstantIndexU16),
    op(0xb3, "putstatic", ConstantIndexU16),
    op(0xb4, "getfield", ConstantIndexU16),
    op(0xb5, "putfield", ConstantIndexU16),
    op(0xb6, "invokevirtual", ConstantIndexU16),
    op(0xb7, "invokespecial", ConstantIndexU16),
    op(0xb8, "invokestatic", ConstantIndexU16),
    op(0xb9, "invokeinterface", InvokeInterface),
    op(0xba, "invokedynamic", InvokeDynamic),
    op(0xbb, "new", ConstantIndexU16),
    op(0xbc, "newarray", ArrayType),
    op(0xbd, "anewarray", ConstantIndexU16),
    op(0xbe, "arraylength", NoOperands),
    op(0xbf, "athrow", NoOperands),
    op(0xc0, "checkcast", ConstantIndexU16),
    op(0xc1, "instanceof", ConstantIndexU16),
    op(0xc2, "monitorenter", NoOperands),
    op(0xc3, "monitorexit", NoOperands),
    // extended
    op(0xc4, "wide", Wide),
    op(0xc5, "multianewarray", MultiANewArray),
    op(0xc6, "ifnull", Branch16),
    op(0xc7, "ifnonnull", Branch16),
    op(0xc8, "goto_w", Branch32),
    op(0xc9, "jsr_w", Branch32),
    // reserved
    op(0xca, "breakpoint", NoOperands),
    op(0xfe, "impdep1", NoOperands),
    op(0xff, "impdep2", NoOperands),
];

const fn build_table() -> [Option<OpcodeInfo>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < DEFINITIONS.len() {
        let info = DEFINITIONS[i];
        table[info.opcode as usize] = Some(info);
        i += 1;
    }
    table
}

static OPCODES: [Option<OpcodeInfo>; 256] = build_table();

/// Looks up an opcode in the instruction set table
pub fn lookup(opcode: u8) -> Option<&'static OpcodeInfo> {
    OPCODES[opcode as usize].as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_standard_opcode_is_defined() {
        for opcode in 0x00..=0xc9_u8 {
            let info = lookup(opcode).unwrap_or_else(|| panic!("{opcode:#04x} is not defined"));
            assert_eq!(info.opcode, opcode);
        }
        assert_eq!(DEFINITIONS.len(), 0xca + 3);
    }

    #[test]
    fn undefined_opcodes() {
        for opcode in 0xcb..=0xfd_u8 {
            assert!(lookup(opcode).is_none(), "{opcode:#04x} should be undefined");
        }
    }

    #[test]
    fn known_layouts() {
        assert_eq!(lookup(0xb1).unwrap().mnemonic, "return");
        assert_eq!(lookup(0x84).unwrap().layout, Iinc);
        assert!(lookup(0x15).unwrap().layout.is_widenable());
        assert!(!lookup(0x10).unwrap().layout.is_widenable());
    }
}
