//! Serializes a [`ClassTrace`] into its document form.
//!
//! The document has the shape
//! `{kind, clazz, method: [{method, signature, input, output, ops: [{op, var?, type?}]}]}`.

use crate::bytecode::{Instruction, ResolvedOperand};
use crate::error::Error;
use crate::trace::{ClassTrace, MethodTrace};
use serde::Serialize;
use std::io::Write;

/// The serialized form of a [`ClassTrace`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDocument {
    /// The caller supplied label
    pub kind: String,
    /// The dotted class name
    #[serde(rename = "clazz")]
    pub class_name: String,
    /// One entry per method, in declaration order
    #[serde(rename = "method")]
    pub methods: Vec<MethodDocument>,
}

/// The serialized form of a [`MethodTrace`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDocument {
    /// The method name
    #[serde(rename = "method")]
    pub name: String,
    /// The raw descriptor
    pub signature: String,
    /// The descriptor of each argument
    pub input: Vec<String>,
    /// The descriptor of the return type
    pub output: String,
    /// The retained instructions
    pub ops: Vec<OperationDocument>,
}

/// The serialized form of an [`Instruction`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDocument {
    /// The mnemonic
    pub op: String,
    /// The local slot, or the name of the resolved constant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<Variable>,
    /// The descriptor of a resolved member reference
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

/// What an instruction operates on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Variable {
    /// A local variable slot
    Slot(u16),
    /// A resolved constant, such as `java/lang/System.out`
    Name(String),
}

impl From<&Instruction> for OperationDocument {
    fn from(instruction: &Instruction) -> Self {
        let (var, ty) = instruction
            .operands
            .iter()
            .find_map(|operand| match operand {
                ResolvedOperand::LocalSlot(slot) => Some((Variable::Slot(*slot), None)),
                ResolvedOperand::ConstantPoolRef(constant) => Some((
                    Variable::Name(constant.qualified_name()),
                    constant.descriptor.clone(),
                )),
                _ => None,
            })
            .map_or((None, None), |(var, ty)| (Some(var), ty));
        Self {
            op: instruction.mnemonic.to_string(),
            var,
            ty,
        }
    }
}

impl From<&MethodTrace> for MethodDocument {
    fn from(method: &MethodTrace) -> Self {
        Self {
            name: method.name.clone(),
            signature: method.signature.clone(),
            input: method
                .descriptor
                .args()
                .iter()
                .map(|arg| arg.descriptor())
                .collect(),
            output: method.descriptor.ret_type().descriptor(),
            ops: method.instructions.iter().map(OperationDocument::from).collect(),
        }
    }
}

/// Converts a trace into its document form
pub fn to_document(trace: &ClassTrace) -> ClassDocument {
    ClassDocument {
        kind: trace.kind.clone(),
        class_name: trace.class_name.clone(),
        methods: trace.methods.iter().map(MethodDocument::from).collect(),
    }
}

/// Renders a trace as pretty printed json
pub fn to_json_pretty(trace: &ClassTrace) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(&to_document(trace))?)
}

/// Writes a trace as pretty printed json
pub fn write_json<W: Write>(trace: &ClassTrace, writer: W) -> Result<(), Error> {
    serde_json::to_writer_pretty(writer, &to_document(trace))?;
    Ok(())
}
