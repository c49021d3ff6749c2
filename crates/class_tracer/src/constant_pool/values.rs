//! The payloads of each kind of constant pool entry

use std::fmt;
use std::fmt::{Display, Formatter};

/// A class or interface, named by a utf8 entry
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name_index: u16,
}
/// A field of some class
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    pub class_index: u16,
    pub name_and_type_index: u16,
}
/// A method of some class
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRef {
    pub class_index: u16,
    pub name_and_type_index: u16,
}
/// A method of some interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethodRef {
    pub class_index: u16,
    pub name_and_type_index: u16,
}
/// A string literal, whose text is a utf8 entry
#[derive(Debug, Clone, PartialEq)]
pub struct StringValue {
    pub string_index: u16,
}
#[derive(Debug, Clone, PartialEq)]
pub struct Integer {
    pub int: i32,
}
#[derive(Debug, Clone, PartialEq)]
pub struct Float {
    pub float: f32,
}
/// Takes up two slots of the constant pool
#[derive(Debug, Clone, PartialEq)]
pub struct Long {
    pub long: i64,
}
/// Takes up two slots of the constant pool
#[derive(Debug, Clone, PartialEq)]
pub struct Double {
    pub double: f64,
}
/// A name paired with a field or method descriptor, without an owning class
#[derive(Debug, Clone, PartialEq)]
pub struct NameAndType {
    pub name_index: u16,
    pub descriptor_index: u16,
}
/// Text stored in modified utf-8
#[derive(Debug, Clone, PartialEq)]
pub struct Utf8 {
    pub text: String,
}

impl Utf8 {
    /// Decodes the raw bytes of the entry. `C0 80` is a nul and surrogate pairs are
    /// joined into supplementary characters.
    ///
    /// Returns `None` if the bytes aren't valid modified utf-8.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        cesu8::from_java_cesu8(bytes)
            .ok()
            .map(|text| Self {
                text: text.into_owned(),
            })
    }
}

impl AsRef<str> for Utf8 {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl Display for Utf8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodHandle {
    pub reference_kind: u8,
    pub reference_index: u16,
}

impl MethodHandle {
    /// The symbolic name of the handle's reference kind, `REF_invokeStatic` for example.
    pub fn kind_name(&self) -> &'static str {
        match self.reference_kind {
            1 => "REF_getField",
            2 => "REF_getStatic",
            3 => "REF_putField",
            4 => "REF_putStatic",
            5 => "REF_invokeVirtual",
            6 => "REF_invokeStatic",
            7 => "REF_invokeSpecial",
            8 => "REF_newInvokeSpecial",
            9 => "REF_invokeInterface",
            _ => "REF_unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodType {
    pub descriptor_index: u16,
}
/// A dynamically computed constant
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamic {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeDynamic {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name_index: u16,
}
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name_index: u16,
}
