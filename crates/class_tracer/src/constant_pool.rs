//! contains the raw definitions for the constant pool

use crate::error::{Error, ErrorKind};
use crate::utility::match_as;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use values::{
    Class, Double, Dynamic, FieldRef, Float, Integer, InterfaceMethodRef, InvokeDynamic, Long,
    MethodHandle, MethodRef, MethodType, Module, NameAndType, Package, StringValue, Utf8,
};

pub(crate) mod parser;
#[allow(missing_docs)]
pub mod values;

/// Config values
pub mod cfg {
    #![allow(missing_docs)]
    pub const UTF8_TAG: u8 = 1;
    pub const INTEGER_TAG: u8 = 3;
    pub const FLOAT_TAG: u8 = 4;
    pub const LONG_TAG: u8 = 5;
    pub const DOUBLE_TAG: u8 = 6;
    pub const CLASS_TAG: u8 = 7;
    pub const STRING_TAG: u8 = 8;
    pub const FIELD_REF_TAG: u8 = 9;
    pub const METHOD_REF_TAG: u8 = 10;
    pub const INTERFACE_METHOD_REF_TAG: u8 = 11;
    pub const NAME_AND_TYPE_TAG: u8 = 12;
    pub const METHOD_HANDLE_TAG: u8 = 15;
    pub const METHOD_TYPE_TAG: u8 = 16;
    pub const DYNAMIC_TAG: u8 = 17;
    pub const INVOKE_DYNAMIC_TAG: u8 = 18;
    pub const MODULE_TAG: u8 = 19;
    pub const PACKAGE_TAG: u8 = 20;
}

/// The `cp_info` structure, represents in a constant
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ConstantPoolInfo {
    Class(Class),
    FieldRef(FieldRef),
    MethodRef(MethodRef),
    InterfaceMethodRef(InterfaceMethodRef),
    String(StringValue),
    Integer(Integer),
    Float(Float),
    Long(Long),
    Double(Double),
    NameAndType(NameAndType),
    Utf8(Utf8),
    MethodHandle(MethodHandle),
    MethodType(MethodType),
    Dynamic(Dynamic),
    InvokeDynamic(InvokeDynamic),
    Module(Module),
    Package(Package),
}

impl ConstantPoolInfo {
    /// The name of this kind of entry, as used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstantPoolInfo::Class(_) => "Class",
            ConstantPoolInfo::FieldRef(_) => "Fieldref",
            ConstantPoolInfo::MethodRef(_) => "Methodref",
            ConstantPoolInfo::InterfaceMethodRef(_) => "InterfaceMethodref",
            ConstantPoolInfo::String(_) => "String",
            ConstantPoolInfo::Integer(_) => "Integer",
            ConstantPoolInfo::Float(_) => "Float",
            ConstantPoolInfo::Long(_) => "Long",
            ConstantPoolInfo::Double(_) => "Double",
            ConstantPoolInfo::NameAndType(_) => "NameAndType",
            ConstantPoolInfo::Utf8(_) => "Utf8",
            ConstantPoolInfo::MethodHandle(_) => "MethodHandle",
            ConstantPoolInfo::MethodType(_) => "MethodType",
            ConstantPoolInfo::Dynamic(_) => "Dynamic",
            ConstantPoolInfo::InvokeDynamic(_) => "InvokeDynamic",
            ConstantPoolInfo::Module(_) => "Module",
            ConstantPoolInfo::Package(_) => "Package",
        }
    }

    /// Longs and doubles take up two indices of the constant pool
    pub fn is_wide(&self) -> bool {
        matches!(self, ConstantPoolInfo::Long(_) | ConstantPoolInfo::Double(_))
    }
}

/// The constant pool contains an array of constants.
///
/// Slots are addressed with 1-based `u16` indices. The slot following a long or a double
/// is unusable and is kept as an empty placeholder.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    pool: Vec<Option<ConstantPoolInfo>>,
}

impl ConstantPool {
    /// Creates a new constant pool from its slots, `None` marking a placeholder
    pub(crate) fn new<I: IntoIterator<Item = Option<ConstantPoolInfo>>>(pool: I) -> Self {
        Self {
            pool: pool.into_iter().collect(),
        }
    }

    /// The number of slots in the pool, including placeholders. Valid indices are
    /// `1..=len()`.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the pool has no slots
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Constant pools are accessed using u16 values.
    ///
    /// # Error
    /// Fails with [`InvalidConstantIndex`](ErrorKind::InvalidConstantIndex) if the index is 0,
    /// past the end of the pool, or lands on a placeholder.
    pub fn get(&self, index: u16) -> Result<&ConstantPoolInfo, Error> {
        (index as usize)
            .checked_sub(1)
            .and_then(|slot| self.pool.get(slot))
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| ErrorKind::InvalidConstantIndex(index).into())
    }

    /// Iterates over every usable entry along with its index
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantPoolInfo)> {
        self.pool
            .iter()
            .enumerate()
            .filter_map(|(slot, info)| info.as_ref().map(|info| (slot as u16 + 1, info)))
    }

    fn malformed(&self, index: u16, expected: &'static str) -> Error {
        let found = self
            .get(index)
            .map(ConstantPoolInfo::kind_name)
            .unwrap_or("nothing");
        ErrorKind::MalformedConstantReference {
            index,
            expected,
            found,
        }
        .into()
    }

    /// Gets the text of a utf8 entry
    pub fn utf8(&self, index: u16) -> Result<&str, Error> {
        let info = self.get(index)?;
        match_as!(utf; ConstantPoolInfo::Utf8(utf) = info)
            .map(|utf| utf.as_ref())
            .ok_or_else(|| self.malformed(index, "Utf8"))
    }

    /// Gets the name of a class entry, in internal form (`java/lang/Object`)
    pub fn class_name(&self, index: u16) -> Result<&str, Error> {
        let info = self.get(index)?;
        let Class { name_index } = match_as!(class; ConstantPoolInfo::Class(class) = info)
            .ok_or_else(|| self.malformed(index, "Class"))?;
        self.utf8(*name_index)
    }

    /// Gets the name and descriptor of a name and type entry
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), Error> {
        let info = self.get(index)?;
        let NameAndType {
            name_index,
            descriptor_index,
        } = match_as!(nat; ConstantPoolInfo::NameAndType(nat) = info)
            .ok_or_else(|| self.malformed(index, "NameAndType"))?;
        Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
    }

    /// Resolves a field, method or interface method reference
    pub fn member(&self, index: u16) -> Result<ConstantRef, Error> {
        let (class_index, name_and_type_index) = match self.get(index)? {
            ConstantPoolInfo::FieldRef(FieldRef {
                class_index,
                name_and_type_index,
            })
            | ConstantPoolInfo::MethodRef(MethodRef {
                class_index,
                name_and_type_index,
            })
            | ConstantPoolInfo::InterfaceMethodRef(InterfaceMethodRef {
                class_index,
                name_and_type_index,
            }) => (*class_index, *name_and_type_index),
            _ => return Err(self.malformed(index, "member reference")),
        };
        let owner = self.class_name(class_index)?;
        let (name, descriptor) = self.name_and_type(name_and_type_index)?;
        Ok(ConstantRef {
            index,
            owner: Some(owner.to_string()),
            name: name.to_string(),
            descriptor: Some(descriptor.to_string()),
        })
    }

    /// Follows the references of any entry to produce its human readable form.
    pub fn resolve(&self, index: u16) -> Result<ConstantRef, Error> {
        let simple = |name: String| ConstantRef {
            index,
            owner: None,
            name,
            descriptor: None,
        };
        let resolved = match self.get(index)? {
            ConstantPoolInfo::Utf8(utf) => simple(utf.text.clone()),
            ConstantPoolInfo::Integer(Integer { int }) => simple(int.to_string()),
            ConstantPoolInfo::Float(Float { float }) => simple(float.to_string()),
            ConstantPoolInfo::Long(Long { long }) => simple(long.to_string()),
            ConstantPoolInfo::Double(Double { double }) => simple(double.to_string()),
            ConstantPoolInfo::Class(_) => simple(self.class_name(index)?.to_string()),
            ConstantPoolInfo::String(StringValue { string_index }) => {
                simple(format!("{:?}", self.utf8(*string_index)?))
            }
            ConstantPoolInfo::FieldRef(_)
            | ConstantPoolInfo::MethodRef(_)
            | ConstantPoolInfo::InterfaceMethodRef(_) => self.member(index)?,
            ConstantPoolInfo::NameAndType(_) => {
                let (name, descriptor) = self.name_and_type(index)?;
                ConstantRef {
                    index,
                    owner: None,
                    name: name.to_string(),
                    descriptor: Some(descriptor.to_string()),
                }
            }
            ConstantPoolInfo::MethodHandle(handle) => {
                let target = self.member(handle.reference_index)?;
                ConstantRef {
                    index,
                    owner: target
                        .owner
                        .map(|owner| format!("{} {}", handle.kind_name(), owner)),
                    name: target.name,
                    descriptor: target.descriptor,
                }
            }
            ConstantPoolInfo::MethodType(MethodType { descriptor_index }) => {
                simple(self.utf8(*descriptor_index)?.to_string())
            }
            ConstantPoolInfo::Dynamic(Dynamic {
                name_and_type_index,
                ..
            })
            | ConstantPoolInfo::InvokeDynamic(InvokeDynamic {
                name_and_type_index,
                ..
            }) => {
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                ConstantRef {
                    index,
                    owner: None,
                    name: name.to_string(),
                    descriptor: Some(descriptor.to_string()),
                }
            }
            ConstantPoolInfo::Module(Module { name_index })
            | ConstantPoolInfo::Package(Package { name_index }) => {
                simple(self.utf8(*name_index)?.to_string())
            }
        };
        Ok(resolved)
    }

    /// Resolves an entry straight to its `Owner.name:descriptor` form
    pub fn resolve_string(&self, index: u16) -> Result<String, Error> {
        self.resolve(index).map(|resolved| resolved.to_string())
    }
}

/// A constant pool entry with all of its references followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantRef {
    /// The index that was resolved
    pub index: u16,
    /// The owning class of a member, if the entry refers to one
    pub owner: Option<String>,
    /// The name of the member, or the literal text of the entry
    pub name: String,
    /// The member's descriptor, if any
    pub descriptor: Option<String>,
}

impl ConstantRef {
    /// The qualified name, without the descriptor
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

impl Display for ConstantRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name())?;
        if let Some(descriptor) = &self.descriptor {
            write!(f, ":{}", descriptor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(text: &str) -> Option<ConstantPoolInfo> {
        Some(ConstantPoolInfo::Utf8(Utf8 {
            text: text.to_string(),
        }))
    }

    fn pool() -> ConstantPool {
        ConstantPool::new([
            /* 1 */
            Some(ConstantPoolInfo::MethodRef(MethodRef {
                class_index: 2,
                name_and_type_index: 4,
            })),
            /* 2 */ Some(ConstantPoolInfo::Class(Class { name_index: 3 })),
            /* 3 */ utf8("java/io/PrintStream"),
            /* 4 */
            Some(ConstantPoolInfo::NameAndType(NameAndType {
                name_index: 5,
                descriptor_index: 6,
            })),
            /* 5 */ utf8("println"),
            /* 6 */ utf8("(Ljava/lang/String;)V"),
            /* 7 */ Some(ConstantPoolInfo::Long(Long { long: 1 << 40 })),
            /* 8 */ None,
            /* 9 */
            Some(ConstantPoolInfo::FieldRef(FieldRef {
                class_index: 3,
                name_and_type_index: 4,
            })),
            /* 10 */ Some(ConstantPoolInfo::String(StringValue { string_index: 5 })),
        ])
    }

    #[test]
    fn resolve_method_ref() {
        let pool = pool();
        assert_eq!(
            pool.resolve_string(1).unwrap(),
            "java/io/PrintStream.println:(Ljava/lang/String;)V"
        );
        let resolved = pool.resolve(1).unwrap();
        assert_eq!(resolved.qualified_name(), "java/io/PrintStream.println");
    }

    #[test]
    fn resolve_literals() {
        let pool = pool();
        assert_eq!(pool.resolve_string(7).unwrap(), "1099511627776");
        assert_eq!(pool.resolve_string(10).unwrap(), "\"println\"");
        assert_eq!(pool.resolve_string(2).unwrap(), "java/io/PrintStream");
    }

    #[test]
    fn invalid_indices() {
        let pool = pool();
        for index in [0, 8, 11, u16::MAX] {
            let error = pool.get(index).unwrap_err();
            assert!(
                matches!(error.kind(), ErrorKind::InvalidConstantIndex(i) if *i == index),
                "index {index} gave {error}"
            );
        }
    }

    #[test]
    fn wrong_kind_is_malformed() {
        let pool = pool();
        let error = pool.resolve(9).unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::MalformedConstantReference {
                index: 3,
                expected: "Class",
                found: "Utf8"
            }
        ));
    }

    #[test]
    fn iter_skips_placeholders() {
        let indices = pool().iter().map(|(index, _)| index).collect::<Vec<_>>();
        assert_eq!(indices, [1, 2, 3, 4, 5, 6, 7, 9, 10]);
    }
}
