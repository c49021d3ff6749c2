use crate::constant_pool::cfg::*;
use crate::constant_pool::values::{
    Class, Double, Dynamic, FieldRef, Float, Integer, InterfaceMethodRef, InvokeDynamic, Long,
    MethodHandle, MethodRef, MethodType, Module, NameAndType, Package, StringValue, Utf8,
};
use crate::constant_pool::{ConstantPool, ConstantPoolInfo};
use crate::cursor::ByteCursor;
use crate::error::{Error, ErrorKind};

/// reads the `(u16, u16)` pair shared by every reference entry
fn parse_ref_info(cursor: &mut ByteCursor) -> Result<(u16, u16), Error> {
    Ok((cursor.read_u16()?, cursor.read_u16()?))
}

fn parse_constant_pool_info(cursor: &mut ByteCursor) -> Result<ConstantPoolInfo, Error> {
    let tag = cursor.read_u8()?;
    let info = match tag {
        UTF8_TAG => {
            let length = cursor.read_u16()?;
            let position = cursor.position();
            let bytes = cursor.read_bytes(length as usize)?;
            let utf8 = Utf8::from_bytes(bytes)
                .ok_or(ErrorKind::InvalidModifiedUtf8 { position })?;
            ConstantPoolInfo::Utf8(utf8)
        }
        INTEGER_TAG => ConstantPoolInfo::Integer(Integer {
            int: cursor.read_i32()?,
        }),
        FLOAT_TAG => ConstantPoolInfo::Float(Float {
            float: f32::from_bits(cursor.read_u32()?),
        }),
        LONG_TAG => ConstantPoolInfo::Long(Long {
            long: cursor.read_i64()?,
        }),
        DOUBLE_TAG => ConstantPoolInfo::Double(Double {
            double: f64::from_bits(cursor.read_i64()? as u64),
        }),
        CLASS_TAG => ConstantPoolInfo::Class(Class {
            name_index: cursor.read_u16()?,
        }),
        STRING_TAG => ConstantPoolInfo::String(StringValue {
            string_index: cursor.read_u16()?,
        }),
        FIELD_REF_TAG => {
            let (class_index, name_and_type_index) = parse_ref_info(cursor)?;
            ConstantPoolInfo::FieldRef(FieldRef {
                class_index,
                name_and_type_index,
            })
        }
        METHOD_REF_TAG => {
            let (class_index, name_and_type_index) = parse_ref_info(cursor)?;
            ConstantPoolInfo::MethodRef(MethodRef {
                class_index,
                name_and_type_index,
            })
        }
        INTERFACE_METHOD_REF_TAG => {
            let (class_index, name_and_type_index) = parse_ref_info(cursor)?;
            ConstantPoolInfo::InterfaceMethodRef(InterfaceMethodRef {
                class_index,
                name_and_type_index,
            })
        }
        NAME_AND_TYPE_TAG => {
            let (name_index, descriptor_index) = parse_ref_info(cursor)?;
            ConstantPoolInfo::NameAndType(NameAndType {
                name_index,
                descriptor_index,
            })
        }
        METHOD_HANDLE_TAG => ConstantPoolInfo::MethodHandle(MethodHandle {
            reference_kind: cursor.read_u8()?,
            reference_index: cursor.read_u16()?,
        }),
        METHOD_TYPE_TAG => ConstantPoolInfo::MethodType(MethodType {
            descriptor_index: cursor.read_u16()?,
        }),
        DYNAMIC_TAG => {
            let (bootstrap_method_attr_index, name_and_type_index) = parse_ref_info(cursor)?;
            ConstantPoolInfo::Dynamic(Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            })
        }
        INVOKE_DYNAMIC_TAG => {
            let (bootstrap_method_attr_index, name_and_type_index) = parse_ref_info(cursor)?;
            ConstantPoolInfo::InvokeDynamic(InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            })
        }
        MODULE_TAG => ConstantPoolInfo::Module(Module {
            name_index: cursor.read_u16()?,
        }),
        PACKAGE_TAG => ConstantPoolInfo::Package(Package {
            name_index: cursor.read_u16()?,
        }),
        _ => return Err(ErrorKind::UnknownConstantPoolInfoTag(tag).into()),
    };
    Ok(info)
}

/// parses an entire constant pool given the `constant_pool_count` field of the class file,
/// which is one more than the number of slots.
pub(crate) fn parse_constant_pool(
    cursor: &mut ByteCursor,
    constant_pool_count: u16,
) -> Result<ConstantPool, Error> {
    let slots = constant_pool_count.saturating_sub(1) as usize;
    let mut pool = Vec::with_capacity(slots);
    while pool.len() < slots {
        let info = parse_constant_pool_info(cursor)?;
        let wide = info.is_wide();
        pool.push(Some(info));
        if wide && pool.len() < slots {
            pool.push(None);
        }
    }
    Ok(ConstantPool::new(pool))
}
