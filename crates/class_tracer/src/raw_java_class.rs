//! The raw java class, a direct translation of the java [ClassFile structure][class_file]
//!
//! [class_file]: https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html#jvms-4.1

use crate::constant_pool::{parser, ConstantPool};
use crate::cursor::ByteCursor;
use crate::error::{Error, ErrorKind};

/// The first four bytes of every class file
pub const MAGIC: u32 = 0xCAFE_BABE;

/// A raw java class file structure. All members have public access.
///
/// Defined by the [jvm spec](https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html#jvms-4.1).
/// Interfaces are kept as constant pool indices, fields and methods only keep what is needed to
/// resolve their names, descriptors and attributes.
#[derive(Debug, Clone)]
pub struct RawJavaClass {
    pub minor: u16,
    pub major: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Box<[u16]>,
    pub fields: Box<[RawFieldInfo]>,
    pub methods: Box<[RawMethodInfo]>,
    pub attributes: Box<[RawAttributeInfo]>,
}

/// The raw field info structure
#[derive(Debug, Default, Clone)]
pub struct RawFieldInfo {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Box<[RawAttributeInfo]>,
}

/// The raw method info structure
#[derive(Debug, Default, Clone)]
pub struct RawMethodInfo {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Box<[RawAttributeInfo]>,
}

/// The raw attribute info struct
#[derive(Debug, Default, Clone)]
pub struct RawAttributeInfo {
    pub attribute_name_index: u16,
    pub info: Box<[u8]>,
}

/// fields and methods share the same layout
fn parse_data_info(
    cursor: &mut ByteCursor,
) -> Result<(u16, u16, u16, Box<[RawAttributeInfo]>), Error> {
    let access_flags = cursor.read_u16()?;
    let name_index = cursor.read_u16()?;
    let descriptor_index = cursor.read_u16()?;
    let attributes = parse_attributes(cursor)?;
    Ok((access_flags, name_index, descriptor_index, attributes))
}

fn parse_field_info(cursor: &mut ByteCursor) -> Result<RawFieldInfo, Error> {
    let (access_flags, name_index, descriptor_index, attributes) = parse_data_info(cursor)?;
    Ok(RawFieldInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}

fn parse_method_info(cursor: &mut ByteCursor) -> Result<RawMethodInfo, Error> {
    let (access_flags, name_index, descriptor_index, attributes) = parse_data_info(cursor)?;
    Ok(RawMethodInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}

fn parse_attribute_info(cursor: &mut ByteCursor) -> Result<RawAttributeInfo, Error> {
    let attribute_name_index = cursor.read_u16()?;
    let length = cursor.read_u32()?;
    let info = cursor.read_bytes(length as usize)?;
    Ok(RawAttributeInfo {
        attribute_name_index,
        info: Box::from(info),
    })
}

/// reads a `u16` count followed by that many attributes
fn parse_attributes(cursor: &mut ByteCursor) -> Result<Box<[RawAttributeInfo]>, Error> {
    let count = cursor.read_u16()?;
    (0..count).map(|_| parse_attribute_info(cursor)).collect()
}

/// Should parse the entire byte array to create a raw java class
pub fn parse_class_file_bytes(bytes: &[u8]) -> Result<RawJavaClass, Error> {
    let mut cursor = ByteCursor::new(bytes);

    let magic = cursor.read_u32()?;
    if magic != MAGIC {
        return Err(ErrorKind::NotAClassFile(magic).into());
    }
    let minor = cursor.read_u16()?;
    let major = cursor.read_u16()?;

    let constant_pool_count = cursor.read_u16()?;
    let constant_pool = parser::parse_constant_pool(&mut cursor, constant_pool_count)?;

    let access_flags = cursor.read_u16()?;
    let this_class = cursor.read_u16()?;
    let super_class = cursor.read_u16()?;

    let interfaces_count = cursor.read_u16()?;
    let interfaces = (0..interfaces_count)
        .map(|_| cursor.read_u16())
        .collect::<Result<Box<[u16]>, Error>>()?;

    let fields_count = cursor.read_u16()?;
    let fields = (0..fields_count)
        .map(|_| parse_field_info(&mut cursor))
        .collect::<Result<Box<[RawFieldInfo]>, Error>>()?;

    let methods_count = cursor.read_u16()?;
    let methods = (0..methods_count)
        .map(|_| parse_method_info(&mut cursor))
        .collect::<Result<Box<[RawMethodInfo]>, Error>>()?;

    let attributes = parse_attributes(&mut cursor)?;

    if !cursor.is_empty() {
        return Err(ErrorKind::TrailingBytes(cursor.remaining()).into());
    }

    Ok(RawJavaClass {
        minor,
        major,
        constant_pool,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itest_common::ClassFileBuilder;

    #[test]
    fn parse_minimal_class() {
        let bytes = ClassFileBuilder::new("com/example/Square")
            .super_class("com/example/Rectangle")
            .interface("java/lang/Runnable")
            .field("side", "I")
            .method("<init>", "()V", Some(vec![0x2a, 0xb1]))
            .build();
        let raw = parse_class_file_bytes(&bytes).expect("couldn't parse");
        assert_eq!((raw.major, raw.minor), (52, 0));
        assert_eq!(raw.interfaces.len(), 1);
        assert_eq!(raw.fields.len(), 1);
        assert_eq!(raw.methods.len(), 1);
        assert_eq!(raw.methods[0].attributes.len(), 1);
    }

    #[test]
    fn bad_magic() {
        let mut bytes = ClassFileBuilder::new("A").build();
        bytes[0] = 0xDE;
        let error = parse_class_file_bytes(&bytes).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::NotAClassFile(0xDEFEBABE)));
    }

    #[test]
    fn trailing_bytes() {
        let mut bytes = ClassFileBuilder::new("A").build();
        bytes.extend([0, 0]);
        let error = parse_class_file_bytes(&bytes).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::TrailingBytes(2)));
    }

    #[test]
    fn every_truncation_fails() {
        let bytes = ClassFileBuilder::new("com/example/Square")
            .field("side", "I")
            .method("area", "()I", Some(vec![0x03, 0xac]))
            .build();
        for len in 0..bytes.len() {
            let error = parse_class_file_bytes(&bytes[..len]).unwrap_err();
            assert!(
                matches!(error.kind(), ErrorKind::UnexpectedEndOfInput { .. }),
                "truncating to {len} bytes gave {error}"
            );
        }
    }
}
