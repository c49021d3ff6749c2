use crate::attributes::{Attribute, AttributeKind, Code};
use crate::bytecode::Instruction;
use crate::constant_pool::ConstantPool;
use crate::error::Error;
use crate::raw_java_class::{RawAttributeInfo, RawFieldInfo, RawMethodInfo};
use crate::structures::class::JavaClass;
use crate::{FieldType, HasAttributes, MethodDescriptor};

/// A field in a class
#[derive(Debug)]
pub struct Field<'a> {
    entry: Entry<'a>,
    descriptor: FieldType,
}

impl<'a> Field<'a> {
    pub(crate) fn new(
        field_info: &'a RawFieldInfo,
        java_class: &'a JavaClass,
    ) -> Result<Self, Error> {
        let entry = Entry::new(
            java_class.constant_pool(),
            field_info.access_flags,
            field_info.name_index,
            field_info.descriptor_index,
            &field_info.attributes,
        )?;
        let descriptor = FieldType::parse(entry.signature)?;
        Ok(Self { entry, descriptor })
    }

    /// The name of the field
    pub fn name(&self) -> &'a str {
        self.entry.name
    }
    /// The raw descriptor of the field
    pub fn signature(&self) -> &'a str {
        self.entry.signature
    }
    /// The parsed type of the field
    pub fn descriptor(&self) -> &FieldType {
        &self.descriptor
    }
    /// The access flags of the field
    pub fn access_flags(&self) -> u16 {
        self.entry.access_flags
    }
}

impl HasAttributes for Field<'_> {
    type Iter<'a> = <Vec<Result<Attribute<'a>, Error>> as IntoIterator>::IntoIter where Self: 'a;

    fn attributes<'a>(&'a self) -> Self::Iter<'a> {
        self.entry.attributes()
    }
}

/// A method in a class
#[derive(Debug)]
pub struct Method<'a> {
    entry: Entry<'a>,
    descriptor: MethodDescriptor,
}

impl<'a> Method<'a> {
    pub(crate) fn new(
        method_info: &'a RawMethodInfo,
        java_class: &'a JavaClass,
    ) -> Result<Self, Error> {
        let entry = Entry::new(
            java_class.constant_pool(),
            method_info.access_flags,
            method_info.name_index,
            method_info.descriptor_index,
            &method_info.attributes,
        )?;
        let descriptor = MethodDescriptor::parse(entry.signature)?;
        Ok(Self { entry, descriptor })
    }

    /// The name of the method
    pub fn name(&self) -> &'a str {
        self.entry.name
    }
    /// The raw descriptor of the method, such as `(I)V`
    pub fn signature(&self) -> &'a str {
        self.entry.signature
    }
    /// The parsed argument and return types of the method
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }
    /// The access flags of the method
    pub fn access_flags(&self) -> u16 {
        self.entry.access_flags
    }

    /// The method's code attribute. Abstract and native methods have none.
    pub fn code(&self) -> Result<Option<Code<'_>>, Error> {
        let code = self.get_attribute("Code")?;
        Ok(code.and_then(|attribute| match attribute.kind() {
            AttributeKind::Code(code) => Some(code.clone()),
            AttributeKind::Unknown(_) => None,
        }))
    }

    /// Decodes the method's bytecode. A method without code has no instructions.
    pub fn instructions(&self) -> Result<Vec<Instruction>, Error> {
        match self.code()? {
            Some(code) => code.instructions(self.entry.pool),
            None => Ok(vec![]),
        }
    }
}

impl HasAttributes for Method<'_> {
    type Iter<'a> = <Vec<Result<Attribute<'a>, Error>> as IntoIterator>::IntoIter where Self: 'a;

    fn attributes<'a>(&'a self) -> Self::Iter<'a> {
        self.entry.attributes()
    }
}

#[derive(Debug)]
struct Entry<'a> {
    pool: &'a ConstantPool,
    access_flags: u16,
    name: &'a str,
    signature: &'a str,
    attributes: &'a [RawAttributeInfo],
}

impl<'a> Entry<'a> {
    fn new(
        pool: &'a ConstantPool,
        access_flags: u16,
        name_index: u16,
        descriptor_index: u16,
        attributes: &'a [RawAttributeInfo],
    ) -> Result<Self, Error> {
        Ok(Self {
            pool,
            access_flags,
            name: pool.utf8(name_index)?,
            signature: pool.utf8(descriptor_index)?,
            attributes,
        })
    }

    fn attributes(&self) -> std::vec::IntoIter<Result<Attribute<'a>, Error>> {
        self.attributes
            .iter()
            .map(|raw| Attribute::new(self.pool, raw))
            .collect::<Vec<_>>()
            .into_iter()
    }
}
