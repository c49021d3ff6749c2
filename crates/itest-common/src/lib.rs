//! Builds class files in memory for tests, so that no java compiler is needed.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
enum Constant {
    Utf8(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    Raw(Vec<u8>),
}

impl Constant {
    fn slots(&self) -> u16 {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self {
            Constant::Utf8(text) => {
                out.push(1);
                out.extend((text.len() as u16).to_be_bytes());
                out.extend(text.as_bytes());
            }
            Constant::Integer(int) => {
                out.push(3);
                out.extend(int.to_be_bytes());
            }
            Constant::Long(long) => {
                out.push(5);
                out.extend(long.to_be_bytes());
            }
            Constant::Double(double) => {
                out.push(6);
                out.extend(double.to_bits().to_be_bytes());
            }
            Constant::Class(name) => {
                out.push(7);
                out.extend(name.to_be_bytes());
            }
            Constant::String(text) => {
                out.push(8);
                out.extend(text.to_be_bytes());
            }
            Constant::FieldRef(class, nat) => write_pair(out, 9, *class, *nat),
            Constant::MethodRef(class, nat) => write_pair(out, 10, *class, *nat),
            Constant::InterfaceMethodRef(class, nat) => write_pair(out, 11, *class, *nat),
            Constant::NameAndType(name, descriptor) => write_pair(out, 12, *name, *descriptor),
            Constant::Raw(bytes) => out.extend(bytes),
        }
    }
}

fn write_pair(out: &mut Vec<u8>, tag: u8, first: u16, second: u16) {
    out.push(tag);
    out.extend(first.to_be_bytes());
    out.extend(second.to_be_bytes());
}

#[derive(Debug, Clone)]
struct Member {
    access_flags: u16,
    name: u16,
    descriptor: u16,
    attributes: Vec<(u16, Vec<u8>)>,
}

/// Assembles the bytes of a class file.
///
/// Constants are deduplicated and numbered in the order they are first requested, so tests can
/// grab an index with [`method_ref`](Self::method_ref) and friends, then embed it in bytecode.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    major: u16,
    minor: u16,
    constants: Vec<(u16, Constant)>,
    next_index: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    attributes: Vec<(u16, Vec<u8>)>,
}

impl ClassFileBuilder {
    /// Starts a public class extending `java/lang/Object`
    pub fn new(this_class: &str) -> Self {
        let mut builder = Self {
            major: 52,
            minor: 0,
            constants: vec![],
            next_index: 1,
            access_flags: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        };
        builder.this_class = builder.class(this_class);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    fn constant(&mut self, constant: Constant) -> u16 {
        if let Some((index, _)) = self.constants.iter().find(|(_, c)| c == &constant) {
            return *index;
        }
        let index = self.next_index;
        self.next_index += constant.slots();
        self.constants.push((index, constant));
        index
    }

    /// Adds a utf8 constant
    pub fn utf8(&mut self, text: &str) -> u16 {
        self.constant(Constant::Utf8(text.to_string()))
    }

    /// Adds an integer constant
    pub fn integer(&mut self, int: i32) -> u16 {
        self.constant(Constant::Integer(int))
    }

    /// Adds a long constant, which takes up two slots
    pub fn long(&mut self, long: i64) -> u16 {
        self.constant(Constant::Long(long))
    }

    /// Adds a double constant, which takes up two slots
    pub fn double(&mut self, double: f64) -> u16 {
        self.constant(Constant::Double(double))
    }

    /// Adds a class constant
    pub fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.constant(Constant::Class(name))
    }

    /// Adds a string constant
    pub fn string(&mut self, text: &str) -> u16 {
        let text = self.utf8(text);
        self.constant(Constant::String(text))
    }

    /// Adds a name and type constant
    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.constant(Constant::NameAndType(name, descriptor))
    }

    /// Adds a field reference
    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let nat = self.name_and_type(name, descriptor);
        self.constant(Constant::FieldRef(class, nat))
    }

    /// Adds a method reference
    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let nat = self.name_and_type(name, descriptor);
        self.constant(Constant::MethodRef(class, nat))
    }

    /// Adds an interface method reference
    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let nat = self.name_and_type(name, descriptor);
        self.constant(Constant::InterfaceMethodRef(class, nat))
    }

    /// Adds a method reference made of arbitrary indices, for building malformed pools
    pub fn raw_method_ref(&mut self, class_index: u16, name_and_type_index: u16) -> u16 {
        self.constant(Constant::MethodRef(class_index, name_and_type_index))
    }

    /// Adds a single-slot constant written verbatim, tag byte included
    pub fn raw_constant(&mut self, bytes: Vec<u8>) -> u16 {
        self.constant(Constant::Raw(bytes))
    }

    /// Sets the class file version
    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    /// Sets the super class
    pub fn super_class(mut self, name: &str) -> Self {
        self.super_class = self.class(name);
        self
    }

    /// Removes the super class, as in `java/lang/Object` itself
    pub fn no_super_class(mut self) -> Self {
        self.super_class = 0;
        self
    }

    /// Adds an implemented interface
    pub fn interface(mut self, name: &str) -> Self {
        let class = self.class(name);
        self.interfaces.push(class);
        self
    }

    /// Adds a private field with a `Deprecated` attribute
    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let member = Member {
            access_flags: 0x0002,
            name: self.utf8(name),
            descriptor: self.utf8(descriptor),
            attributes: vec![(self.utf8("Deprecated"), vec![])],
        };
        self.fields.push(member);
        self
    }

    /// Adds a public method. A method without code is written as abstract.
    pub fn method(mut self, name: &str, descriptor: &str, code: Option<Vec<u8>>) -> Self {
        let mut member = Member {
            access_flags: if code.is_some() { 0x0001 } else { 0x0401 },
            name: self.utf8(name),
            descriptor: self.utf8(descriptor),
            attributes: vec![],
        };
        if let Some(code) = code {
            let code_name = self.utf8("Code");
            member.attributes.push((code_name, code_attribute(&code)));
        }
        self.methods.push(member);
        self
    }

    /// Adds a class attribute with arbitrary contents
    pub fn attribute(mut self, name: &str, info: Vec<u8>) -> Self {
        let name = self.utf8(name);
        self.attributes.push((name, info));
        self
    }

    /// Writes out the class file
    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE];
        out.extend(self.minor.to_be_bytes());
        out.extend(self.major.to_be_bytes());
        out.extend(self.next_index.to_be_bytes());
        for (_, constant) in &self.constants {
            constant.write(&mut out);
        }
        out.extend(self.access_flags.to_be_bytes());
        out.extend(self.this_class.to_be_bytes());
        out.extend(self.super_class.to_be_bytes());
        out.extend((self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend(interface.to_be_bytes());
        }
        for members in [&self.fields, &self.methods] {
            out.extend((members.len() as u16).to_be_bytes());
            for member in members {
                out.extend(member.access_flags.to_be_bytes());
                out.extend(member.name.to_be_bytes());
                out.extend(member.descriptor.to_be_bytes());
                write_attributes(&mut out, &member.attributes);
            }
        }
        write_attributes(&mut out, &self.attributes);
        out
    }

    /// Writes out the class file to a temporary file named after the test
    pub fn write_temp(&self, test_name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "itest-common-{}-{}.class",
            std::process::id(),
            test_name
        ));
        std::fs::write(&path, self.build()).expect("couldn't write class file");
        path
    }
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    out.extend((attributes.len() as u16).to_be_bytes());
    for (name, info) in attributes {
        out.extend(name.to_be_bytes());
        out.extend((info.len() as u32).to_be_bytes());
        out.extend(info);
    }
}

/// The body of a `Code` attribute with an empty exception table and no nested attributes
fn code_attribute(code: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    out.extend(16_u16.to_be_bytes());
    out.extend(16_u16.to_be_bytes());
    out.extend((code.len() as u32).to_be_bytes());
    out.extend(code);
    out.extend(0_u16.to_be_bytes());
    out.extend(0_u16.to_be_bytes());
    out
}

#[cfg(test)]
mod tests {
    use crate::ClassFileBuilder;

    #[test]
    fn constants_are_deduplicated() {
        let mut builder = ClassFileBuilder::new("Test");
        let first = builder.method_ref("Test", "run", "()V");
        let second = builder.method_ref("Test", "run", "()V");
        assert_eq!(first, second);
        let long = builder.long(7);
        assert_eq!(builder.integer(1), long + 2, "longs take two slots");
    }

    #[test]
    fn starts_with_magic() {
        let bytes = ClassFileBuilder::new("Test").build();
        assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
    }
}
