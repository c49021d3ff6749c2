use crate::attributes::Attribute;
use crate::constant_pool::ConstantPool;
use crate::error::Error;
use crate::raw_java_class::RawJavaClass;
use crate::{FQName, Field, HasAttributes, Method};
use std::fmt::{Debug, Display, Formatter};

/// A java class
#[derive(Debug, Clone)]
pub struct JavaClass(RawJavaClass);

impl JavaClass {
    pub(crate) fn new(class: RawJavaClass) -> Self {
        Self(class)
    }

    /// The class's constant pool
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.0.constant_pool
    }

    /// The class file version as `(major, minor)`
    pub fn version(&self) -> (u16, u16) {
        (self.0.major, self.0.minor)
    }

    /// The access flags of the class
    pub fn access_flags(&self) -> u16 {
        self.0.access_flags
    }

    /// Gets this class's name
    pub fn this(&self) -> Result<&FQName, Error> {
        self.constant_pool()
            .class_name(self.0.this_class)
            .map(FQName::new)
    }

    /// Gets the super class's name of this class. Only `java/lang/Object` has no super class.
    pub fn super_name(&self) -> Result<Option<&FQName>, Error> {
        if self.0.super_class == 0 {
            return Ok(None);
        }
        self.constant_pool()
            .class_name(self.0.super_class)
            .map(|name| Some(FQName::new(name)))
    }

    /// Gets the names of this interfaces that this class implements
    pub fn interfaces(&self) -> Result<Vec<&FQName>, Error> {
        self.0
            .interfaces
            .iter()
            .map(|index| self.constant_pool().class_name(*index).map(FQName::new))
            .collect()
    }

    /// Gets the fields declared in this class.
    pub fn fields(&self) -> Result<Vec<Field>, Error> {
        self.0.fields.iter().map(|f| Field::new(f, self)).collect()
    }

    /// Gets the methods declared in this class.
    pub fn methods(&self) -> Result<Vec<Method>, Error> {
        self.0.methods.iter().map(|m| Method::new(m, self)).collect()
    }
}

impl Display for JavaClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let methods = self.methods().map(|methods| {
            methods
                .iter()
                .map(|method| format!("{}{}", method.name(), method.signature()))
                .collect::<Vec<_>>()
        });
        f.debug_struct("JavaClass")
            .field("this", &Resolved(self.this()))
            .field("super", &Resolved(self.super_name()))
            .field("interfaces", &Resolved(self.interfaces()))
            .field("methods", &Resolved(methods))
            .finish()
    }
}

/// Shows a value that couldn't be resolved as its error
struct Resolved<T>(Result<T, Error>);

impl<T: Debug> Debug for Resolved<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Ok(value) => value.fmt(f),
            Err(error) => write!(f, "<{}>", error),
        }
    }
}

impl HasAttributes for JavaClass {
    type Iter<'a> = <Vec<Result<Attribute<'a>, Error>> as IntoIterator>::IntoIter where Self: 'a;

    fn attributes<'a>(&'a self) -> Self::Iter<'a> {
        self.0
            .attributes
            .iter()
            .map(|raw| Attribute::new(self.constant_pool(), raw))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::attributes::AttributeKind;
    use crate::{parse_bytes, FieldType, HasAttributes};
    use itest_common::ClassFileBuilder;

    #[test]
    fn parse_class() {
        let bytes = ClassFileBuilder::new("com/example/Square")
            .super_class("com/example/Rectangle")
            .interface("java/lang/Comparable")
            .field("side", "D")
            .method("<init>", "()V", Some(vec![0x2a, 0xb1]))
            .method("area", "()D", None)
            .attribute("SourceFile", vec![0, 1])
            .build();

        let class = parse_bytes(&bytes[..]).unwrap();
        assert_eq!(class.this().unwrap(), "com/example/Square");
        assert_eq!(
            class.super_name().unwrap().unwrap(),
            "com/example/Rectangle",
            "couldn't get name from {:#?}",
            class
        );
        assert_eq!(class.interfaces().unwrap(), ["java/lang/Comparable"]);

        let fields = class.fields().unwrap();
        assert_eq!(fields[0].name(), "side");
        assert_eq!(fields[0].descriptor(), &FieldType::Double);

        let methods = class.methods().unwrap();
        assert_eq!(methods.len(), 2);
        assert!(methods[0].code().unwrap().is_some());
        assert!(methods[1].code().unwrap().is_none());
        assert!(methods[1].instructions().unwrap().is_empty());

        let source = class.get_attribute("SourceFile").unwrap().unwrap();
        assert!(matches!(source.kind(), AttributeKind::Unknown(&[0, 1])));
        println!("{}", class);
    }

    #[test]
    fn object_has_no_super_class() {
        let bytes = ClassFileBuilder::new("java/lang/Object")
            .no_super_class()
            .build();
        let class = parse_bytes(&bytes[..]).unwrap();
        assert!(class.super_name().unwrap().is_none());
    }

    #[test]
    fn display_bad_method_descriptor() {
        let bytes = ClassFileBuilder::new("com/example/Broken")
            .method("run", "not a descriptor", None)
            .build();
        let class = parse_bytes(&bytes[..]).unwrap();
        assert!(class.methods().is_err());

        let shown = class.to_string();
        assert!(shown.contains("com/example/Broken"), "{shown}");
        assert!(
            shown.contains("\"not a descriptor\" is not a valid descriptor"),
            "{shown}"
        );
    }
}
