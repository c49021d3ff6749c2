//! Field and method descriptors, as defined in [§4.3](https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html#jvms-4.3)
//! of the JVM specification.

use crate::error::{Error, ErrorKind};
use nom::branch::alt;
use nom::bytes::complete::take_till1;
use nom::character::complete::{char, one_of};
use nom::combinator::{all_consuming, map, value};
use nom::multi::{many0, many_m_n};
use nom::sequence::{delimited, pair};
use nom::{Finish, IResult};
use std::fmt::{Display, Formatter};

/// The type of a field, argument or local variable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `Z`
    Boolean,
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `S`
    Short,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `F`
    Float,
    /// `D`
    Double,
    /// `Lname;`, with the name in internal form
    Object(String),
    /// `[component`
    Array(Box<FieldType>),
}

impl FieldType {
    /// Parses a bare field descriptor, such as `[Ljava/lang/String;`
    pub fn parse(descriptor: &str) -> Result<Self, Error> {
        all_consuming(field_type)(descriptor)
            .finish()
            .map(|(_, parsed)| parsed)
            .map_err(|_| malformed(descriptor))
    }

    /// emits this type as a descriptor
    pub fn descriptor(&self) -> String {
        match self {
            FieldType::Boolean => "Z".to_string(),
            FieldType::Byte => "B".to_string(),
            FieldType::Char => "C".to_string(),
            FieldType::Short => "S".to_string(),
            FieldType::Int => "I".to_string(),
            FieldType::Long => "J".to_string(),
            FieldType::Float => "F".to_string(),
            FieldType::Double => "D".to_string(),
            FieldType::Object(name) => format!("L{name};"),
            FieldType::Array(component) => format!("[{}", component.descriptor()),
        }
    }

    /// The number of array dimensions, 0 if this isn't an array
    pub fn dimensions(&self) -> usize {
        match self {
            FieldType::Array(component) => 1 + component.dimensions(),
            _ => 0,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Byte => write!(f, "byte"),
            FieldType::Char => write!(f, "char"),
            FieldType::Short => write!(f, "short"),
            FieldType::Int => write!(f, "int"),
            FieldType::Long => write!(f, "long"),
            FieldType::Float => write!(f, "float"),
            FieldType::Double => write!(f, "double"),
            FieldType::Object(name) => write!(f, "{}", name.replace('/', ".")),
            FieldType::Array(component) => write!(f, "{}[]", component),
        }
    }
}

/// The return type of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// `V`
    Void,
    /// Any field type
    Type(FieldType),
}

impl ReturnType {
    /// emits this return type as a descriptor
    pub fn descriptor(&self) -> String {
        match self {
            ReturnType::Void => "V".to_string(),
            ReturnType::Type(ty) => ty.descriptor(),
        }
    }
}

impl Display for ReturnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnType::Void => write!(f, "void"),
            ReturnType::Type(ty) => write!(f, "{}", ty),
        }
    }
}

/// The argument types and return type of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    args: Vec<FieldType>,
    ret_type: ReturnType,
}

impl MethodDescriptor {
    /// Creates a method descriptor from its parts
    pub fn new(args: Vec<FieldType>, ret_type: ReturnType) -> Self {
        Self { args, ret_type }
    }

    /// Parses a method descriptor, such as `(I[Ljava/lang/String;)V`
    pub fn parse(descriptor: &str) -> Result<Self, Error> {
        all_consuming(method_descriptor)(descriptor)
            .finish()
            .map(|(_, parsed)| parsed)
            .map_err(|_| malformed(descriptor))
    }

    /// The argument types, in declaration order
    pub fn args(&self) -> &[FieldType] {
        &self.args[..]
    }

    /// The return type
    pub fn ret_type(&self) -> &ReturnType {
        &self.ret_type
    }

    /// emits this method descriptor as a descriptor
    pub fn descriptor(&self) -> String {
        format!(
            "({}){}",
            self.args.iter().map(|s| s.descriptor()).collect::<String>(),
            self.ret_type.descriptor()
        )
    }
}

impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.ret_type,
            self.args
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

fn malformed(descriptor: &str) -> Error {
    ErrorKind::MalformedDescriptor(descriptor.to_string()).into()
}

/// Arrays can't have more than 255 dimensions
const MAX_ARRAY_DIMENSIONS: usize = 255;

fn component_type(string: &str) -> IResult<&str, FieldType> {
    alt((
        map(one_of("ZBCSIJFD"), |code| match code {
            'Z' => FieldType::Boolean,
            'B' => FieldType::Byte,
            'C' => FieldType::Char,
            'S' => FieldType::Short,
            'I' => FieldType::Int,
            'J' => FieldType::Long,
            'F' => FieldType::Float,
            _ => FieldType::Double,
        }),
        map(
            delimited(char('L'), take_till1(|c| c == ';'), char(';')),
            |name: &str| FieldType::Object(name.to_string()),
        ),
    ))(string)
}

fn field_type(string: &str) -> IResult<&str, FieldType> {
    map(
        pair(
            many_m_n(0, MAX_ARRAY_DIMENSIONS, char('[')),
            component_type,
        ),
        |(dimensions, component)| {
            dimensions
                .iter()
                .fold(component, |inner, _| FieldType::Array(Box::new(inner)))
        },
    )(string)
}

fn return_type(string: &str) -> IResult<&str, ReturnType> {
    alt((
        value(ReturnType::Void, char('V')),
        map(field_type, ReturnType::Type),
    ))(string)
}

fn method_descriptor(string: &str) -> IResult<&str, MethodDescriptor> {
    map(
        pair(
            delimited(char('('), many0(field_type), char(')')),
            return_type,
        ),
        |(args, ret_type)| MethodDescriptor { args, ret_type },
    )(string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_method_descriptor() {
        let parsed = MethodDescriptor::parse("(I[Ljava/lang/String;)V").expect("couldn't parse");
        assert_eq!(
            parsed.args(),
            [
                FieldType::Int,
                FieldType::Array(Box::new(FieldType::Object("java/lang/String".to_string())))
            ]
        );
        assert_eq!(parsed.ret_type(), &ReturnType::Void);
        assert_eq!(parsed.descriptor(), "(I[Ljava/lang/String;)V");
        assert_eq!(parsed.to_string(), "void (int, java.lang.String[])");
    }

    #[test]
    fn parse_jni_signature() {
        let jni = "(ZI)Ljava/lang/Object;";
        let parsed = MethodDescriptor::parse(jni).expect("couldn't parse");
        assert_eq!(
            parsed,
            MethodDescriptor::new(
                vec![FieldType::Boolean, FieldType::Int],
                ReturnType::Type(FieldType::Object("java/lang/Object".to_string()))
            )
        );
        assert_eq!(parsed.descriptor(), jni);
    }

    #[test]
    fn parse_field_descriptor() {
        let parsed = FieldType::parse("[[J").unwrap();
        assert_eq!(parsed.dimensions(), 2);
        assert_eq!(parsed.to_string(), "long[][]");
    }

    #[test]
    fn no_arguments() {
        let parsed = MethodDescriptor::parse("()J").unwrap();
        assert!(parsed.args().is_empty());
        assert_eq!(parsed.ret_type(), &ReturnType::Type(FieldType::Long));
    }

    #[test]
    fn malformed_descriptors() {
        for bad in [
            "",
            "(I",
            "(Ljava/lang/String)V",
            "(L;)V",
            "(V)V",
            "(I)",
            "(I)VV",
            "Q",
            "[",
        ] {
            let error = MethodDescriptor::parse(bad).unwrap_err();
            assert!(
                matches!(error.kind(), ErrorKind::MalformedDescriptor(d) if d == bad),
                "{bad:?} gave {error}"
            );
        }
        assert!(FieldType::parse("V").is_err());
        assert!(FieldType::parse("Ljava/lang/String").is_err());
    }

    #[test]
    fn array_dimension_limit() {
        let deepest = format!("{}I", "[".repeat(255));
        let parsed = FieldType::parse(&deepest).expect("255 dimensions are allowed");
        assert_eq!(parsed.dimensions(), 255);
        assert_eq!(parsed.descriptor(), deepest);

        let too_deep = format!("{}I", "[".repeat(256));
        assert!(matches!(
            FieldType::parse(&too_deep).unwrap_err().kind(),
            ErrorKind::MalformedDescriptor(_)
        ));
    }

    #[test]
    fn very_deep_array_is_malformed() {
        let descriptor = format!("({}I)V", "[".repeat(60000));
        assert!(matches!(
            MethodDescriptor::parse(&descriptor).unwrap_err().kind(),
            ErrorKind::MalformedDescriptor(_)
        ));
    }
}
