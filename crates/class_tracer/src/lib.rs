//! Decodes java class files into traces of their methods. A class file's structure is read,
//! its constant pool is used to resolve every reference, and the bytecode of each method is
//! decoded into a list of instructions with resolved operands. The result can then be
//! serialized into a language agnostic document.
//!
//! There are three main entrance points to the api: [`parse_file`][0], [`parse_bytes`][1], and
//! [`ClassTracer`][2]
//!
//! [0]: parse_file
//! [1]: parse_bytes
//! [2]: ClassTracer
//!
//! # Example
//! ```no_run
//! # use class_tracer::{ClassTracer, TraceConfig, InstructionFilter};
//! let tracer = ClassTracer::new(TraceConfig::default().filter(InstructionFilter::KeepAll));
//! let trace = tracer.trace_file("com/example/Square.class").expect("couldn't trace class");
//! println!("{}", class_tracer::report::to_json_pretty(&trace).expect("couldn't serialize"));
//! ```

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

use std::io::Read;
use std::path::Path;

pub mod bytecode;
pub mod constant_pool;
pub mod cursor;
pub mod error;
pub(crate) mod raw_java_class;
pub mod report;
mod structures;
pub mod trace;
pub(crate) mod utility;

use crate::error::Error;
pub use structures::*;
pub use trace::{ClassTrace, ClassTracer, InstructionFilter, MethodTrace, TraceConfig};

/// Parse bytes into a java class.
///
/// # Error
/// Will return an error if the byte stream does not resolve to a valid java class
pub fn parse_bytes<R: Read>(mut read: R) -> Result<JavaClass, Error> {
    let mut buffer = vec![];
    read.read_to_end(&mut buffer)?;

    raw_java_class::parse_class_file_bytes(&buffer[..]).map(JavaClass::new)
}

/// Parses the contents of a file into a java class
///
/// # Error
/// Will return an error if the file does not exist, or the contents of the file doesn't resolve
/// to a valid java class.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<JavaClass, Error> {
    let bytes = std::fs::read(path)?;
    raw_java_class::parse_class_file_bytes(&bytes).map(JavaClass::new)
}

/// Traces a class file using the default [`TraceConfig`]
///
/// > This is a wrapper over the [`ClassTracer::trace_file`](ClassTracer::trace_file) method.
pub fn trace_file<P: AsRef<Path>>(path: P) -> Result<ClassTrace, Error> {
    ClassTracer::default().trace_file(path)
}
