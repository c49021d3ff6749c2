//! Assembles the decoded methods of a class into a trace.
//!
//! A [`ClassTracer`] holds only its configuration, so one tracer can be shared between
//! threads and used to trace any number of classes.

use crate::bytecode::Instruction;
use crate::error::Error;
use crate::raw_java_class::parse_class_file_bytes;
use crate::{JavaClass, MethodDescriptor};
use log::debug;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;

/// The label given to a trace when none is configured
pub const DEFAULT_KIND: &str = "Controller";

/// Mnemonic prefixes dropped from a trace by default
pub const DEFAULT_SUPPRESSED_PREFIXES: [&str; 2] = ["iload_", "aload_"];

/// Decides which decoded instructions make it into a trace
#[derive(Clone)]
pub enum InstructionFilter {
    /// Every instruction is kept
    KeepAll,
    /// Instructions whose mnemonic starts with any of these prefixes are dropped
    SuppressPrefixes(Vec<String>),
    /// Instructions are kept when the predicate returns `true`
    Custom(Arc<dyn Fn(&Instruction) -> bool + Send + Sync>),
}

impl InstructionFilter {
    /// Creates a custom filter from a predicate
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Instruction) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Whether an instruction should be kept
    pub fn retains(&self, instruction: &Instruction) -> bool {
        match self {
            InstructionFilter::KeepAll => true,
            InstructionFilter::SuppressPrefixes(prefixes) => !prefixes
                .iter()
                .any(|prefix| instruction.mnemonic.starts_with(prefix.as_str())),
            InstructionFilter::Custom(predicate) => predicate(instruction),
        }
    }
}

impl Default for InstructionFilter {
    fn default() -> Self {
        Self::SuppressPrefixes(
            DEFAULT_SUPPRESSED_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        )
    }
}

impl Debug for InstructionFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InstructionFilter::KeepAll => write!(f, "KeepAll"),
            InstructionFilter::SuppressPrefixes(prefixes) => {
                f.debug_tuple("SuppressPrefixes").field(prefixes).finish()
            }
            InstructionFilter::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Settings for a [`ClassTracer`]
#[derive(Debug, Clone)]
pub struct TraceConfig {
    kind: String,
    filter: InstructionFilter,
    max_instructions: Option<usize>,
}

impl TraceConfig {
    /// Sets the label written into the trace
    pub fn kind<S: Into<String>>(mut self, kind: S) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the instruction filter
    pub fn filter(mut self, filter: InstructionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Limits how many instructions of each method are traced. The limit is applied before
    /// filtering, and the whole code array is still decoded.
    pub fn max_instructions(mut self, max: Option<usize>) -> Self {
        self.max_instructions = max;
        self
    }

    /// The label written into the trace
    pub fn get_kind(&self) -> &str {
        &self.kind
    }

    /// The instruction filter
    pub fn get_filter(&self) -> &InstructionFilter {
        &self.filter
    }

    /// The per method instruction limit
    pub fn get_max_instructions(&self) -> Option<usize> {
        self.max_instructions
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            kind: DEFAULT_KIND.to_string(),
            filter: InstructionFilter::default(),
            max_instructions: None,
        }
    }
}

/// The trace of a single method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodTrace {
    /// The method's name
    pub name: String,
    /// The raw descriptor, such as `(I)V`
    pub signature: String,
    /// The parsed descriptor
    pub descriptor: MethodDescriptor,
    /// The retained instructions, in code order
    pub instructions: Vec<Instruction>,
}

/// The trace of a class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTrace {
    /// The caller supplied label
    pub kind: String,
    /// The class name, with `.` separating packages
    pub class_name: String,
    /// The traced methods, in declaration order
    pub methods: Vec<MethodTrace>,
}

/// Traces classes
#[derive(Debug, Clone, Default)]
pub struct ClassTracer {
    config: TraceConfig,
}

impl ClassTracer {
    /// Creates a tracer with the given configuration
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    /// The tracer's configuration
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Traces a class from its bytes
    pub fn trace_bytes(&self, bytes: &[u8]) -> Result<ClassTrace, Error> {
        let class = JavaClass::new(parse_class_file_bytes(bytes)?);
        self.trace_class(&class)
    }

    /// Traces a class file
    pub fn trace_file<P: AsRef<Path>>(&self, path: P) -> Result<ClassTrace, Error> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!("read {} bytes from {:?}", bytes.len(), path.as_ref());
        self.trace_bytes(&bytes)
    }

    /// Traces an already parsed class
    pub fn trace_class(&self, class: &JavaClass) -> Result<ClassTrace, Error> {
        let this = class.this()?;
        let (major, minor) = class.version();
        debug!("tracing {} (version {}.{})", this, major, minor);

        let methods = class
            .methods()?
            .iter()
            .map(|method| -> Result<MethodTrace, Error> {
                let mut instructions = method.instructions()?;
                if let Some(max) = self.config.max_instructions {
                    instructions.truncate(max);
                }
                instructions.retain(|instruction| self.config.filter.retains(instruction));
                debug!(
                    "traced {}{} with {} instructions",
                    method.name(),
                    method.signature(),
                    instructions.len()
                );
                Ok(MethodTrace {
                    name: method.name().to_string(),
                    signature: method.signature().to_string(),
                    descriptor: method.descriptor().clone(),
                    instructions,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ClassTrace {
            kind: self.config.kind.clone(),
            class_name: this.binary_name(),
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::ResolvedOperand;
    use crate::error::ErrorKind;
    use crate::{FieldType, ReturnType};
    use itest_common::ClassFileBuilder;

    fn sample_class() -> Vec<u8> {
        let mut builder = ClassFileBuilder::new("com/example/Greeter");
        let println = builder.method_ref("java/io/PrintStream", "println", "(Ljava/lang/String;)V");
        let out = builder.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
        let [p_hi, p_lo] = println.to_be_bytes();
        let [o_hi, o_lo] = out.to_be_bytes();
        builder
            .method(
                "greet",
                "(Ljava/lang/String;I)V",
                Some(vec![
                    0xb2, o_hi, o_lo, // getstatic
                    0x2b, // aload_1
                    0xb6, p_hi, p_lo, // invokevirtual
                    0x1c, // iload_2
                    0x57, // pop
                    0xb1, // return
                ]),
            )
            .method("run", "()V", None)
            .build()
    }

    #[test]
    fn default_config() {
        let config = TraceConfig::default();
        assert_eq!(config.get_kind(), "Controller");
        assert!(config.get_max_instructions().is_none());
        assert!(matches!(
            config.get_filter(),
            InstructionFilter::SuppressPrefixes(prefixes) if prefixes == &["iload_", "aload_"]
        ));
    }

    #[test]
    fn trace_with_default_filter() {
        let trace = ClassTracer::default().trace_bytes(&sample_class()).unwrap();
        assert_eq!(trace.kind, "Controller");
        assert_eq!(trace.class_name, "com.example.Greeter");
        assert_eq!(trace.methods.len(), 2);

        let greet = &trace.methods[0];
        assert_eq!(greet.name, "greet");
        assert_eq!(greet.signature, "(Ljava/lang/String;I)V");
        assert_eq!(
            greet.descriptor.args(),
            &[FieldType::Object("java/lang/String".to_string()), FieldType::Int]
        );
        assert_eq!(greet.descriptor.ret_type(), &ReturnType::Void);

        let mnemonics = greet
            .instructions
            .iter()
            .map(|i| (i.offset, i.mnemonic))
            .collect::<Vec<_>>();
        assert_eq!(
            mnemonics,
            [(0, "getstatic"), (4, "invokevirtual"), (8, "pop"), (9, "return")]
        );
        assert!(matches!(
            &greet.instructions[1].operands[..],
            [ResolvedOperand::ConstantPoolRef(r)]
                if r.to_string() == "java/io/PrintStream.println:(Ljava/lang/String;)V"
        ));

        assert!(trace.methods[1].instructions.is_empty());
    }

    #[test]
    fn keep_all_and_custom_filters() {
        let bytes = sample_class();
        let all = ClassTracer::new(TraceConfig::default().filter(InstructionFilter::KeepAll))
            .trace_bytes(&bytes)
            .unwrap();
        assert_eq!(all.methods[0].instructions.len(), 6);

        let invokes = ClassTracer::new(
            TraceConfig::default()
                .kind("Service")
                .filter(InstructionFilter::custom(|i| i.mnemonic.starts_with("invoke"))),
        )
        .trace_bytes(&bytes)
        .unwrap();
        assert_eq!(invokes.kind, "Service");
        assert_eq!(invokes.methods[0].instructions.len(), 1);
        assert_eq!(invokes.methods[0].instructions[0].offset, 4);
    }

    #[test]
    fn limit_applies_before_filter() {
        let trace = ClassTracer::new(TraceConfig::default().max_instructions(Some(3)))
            .trace_bytes(&sample_class())
            .unwrap();
        let offsets = trace.methods[0]
            .instructions
            .iter()
            .map(|i| i.offset)
            .collect::<Vec<_>>();
        assert_eq!(offsets, [0, 4]);
    }

    #[test]
    fn limit_still_validates_code() {
        let bytes = ClassFileBuilder::new("Broken")
            .method("bad", "()V", Some(vec![0x00, 0xb1, 0xcb]))
            .build();
        let error = ClassTracer::new(TraceConfig::default().max_instructions(Some(1)))
            .trace_bytes(&bytes)
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::UnknownOpcode {
                opcode: 0xcb,
                offset: 2
            }
        ));
    }

    #[test]
    fn missing_file() {
        let error = ClassTracer::default()
            .trace_file("does/not/exist.class")
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::IoError(_)));
    }

    #[test]
    fn tracer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClassTracer>();

        let tracer = ClassTracer::default();
        let bytes = sample_class();
        let traces = std::thread::scope(|scope| {
            let handles = (0..4)
                .map(|_| scope.spawn(|| tracer.trace_bytes(&bytes).unwrap()))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(traces.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
