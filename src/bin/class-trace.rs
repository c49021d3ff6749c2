use clap::Parser;
use class_tracer::error::Error;
use class_tracer::{report, ClassTracer, InstructionFilter, TraceConfig};
use log::{info, LevelFilter};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Traces the bytecode of a java class file into a json document")]
struct CliArgs {
    /// The class file to trace
    input: PathBuf,
    /// Where to write the document. Defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// The label written into the document
    #[arg(long, default_value = class_tracer::trace::DEFAULT_KIND)]
    kind: String,
    /// Keep every instruction, including local loads
    #[arg(long, conflicts_with = "suppress")]
    keep_all: bool,
    /// Drop instructions whose mnemonic starts with this prefix. Defaults to `iload_` and `aload_`
    #[arg(long, value_name = "PREFIX")]
    suppress: Vec<String>,
    /// Only trace the first N instructions of each method
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

impl CliArgs {
    fn config(&self) -> TraceConfig {
        let filter = if self.keep_all {
            InstructionFilter::KeepAll
        } else if !self.suppress.is_empty() {
            InstructionFilter::SuppressPrefixes(self.suppress.clone())
        } else {
            InstructionFilter::default()
        };
        TraceConfig::default()
            .kind(self.kind.as_str())
            .filter(filter)
            .max_instructions(self.limit)
    }
}

fn main() -> Result<(), Error> {
    let args: CliArgs = CliArgs::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("class_tracer", level)
        .filter_module("class_trace", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    let tracer = ClassTracer::new(args.config());
    let trace = tracer.trace_file(&args.input)?;
    info!(
        "traced {} methods of {}",
        trace.methods.len(),
        trace.class_name
    );

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            report::write_json(&trace, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = stdout().lock();
            report::write_json(&trace, &mut stdout)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn default_filter() {
        let args = CliArgs::parse_from(["class-trace", "Foo.class"]);
        let config = args.config();
        assert_eq!(config.get_kind(), "Controller");
        assert!(matches!(
            config.get_filter(),
            InstructionFilter::SuppressPrefixes(prefixes) if prefixes == &["iload_", "aload_"]
        ));
    }

    #[test]
    fn custom_filter_and_limit() {
        let args = CliArgs::parse_from([
            "class-trace",
            "Foo.class",
            "--kind",
            "Service",
            "--suppress",
            "astore",
            "--suppress",
            "istore",
            "--limit",
            "10",
        ]);
        let config = args.config();
        assert_eq!(config.get_kind(), "Service");
        assert_eq!(config.get_max_instructions(), Some(10));
        assert!(matches!(
            config.get_filter(),
            InstructionFilter::SuppressPrefixes(prefixes) if prefixes == &["astore", "istore"]
        ));
    }

    #[test]
    fn keep_all_conflicts_with_suppress() {
        let conflicting = ["class-trace", "Foo.class", "--keep-all", "--suppress", "x"];
        assert!(CliArgs::try_parse_from(conflicting).is_err());
        let args = CliArgs::parse_from(["class-trace", "Foo.class", "--keep-all"]);
        assert!(matches!(args.config().get_filter(), InstructionFilter::KeepAll));
    }
}
