//! Read a boolean expression file; parse, simplify, and normalize
//! its main expression; write the result.

use std::fmt;
use std::fs::{read_to_string, File};
use std::io::{stdin, stdout, Read, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use atty::Stream;
use clap::{Parser, ValueEnum};

use cnfgen_normal::{exp_cnf, exp_dnf, print_expr, simplify, tseitin_cnf, verify};
use cnfgen_syntax::parse_std;
use cnfgen_tracer::{trace, Trace};

#[derive(Debug, Parser)]
#[command(name = "cnfgen", version, about = "Convert boolean expressions to conjunctive normal form", long_about = None)]
struct Args {
    /// Expression file to read, or `-` for standard input
    #[arg(env = "EXPRESSION_FILE_INPUT")]
    input: Option<String>,

    /// Where to write the normal form, or `-` for standard output
    #[arg(env = "EXPRESSION_FILE_OUTPUT")]
    output: Option<String>,

    /// Use the linear-size Tseitin encoding (adds `_t<n>` variables)
    #[arg(long)]
    tseitin: bool,

    /// Emit disjunctive normal form instead
    #[arg(long, conflicts_with = "tseitin")]
    dnf: bool,

    /// Normalize the expression exactly as written
    #[arg(long)]
    no_simplify: bool,

    /// Check by truth table that the result is equivalent to the input
    #[arg(long, conflicts_with = "tseitin")]
    verify: bool,

    /// Echo the result of a pipeline phase to stderr
    #[arg(long, value_enum)]
    trace: Vec<Phase>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum Phase {
    Parse,
    Simplify,
    Normalize,
    All,
}

impl From<Phase> for Trace {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Parse => Trace::Parse,
            Phase::Simplify => Trace::Simplify,
            Phase::Normalize => Trace::Normalize,
            Phase::All => Trace::all(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Form {
    #[default]
    Cnf,
    Dnf,
    Tseitin,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Options {
    form: Form,
    simplify: bool,
    verify: bool,
    trace: Trace,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            form: Form::Cnf,
            simplify: true,
            verify: false,
            trace: Trace::none(),
        }
    }
}

impl From<&Args> for Options {
    fn from(args: &Args) -> Self {
        Self {
            form: match (args.tseitin, args.dnf) {
                (true, _) => Form::Tseitin,
                (false, true) => Form::Dnf,
                (false, false) => Form::Cnf,
            },
            simplify: !args.no_simplify,
            verify: args.verify,
            trace: args
                .trace
                .iter()
                .fold(Trace::none(), |trace, &phase| trace | Trace::from(phase)),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Source {
    Stdin,
    Path(PathBuf),
}

impl Source {
    fn new(arg: Option<&str>) -> Self {
        match arg {
            None | Some("-") => Self::Stdin,
            Some(path) => Self::Path(PathBuf::from(path)),
        }
    }

    /// Read the whole file or standard input.
    fn read(&self) -> Result<String> {
        match self {
            Self::Stdin => {
                if atty::is(Stream::Stdin) {
                    eprintln!("Enter a boolean expression, terminated with Ctrl-D.");
                }
                let mut buffer = String::new();
                stdin()
                    .read_to_string(&mut buffer)
                    .context("Reading from stdin")?;
                Ok(buffer)
            }
            Self::Path(path) => {
                read_to_string(path).with_context(|| format!("Reading {}", path.display()))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::Path(path) => path.display().fmt(f),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Sink {
    Stdout,
    Path(PathBuf),
}

impl Sink {
    fn new(arg: Option<&str>) -> Self {
        match arg {
            None | Some("-") => Self::Stdout,
            Some(path) => Self::Path(PathBuf::from(path)),
        }
    }

    /// Create (or truncate) the file and write `text` to it.
    fn write(&self, text: &str) -> Result<()> {
        match self {
            Self::Stdout => stdout()
                .lock()
                .write_all(text.as_bytes())
                .context("Writing to stdout"),
            Self::Path(path) => {
                let context = || format!("Writing {}", path.display());
                let mut file = File::create(path).with_context(context)?;
                file.write_all(text.as_bytes()).with_context(context)
            }
        }
    }
}

/// The whole pipeline: read, parse, simplify, normalize, write.
/// Nothing is written unless every earlier step succeeds.
fn convert_to_cnf(source: &Source, sink: &Sink, options: &Options) -> Result<()> {
    let text = source.read()?;
    let file = parse_std(&text).with_context(|| format!("Parsing {source}"))?;
    trace!(options.trace, Parse, "Parsed: {}", file.main_expr);

    // Keep the parsed expression only if it's needed to check the result.
    let original = options.verify.then(|| file.main_expr.clone());
    let expr = if options.simplify {
        let simple = simplify(file.main_expr);
        trace!(options.trace, Simplify, "Simplified: {}", simple);
        simple
    } else {
        file.main_expr
    };

    let output = match options.form {
        Form::Cnf => {
            let cnf = exp_cnf(expr);
            if let Some(original) = &original {
                verify(original, &cnf)?;
            }
            print_expr(&cnf)
        }
        Form::Dnf => {
            let dnf = exp_dnf(expr);
            if let Some(original) = &original {
                verify(original, &dnf)?;
            }
            dnf.to_string()
        }
        Form::Tseitin => print_expr(&tseitin_cnf(expr)),
    };
    trace!(options.trace, Normalize, "Normalized: {}", output);

    sink.write(&format!("{output}\n"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let source = Source::new(args.input.as_deref());
    let sink = Sink::new(args.output.as_deref());
    convert_to_cnf(&source, &sink, &Options::from(&args))
}
