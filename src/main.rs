//! tmplwalk CLI
//!
//! Usage:
//!   tmplwalk [OPTIONS] [TEMPLATE]
//!
//! Options:
//!   -d, --data <FILE>             Bindings to render against (TOML format)
//!   -t, --tags <FILE>             Tag keywords and delimiters (TOML format)
//!       --max-include-depth <N>   Maximum nesting of included templates
//!   -o, --output <FILE>           Write output here instead of stdout
//!   -p, --pretty                  Show diagnostics with source context
//!   -h, --help                    Print help

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tmplwalk::{
    render_with_config, FormatRegistry, RenderConfig, RenderError, Scope, Source, TagSet,
    DEFAULT_MAX_INCLUDE_DEPTH,
};

#[derive(Parser)]
#[command(name = "tmplwalk")]
#[command(about = "Render text templates against TOML data")]
struct Cli {
    /// Template file (reads template text from stdin if not provided)
    template: Option<PathBuf>,

    /// Bindings to render against (TOML format)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Tag keywords and delimiters (TOML format)
    #[arg(short, long)]
    tags: Option<PathBuf>,

    /// Maximum nesting of included templates
    #[arg(long, default_value_t = DEFAULT_MAX_INCLUDE_DEPTH)]
    max_include_depth: usize,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show diagnostics with source context
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Load tag set
    let tags = match &cli.tags {
        Some(path) => match TagSet::from_file(path) {
            Ok(tags) => tags,
            Err(e) => {
                eprintln!("Error loading tag set '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => TagSet::default(),
    };

    // Load bindings
    let scope = match &cli.data {
        Some(path) => match Scope::from_toml_file(path) {
            Ok(scope) => scope,
            Err(e) => {
                eprintln!("Error loading data '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Scope::new(),
    };

    // Read template text from stdin when no file is given
    let stdin_text = match &cli.template {
        Some(_) => None,
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                return ExitCode::FAILURE;
            }
            Some(buffer)
        }
    };
    let source = match (&cli.template, &stdin_text) {
        (Some(path), _) => Source::Path(path),
        (None, Some(text)) => Source::Text(text),
        (None, None) => Source::Text(""),
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Error creating output '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let config = RenderConfig::new()
        .with_tags(tags)
        .with_max_include_depth(cli.max_include_depth);
    let formats = FormatRegistry::with_builtins();

    // Pretty reports are printed from the returned error instead of the sink
    let mut stderr = io::stderr();
    let mut sink = io::sink();
    let errout: &mut dyn Write = if cli.pretty { &mut sink } else { &mut stderr };

    let result = render_with_config(source, &formats, &scope, &mut out, errout, &config);
    let flushed = out.flush();

    match result {
        Ok(()) => {}
        Err(RenderError::Template(diagnostics)) => {
            if cli.pretty {
                for diagnostic in &diagnostics {
                    eprintln!("{}", diagnostic.report().trim_end());
                }
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = flushed {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
