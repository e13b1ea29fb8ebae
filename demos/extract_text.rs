//! Example: Extract plain text from legacy Office files
//!
//! Detects each file's format (or takes it from `--format`), extracts the
//! text and prints it, followed by the recovered byte count and any units
//! that had to be skipped.
//!
//! Usage:
//!   cargo run --example extract_text -- -i report.doc
//!   cargo run --example extract_text -- -i a.ppt -i b.xls -v
//!   cargo run --example extract_text -- -i attachment.bin -t xls

use clap::{ArgAction, Parser};
use oletext::{ExtractOptions, Extraction, FileFormat, ParserRegistry};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "extract_text")]
#[command(about = "Extract plain text from .doc, .ppt and .xls files")]
struct Args {
    /// Input file (repeatable)
    #[arg(short, long = "input", required = true)]
    input: Vec<PathBuf>,

    /// Treat every input as this format (doc, ppt, xls) instead of detecting it
    #[arg(short = 't', long = "format")]
    format: Option<String>,

    /// Windows code page for single-byte Word text
    #[arg(long, default_value_t = 936)]
    codepage: u32,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let format = match args.format.as_deref().map(FileFormat::from_extension) {
        Some(FileFormat::Unknown) => {
            eprintln!("Unknown format: {}", args.format.unwrap_or_default());
            process::exit(2);
        },
        other => other,
    };

    let options = ExtractOptions::new().with_legacy_codepage(args.codepage);
    let registry = ParserRegistry::with_defaults();

    let results: Vec<oletext::Result<Extraction>> = match format {
        Some(format) => args
            .input
            .iter()
            .map(|path| registry.parse_as(path, format, &options))
            .collect(),
        None => registry.extract_many(&args.input, &options),
    };

    let mut failed = false;
    for (path, result) in args.input.iter().zip(results) {
        match result {
            Ok(extraction) => {
                println!("{}", extraction.text);
                println!("file[{}], size[{}]", path.display(), extraction.len());
                for warning in &extraction.warnings {
                    eprintln!("  warning: {warning}");
                }
            },
            Err(e) => {
                failed = true;
                println!("file[{}], size[0]", path.display());
                eprintln!("  error: {e}");
            },
        }
    }

    if failed {
        process::exit(1);
    }
}
