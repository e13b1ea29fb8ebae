//! oletext - plain-text extraction from legacy binary Office documents
//!
//! This library reads the text out of `.doc`, `.ppt` and `.xls` files. All
//! three are OLE2 (Compound File Binary) containers; the container reader is
//! implemented here from scratch, together with the format decoders built on
//! top of it.
//!
//! # Features
//!
//! - **OLE2 Reader**: header, FAT/DIFAT/MiniFAT, directory and stream reads,
//!   with cycle detection on every sector chain
//! - **DOC Reader**: File Information Block and piece table (CLX) decoding
//! - **PPT Reader**: depth-bounded walk of the record tree
//! - **XLS Reader**: BIFF record scan for string cells
//! - **Best-effort recovery**: a corrupt piece, record or subtree is skipped
//!   and reported, the rest of the document is still returned
//!
//! # Example - Any supported file
//!
//! ```no_run
//! use oletext::{ExtractOptions, ParserRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ParserRegistry::with_defaults();
//! let extraction = registry.parse("report.doc", &ExtractOptions::default())?;
//! println!("{}", extraction.text);
//! for warning in &extraction.warnings {
//!     eprintln!("skipped: {warning}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading a DOC file
//!
//! ```no_run
//! use oletext::ole::doc::Package;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::open("document.doc")?;
//! let fib = pkg.fib()?;
//! println!("nFib: 0x{:04X}, {} characters", fib.version(), fib.ccp_text());
//! println!("{}", pkg.extract_text()?.text);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level OLE access
//!
//! ```no_run
//! use std::fs::File;
//! use oletext::ole::{NameMatch, OleFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("document.doc")?;
//! let mut ole = OleFile::open(file)?;
//!
//! for stream in ole.list_streams() {
//!     println!("Stream: {stream}");
//! }
//!
//! let data = ole.open_stream("WordDocument", NameMatch::Exact)?;
//! println!("Stream size: {} bytes", data.len());
//! # Ok(())
//! # }
//! ```

/// Shared building blocks: byte readers, text decoding, errors, detection
pub mod common;

/// Extraction options
pub mod config;

/// OLE2 (Compound File Binary) container reader
///
/// This module provides the sector store, allocation tables, directory and
/// stream reads used by the legacy Office formats (.doc, .xls, .ppt), and
/// holds the `doc`, `ppt` and `xls` decoders built on top of it.
pub mod ole;

/// Format dispatch and batch extraction
pub mod registry;

// Re-export commonly used types for convenience
pub use common::{Error, ErrorKind, Extraction, FileFormat, Result};
pub use config::ExtractOptions;
pub use ole::{doc, ppt, xls};
pub use registry::{ParserRegistry, TextParser};
