//! Common types, traits, and utilities shared across formats.
//!
//! This module provides the byte-level helpers, text decoding, error types and
//! the extraction result used by the DOC, PPT and XLS decoders alike.

// Submodule declarations
pub mod binary;
pub mod detection;
pub mod encoding;
pub mod error;
pub mod extraction;

// Re-exports for convenience
pub use detection::{FileFormat, detect_file_format, detect_format_from_path};
pub use error::{Error, ErrorKind, Result};
pub use extraction::Extraction;
