//! File format detection utilities.
//!
//! Formats are recognised by file extension first. Files without a known
//! extension are opened as compound files and identified by the well-known
//! streams they contain.

// Submodule declarations
pub mod functions;
pub mod ole2;
pub mod types;

// Re-exports
pub use functions::{detect_file_format, detect_format_from_path};
pub use ole2::detect_ole2_format_from_reader;
pub use types::FileFormat;
