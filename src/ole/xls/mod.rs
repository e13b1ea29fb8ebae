//! Legacy Excel (.xls) text extraction
//!
//! This module reads the cell text of Microsoft Excel files in the legacy
//! binary format (.xls files), which are OLE2-based files. The workbook
//! stream is a flat sequence of BIFF (Binary Interchange File Format)
//! records; string cells are either inline (Label) or references into the
//! shared string table (LabelSst).

/// Error types for XLS parsing
mod error;

/// BIFF record parsing utilities
pub mod records;

/// Workbook scanning implementation
mod workbook;

pub use error::{XlsError, XlsResult};
pub use workbook::{XlsWorkbook, scan_text};
