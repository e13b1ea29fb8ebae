//! Error types for XLS file parsing

use crate::common::ErrorKind;
use crate::ole::OleError;
use std::fmt;

/// Result type alias for XLS operations
pub type XlsResult<T> = Result<T, XlsError>;

/// Errors that can occur during XLS text extraction
#[derive(Debug)]
pub enum XlsError {
    /// CFB (Compound File Binary) error
    Ole(OleError),
    /// Neither a `Workbook` nor a `Book` stream exists
    StreamNotFound(String),
    /// A record's payload runs past the end of the stream
    RecordBoundsViolation {
        /// Offset of the record header
        offset: usize,
        record_type: u16,
        /// Declared payload length
        length: usize,
        /// Bytes left after the header
        available: usize,
    },
    /// A payload too short for the fields its type requires
    InvalidRecord {
        offset: usize,
        record_type: u16,
        message: String,
    },
    /// A LabelSst refers past the end of the shared string table
    SstIndexOutOfRange {
        offset: usize,
        index: u32,
        len: usize,
    },
    /// Malformed UTF-16 in a cell string
    TextDecodeFailure { offset: usize },
}

impl XlsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            XlsError::Ole(e) => e.kind(),
            XlsError::StreamNotFound(_) => ErrorKind::StreamNotFound,
            XlsError::RecordBoundsViolation { .. }
            | XlsError::InvalidRecord { .. }
            | XlsError::SstIndexOutOfRange { .. } => ErrorKind::RecordBoundsViolation,
            XlsError::TextDecodeFailure { .. } => ErrorKind::TextDecodeFailure,
        }
    }
}

impl fmt::Display for XlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XlsError::Ole(e) => write!(f, "CFB error: {}", e),
            XlsError::StreamNotFound(name) => write!(f, "Stream not found: {}", name),
            XlsError::RecordBoundsViolation {
                offset,
                record_type,
                length,
                available,
            } => write!(
                f,
                "Record 0x{:04X} at {} declares {} bytes, {} available",
                record_type, offset, length, available
            ),
            XlsError::InvalidRecord {
                offset,
                record_type,
                message,
            } => {
                write!(f, "Invalid record 0x{:04X} at {}: {}", record_type, offset, message)
            },
            XlsError::SstIndexOutOfRange { offset, index, len } => write!(
                f,
                "LabelSst at {} refers to string {} of {}",
                offset, index, len
            ),
            XlsError::TextDecodeFailure { offset } => {
                write!(f, "Record at {} contained undecodable text", offset)
            },
        }
    }
}

impl std::error::Error for XlsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XlsError::Ole(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OleError> for XlsError {
    fn from(err: OleError) -> Self {
        XlsError::Ole(err)
    }
}
