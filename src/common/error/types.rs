//! Unified error type and failure classification.
use crate::ole::OleError;
use crate::ole::doc::DocError;
use crate::ole::ppt::PptError;
use crate::ole::xls::XlsError;
use thiserror::Error;

/// Main error type for oletext operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compound file (sector store, allocation tables, directory) failure
    #[error("OLE error: {0}")]
    Ole(OleError),

    /// Word document failure
    #[error("DOC error: {0}")]
    Doc(DocError),

    /// PowerPoint document failure
    #[error("PPT error: {0}")]
    Ppt(PptError),

    /// Excel workbook failure
    #[error("XLS error: {0}")]
    Xls(XlsError),

    /// No parser is registered for the requested format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for oletext operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failure, independent of which layer raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    InvalidSignature,
    InvalidSectorSize,
    TruncatedHeader,
    TruncatedAllocationTable,
    DanglingSectorPointer,
    CyclicChain,
    TruncatedSector,
    NoDirectoryEntries,
    StreamNotFound,
    InvalidFibIdent,
    TruncatedFib,
    InvalidCswCount,
    InvalidCslwCount,
    InvalidFclcbCount,
    Encrypted,
    MissingClx,
    CorruptClx,
    CorruptPlcPcd,
    CorruptPiece,
    CpOutOfRange,
    RunCrossesPieceBoundary,
    TruncatedRun,
    TextDecodeFailure,
    RecordBoundsViolation,
    Unsupported,
}

impl ErrorKind {
    /// Whether a failure of this kind only affects one piece, record or
    /// subtree, so extraction can skip it and continue.
    pub fn is_localized(self) -> bool {
        matches!(
            self,
            ErrorKind::CorruptPiece
                | ErrorKind::CpOutOfRange
                | ErrorKind::RunCrossesPieceBoundary
                | ErrorKind::TruncatedRun
                | ErrorKind::TextDecodeFailure
                | ErrorKind::RecordBoundsViolation
        )
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Ole(e) => e.kind(),
            Error::Doc(e) => e.kind(),
            Error::Ppt(e) => e.kind(),
            Error::Xls(e) => e.kind(),
            Error::UnsupportedFormat(_) => ErrorKind::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_passes_through_layers() {
        let err = Error::from(DocError::Ole(OleError::CyclicChain { sector: 7 }));
        assert_eq!(err.kind(), ErrorKind::CyclicChain);
        assert!(!err.kind().is_localized());

        let err = Error::from(PptError::RecordBoundsViolation {
            offset: 0,
            reason: "test".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::RecordBoundsViolation);
        assert!(err.kind().is_localized());
    }

    #[test]
    fn test_io_is_flattened() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err = Error::from(OleError::Io(io));
        assert!(matches!(err, Error::Io(_)));
    }
}
