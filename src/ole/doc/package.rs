//! Package implementation for legacy Word documents (.doc).
use super::super::consts::WORD_DOCUMENT_STREAM;
use super::super::{NameMatch, OleError, OleFile};
use super::parts::fib::FileInformationBlock;
use super::parts::piece_table::Clx;
use super::parts::text::TextExtractor;
use crate::common::{ErrorKind, Extraction};
use crate::config::ExtractOptions;
use bytes::Bytes;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use thiserror::Error;

/// Error types for DOC file parsing.
#[derive(Debug, Error)]
pub enum DocError {
    /// OLE file error
    #[error("OLE error: {0}")]
    Ole(#[from] OleError),
    /// A required stream is absent
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
    #[error("WordDocument stream too short for FIB: needed {needed} bytes, have {available}")]
    TruncatedFib { needed: usize, available: usize },
    #[error("Invalid FIB magic number: 0x{0:04X}")]
    InvalidFibIdent(u16),
    #[error("Invalid csw 0x{0:04X}, expected 0x000E")]
    InvalidCswCount(u16),
    #[error("Invalid cslw 0x{0:04X}, expected 0x0016")]
    InvalidCslwCount(u16),
    #[error("Invalid cbRgFcLcb 0x{0:04X}")]
    InvalidFclcbCount(u16),
    #[error("Document is encrypted (obfuscated: {obfuscated})")]
    Encrypted { obfuscated: bool },
    #[error("FIB does not locate a CLX")]
    MissingClx,
    #[error("CLX at {offset} (+{len}) exceeds the {available}-byte table stream")]
    ClxOutOfBounds {
        offset: u32,
        len: u32,
        available: usize,
    },
    #[error("Corrupt CLX: {0}")]
    CorruptClx(String),
    #[error("Corrupt PlcPcd: {0}")]
    CorruptPlcPcd(String),
    #[error("Piece {index} has the reserved fc bit set")]
    CorruptPiece { index: usize },
    #[error("Character position {cp} is outside [{first}, {end})")]
    CpOutOfRange { cp: u32, first: u32, end: u32 },
    #[error("Run of {length} characters at cp {cp} crosses the piece end at {piece_end}")]
    RunCrossesPieceBoundary { cp: u32, length: u32, piece_end: u32 },
    #[error("Run at byte {offset} needs {len} bytes, WordDocument has {available}")]
    TruncatedRun {
        offset: u64,
        len: u64,
        available: usize,
    },
    #[error("Piece at cp {cp} contained undecodable text")]
    TextDecodeFailure { cp: u32 },
}

impl DocError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocError::Ole(e) => e.kind(),
            DocError::StreamNotFound(_) => ErrorKind::StreamNotFound,
            DocError::TruncatedFib { .. } => ErrorKind::TruncatedFib,
            DocError::InvalidFibIdent(_) => ErrorKind::InvalidFibIdent,
            DocError::InvalidCswCount(_) => ErrorKind::InvalidCswCount,
            DocError::InvalidCslwCount(_) => ErrorKind::InvalidCslwCount,
            DocError::InvalidFclcbCount(_) => ErrorKind::InvalidFclcbCount,
            DocError::Encrypted { .. } => ErrorKind::Encrypted,
            DocError::MissingClx => ErrorKind::MissingClx,
            DocError::ClxOutOfBounds { .. } | DocError::CorruptClx(_) => ErrorKind::CorruptClx,
            DocError::CorruptPlcPcd(_) => ErrorKind::CorruptPlcPcd,
            DocError::CorruptPiece { .. } => ErrorKind::CorruptPiece,
            DocError::CpOutOfRange { .. } => ErrorKind::CpOutOfRange,
            DocError::RunCrossesPieceBoundary { .. } => ErrorKind::RunCrossesPieceBoundary,
            DocError::TruncatedRun { .. } => ErrorKind::TruncatedRun,
            DocError::TextDecodeFailure { .. } => ErrorKind::TextDecodeFailure,
        }
    }
}

/// Result type for DOC operations.
pub type Result<T> = std::result::Result<T, DocError>;

/// A Word (.doc) package.
///
/// This is the main entry point for working with legacy Word documents.
/// It wraps an OLE file and provides Word-specific functionality.
///
/// # Examples
///
/// ```rust,no_run
/// use oletext::doc::Package;
///
/// let mut pkg = Package::open("document.doc")?;
/// let extraction = pkg.extract_text()?;
/// println!("{}", extraction.text);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package<R: Read + Seek = File> {
    /// The underlying OLE file
    ole: OleFile<R>,
    options: ExtractOptions,
}

impl Package<File> {
    /// Open a .doc package from a file path with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &ExtractOptions::default())
    }

    /// Open a .doc package from a file path.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Self> {
        let file = File::open(path).map_err(OleError::from)?;
        Package::from_reader_with(file, options)
    }
}

impl<R: Read + Seek> Package<R> {
    /// Create a Package from any reader that implements Read + Seek.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use oletext::ole::doc::Package;
    ///
    /// let file = File::open("document.doc")?;
    /// let pkg = Package::from_reader(file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_with(reader, &ExtractOptions::default())
    }

    pub fn from_reader_with(reader: R, options: &ExtractOptions) -> Result<Self> {
        let ole = OleFile::open_with(reader, options)?;
        Self::from_ole_file(ole, options)
    }

    /// Create a Package from an already-parsed OLE file.
    ///
    /// Fails unless the container holds a `WordDocument` stream.
    pub fn from_ole_file(ole: OleFile<R>, options: &ExtractOptions) -> Result<Self> {
        if !ole.exists(WORD_DOCUMENT_STREAM, NameMatch::Exact) {
            return Err(DocError::StreamNotFound(WORD_DOCUMENT_STREAM.to_string()));
        }
        Ok(Self {
            ole,
            options: options.clone(),
        })
    }

    /// Read a required stream; names are matched case-sensitively.
    fn read_stream(&mut self, name: &str) -> Result<Bytes> {
        match self.ole.open_stream(name, NameMatch::Exact) {
            Ok(data) => Ok(data),
            Err(OleError::StreamNotFound(name)) => Err(DocError::StreamNotFound(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse the File Information Block.
    pub fn fib(&mut self) -> Result<FileInformationBlock> {
        let word_document = self.read_stream(WORD_DOCUMENT_STREAM)?;
        FileInformationBlock::parse(&word_document)
    }

    /// Extract the document text.
    ///
    /// Container, FIB and CLX failures abort the extraction. A piece that
    /// cannot be decoded is skipped and reported in the warnings.
    pub fn extract_text(&mut self) -> Result<Extraction> {
        let word_document = self.read_stream(WORD_DOCUMENT_STREAM)?;
        let fib = FileInformationBlock::parse(&word_document)?;
        if fib.is_encrypted() {
            return Err(DocError::Encrypted {
                obfuscated: fib.is_obfuscated(),
            });
        }

        let table = self.read_stream(fib.table_stream_name())?;
        let clx = Clx::parse(fib.clx_bytes(&table)?)?;
        log::debug!(
            "CLX: {} property runs, {} pieces, cp range {:?}",
            clx.property_runs.len(),
            clx.plc().piece_count(),
            clx.plc().cp_range()
        );

        let limit = self.options.doc_main_text_only.then(|| fib.ccp_text());
        let extractor = TextExtractor::new(&clx, &word_document, &self.options);
        Ok(extractor.extract(limit))
    }
}
