use super::super::consts::PPT_DOCUMENT_STREAM;
use super::super::{NameMatch, OleError, OleFile};
/// Package implementation for legacy PowerPoint presentations (.ppt).
use super::text::extract_text;
use crate::common::{ErrorKind, Extraction};
use crate::config::ExtractOptions;
use bytes::Bytes;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use thiserror::Error;

/// Error types for PPT file parsing.
#[derive(Debug, Error)]
pub enum PptError {
    /// OLE file error
    #[error("OLE error: {0}")]
    Ole(#[from] OleError),
    /// Stream not found
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
    /// A record runs past its container or the stream
    #[error("Record at {offset}: {reason}")]
    RecordBoundsViolation { offset: usize, reason: String },
    /// A text atom held malformed UTF-16
    #[error("Text atom at {offset} contained undecodable text")]
    TextDecodeFailure { offset: usize },
}

impl PptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PptError::Ole(e) => e.kind(),
            PptError::StreamNotFound(_) => ErrorKind::StreamNotFound,
            PptError::RecordBoundsViolation { .. } => ErrorKind::RecordBoundsViolation,
            PptError::TextDecodeFailure { .. } => ErrorKind::TextDecodeFailure,
        }
    }
}

/// Result type for PPT operations.
pub type Result<T> = std::result::Result<T, PptError>;

/// A PowerPoint (.ppt) package.
///
/// This is the main entry point for working with legacy PowerPoint presentations.
/// It wraps an OLE file and locates the `PowerPoint Document` stream.
///
/// # Examples
///
/// ```rust,no_run
/// use oletext::ppt::Package;
///
/// let mut pkg = Package::open("presentation.ppt")?;
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
    /// Open a .ppt package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &ExtractOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Self> {
        let file = File::open(path).map_err(OleError::from)?;
        Package::from_reader_with(file, options)
    }
}

impl<R: Read + Seek> Package<R> {
    /// Create a Package from any reader that implements Read + Seek.
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_with(reader, &ExtractOptions::default())
    }

    pub fn from_reader_with(reader: R, options: &ExtractOptions) -> Result<Self> {
        let ole = OleFile::open_with(reader, options)?;
        Self::from_ole_file(ole, options)
    }

    /// Create a Package from an already-parsed OLE file.
    ///
    /// The document stream is matched case-insensitively by substring, so
    /// `PowerPoint Document` and vendor variants of the name are accepted.
    pub fn from_ole_file(ole: OleFile<R>, options: &ExtractOptions) -> Result<Self> {
        if !ole.exists(PPT_DOCUMENT_STREAM, NameMatch::ContainsIgnoreCase) {
            return Err(PptError::StreamNotFound("PowerPoint Document".to_string()));
        }
        Ok(Self {
            ole,
            options: options.clone(),
        })
    }

    /// Raw bytes of the PowerPoint Document stream.
    pub fn document_stream(&mut self) -> Result<Bytes> {
        match self.ole.open_stream(PPT_DOCUMENT_STREAM, NameMatch::ContainsIgnoreCase) {
            Ok(data) => Ok(data),
            Err(OleError::StreamNotFound(name)) => Err(PptError::StreamNotFound(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Extract the text of every text atom in the record tree.
    pub fn extract_text(&mut self) -> Result<Extraction> {
        let stream = self.document_stream()?;
        log::debug!("PowerPoint Document stream: {} bytes", stream.len());
        Ok(extract_text(&stream, &self.options))
    }

    /// Get the underlying OLE file.
    #[inline]
    pub fn ole_file(&mut self) -> &mut OleFile<R> {
        &mut self.ole
    }
}
