//! Workbook text extraction for XLS files

use crate::common::Extraction;
use crate::common::encoding::{codepage_to_encoding, decode_utf16le, legacy_encoding};
use crate::config::ExtractOptions;
use crate::ole::consts::{BIFF_LABEL, BIFF_LABEL_SST, BOOK_STREAM, WORKBOOK_STREAM};
use crate::ole::xls::error::{XlsError, XlsResult};
use crate::ole::xls::records::{
    BOF, BiffVersion, CODEPAGE, CONTINUE, RecordIter, SST, SharedStringTable, parse_bof,
    parse_codepage, parse_label, parse_label_sst,
};
use crate::ole::{NameMatch, OleError, OleFile};
use bytes::Bytes;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// An XLS workbook opened for text extraction.
///
/// # Examples
///
/// ```rust,no_run
/// use oletext::xls::XlsWorkbook;
///
/// let mut workbook = XlsWorkbook::open("book.xls")?;
/// let extraction = workbook.extract_text()?;
/// println!("{}", extraction.text);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct XlsWorkbook<R: Read + Seek = File> {
    ole_file: OleFile<R>,
    options: ExtractOptions,
}

impl XlsWorkbook<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> XlsResult<Self> {
        Self::open_with(path, &ExtractOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> XlsResult<Self> {
        let file = File::open(path).map_err(OleError::from)?;
        XlsWorkbook::from_reader_with(file, options)
    }
}

impl<R: Read + Seek> XlsWorkbook<R> {
    /// Open an XLS workbook from a reader
    pub fn from_reader(reader: R) -> XlsResult<Self> {
        Self::from_reader_with(reader, &ExtractOptions::default())
    }

    pub fn from_reader_with(reader: R, options: &ExtractOptions) -> XlsResult<Self> {
        let ole_file = OleFile::open_with(reader, options)?;
        Self::from_ole_file(ole_file, options)
    }

    /// Wrap an already-parsed OLE file holding a `Workbook` (BIFF8) or
    /// `Book` (BIFF5) stream.
    pub fn from_ole_file(ole_file: OleFile<R>, options: &ExtractOptions) -> XlsResult<Self> {
        if !ole_file.exists(WORKBOOK_STREAM, NameMatch::IgnoreCase)
            && !ole_file.exists(BOOK_STREAM, NameMatch::IgnoreCase)
        {
            return Err(XlsError::StreamNotFound(WORKBOOK_STREAM.to_string()));
        }
        Ok(Self {
            ole_file,
            options: options.clone(),
        })
    }

    /// Raw bytes of the workbook stream.
    pub fn workbook_stream(&mut self) -> XlsResult<Bytes> {
        let name = if self.ole_file.exists(WORKBOOK_STREAM, NameMatch::IgnoreCase) {
            WORKBOOK_STREAM
        } else {
            BOOK_STREAM
        };
        match self.ole_file.open_stream(name, NameMatch::IgnoreCase) {
            Ok(data) => Ok(data),
            Err(OleError::StreamNotFound(name)) => Err(XlsError::StreamNotFound(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Extract the text of every string cell, one per line.
    pub fn extract_text(&mut self) -> XlsResult<Extraction> {
        let stream = self.workbook_stream()?;
        log::debug!("Workbook stream: {} bytes", stream.len());
        Ok(scan_text(&stream, &self.options))
    }
}

/// Append one cell's text, trimmed, followed by a newline.
fn push_cell(out: &mut Extraction, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        out.push_str(text);
        out.push_str("\n");
    }
}

/// Scan a workbook stream for string cells.
///
/// Every `0x0204` and `0x00FD` record is a cell. By default its whole payload
/// is decoded as UTF-16LE; with [`ExtractOptions::xls_structured_cells`] the
/// records are decoded by their BIFF8 layout instead. A record that runs past
/// the end of the stream ends the scan with a warning.
pub fn scan_text(stream: &[u8], options: &ExtractOptions) -> Extraction {
    if options.xls_structured_cells {
        scan_structured_cells(stream, options)
    } else {
        scan_raw_cells(stream)
    }
}

/// Decode each cell record's payload as UTF-16LE. A trailing odd byte is
/// dropped.
fn scan_raw_cells(stream: &[u8]) -> Extraction {
    let mut out = Extraction::new();

    for item in RecordIter::new(stream) {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                out.warn(e);
                break;
            },
        };
        if !matches!(record.header.record_type, BIFF_LABEL | BIFF_LABEL_SST) {
            continue;
        }

        let even = record.data.len() & !1;
        let decoded = decode_utf16le(&record.data[..even]);
        if decoded.had_errors {
            out.warn(XlsError::TextDecodeFailure {
                offset: record.offset,
            });
        }
        push_cell(&mut out, &decoded.text);
    }

    out
}

/// Label records carry their text inline; LabelSst records index the shared
/// string table, which precedes them in the stream. A cell that cannot be
/// decoded is skipped with a warning.
fn scan_structured_cells(stream: &[u8], options: &ExtractOptions) -> Extraction {
    let mut out = Extraction::new();
    let mut version = BiffVersion::Biff8;
    let mut encoding = legacy_encoding(options.legacy_codepage);
    let mut sst = SharedStringTable::default();
    let mut pending_sst: Option<(usize, Vec<&[u8]>)> = None;

    for item in RecordIter::new(stream) {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                out.warn(e);
                break;
            },
        };
        let record_type = record.header.record_type;

        if record_type == CONTINUE {
            if let Some((_, segments)) = pending_sst.as_mut() {
                segments.push(record.data);
            }
            continue;
        }
        if let Some((offset, segments)) = pending_sst.take() {
            sst = SharedStringTable::parse(&segments);
            log::debug!("SST at {offset}: {} strings", sst.len());
            if sst.had_errors {
                out.warn(XlsError::TextDecodeFailure { offset });
            }
        }

        match record_type {
            BOF => {
                if let Some(v) = parse_bof(&record) {
                    version = v;
                }
            },
            CODEPAGE => {
                if let Some(enc) = parse_codepage(&record)
                    .and_then(|cp| codepage_to_encoding(u32::from(cp)))
                {
                    encoding = enc;
                }
            },
            SST => pending_sst = Some((record.offset, vec![record.data])),
            BIFF_LABEL => match parse_label(&record, version, encoding) {
                Ok(decoded) => {
                    if decoded.had_errors {
                        out.warn(XlsError::TextDecodeFailure {
                            offset: record.offset,
                        });
                    }
                    push_cell(&mut out, &decoded.text);
                },
                Err(e) => out.warn(e),
            },
            BIFF_LABEL_SST => match parse_label_sst(&record) {
                Ok(index) => match sst.get(index) {
                    Some(text) => push_cell(&mut out, text),
                    None => out.warn(XlsError::SstIndexOutOfRange {
                        offset: record.offset,
                        index,
                        len: sst.len(),
                    }),
                },
                Err(e) => out.warn(e),
            },
            _ => {},
        }
    }

    out
}
