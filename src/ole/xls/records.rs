//! BIFF record parsing for XLS files
//!
//! A workbook stream is a flat sequence of records, each a 4-byte header
//! (type, length) followed by its payload. This module iterates records
//! over an in-memory stream and decodes the few payloads that carry cell
//! text: BOF, CodePage, SST/CONTINUE, Label and LabelSst.

use crate::common::binary::{ByteCursor, read_u16_le, read_u32_le};
use crate::common::encoding::{DecodedText, decode_codepage};
use crate::ole::xls::error::{XlsError, XlsResult};
use encoding_rs::Encoding;

/// Size of a BIFF record header.
pub const RECORD_HEADER_SIZE: usize = 4;

pub const BOF: u16 = 0x0809;
pub const CODEPAGE: u16 = 0x0042;
pub const SST: u16 = 0x00FC;
pub const CONTINUE: u16 = 0x003C;

/// Offset of the string data in Label and LabelSst (row, col, ixfe).
const CELL_HEADER_SIZE: usize = 6;

/// BIFF record header (4 bytes: type + length)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: u16,
    pub data_len: u16,
}

/// A BIFF record borrowed from the stream.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Offset of the header in the stream
    pub offset: usize,
    pub header: RecordHeader,
    pub data: &'a [u8],
}

impl Record<'_> {
    fn invalid(&self, message: impl Into<String>) -> XlsError {
        XlsError::InvalidRecord {
            offset: self.offset,
            record_type: self.header.record_type,
            message: message.into(),
        }
    }
}

/// Iterator over BIFF records in a stream
///
/// Stops when fewer than four bytes remain. A record whose payload runs past
/// the end of the stream is yielded once as an error and ends the iteration.
pub struct RecordIter<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> RecordIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = XlsResult<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.data.len() - self.pos < RECORD_HEADER_SIZE {
            return None;
        }

        let offset = self.pos;
        let mut cursor = ByteCursor::at(self.data, offset);
        let header = match (cursor.read_u16(), cursor.read_u16()) {
            (Ok(record_type), Ok(data_len)) => RecordHeader {
                record_type,
                data_len,
            },
            _ => return None,
        };

        match cursor.take(usize::from(header.data_len)) {
            Ok(data) => {
                self.pos = cursor.position();
                Some(Ok(Record {
                    offset,
                    header,
                    data,
                }))
            },
            Err(_) => {
                self.done = true;
                Some(Err(XlsError::RecordBoundsViolation {
                    offset,
                    record_type: header.record_type,
                    length: usize::from(header.data_len),
                    available: self.data.len() - offset - RECORD_HEADER_SIZE,
                }))
            },
        }
    }
}

/// BIFF versions announced by a `0x0809` BOF record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiffVersion {
    Biff5 = 0x0500,
    Biff8 = 0x0600,
}

impl BiffVersion {
    pub fn from_bof_version(version: u16) -> Option<Self> {
        match version {
            0x0500 => Some(BiffVersion::Biff5),
            0x0600 => Some(BiffVersion::Biff8),
            _ => None,
        }
    }

    /// BIFF8 stores strings as (possibly compressed) UTF-16; earlier
    /// versions use the workbook code page.
    pub fn supports_unicode(&self) -> bool {
        matches!(self, BiffVersion::Biff8)
    }
}

/// BIFF version announced by a BOF record, if recognized.
pub fn parse_bof(record: &Record<'_>) -> Option<BiffVersion> {
    read_u16_le(record.data, 0)
        .ok()
        .and_then(BiffVersion::from_bof_version)
}

/// Code page announced by a CodePage record.
pub fn parse_codepage(record: &Record<'_>) -> Option<u16> {
    read_u16_le(record.data, 0).ok()
}

/// Text of a Label record.
///
/// BIFF8 holds an XLUnicodeString after the cell header; earlier versions
/// hold a 16-bit length and code page bytes.
pub fn parse_label(
    record: &Record<'_>,
    version: BiffVersion,
    encoding: &'static Encoding,
) -> XlsResult<DecodedText> {
    let mut cursor = ByteCursor::at(record.data, CELL_HEADER_SIZE);
    let cch = cursor
        .read_u16()
        .map_err(|_| record.invalid("missing string length"))? as usize;

    if !version.supports_unicode() {
        let bytes = cursor.take(cch).map_err(|e| record.invalid(e.to_string()))?;
        return Ok(decode_codepage(bytes, encoding));
    }

    let flags = cursor
        .read_u8()
        .map_err(|_| record.invalid("missing string flags"))?;
    let width = if flags & 0x01 != 0 { 2 } else { 1 };
    let bytes = cursor
        .take(cch * width)
        .map_err(|e| record.invalid(e.to_string()))?;
    let mut units = UnitDecoder::default();
    units.push(bytes, width == 2);
    Ok(units.finish())
}

/// Shared string table index of a LabelSst record.
pub fn parse_label_sst(record: &Record<'_>) -> XlsResult<u32> {
    read_u32_le(record.data, CELL_HEADER_SIZE).map_err(|_| record.invalid("missing SST index"))
}

/// Accumulates UTF-16 code units from compressed (one byte per unit) and
/// uncompressed runs.
#[derive(Default)]
struct UnitDecoder {
    units: Vec<u16>,
}

impl UnitDecoder {
    fn push(&mut self, bytes: &[u8], high_byte: bool) {
        if high_byte {
            self.units.extend(
                bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
            );
        } else {
            self.units.extend(bytes.iter().map(|&b| u16::from(b)));
        }
    }

    fn finish(self) -> DecodedText {
        let mut had_errors = false;
        let text = char::decode_utf16(self.units.iter().copied())
            .map(|r| {
                r.unwrap_or_else(|_| {
                    had_errors = true;
                    char::REPLACEMENT_CHARACTER
                })
            })
            .collect();
        DecodedText { text, had_errors }
    }
}

/// Reader over an SST payload and the CONTINUE payloads that follow it.
///
/// Character data may be split across records; each continuation of a
/// string starts with a fresh flags byte selecting the width of the rest.
struct SegmentReader<'a> {
    segments: &'a [&'a [u8]],
    index: usize,
    pos: usize,
}

impl<'a> SegmentReader<'a> {
    fn new(segments: &'a [&'a [u8]]) -> Self {
        Self {
            segments,
            index: 0,
            pos: 0,
        }
    }

    /// Bytes left in the current segment, moving past exhausted segments.
    fn current(&mut self) -> Option<&'a [u8]> {
        let segments: &'a [&'a [u8]] = self.segments;
        loop {
            let segment: &'a [u8] = segments.get(self.index)?;
            if self.pos < segment.len() {
                return Some(&segment[self.pos..]);
            }
            self.index += 1;
            self.pos = 0;
        }
    }

    /// Whether the current segment is used up.
    fn at_boundary(&self) -> bool {
        self.segments
            .get(self.index)
            .is_none_or(|segment| self.pos >= segment.len())
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut out = [0u8; N];
        for byte in out.iter_mut() {
            *byte = *self.current()?.first()?;
            self.pos += 1;
        }
        Some(out)
    }

    fn skip(&mut self, mut len: usize) -> Option<()> {
        while len > 0 {
            let n = self.current()?.len().min(len);
            self.pos += n;
            len -= n;
        }
        Some(())
    }

    /// Read `cch` characters, starting at the given width.
    fn read_chars(&mut self, cch: usize, mut high_byte: bool) -> Option<DecodedText> {
        let mut decoder = UnitDecoder::default();
        let mut remaining = cch;

        while remaining > 0 {
            if self.at_boundary() {
                let [flags] = self.read_array::<1>()?;
                high_byte = flags & 0x01 != 0;
            }

            let width = if high_byte { 2 } else { 1 };
            let available = self.current()?;
            let n = (available.len() / width).min(remaining);
            if n == 0 {
                return None;
            }
            decoder.push(&available[..n * width], high_byte);
            self.pos += n * width;
            remaining -= n;
        }
        Some(decoder.finish())
    }
}

/// SST (Shared String Table) record
#[derive(Debug, Clone, Default)]
pub struct SharedStringTable {
    pub strings: Vec<String>,
    /// Whether any string needed replacement characters
    pub had_errors: bool,
}

impl SharedStringTable {
    /// Parse the SST payload followed by its CONTINUE payloads.
    ///
    /// Parsing stops quietly at the first string that runs out of data;
    /// the strings read so far are kept.
    pub fn parse(segments: &[&[u8]]) -> Self {
        let mut reader = SegmentReader::new(segments);
        let mut table = SharedStringTable::default();

        let Some(header) = reader.read_array::<8>() else {
            return table;
        };
        let cst_unique = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        table.strings.reserve(cst_unique.min(65_536));

        for _ in 0..cst_unique {
            match Self::read_string(&mut reader) {
                Some(decoded) => {
                    table.had_errors |= decoded.had_errors;
                    table.strings.push(decoded.text);
                },
                None => {
                    log::debug!(
                        "SST ended after {} of {} strings",
                        table.strings.len(),
                        cst_unique
                    );
                    break;
                },
            }
        }
        table
    }

    /// XLUnicodeRichExtendedString: cch, flags, optional run count and
    /// extension size, characters, then the runs and extension data.
    fn read_string(reader: &mut SegmentReader<'_>) -> Option<DecodedText> {
        let cch = usize::from(u16::from_le_bytes(reader.read_array::<2>()?));
        let [flags] = reader.read_array::<1>()?;

        let runs = if flags & 0x08 != 0 {
            usize::from(u16::from_le_bytes(reader.read_array::<2>()?))
        } else {
            0
        };
        let ext = if flags & 0x04 != 0 {
            u32::from_le_bytes(reader.read_array::<4>()?) as usize
        } else {
            0
        };

        let text = reader.read_chars(cch, flags & 0x01 != 0)?;
        reader.skip(runs * 4)?;
        reader.skip(ext)?;
        Some(text)
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
