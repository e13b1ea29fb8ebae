//! OLE2 format detection (legacy Office documents).

use std::io::{Read, Seek};

use crate::common::detection::FileFormat;
use crate::ole::consts::{
    BOOK_STREAM, PPT_DOCUMENT_STREAM, WORD_DOCUMENT_STREAM, WORKBOOK_STREAM,
};
use crate::ole::{NameMatch, OleFile};

/// Detect OLE2-based formats from a reader.
///
/// Opens the compound file and checks for the main stream of each format,
/// using the same name matching the decoders use. Returns `None` when the
/// reader is not a compound file or holds none of the known streams.
pub fn detect_ole2_format_from_reader<R: Read + Seek>(reader: R) -> Option<FileFormat> {
    let ole = match OleFile::open(reader) {
        Ok(ole) => ole,
        Err(e) => {
            log::debug!("Not an OLE2 container: {e}");
            return None;
        },
    };

    if ole.exists(WORD_DOCUMENT_STREAM, NameMatch::Exact) {
        return Some(FileFormat::Doc);
    }

    if ole.exists(PPT_DOCUMENT_STREAM, NameMatch::ContainsIgnoreCase) {
        return Some(FileFormat::Ppt);
    }

    if ole.exists(WORKBOOK_STREAM, NameMatch::IgnoreCase)
        || ole.exists(BOOK_STREAM, NameMatch::IgnoreCase)
    {
        return Some(FileFormat::Xls);
    }

    None
}
