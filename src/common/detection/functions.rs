//! Core file format detection functions.

use std::fs::File;
use std::path::Path;

use super::ole2;
use super::types::FileFormat;

/// Detect a format from the file extension alone.
///
/// # Examples
///
/// ```rust
/// use oletext::common::{FileFormat, detect_format_from_path};
///
/// assert_eq!(detect_format_from_path("report.XLS"), FileFormat::Xls);
/// assert_eq!(detect_format_from_path("notes"), FileFormat::Unknown);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> FileFormat {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(FileFormat::from_extension)
        .unwrap_or(FileFormat::Unknown)
}

/// Detect file format from a file path.
///
/// The extension decides when it is known. Otherwise the file is opened and
/// sniffed as a compound file. Unreadable or unrecognised files are
/// [`FileFormat::Unknown`].
///
/// # Examples
///
/// ```rust,no_run
/// use oletext::common::detect_file_format;
///
/// let format = detect_file_format("attachment.bin");
/// println!("Detected format: {format}");
/// ```
pub fn detect_file_format<P: AsRef<Path>>(path: P) -> FileFormat {
    let path = path.as_ref();
    let by_extension = detect_format_from_path(path);
    if by_extension != FileFormat::Unknown {
        return by_extension;
    }

    match File::open(path) {
        Ok(file) => ole2::detect_ole2_format_from_reader(file).unwrap_or(FileFormat::Unknown),
        Err(e) => {
            log::debug!("Cannot sniff {}: {e}", path.display());
            FileFormat::Unknown
        },
    }
}
