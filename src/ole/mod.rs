/// Constants for OLE file format
pub mod consts;

/// Fixed 512-byte header
pub mod header;

/// FAT / MiniFAT tables and the chain walker
pub mod fat;

/// Directory entries and stream lookup
pub mod directory;

/// Sector reads over the byte source
pub mod sector;

/// Main OLE file parsing implementation
mod file;

/// Legacy Word document (.doc) text extraction
///
/// Decodes the File Information Block and the CLX piece table, then
/// reassembles the logical document text piece by piece.
pub mod doc;

/// Legacy PowerPoint presentation (.ppt) text extraction
///
/// Walks the record tree of the `PowerPoint Document` stream and collects
/// the text atoms.
pub mod ppt;

/// Legacy Excel workbook (.xls) text extraction
pub mod xls;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export public types for convenient access
pub use directory::{Directory, DirectoryEntry, EntryKind, NameMatch};
pub use fat::{AllocationTable, Chain};
pub use file::{OleError, OleFile, is_ole_file};
pub use header::Header;
pub use sector::SectorStore;
