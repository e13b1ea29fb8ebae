/// Word (.doc) document support.
///
/// This module extracts the text of Microsoft Word documents in the legacy
/// binary format (.doc files), which uses OLE2 structured storage.
///
/// # DOC File Structure
///
/// A .doc file is an OLE2 structured storage containing several streams:
/// - **WordDocument**: Main document stream containing the FIB and text
/// - **1Table** or **0Table**: Contains the piece table (CLX) among other
///   structures; the FIB selects which one is live
///
/// Text is reassembled from the piece table: each piece maps a range of
/// character positions to a run of bytes in the WordDocument stream, either
/// UTF-16LE or one byte per character in a legacy code page.
///
/// # Example
///
/// ```rust,no_run
/// use oletext::doc::Package;
///
/// let mut package = Package::open("document.doc")?;
/// let extraction = package.extract_text()?;
/// println!("Document text: {}", extraction.text);
/// for warning in &extraction.warnings {
///     eprintln!("skipped: {warning}");
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod package;
pub mod parts;

pub use package::{DocError, Package};
pub use parts::fib::FileInformationBlock;
pub use parts::piece_table::{Clx, Pcd, PlcPcd, Prc};
