/// PowerPoint (.ppt) presentation support.
///
/// This module extracts the text of Microsoft PowerPoint presentations in
/// the legacy binary format (.ppt files), which uses OLE2 structured storage.
///
/// # PPT File Structure
///
/// The **PowerPoint Document** stream is a tree of records. Each record has
/// an 8-byte header; containers nest further records and atoms carry data.
/// Text lives in three atom types, all read as UTF-16LE:
/// - `TextCharsAtom`: slide and notes text
/// - `TextBytesAtom`: slide and notes text
/// - `CString`: names and labels
///
/// # Example
///
/// ```rust,no_run
/// use oletext::ppt::Package;
///
/// let mut package = Package::open("presentation.ppt")?;
/// let extraction = package.extract_text()?;
/// println!("Presentation text: {}", extraction.text);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod package;
pub mod records;
pub mod text;

pub use package::{Package, PptError};
pub use records::{RecordHeader, RecordVisitor, RecordWalker};
