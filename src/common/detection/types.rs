//! File format type enumeration.

use std::fmt;

/// Formats the extractor knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Microsoft Word Document (OLE2 format, .doc)
    Doc,
    /// Microsoft PowerPoint Presentation (OLE2 format, .ppt)
    Ppt,
    /// Microsoft Excel Spreadsheet (OLE2 format, .xls)
    Xls,
    /// Anything else; handled by the pass-through parser
    Unknown,
}

impl FileFormat {
    /// Map a file extension (without the dot, any case) to a format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oletext::common::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_extension("DOC"), FileFormat::Doc);
    /// assert_eq!(FileFormat::from_extension("pps"), FileFormat::Ppt);
    /// assert_eq!(FileFormat::from_extension("docx"), FileFormat::Unknown);
    /// ```
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "doc" | "dot" => FileFormat::Doc,
            "ppt" | "pps" | "pot" => FileFormat::Ppt,
            "xls" | "xlt" => FileFormat::Xls,
            _ => FileFormat::Unknown,
        }
    }

    /// Canonical extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Doc => "doc",
            FileFormat::Ppt => "ppt",
            FileFormat::Xls => "xls",
            FileFormat::Unknown => "",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Unknown => f.write_str("unknown"),
            other => f.write_str(other.extension()),
        }
    }
}
