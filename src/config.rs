//! Extraction options.
//!
//! One [`ExtractOptions`] value is built by the caller and passed by reference
//! into every entry point; nothing is read from global state.

use crate::common::encoding::DEFAULT_LEGACY_CODEPAGE;

/// Configuration options for text extraction.
///
/// # Examples
///
/// ```rust
/// use oletext::ExtractOptions;
///
/// // Create with defaults
/// let options = ExtractOptions::default();
/// assert_eq!(options.legacy_codepage, 936);
///
/// // Or customize
/// let options = ExtractOptions::new()
///     .with_legacy_codepage(1252)
///     .with_max_record_depth(16)
///     .with_ppt_atom_separator(" ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Windows code page for compressed (one byte per character) Word pieces
    pub legacy_codepage: u32,
    /// Read streams below the mini stream cutoff through the MiniFAT
    pub use_mini_stream: bool,
    /// Deepest PowerPoint container nesting that is still decoded
    pub max_record_depth: usize,
    /// Appended after every PowerPoint text atom
    pub ppt_atom_separator: String,
    /// Stop the Word sweep after the main document story
    pub doc_main_text_only: bool,
    /// Decode XLS cell records structurally (Label strings, LabelSst through
    /// the shared string table) instead of as raw UTF-16LE payloads
    pub xls_structured_cells: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            legacy_codepage: DEFAULT_LEGACY_CODEPAGE,
            use_mini_stream: true,
            max_record_depth: 64,
            ppt_atom_separator: "\n".to_string(),
            doc_main_text_only: false,
            xls_structured_cells: false,
        }
    }
}

impl ExtractOptions {
    /// Create a new `ExtractOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the code page used for compressed Word pieces.
    ///
    /// Unknown code pages fall back to GBK (936).
    #[inline]
    pub fn with_legacy_codepage(mut self, codepage: u32) -> Self {
        self.legacy_codepage = codepage;
        self
    }

    /// Set whether small streams are read from the mini stream.
    ///
    /// Disabling this reads every stream through the regular FAT, which only
    /// works for files that do not use the mini stream for the main streams.
    #[inline]
    pub fn with_mini_stream(mut self, enabled: bool) -> Self {
        self.use_mini_stream = enabled;
        self
    }

    /// Set the PowerPoint container nesting limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oletext::ExtractOptions;
    ///
    /// let options = ExtractOptions::new().with_max_record_depth(8);
    /// assert_eq!(options.max_record_depth, 8);
    /// ```
    #[inline]
    pub fn with_max_record_depth(mut self, depth: usize) -> Self {
        self.max_record_depth = depth;
        self
    }

    /// Set the separator appended after each PowerPoint text atom.
    #[inline]
    pub fn with_ppt_atom_separator(mut self, separator: impl Into<String>) -> Self {
        self.ppt_atom_separator = separator.into();
        self
    }

    /// Limit Word extraction to the main document story (`ccpText`
    /// characters), leaving out footnotes, headers and other stories.
    #[inline]
    pub fn with_doc_main_text_only(mut self, enabled: bool) -> Self {
        self.doc_main_text_only = enabled;
        self
    }

    /// Decode XLS cells by their BIFF8 layout.
    ///
    /// By default the whole payload of every `0x0204` and `0x00FD` record is
    /// read as UTF-16LE. With this enabled, Label records are decoded as
    /// strings after their cell header and LabelSst records are resolved
    /// through the shared string table.
    #[inline]
    pub fn with_xls_structured_cells(mut self, enabled: bool) -> Self {
        self.xls_structured_cells = enabled;
        self
    }
}
