/// Magic bytes that should be at the beginning of every OLE file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 512;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Longest valid directory entry name, in bytes, including the terminator
pub const MAX_NAME_LEN: usize = 64;

/// Sector size for version 3 (512 bytes)
pub const SECTOR_SIZE_V3: usize = 512;

/// Sector size for version 4 (4096 bytes)
pub const SECTOR_SIZE_V4: usize = 4096;

/// Mini sector size; fixed for every known version
pub const MINI_SECTOR_SIZE: usize = 64;

/// Usual mini stream cutoff
pub const DEFAULT_MINI_STREAM_CUTOFF: u32 = 4096;

/// Number of DIFAT entries stored in the header
pub const HEADER_DIFAT_ENTRIES: usize = 109;

// Sector IDs (from AAF specifications)
/// Maximum regular sector ID
pub const MAXREGSECT: u32 = 0xFFFFFFFA; // -6
/// Denotes a DIFAT sector in a FAT
pub const DIFSECT: u32 = 0xFFFFFFFC; // -4
/// Denotes a FAT sector in a FAT
pub const FATSECT: u32 = 0xFFFFFFFD; // -3
/// End of a virtual stream chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE; // -2
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF; // -1

/// Unallocated directory entry
pub const NOSTREAM: u32 = 0xFFFFFFFF; // -1

// Object types in storage (from AAF specifications)
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

// Well-known stream names
/// Main Word stream; matched exactly
pub const WORD_DOCUMENT_STREAM: &str = "WordDocument";
/// Word table stream when `fWhichTblStm` is clear
pub const TABLE0_STREAM: &str = "0Table";
/// Word table stream when `fWhichTblStm` is set
pub const TABLE1_STREAM: &str = "1Table";
/// PowerPoint main stream; matched by case-insensitive containment
pub const PPT_DOCUMENT_STREAM: &str = "powerpoint document";
/// BIFF8 workbook stream
pub const WORKBOOK_STREAM: &str = "Workbook";
/// BIFF5 workbook stream
pub const BOOK_STREAM: &str = "Book";

// PowerPoint Binary File Format (MS-PPT) constants

/// PPT record types the text walker cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum PptRecordType {
    /// Unknown record type
    Unknown = 0,
    /// Document record
    Document = 1000,
    /// Slide record
    Slide = 1006,
    /// Notes record
    Notes = 1008,
    /// Main master record
    MainMaster = 1016,
    /// Unicode text
    TextCharsAtom = 4000,
    /// Text atom, read as UTF-16LE like the others
    TextBytesAtom = 4008,
    /// Null-terminated Unicode string
    CString = 4026,
    /// Slide list with text record
    SlideListWithText = 4080,
}

impl From<u16> for PptRecordType {
    fn from(value: u16) -> Self {
        match value {
            1000 => PptRecordType::Document,
            1006 => PptRecordType::Slide,
            1008 => PptRecordType::Notes,
            1016 => PptRecordType::MainMaster,
            4000 => PptRecordType::TextCharsAtom,
            4008 => PptRecordType::TextBytesAtom,
            4026 => PptRecordType::CString,
            4080 => PptRecordType::SlideListWithText,
            _ => PptRecordType::Unknown,
        }
    }
}

impl PptRecordType {
    /// Whether records of this type carry extractable text.
    #[inline]
    pub fn is_text_atom(self) -> bool {
        matches!(
            self,
            PptRecordType::TextCharsAtom | PptRecordType::TextBytesAtom | PptRecordType::CString
        )
    }
}

// BIFF record types carrying cell text
/// Label record (inline string)
pub const BIFF_LABEL: u16 = 0x0204;
/// LabelSst record (shared string reference)
pub const BIFF_LABEL_SST: u16 = 0x00FD;
