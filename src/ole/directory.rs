//! Directory entries and well-known stream lookup.

use super::consts::*;
use super::file::OleError;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw OLE directory entry structure (128 bytes)
///
/// This represents the on-disk format of a directory entry.
#[allow(dead_code)]
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    /// Creation time (FILETIME)
    creation_time: U64<LE>,
    /// Modified time (FILETIME)
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// Kind of directory object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Unknown,
    Storage,
    Stream,
    RootStorage,
}

impl From<u8> for EntryKind {
    fn from(value: u8) -> Self {
        match value {
            STGTY_STORAGE => EntryKind::Storage,
            STGTY_STREAM => EntryKind::Stream,
            STGTY_ROOT => EntryKind::RootStorage,
            _ => EntryKind::Unknown,
        }
    }
}

/// Represents an OLE directory entry (stream or storage)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Storage ID (index in directory)
    pub sid: u32,
    /// Entry name (UTF-16 decoded to UTF-8)
    pub name: String,
    pub kind: EntryKind,
    /// Index of left sibling in red-black tree
    pub sid_left: u32,
    /// Index of right sibling in red-black tree
    pub sid_right: u32,
    /// Index of child node in red-black tree
    pub sid_child: u32,
    /// First sector of the stream
    pub start_sector: u32,
    /// Size of the stream in bytes
    pub stream_size: u64,
}

impl DirectoryEntry {
    #[inline]
    pub fn is_stream(&self) -> bool {
        self.kind == EntryKind::Stream
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.kind == EntryKind::RootStorage
    }
}

/// How a stream name is compared during lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Byte-for-byte equal
    Exact,
    /// Equal ignoring case
    IgnoreCase,
    /// The entry name contains the needle, ignoring case
    ContainsIgnoreCase,
}

impl NameMatch {
    fn matches(self, name: &str, needle: &str) -> bool {
        match self {
            NameMatch::Exact => name == needle,
            NameMatch::IgnoreCase => name.to_lowercase() == needle.to_lowercase(),
            NameMatch::ContainsIgnoreCase => name.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

/// Parsed directory: every used entry in on-disk order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// Parse up to `entry_count` entries from the directory stream bytes.
    ///
    /// Slots with a zero name length are unused and skipped. A name length
    /// above 64 bytes marks the end of the usable directory; everything read
    /// before it is kept.
    pub fn parse(bytes: &[u8], entry_count: usize, major_version: u16) -> Result<Self, OleError> {
        let mut entries = Vec::new();

        for (sid, chunk) in bytes.chunks_exact(DIRENTRY_SIZE).take(entry_count).enumerate() {
            let Ok(raw) = RawDirectoryEntry::read_from_bytes(chunk) else {
                break;
            };

            let name_len = raw.name_len.get() as usize;
            if name_len > MAX_NAME_LEN {
                log::debug!("Directory entry {sid} has name length {name_len}, stopping");
                break;
            }
            if name_len == 0 {
                continue;
            }

            // Version 3 files only define the low 32 bits of the size.
            let stream_size = if major_version == 3 {
                raw.stream_size.get() & 0xFFFF_FFFF
            } else {
                raw.stream_size.get()
            };

            let entry = DirectoryEntry {
                sid: sid as u32,
                name: decode_name(&raw.name[..name_len]),
                kind: EntryKind::from(raw.entry_type),
                sid_left: raw.sid_left.get(),
                sid_right: raw.sid_right.get(),
                sid_child: raw.sid_child.get(),
                start_sector: raw.start_sector.get(),
                stream_size,
            };
            log::trace!(
                "Directory entry {}: {:?} {:?} start={} size={}",
                entry.sid,
                entry.name,
                entry.kind,
                entry.start_sector,
                entry.stream_size
            );
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(OleError::NoDirectoryEntries);
        }
        Ok(Self { entries })
    }

    #[inline]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The root storage entry, which owns the mini stream.
    pub fn root(&self) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.is_root())
    }

    /// First stream entry whose name matches.
    pub fn find_stream(&self, name: &str, mode: NameMatch) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_stream())
            .find(|e| mode.matches(&e.name, name))
    }

    /// Names of all stream entries.
    pub fn stream_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.is_stream())
            .map(|e| e.name.as_str())
    }
}

/// Decode a UTF-16LE entry name, dropping the terminator.
fn decode_name(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}
