use std::io::{self, Read, Seek};

use super::consts::*;
use super::directory::{Directory, DirectoryEntry, NameMatch};
use super::fat::AllocationTable;
use super::header::Header;
use super::sector::SectorStore;
use crate::common::ErrorKind;
use crate::config::ExtractOptions;
use bytes::Bytes;
use fixedbitset::FixedBitSet;
use thiserror::Error;

/// Error types for OLE file parsing
#[derive(Debug, Error)]
pub enum OleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Not an OLE file: invalid signature")]
    InvalidSignature,
    #[error("Unsupported sector shift {shift}")]
    InvalidSectorSize { shift: u16 },
    #[error("Truncated header: {0} of 512 bytes")]
    TruncatedHeader(usize),
    #[error("Truncated allocation table: {0}")]
    TruncatedAllocationTable(String),
    #[error("Sector {sector} is outside the allocation table ({table_len} entries)")]
    DanglingSectorPointer { sector: u32, table_len: usize },
    #[error("Sector chain revisits sector {sector}")]
    CyclicChain { sector: u32 },
    #[error("Sector {sector} lies beyond the end of the file")]
    TruncatedSector { sector: u32 },
    #[error("Directory contains no entries")]
    NoDirectoryEntries,
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
}

impl OleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OleError::Io(_) => ErrorKind::Io,
            OleError::InvalidSignature => ErrorKind::InvalidSignature,
            OleError::InvalidSectorSize { .. } => ErrorKind::InvalidSectorSize,
            OleError::TruncatedHeader(_) => ErrorKind::TruncatedHeader,
            OleError::TruncatedAllocationTable(_) => ErrorKind::TruncatedAllocationTable,
            OleError::DanglingSectorPointer { .. } => ErrorKind::DanglingSectorPointer,
            OleError::CyclicChain { .. } => ErrorKind::CyclicChain,
            OleError::TruncatedSector { .. } => ErrorKind::TruncatedSector,
            OleError::NoDirectoryEntries => ErrorKind::NoDirectoryEntries,
            OleError::StreamNotFound(_) => ErrorKind::StreamNotFound,
        }
    }
}

/// Map a read failure while loading a table onto the table truncation error.
fn table_error(what: &str, err: OleError) -> OleError {
    match err {
        OleError::TruncatedSector { sector } => {
            OleError::TruncatedAllocationTable(format!(
                "{what} sector {sector} is past end of file"
            ))
        },
        OleError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            OleError::TruncatedAllocationTable(format!("{what}: {e}"))
        },
        other => other,
    }
}

/// Main OLE file parser structure
///
/// Owns the byte source for the duration of one parse. Opening reads the
/// header, the DIFAT, FAT, MiniFAT and directory; stream contents are read on
/// demand.
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
/// use oletext::ole::{NameMatch, OleFile};
///
/// let mut ole = OleFile::open(File::open("document.doc")?)?;
/// let word = ole.open_stream("WordDocument", NameMatch::Exact)?;
/// println!("WordDocument: {} bytes", word.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    store: SectorStore<R>,
    header: Header,
    /// Every FAT sector location, header entries first
    difat: Vec<u32>,
    fat: AllocationTable,
    minifat: AllocationTable,
    directory: Directory,
    /// Mini stream contents, loaded on first use
    ministream: Option<Bytes>,
    use_mini_stream: bool,
}

impl<R: Read + Seek> OleFile<R> {
    /// Open and parse an OLE file with default options.
    pub fn open(reader: R) -> Result<Self, OleError> {
        Self::open_with(reader, &ExtractOptions::default())
    }

    /// Open and parse an OLE file.
    pub fn open_with(reader: R, options: &ExtractOptions) -> Result<Self, OleError> {
        let mut store = SectorStore::new(reader, SECTOR_SIZE_V3)?;
        let header = store.read_header()?;

        let mut ole = OleFile {
            store,
            header,
            difat: Vec::new(),
            fat: AllocationTable::default(),
            minifat: AllocationTable::default(),
            directory: Directory::default(),
            ministream: None,
            use_mini_stream: options.use_mini_stream,
        };

        ole.difat = ole.load_difat()?;
        ole.fat = ole.load_fat()?;
        ole.minifat = ole.load_minifat()?;
        ole.directory = ole.load_directory()?;
        log::debug!(
            "Opened OLE file: {} bytes, {} FAT entries, {} MiniFAT entries, {} directory entries",
            ole.store.file_size(),
            ole.fat.len(),
            ole.minifat.len(),
            ole.directory.len()
        );
        Ok(ole)
    }

    /// Assemble the full list of FAT sector locations.
    ///
    /// The first 109 come from the header. Further ones live in a chain of
    /// DIFAT sectors, each holding `sector_size / 4 - 1` locations followed
    /// by the next DIFAT sector.
    fn load_difat(&mut self) -> Result<Vec<u32>, OleError> {
        let mut difat = self.header.difat.clone();
        if self.header.num_difat_sectors == 0 {
            return Ok(difat);
        }

        let per_sector = self.header.entries_per_sector() - 1;
        let mut visited = FixedBitSet::with_capacity(self.store.sector_count() as usize);
        let mut sector = self.header.first_difat_sector;

        for _ in 0..self.header.num_difat_sectors {
            if sector > MAXREGSECT {
                log::debug!("DIFAT chain ended early at 0x{sector:08X}");
                break;
            }
            let data = self
                .store
                .read_sector(sector)
                .map_err(|e| table_error("DIFAT", e))?;
            if data.len() < self.header.sector_size {
                return Err(OleError::TruncatedAllocationTable(format!(
                    "DIFAT sector {sector} is short"
                )));
            }
            // read_sector succeeded, so the index is inside the bitset
            if visited.contains(sector as usize) {
                return Err(OleError::CyclicChain { sector });
            }
            visited.insert(sector as usize);

            let pointers = crate::common::binary::u32_array_le(&data);
            difat.extend(
                pointers[..per_sector]
                    .iter()
                    .copied()
                    .filter(|&s| s <= MAXREGSECT),
            );
            sector = pointers[per_sector];
        }

        Ok(difat)
    }

    /// Read every FAT sector named by the DIFAT list, in order.
    fn load_fat(&mut self) -> Result<AllocationTable, OleError> {
        let sector_size = self.header.sector_size;
        if self.difat.len() != self.header.num_fat_sectors as usize {
            log::debug!(
                "Header declares {} FAT sectors, DIFAT lists {}",
                self.header.num_fat_sectors,
                self.difat.len()
            );
        }

        let mut bytes = Vec::with_capacity(self.difat.len() * sector_size);
        for &sector in &self.difat {
            let data = self
                .store
                .read_sector(sector)
                .map_err(|e| table_error("FAT", e))?;
            if data.len() < sector_size {
                return Err(OleError::TruncatedAllocationTable(format!(
                    "FAT sector {sector} is short"
                )));
            }
            bytes.extend_from_slice(&data);
        }
        Ok(AllocationTable::from_le_bytes(&bytes))
    }

    /// Read the MiniFAT as one contiguous run of sectors starting at
    /// `MiniFATStart`.
    fn load_minifat(&mut self) -> Result<AllocationTable, OleError> {
        let count = self.header.num_minifat_sectors;
        if count == 0 {
            return Ok(AllocationTable::default());
        }
        let len = u64::from(count) * self.header.sector_size as u64;
        let bytes = self
            .store
            .read_contiguous(self.header.first_minifat_sector, len)
            .map_err(|e| table_error("MiniFAT", e))?;
        Ok(AllocationTable::from_le_bytes(&bytes))
    }

    /// Read the directory stream through the FAT and parse its entries.
    fn load_directory(&mut self) -> Result<Directory, OleError> {
        let bytes = self
            .store
            .read_stream(self.header.first_dir_sector, u64::MAX, &self.fat)?;
        let available = bytes.len() / DIRENTRY_SIZE;
        let per_sector = self.header.sector_size / DIRENTRY_SIZE;

        let count = if self.header.major_version >= 4 {
            let declared = (self.header.num_dir_sectors as usize).saturating_add(1) * per_sector;
            declared.min(available)
        } else {
            available
        };
        Directory::parse(&bytes, count, self.header.major_version)
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        self.store.file_size()
    }

    #[inline]
    pub fn sector_size(&self) -> usize {
        self.header.sector_size
    }

    #[inline]
    pub fn mini_sector_size(&self) -> usize {
        self.header.mini_sector_size
    }

    #[inline]
    pub fn mini_stream_cutoff(&self) -> u32 {
        self.header.mini_stream_cutoff
    }

    /// FAT sector locations gathered from the header and DIFAT sectors.
    #[inline]
    pub fn difat(&self) -> &[u32] {
        &self.difat
    }

    #[inline]
    pub fn fat(&self) -> &AllocationTable {
        &self.fat
    }

    #[inline]
    pub fn minifat(&self) -> &AllocationTable {
        &self.minifat
    }

    #[inline]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Follow a chain in the regular FAT.
    pub fn read_stream(
        &mut self,
        start_sector: u32,
        declared_size: u64,
    ) -> Result<Bytes, OleError> {
        self.store.read_stream(start_sector, declared_size, &self.fat)
    }

    /// Follow a chain in the MiniFAT over the root entry's mini stream.
    pub fn read_mini_stream(
        &mut self,
        start_sector: u32,
        declared_size: u64,
    ) -> Result<Bytes, OleError> {
        let ministream = self.ministream()?;
        let mini_size = self.header.mini_sector_size;
        let mut data = Vec::with_capacity(declared_size.min(ministream.len() as u64) as usize);
        let mut remaining = declared_size;

        for sector in self.minifat.chain(start_sector) {
            if remaining == 0 {
                break;
            }
            let sector = sector?;
            let position = sector as usize * mini_size;
            if position >= ministream.len() {
                return Err(OleError::TruncatedSector { sector });
            }
            let end = (position + mini_size).min(ministream.len());
            let take = ((end - position) as u64).min(remaining) as usize;
            data.extend_from_slice(&ministream[position..position + take]);
            remaining -= take as u64;
        }

        if remaining > 0 {
            log::warn!(
                "Mini chain from sector {start_sector} ended after {} of {declared_size} bytes",
                data.len()
            );
        }
        Ok(Bytes::from(data))
    }

    fn ministream(&mut self) -> Result<Bytes, OleError> {
        if let Some(ref cached) = self.ministream {
            return Ok(cached.clone());
        }
        let root = self
            .directory
            .root()
            .ok_or_else(|| OleError::StreamNotFound("Root Entry".to_string()))?;
        let (start, size) = (root.start_sector, root.stream_size);
        let data = self.store.read_stream(start, size, &self.fat)?;
        self.ministream = Some(data.clone());
        Ok(data)
    }

    /// Whether an entry's contents live in the mini stream.
    fn is_mini(&self, entry: &DirectoryEntry) -> bool {
        self.use_mini_stream
            && entry.is_stream()
            && entry.stream_size < u64::from(self.header.mini_stream_cutoff)
    }

    /// Read the contents of a directory entry.
    pub fn read_entry(&mut self, entry: &DirectoryEntry) -> Result<Bytes, OleError> {
        if self.is_mini(entry) {
            self.read_mini_stream(entry.start_sector, entry.stream_size)
        } else {
            self.read_stream(entry.start_sector, entry.stream_size)
        }
    }

    /// Find a stream by name.
    pub fn find_stream(&self, name: &str, mode: NameMatch) -> Option<&DirectoryEntry> {
        self.directory.find_stream(name, mode)
    }

    /// Check if a stream exists
    pub fn exists(&self, name: &str, mode: NameMatch) -> bool {
        self.find_stream(name, mode).is_some()
    }

    /// Open a stream by name and return its contents.
    pub fn open_stream(&mut self, name: &str, mode: NameMatch) -> Result<Bytes, OleError> {
        let entry = self
            .find_stream(name, mode)
            .cloned()
            .ok_or_else(|| OleError::StreamNotFound(name.to_string()))?;
        log::debug!(
            "Reading stream {:?} ({} bytes from sector {})",
            entry.name,
            entry.stream_size,
            entry.start_sector
        );
        self.read_entry(&entry)
    }

    /// Names of all streams in directory order.
    pub fn list_streams(&self) -> Vec<String> {
        self.directory.stream_names().map(str::to_string).collect()
    }
}

/// Check if a buffer starts with the OLE signature.
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= HEADER_SIZE && &data[0..8] == MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::test_support::CfbBuilder;
    use std::io::Cursor;

    fn pattern(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed)).collect()
    }

    #[test]
    fn test_open_and_read_regular_streams() {
        let word = pattern(5000, 1);
        let table = pattern(9000, 2);
        let image = CfbBuilder::new(512)
            .stream("WordDocument", word.clone())
            .stream("1Table", table.clone())
            .build();

        let mut ole = OleFile::open(Cursor::new(image)).unwrap();
        assert_eq!(ole.sector_size(), 512);
        assert_eq!(ole.list_streams(), vec!["WordDocument", "1Table"]);
        assert_eq!(ole.open_stream("WordDocument", NameMatch::Exact).unwrap(), word);
        assert_eq!(ole.open_stream("1Table", NameMatch::Exact).unwrap(), table);
    }

    #[test]
    fn test_small_stream_comes_from_mini_stream() {
        let small = pattern(300, 3);
        let other = pattern(130, 4);
        let image = CfbBuilder::new(512)
            .stream("Small", small.clone())
            .stream("Other", other.clone())
            .build();

        let mut ole = OleFile::open(Cursor::new(image)).unwrap();
        assert!(!ole.minifat().is_empty());
        assert_eq!(ole.open_stream("Small", NameMatch::Exact).unwrap(), small);
        assert_eq!(ole.open_stream("other", NameMatch::IgnoreCase).unwrap(), other);
    }

    #[test]
    fn test_mini_stream_can_be_disabled() {
        let small = pattern(700, 5);
        let image = CfbBuilder::new(512)
            .without_mini_stream()
            .stream("Small", small.clone())
            .build();

        let options = ExtractOptions::new().with_mini_stream(false);
        let mut ole = OleFile::open_with(Cursor::new(image), &options).unwrap();
        assert_eq!(ole.open_stream("Small", NameMatch::Exact).unwrap(), small);
    }

    #[test]
    fn test_version_4_file() {
        let data = pattern(10000, 6);
        let small = pattern(100, 7);
        let image = CfbBuilder::new(4096)
            .stream("Workbook", data.clone())
            .stream("Tiny", small.clone())
            .build();

        let mut ole = OleFile::open(Cursor::new(image)).unwrap();
        assert_eq!(ole.header().major_version, 4);
        assert_eq!(ole.sector_size(), 4096);
        assert_eq!(ole.open_stream("Workbook", NameMatch::Exact).unwrap(), data);
        assert_eq!(ole.open_stream("Tiny", NameMatch::Exact).unwrap(), small);
    }

    #[test]
    fn test_difat_extension_sector() {
        let data = pattern(6000, 8);
        let image = CfbBuilder::new(512)
            .difat_in_extension()
            .stream("WordDocument", data.clone())
            .build();

        let mut ole = OleFile::open(Cursor::new(image)).unwrap();
        assert_eq!(ole.header().num_difat_sectors, 1);
        assert!(ole.header().difat.is_empty());
        assert!(!ole.difat().is_empty());
        assert_eq!(ole.open_stream("WordDocument", NameMatch::Exact).unwrap(), data);
    }

    #[test]
    fn test_cyclic_stream_chain() {
        let (mut image, layout) = CfbBuilder::new(512)
            .stream("WordDocument", pattern(2048, 9))
            .build_with_layout();
        // Point the stream's second sector back at its first.
        let start = layout.stream_start("WordDocument");
        layout.set_fat_entry(&mut image, start + 1, start);

        let mut ole = OleFile::open(Cursor::new(image)).unwrap();
        assert!(matches!(
            ole.open_stream("WordDocument", NameMatch::Exact),
            Err(OleError::CyclicChain { .. })
        ));
    }

    #[test]
    fn test_dangling_stream_chain() {
        let (mut image, layout) = CfbBuilder::new(512)
            .stream("WordDocument", pattern(2048, 9))
            .build_with_layout();
        let start = layout.stream_start("WordDocument");
        layout.set_fat_entry(&mut image, start, 0x00FF_0000);

        let mut ole = OleFile::open(Cursor::new(image)).unwrap();
        let err = ole
            .open_stream("WordDocument", NameMatch::Exact)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DanglingSectorPointer);
    }

    #[test]
    fn test_truncated_fat() {
        let (image, layout) = CfbBuilder::new(512)
            .stream("WordDocument", pattern(4096, 1))
            .build_with_layout();
        let cut = layout.sector_offset(layout.fat_sectors[0]) + 100;
        let result = OleFile::open(Cursor::new(image[..cut].to_vec()));
        assert!(matches!(result, Err(OleError::TruncatedAllocationTable(_))));
    }

    #[test]
    fn test_missing_stream() {
        let image = CfbBuilder::new(512).stream("Workbook", pattern(10, 1)).build();
        let mut ole = OleFile::open(Cursor::new(image)).unwrap();
        assert!(matches!(
            ole.open_stream("WordDocument", NameMatch::Exact),
            Err(OleError::StreamNotFound(name)) if name == "WordDocument"
        ));
    }

    #[test]
    fn test_not_an_ole_file() {
        let data = vec![0x50u8; 2048];
        assert!(!is_ole_file(&data));
        assert!(matches!(
            OleFile::open(Cursor::new(data)),
            Err(OleError::InvalidSignature)
        ));
        assert!(matches!(
            OleFile::open(Cursor::new(vec![0u8; 100])),
            Err(OleError::TruncatedHeader(100))
        ));
    }

    #[test]
    fn test_parsing_twice_is_identical() {
        let image = CfbBuilder::new(512)
            .stream("WordDocument", pattern(5000, 3))
            .stream("Small", pattern(200, 4))
            .build();
        let read_all = |image: Vec<u8>| {
            let mut ole = OleFile::open(Cursor::new(image)).unwrap();
            (
                ole.open_stream("WordDocument", NameMatch::Exact).unwrap(),
                ole.open_stream("Small", NameMatch::Exact).unwrap(),
            )
        };
        assert_eq!(read_all(image.clone()), read_all(image));
    }
}
