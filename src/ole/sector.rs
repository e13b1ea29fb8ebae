//! Random-access sector reads over the underlying byte source.

use std::io::{Read, Seek, SeekFrom};

use super::fat::AllocationTable;
use super::file::OleError;
use super::header::Header;
use bytes::{Bytes, BytesMut};

/// Byte source plus the geometry needed to address regular sectors.
#[derive(Debug)]
pub struct SectorStore<R: Read + Seek> {
    reader: R,
    file_size: u64,
    sector_size: usize,
}

impl<R: Read + Seek> SectorStore<R> {
    /// Wrap a reader; its length is measured once up front.
    pub fn new(mut reader: R, sector_size: usize) -> Result<Self, OleError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self {
            reader,
            file_size,
            sector_size,
        })
    }

    /// Read the fixed header block.
    pub fn read_header(&mut self) -> Result<Header, OleError> {
        let mut buf = Vec::with_capacity(super::consts::HEADER_SIZE);
        self.reader.seek(SeekFrom::Start(0))?;
        (&mut self.reader)
            .take(super::consts::HEADER_SIZE as u64)
            .read_to_end(&mut buf)?;
        let header = Header::parse(&buf)?;
        self.sector_size = header.sector_size;
        Ok(header)
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    #[inline]
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    /// Number of whole or partial sectors that follow the header.
    pub fn sector_count(&self) -> u64 {
        let body = self.file_size.saturating_sub(self.sector_size as u64);
        body.div_ceil(self.sector_size as u64)
    }

    /// The header fills the whole first sector-sized block, so sector `n`
    /// starts at `(n + 1) * sector_size`: 4096 for sector 0 of a version 4
    /// file, not `512 + n * sector_size`.
    #[inline]
    fn sector_offset(&self, sector: u32) -> u64 {
        (u64::from(sector) + 1) * self.sector_size as u64
    }

    /// Read one sector.
    ///
    /// The last sector of a file may be short; the returned buffer is then
    /// shorter than the sector size. A sector that starts past the end of the
    /// file is an error.
    pub fn read_sector(&mut self, sector: u32) -> Result<Vec<u8>, OleError> {
        let position = self.sector_offset(sector);
        if position >= self.file_size {
            return Err(OleError::TruncatedSector { sector });
        }
        let len = (self.file_size - position).min(self.sector_size as u64) as usize;

        self.reader.seek(SeekFrom::Start(position))?;
        let mut buffer = vec![0u8; len];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read `len` bytes starting at the first byte of `sector`, across
    /// physically consecutive sectors.
    pub fn read_contiguous(&mut self, sector: u32, len: u64) -> Result<Vec<u8>, OleError> {
        let position = self.sector_offset(sector);
        let end = position.saturating_add(len);
        if end > self.file_size {
            return Err(OleError::TruncatedSector { sector });
        }

        self.reader.seek(SeekFrom::Start(position))?;
        let mut buffer = vec![0u8; len as usize];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Follow a FAT chain and collect the stream bytes in order.
    ///
    /// Collection stops at `ENDOFCHAIN` or once `declared_size` bytes are
    /// gathered, whichever comes first; the final sector is clamped to the
    /// remaining size. A chain that ends early yields what was read.
    pub fn read_stream(
        &mut self,
        start_sector: u32,
        declared_size: u64,
        table: &AllocationTable,
    ) -> Result<Bytes, OleError> {
        let capacity = declared_size.min(self.file_size) as usize;
        let mut data = BytesMut::with_capacity(capacity);
        let mut remaining = declared_size;

        for sector in table.chain(start_sector) {
            if remaining == 0 {
                break;
            }
            let sector = sector?;
            let sector_data = self.read_sector(sector)?;
            let take = (sector_data.len() as u64).min(remaining) as usize;
            data.extend_from_slice(&sector_data[..take]);
            remaining -= take as u64;
        }

        if remaining > 0 && declared_size != u64::MAX {
            log::warn!(
                "Chain from sector {start_sector} ended after {} of {declared_size} bytes",
                data.len()
            );
        }
        Ok(data.freeze())
    }
}
