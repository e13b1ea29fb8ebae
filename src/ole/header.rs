//! Compound file header.
//!
//! The first 512 bytes of every compound file describe its geometry: sector
//! sizes, where the directory and MiniFAT start, and the first 109 FAT sector
//! locations. For 4096-byte sectors the header still occupies a whole sector.

use super::consts::*;
use super::file::OleError;
use zerocopy::{FromBytes, LE, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw on-disk header layout (512 bytes).
#[allow(dead_code)]
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    signature: [u8; 8],
    clsid: [u8; 16],
    minor_version: U16<LE>,
    major_version: U16<LE>,
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    /// Directory sector count; zero for version 3
    num_dir_sectors: U32<LE>,
    num_fat_sectors: U32<LE>,
    first_dir_sector: U32<LE>,
    transaction_signature: U32<LE>,
    mini_stream_cutoff: U32<LE>,
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Parsed and validated header geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub major_version: u16,
    pub sector_size: usize,
    pub mini_sector_size: usize,
    pub mini_stream_cutoff: u32,
    pub num_dir_sectors: u32,
    pub num_fat_sectors: u32,
    pub first_dir_sector: u32,
    pub first_minifat_sector: u32,
    pub num_minifat_sectors: u32,
    pub first_difat_sector: u32,
    pub num_difat_sectors: u32,
    /// FAT sector locations listed in the header, sentinels removed
    pub difat: Vec<u32>,
}

impl Header {
    /// Parse the fixed header.
    ///
    /// Fails on a short buffer, a wrong signature, or a sector shift other
    /// than 9 or 12. A wrong byte-order mark or mini sector shift is logged
    /// and tolerated.
    pub fn parse(bytes: &[u8]) -> Result<Self, OleError> {
        let raw = bytes
            .get(..HEADER_SIZE)
            .and_then(|b| RawHeader::read_from_bytes(b).ok())
            .ok_or(OleError::TruncatedHeader(bytes.len()))?;

        if &raw.signature != MAGIC {
            return Err(OleError::InvalidSignature);
        }

        let sector_shift = raw.sector_shift.get();
        let sector_size = match sector_shift {
            9 => SECTOR_SIZE_V3,
            12 => SECTOR_SIZE_V4,
            other => return Err(OleError::InvalidSectorSize { shift: other }),
        };

        let byte_order = raw.byte_order.get();
        if byte_order != 0xFFFE {
            log::warn!("Unexpected byte order mark 0x{byte_order:04X}, assuming little-endian");
        }
        let mini_shift = raw.mini_sector_shift.get();
        if mini_shift != 6 {
            log::warn!("Unexpected mini sector shift {mini_shift}, using 64-byte mini sectors");
        }

        let major_version = raw.major_version.get();
        if (major_version == 3 && sector_size != SECTOR_SIZE_V3)
            || (major_version == 4 && sector_size != SECTOR_SIZE_V4)
        {
            log::warn!("Version {major_version} header with {sector_size}-byte sectors");
        }

        let difat = raw
            .difat
            .iter()
            .map(|v| v.get())
            .filter(|&sector| sector <= MAXREGSECT)
            .collect();

        let header = Self {
            major_version,
            sector_size,
            mini_sector_size: MINI_SECTOR_SIZE,
            mini_stream_cutoff: raw.mini_stream_cutoff.get(),
            num_dir_sectors: raw.num_dir_sectors.get(),
            num_fat_sectors: raw.num_fat_sectors.get(),
            first_dir_sector: raw.first_dir_sector.get(),
            first_minifat_sector: raw.first_minifat_sector.get(),
            num_minifat_sectors: raw.num_minifat_sectors.get(),
            first_difat_sector: raw.first_difat_sector.get(),
            num_difat_sectors: raw.num_difat_sectors.get(),
            difat,
        };
        log::debug!(
            "OLE header: v{} sectors={}B cutoff={} fat={} minifat={} difat_ext={}",
            header.major_version,
            header.sector_size,
            header.mini_stream_cutoff,
            header.num_fat_sectors,
            header.num_minifat_sectors,
            header.num_difat_sectors
        );
        Ok(header)
    }

    /// Pointers per allocation table sector.
    #[inline]
    pub fn entries_per_sector(&self) -> usize {
        self.sector_size / 4
    }

    /// Byte position of a regular sector.
    ///
    /// The header occupies the first sector-sized block, so sector `n` starts
    /// at `(n + 1) * sector_size`.
    #[inline]
    pub fn sector_offset(&self, sector: u32) -> u64 {
        (u64::from(sector) + 1) * self.sector_size as u64
    }
}
