//! PPT record headers and the record-tree walker.
//!
//! Every record starts with an 8-byte header. Containers (version `0xF`)
//! hold a sequence of child records filling their payload exactly; atoms
//! hold data. The tree is never materialized: the walker recurses along
//! the current path and hands each atom to a visitor.

use crate::ole::consts::PptRecordType;
use crate::ole::ppt::package::{PptError, Result};
use std::ops::Range;
use zerocopy::{
    FromBytes,
    byteorder::{LittleEndian, U16, U32},
};

/// Size of a record header in bytes.
pub const RECORD_HEADER_SIZE: usize = 8;

/// Version nibble marking a container record.
const CONTAINER_VERSION: u8 = 0x0F;

/// Default nesting limit for container records.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A decoded PPT record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record version (low 4 bits of the first field)
    pub version: u8,
    /// Record instance (high 12 bits of the first field)
    pub instance: u16,
    /// Raw record type
    pub rec_type: u16,
    /// Payload length in bytes
    pub length: u32,
}

impl RecordHeader {
    /// Parse the header at `offset`.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let bytes = offset
            .checked_add(RECORD_HEADER_SIZE)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| PptError::RecordBoundsViolation {
                offset,
                reason: format!(
                    "record header needs {RECORD_HEADER_SIZE} bytes, {} remain",
                    data.len().saturating_sub(offset)
                ),
            })?;

        // Format: bits 0-3 = version, bits 4-15 = instance
        let version_instance = U16::<LittleEndian>::read_from_bytes(&bytes[0..2])
            .map(|v| v.get())
            .unwrap_or(0);
        let rec_type = U16::<LittleEndian>::read_from_bytes(&bytes[2..4])
            .map(|v| v.get())
            .unwrap_or(0);
        let length = U32::<LittleEndian>::read_from_bytes(&bytes[4..8])
            .map(|v| v.get())
            .unwrap_or(0);

        Ok(Self {
            version: (version_instance & 0x000F) as u8,
            instance: version_instance >> 4,
            rec_type,
            length,
        })
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.version == CONTAINER_VERSION
    }

    #[inline]
    pub fn record_type(&self) -> PptRecordType {
        PptRecordType::from(self.rec_type)
    }

    /// Payload range of a record whose header starts at `offset`.
    ///
    /// Computed in `u64` so a huge length cannot wrap.
    pub fn payload_range(&self, offset: usize) -> Range<u64> {
        let start = offset as u64 + RECORD_HEADER_SIZE as u64;
        start..start + u64::from(self.length)
    }
}

/// Receives the atoms found by [`RecordWalker`].
pub trait RecordVisitor {
    /// Called for every atom, in stream order. `offset` is the position of
    /// the atom's header in the stream.
    fn visit_atom(&mut self, header: &RecordHeader, payload: &[u8], offset: usize);
}

/// Depth-bounded walker over a PowerPoint Document stream.
#[derive(Debug, Clone, Copy)]
pub struct RecordWalker {
    max_depth: usize,
}

impl Default for RecordWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl RecordWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Walk every top-level record of `stream`.
    ///
    /// A failure inside a top-level container abandons the rest of that
    /// container and is returned as a warning; the walk resumes with the
    /// next top-level record. A top-level record running past the end of
    /// the stream ends the walk.
    pub fn walk<V: RecordVisitor>(&self, stream: &[u8], visitor: &mut V) -> Vec<PptError> {
        let mut warnings = Vec::new();
        let mut offset = 0usize;

        while stream.len() - offset >= RECORD_HEADER_SIZE {
            let header = match RecordHeader::parse(stream, offset) {
                Ok(header) => header,
                Err(e) => {
                    warnings.push(e);
                    break;
                },
            };
            let payload = header.payload_range(offset);
            if payload.end > stream.len() as u64 {
                warnings.push(PptError::RecordBoundsViolation {
                    offset,
                    reason: format!(
                        "record 0x{:04X} of {} bytes runs past the {}-byte stream",
                        header.rec_type,
                        header.length,
                        stream.len()
                    ),
                });
                break;
            }

            if let Err(e) = self.visit(stream, offset, &header, 0, visitor) {
                warnings.push(e);
            }
            offset = payload.end as usize;
        }

        if offset < stream.len() {
            log::debug!("{} trailing bytes after the last record", stream.len() - offset);
        }
        warnings
    }

    /// Visit one record whose payload is known to lie within `stream`.
    fn visit<V: RecordVisitor>(
        &self,
        stream: &[u8],
        offset: usize,
        header: &RecordHeader,
        depth: usize,
        visitor: &mut V,
    ) -> Result<()> {
        let payload = header.payload_range(offset);
        let (start, end) = (payload.start as usize, payload.end as usize);

        if !header.is_container() {
            visitor.visit_atom(header, &stream[start..end], offset);
            return Ok(());
        }
        if depth >= self.max_depth {
            return Err(PptError::RecordBoundsViolation {
                offset,
                reason: format!("containers nested deeper than {}", self.max_depth),
            });
        }

        let mut child = start;
        while child < end {
            if end - child < RECORD_HEADER_SIZE {
                return Err(PptError::RecordBoundsViolation {
                    offset: child,
                    reason: format!("{} stray bytes at the end of a container", end - child),
                });
            }
            let child_header = RecordHeader::parse(stream, child)?;
            let child_payload = child_header.payload_range(child);
            if child_payload.end > end as u64 {
                return Err(PptError::RecordBoundsViolation {
                    offset: child,
                    reason: format!(
                        "record 0x{:04X} of {} bytes overruns its container ending at {}",
                        child_header.rec_type, child_header.length, end
                    ),
                });
            }
            self.visit(stream, child, &child_header, depth + 1, visitor)?;
            child = child_payload.end as usize;
        }
        Ok(())
    }
}
