//! Binary data parsing utilities shared across formats.
//!
//! All structure decoding goes through these bounds-checked readers. Offsets are
//! never indexed directly into a buffer by the format code; a short buffer turns
//! into a [`BinaryError`] that each format maps onto its own truncation error.

use thiserror::Error;
use zerocopy::{FromBytes, LE, U16, U32, U64};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    #[error("Insufficient data: expected {expected}, got {available}")]
    InsufficientData { expected: usize, available: usize },
}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn slice_at(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    let end = offset
        .checked_add(len)
        .ok_or(BinaryError::InsufficientData {
            expected: usize::MAX,
            available: data.len(),
        })?;
    data.get(offset..end).ok_or(BinaryError::InsufficientData {
        expected: end,
        available: data.len(),
    })
}

/// Read a single byte at the given offset.
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> BinaryResult<u8> {
    slice_at(data, offset, 1).map(|b| b[0])
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use oletext::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    let bytes = slice_at(data, offset, 2)?;
    Ok(U16::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use oletext::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// assert!(read_u32_le(&data, 1).is_err());
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = slice_at(data, offset, 4)?;
    Ok(U32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian u64 from a byte slice at the given offset.
#[inline]
pub fn read_u64_le(data: &[u8], offset: usize) -> BinaryResult<u64> {
    let bytes = slice_at(data, offset, 8)?;
    Ok(U64::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Decode a buffer of packed little-endian u32 values.
///
/// Trailing bytes that do not make up a whole value are ignored.
pub fn u32_array_le(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Forward-only reader over a byte slice.
///
/// Each read advances the position; a failed read leaves it unchanged.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at `pos` instead of the beginning.
    #[inline]
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it.
    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        let v = read_u8(self.data, self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> BinaryResult<u16> {
        let v = read_u16_le(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> BinaryResult<u32> {
        let v = read_u32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    /// Borrow the next `len` bytes.
    pub fn take(&mut self, len: usize) -> BinaryResult<&'a [u8]> {
        let bytes = slice_at(self.data, self.pos, len)?;
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> BinaryResult<()> {
        self.take(len).map(|_| ())
    }
}
