/// Piece table (CLX) parser for DOC files.
///
/// The piece table maps character positions (CP) to byte offsets (FC) in the
/// WordDocument stream. Text may be stored out of logical order and in a mix
/// of UTF-16LE and single-byte code page runs, so every request is resolved
/// through the piece that covers it.
///
/// References:
/// - [MS-DOC] 2.9.38 Clx
/// - [MS-DOC] 2.9.178 PlcPcd
/// - [MS-DOC] 2.9.177 Pcd
/// - [MS-DOC] 2.9.73 FcCompressed
use super::super::package::{DocError, Result};
use crate::common::binary::{ByteCursor, u32_array_le};
use crate::common::encoding::{
    DEFAULT_LEGACY_CODEPAGE, DecodedText, decode_codepage, decode_utf16le, legacy_encoding,
};
use encoding_rs::Encoding;
use std::ops::Range;

const CLXT_PRC: u8 = 0x01;
const CLXT_PCDT: u8 = 0x02;

/// Size of one Pcd in bytes.
const PCD_SIZE: usize = 8;

const FC_MASK: u32 = 0x3FFF_FFFF;
const F_COMPRESSED: u32 = 0x4000_0000;
const FC_RESERVED: u32 = 0x8000_0000;

/// Property modifier run preceding the piece descriptors.
///
/// Only the raw bytes are kept; text extraction never applies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prc {
    pub data: Vec<u8>,
}

/// Piece descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pcd {
    pub flags: u16,
    pub fc_compressed: u32,
    pub prm: u16,
}

impl Pcd {
    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            flags: u16::from_le_bytes([bytes[0], bytes[1]]),
            fc_compressed: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
            prm: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    /// Byte offset of the run, or twice the offset when compressed.
    #[inline]
    pub fn fc(&self) -> u32 {
        self.fc_compressed & FC_MASK
    }

    /// Whether the run is one byte per character in the legacy code page.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.fc_compressed & F_COMPRESSED != 0
    }

    #[inline]
    pub fn has_reserved_bit(&self) -> bool {
        self.fc_compressed & FC_RESERVED != 0
    }

    /// Byte offset of `char_offset` within this run.
    pub fn byte_offset(&self, char_offset: u32) -> u64 {
        if self.is_compressed() {
            u64::from(self.fc() / 2) + u64::from(char_offset)
        } else {
            u64::from(self.fc()) + 2 * u64::from(char_offset)
        }
    }

    /// Number of bytes holding `length` characters.
    pub fn byte_len(&self, length: u32) -> u64 {
        if self.is_compressed() {
            u64::from(length)
        } else {
            2 * u64::from(length)
        }
    }
}

/// Piece descriptor table: `n + 1` character positions and `n` descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlcPcd {
    cps: Vec<u32>,
    pcds: Vec<Pcd>,
}

impl PlcPcd {
    /// Parse a PlcPcd of `data.len()` bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let lcb = data.len();
        let n = (lcb + PCD_SIZE) / (4 + PCD_SIZE);
        if n == 0 || (n - 1) * (4 + PCD_SIZE) + 4 != lcb {
            return Err(DocError::CorruptPlcPcd(format!(
                "{lcb} bytes is not a whole number of pieces"
            )));
        }

        let (cp_bytes, pcd_bytes) = data.split_at(n * 4);
        let cps = u32_array_le(cp_bytes);
        if let Some(i) = cps.windows(2).position(|w| w[0] > w[1]) {
            return Err(DocError::CorruptPlcPcd(format!(
                "cp[{}] = {} exceeds cp[{}] = {}",
                i,
                cps[i],
                i + 1,
                cps[i + 1]
            )));
        }
        let pcds: Vec<Pcd> = pcd_bytes.chunks_exact(PCD_SIZE).map(Pcd::from_bytes).collect();
        debug_assert_eq!(cps.len(), pcds.len() + 1);

        Ok(Self { cps, pcds })
    }

    /// Character position boundaries.
    #[inline]
    pub fn cps(&self) -> &[u32] {
        &self.cps
    }

    #[inline]
    pub fn pcds(&self) -> &[Pcd] {
        &self.pcds
    }

    #[inline]
    pub fn piece_count(&self) -> usize {
        self.pcds.len()
    }

    /// `cp[0]..cp[n]`
    pub fn cp_range(&self) -> Range<u32> {
        self.cps[0]..self.cps[self.cps.len() - 1]
    }

    /// Character range of piece `index`.
    pub fn piece_range(&self, index: usize) -> Option<Range<u32>> {
        Some(*self.cps.get(index)?..*self.cps.get(index + 1)?)
    }

    /// Index of the piece covering `cp`: the largest `i` with `cp[i] <= cp`.
    ///
    /// Empty pieces sharing a boundary are passed over, so the returned piece
    /// always satisfies `cp[i] <= cp < cp[i + 1]`.
    pub fn piece_index(&self, cp: u32) -> Result<usize> {
        let range = self.cp_range();
        if !range.contains(&cp) {
            return Err(DocError::CpOutOfRange {
                cp,
                first: range.start,
                end: range.end,
            });
        }
        Ok(self.cps.partition_point(|&c| c <= cp) - 1)
    }
}

/// Complex file information: property runs followed by the piece table.
#[derive(Debug, Clone)]
pub struct Clx {
    pub property_runs: Vec<Prc>,
    plc: PlcPcd,
}

impl Clx {
    /// Parse a CLX.
    ///
    /// Leading blocks tagged `0x01` carry a one-byte length and are kept as
    /// opaque property runs. The block tagged `0x02` holds a `u32` length and
    /// the PlcPcd, and ends the CLX.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let mut property_runs = Vec::new();

        loop {
            let offset = cursor.position();
            let tag = cursor
                .read_u8()
                .map_err(|_| DocError::CorruptClx(format!("no Pcdt in {} bytes", data.len())))?;
            match tag {
                CLXT_PRC => {
                    let run = cursor
                        .read_u8()
                        .and_then(|len| cursor.take(usize::from(len)))
                        .map_err(|e| {
                            DocError::CorruptClx(format!("property run at {offset}: {e}"))
                        })?;
                    property_runs.push(Prc { data: run.to_vec() });
                },
                CLXT_PCDT => {
                    let plc = cursor
                        .read_u32()
                        .and_then(|lcb| cursor.take(lcb as usize))
                        .map_err(|e| DocError::CorruptClx(format!("Pcdt at {offset}: {e}")))?;
                    if !cursor.is_empty() {
                        log::debug!("ignoring {} bytes after the Pcdt", cursor.remaining());
                    }
                    return Ok(Self {
                        property_runs,
                        plc: PlcPcd::parse(plc)?,
                    });
                },
                other => {
                    return Err(DocError::CorruptClx(format!(
                        "unexpected block tag 0x{other:02X} at {offset}"
                    )));
                },
            }
        }
    }

    #[inline]
    pub fn plc(&self) -> &PlcPcd {
        &self.plc
    }

    /// Decode `length` characters starting at `cp`.
    ///
    /// The run must lie within a single piece. Compressed pieces are decoded
    /// with `encoding`, the rest as UTF-16LE. Decoding is lossy and reports
    /// whether replacement characters were produced.
    pub fn decode_run(
        &self,
        cp: u32,
        length: u32,
        word_document: &[u8],
        encoding: &'static Encoding,
    ) -> Result<DecodedText> {
        let index = self.plc.piece_index(cp)?;
        if length == 0 {
            return Ok(DecodedText::default());
        }

        let pcd = self.plc.pcds[index];
        if pcd.has_reserved_bit() {
            return Err(DocError::CorruptPiece { index });
        }

        let piece_start = self.plc.cps[index];
        let piece_end = self.plc.cps[index + 1];
        let char_offset = cp - piece_start;
        if u64::from(char_offset) + u64::from(length) > u64::from(piece_end - piece_start) {
            return Err(DocError::RunCrossesPieceBoundary {
                cp,
                length,
                piece_end,
            });
        }

        let offset = pcd.byte_offset(char_offset);
        let len = pcd.byte_len(length);
        let bytes = offset
            .checked_add(len)
            .and_then(|end| {
                let start = usize::try_from(offset).ok()?;
                let end = usize::try_from(end).ok()?;
                word_document.get(start..end)
            })
            .ok_or(DocError::TruncatedRun {
                offset,
                len,
                available: word_document.len(),
            })?;

        Ok(if pcd.is_compressed() {
            decode_codepage(bytes, encoding)
        } else {
            decode_utf16le(bytes)
        })
    }

    /// Text of `length` characters starting at `cp`, with compressed runs
    /// read as GBK.
    ///
    /// Malformed bytes become U+FFFD rather than failing.
    pub fn text_for(&self, cp: u32, length: u32, word_document: &[u8]) -> Result<String> {
        let encoding = legacy_encoding(DEFAULT_LEGACY_CODEPAGE);
        self.decode_run(cp, length, word_document, encoding)
            .map(|decoded| decoded.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::test_support::{encode_clx, utf16le};
    use proptest::prelude::*;

    fn single_piece(fc_compressed: u32, cps: [u32; 2]) -> Clx {
        Clx::parse(&encode_clx(&[], &cps, &[(0, fc_compressed, 0)])).unwrap()
    }

    #[test]
    fn test_pcd_fields() {
        let pcd = Pcd {
            flags: 0,
            fc_compressed: 0x4000_0010,
            prm: 0,
        };
        assert_eq!(pcd.fc(), 0x10);
        assert!(pcd.is_compressed());
        assert!(!pcd.has_reserved_bit());
        assert_eq!(pcd.byte_offset(3), 0x08 + 3);

        let pcd = Pcd {
            flags: 0,
            fc_compressed: 0x0000_0010,
            prm: 0,
        };
        assert!(!pcd.is_compressed());
        assert_eq!(pcd.byte_offset(3), 0x10 + 6);
        assert_eq!(pcd.byte_len(3), 6);
    }

    #[test]
    fn test_compressed_run() {
        let mut word = vec![0u8; 8];
        word.extend_from_slice(b"Hello, world");
        let clx = single_piece(0x4000_0010, [0, 12]);
        assert_eq!(clx.text_for(0, 5, &word).unwrap(), "Hello");
        assert_eq!(clx.text_for(7, 5, &word).unwrap(), "world");
    }

    #[test]
    fn test_compressed_run_gbk() {
        let mut word = vec![0u8; 8];
        word.extend_from_slice(&[0xD6, 0xD0, 0xCE, 0xC4]);
        let clx = single_piece(0x4000_0010, [0, 4]);
        assert_eq!(clx.text_for(0, 4, &word).unwrap(), "中文");
    }

    #[test]
    fn test_unicode_run() {
        let mut word = vec![0u8; 0x10];
        word.extend_from_slice(&utf16le("Grüße"));
        let clx = single_piece(0x10, [10, 15]);
        assert_eq!(clx.text_for(10, 5, &word).unwrap(), "Grüße");
        assert_eq!(clx.text_for(12, 2, &word).unwrap(), "üß");
    }

    #[test]
    fn test_boundaries() {
        let word = vec![b'a'; 64];
        let clx = Clx::parse(&encode_clx(
            &[],
            &[0, 4, 8],
            &[(0, 0x4000_0000, 0), (0, 0x4000_0010, 0)],
        ))
        .unwrap();

        assert!(matches!(
            clx.text_for(8, 1, &word),
            Err(DocError::CpOutOfRange { cp: 8, first: 0, end: 8 })
        ));
        assert_eq!(clx.text_for(7, 1, &word).unwrap(), "a");
        assert!(matches!(
            clx.text_for(2, 4, &word),
            Err(DocError::RunCrossesPieceBoundary { piece_end: 4, .. })
        ));
        assert_eq!(clx.text_for(3, 0, &word).unwrap(), "");
        assert!(matches!(
            clx.text_for(8, 0, &word),
            Err(DocError::CpOutOfRange { .. })
        ));
    }

    #[test]
    fn test_truncated_run() {
        let word = vec![0u8; 20];
        let clx = single_piece(0x10, [0, 4]);
        assert!(matches!(
            clx.text_for(0, 4, &word),
            Err(DocError::TruncatedRun {
                offset: 0x10,
                len: 8,
                available: 20
            })
        ));
    }

    #[test]
    fn test_reserved_bit() {
        let clx = single_piece(0x8000_0000, [0, 4]);
        assert!(matches!(
            clx.text_for(0, 1, &[0u8; 16]),
            Err(DocError::CorruptPiece { index: 0 })
        ));
    }

    #[test]
    fn test_property_runs_skipped() {
        let clx = Clx::parse(&encode_clx(&[&[1, 2, 3], &[]], &[0, 1], &[(0, 0, 0)])).unwrap();
        assert_eq!(clx.property_runs.len(), 2);
        assert_eq!(clx.property_runs[0].data, vec![1, 2, 3]);
        assert_eq!(clx.plc().piece_count(), 1);
    }

    #[test]
    fn test_corrupt_clx() {
        assert!(matches!(Clx::parse(&[]), Err(DocError::CorruptClx(_))));
        assert!(matches!(Clx::parse(&[0x01, 0x05, 0x00]), Err(DocError::CorruptClx(_))));
        assert!(matches!(Clx::parse(&[0x07]), Err(DocError::CorruptClx(_))));
        // Pcdt claims more bytes than remain
        assert!(matches!(
            Clx::parse(&[0x02, 0x40, 0, 0, 0, 0, 0]),
            Err(DocError::CorruptClx(_))
        ));
    }

    #[test]
    fn test_corrupt_plc() {
        // 13 bytes fits no piece count
        assert!(matches!(PlcPcd::parse(&[0u8; 13]), Err(DocError::CorruptPlcPcd(_))));
        assert!(matches!(PlcPcd::parse(&[]), Err(DocError::CorruptPlcPcd(_))));

        let clx = encode_clx(&[], &[0, 10, 5], &[(0, 0, 0), (0, 0, 0)]);
        assert!(matches!(Clx::parse(&clx), Err(DocError::CorruptPlcPcd(_))));
    }

    #[test]
    fn test_empty_piece_lookup() {
        let clx = Clx::parse(&encode_clx(
            &[],
            &[0, 3, 3, 6],
            &[(0, 0x4000_0000, 0), (0, 0x4000_0000, 0), (0, 0x4000_000C, 0)],
        ))
        .unwrap();
        assert_eq!(clx.plc().piece_index(3).unwrap(), 2);
        assert_eq!(clx.text_for(3, 3, b"abcdefghij").unwrap(), "ghi");
    }

    /// Lay out each piece's text at increasing offsets and return the CLX,
    /// the WordDocument bytes and the expected text.
    fn build_document(first_cp: u32, pieces: &[(usize, bool)]) -> (Clx, Vec<u8>, String) {
        let mut word = vec![0u8; 16];
        let mut cps = vec![first_cp];
        let mut pcds = Vec::new();
        let mut expected = String::new();

        for (i, &(len, compressed)) in pieces.iter().enumerate() {
            let offset = word.len() as u32;
            if compressed {
                let text: String = (0..len)
                    .map(|k| char::from(b'a' + ((i + k) % 26) as u8))
                    .collect();
                word.extend_from_slice(text.as_bytes());
                pcds.push((0, (offset * 2) | F_COMPRESSED, 0));
                expected.push_str(&text);
            } else {
                let text: String = (0..len)
                    .map(|k| if (i + k) % 3 == 0 { '中' } else { 'Ω' })
                    .collect();
                word.extend_from_slice(&utf16le(&text));
                pcds.push((0, offset, 0));
                expected.push_str(&text);
            }
            cps.push(cps[i] + len as u32);
        }

        let clx = Clx::parse(&encode_clx(&[&[0xAA]], &cps, &pcds)).unwrap();
        (clx, word, expected)
    }

    proptest! {
        #[test]
        fn prop_sweep_reconstructs_document(
            first_cp in 0u32..100,
            pieces in proptest::collection::vec((0usize..12, any::<bool>()), 1..8),
        ) {
            let (clx, word, expected) = build_document(first_cp, &pieces);
            let plc = clx.plc();
            let range = plc.cp_range();

            let mut swept = String::new();
            for i in 0..plc.piece_count() {
                let piece = plc.piece_range(i).unwrap();
                if piece.is_empty() {
                    continue;
                }
                swept.push_str(&clx.text_for(piece.start, piece.end - piece.start, &word).unwrap());
            }

            prop_assert_eq!(swept.chars().count() as u32, range.end - range.start);
            prop_assert_eq!(swept, expected);
        }
    }
}
