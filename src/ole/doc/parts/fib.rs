/// File Information Block (FIB) parser for DOC files.
///
/// The FIB is located at the beginning of the WordDocument stream and contains
/// the information needed to reach the text:
/// - Which table stream to use (0Table or 1Table)
/// - Encryption and obfuscation flags
/// - The character count of the main document
/// - The (fc, lcb) pair locating the CLX in the table stream
use super::super::package::{DocError, Result};
use crate::common::binary::{ByteCursor, u32_array_le};
use crate::ole::consts::{TABLE0_STREAM, TABLE1_STREAM};

/// Size of the fixed FibBase structure.
const FIB_BASE_SIZE: usize = 32;

/// Required csw (count of u16 in FibRgW97).
const CSW: u16 = 0x000E;

/// Required cslw (count of u32 in FibRgLw97).
const CSLW: u16 = 0x0016;

/// Offset of cbRgFcLcb; the FibRgFcLcb array follows it.
const CB_RG_FC_LCB_OFFSET: usize = 152;

/// cbRgFcLcb values for the Word 97, 2000, 2002, 2003 and 2007 FIBs.
const KNOWN_FC_LCB_COUNTS: [u16; 5] = [0x005D, 0x006C, 0x0088, 0x00A4, 0x00B7];

/// Index of fcClx in the flat FibRgFcLcb u32 array; lcbClx follows it.
const FC_CLX_INDEX: usize = 66;

const F_ENCRYPTED: u16 = 0x0100;
const F_WHICH_TBL_STM: u16 = 0x0200;
const F_OBFUSCATED: u16 = 0x8000;

/// File Information Block.
///
/// # Structure
///
/// - Bytes 0-1: wIdent (0xA5EC, or 0xA5DC for Word 6.0/95)
/// - Bytes 2-3: nFib
/// - Bytes 10-11: flags
/// - Byte 32: csw, followed by FibRgW97
/// - Byte 62: cslw, followed by FibRgLw97 (ccpText at 76)
/// - Byte 152: cbRgFcLcb, followed by FibRgFcLcb
#[derive(Debug, Clone)]
pub struct FileInformationBlock {
    ident: u16,
    nfib: u16,
    lid: u16,
    flags: u16,
    ccp_text: u32,
    /// FibRgFcLcb as a flat array of u32 values
    fc_lcb: Vec<u32>,
}

impl FileInformationBlock {
    /// Parse and validate a FIB from the start of the WordDocument stream.
    pub fn parse(word_document: &[u8]) -> Result<Self> {
        let truncated = |needed: usize| DocError::TruncatedFib {
            needed,
            available: word_document.len(),
        };
        if word_document.len() < CB_RG_FC_LCB_OFFSET + 2 {
            return Err(truncated(CB_RG_FC_LCB_OFFSET + 2));
        }

        let mut cursor = ByteCursor::new(word_document);
        let ident = cursor.read_u16().map_err(|_| truncated(FIB_BASE_SIZE))?;
        let nfib = cursor.read_u16().map_err(|_| truncated(FIB_BASE_SIZE))?;
        cursor.skip(2).map_err(|_| truncated(FIB_BASE_SIZE))?;
        let lid = cursor.read_u16().map_err(|_| truncated(FIB_BASE_SIZE))?;
        cursor.skip(2).map_err(|_| truncated(FIB_BASE_SIZE))?;
        let flags = cursor.read_u16().map_err(|_| truncated(FIB_BASE_SIZE))?;

        if ident != 0xA5EC && ident != 0xA5DC {
            return Err(DocError::InvalidFibIdent(ident));
        }

        let mut cursor = ByteCursor::at(word_document, FIB_BASE_SIZE);
        let csw = cursor.read_u16().map_err(|_| truncated(FIB_BASE_SIZE + 2))?;
        if csw != CSW {
            return Err(DocError::InvalidCswCount(csw));
        }
        cursor
            .skip(usize::from(CSW) * 2)
            .map_err(|_| truncated(CB_RG_FC_LCB_OFFSET))?;

        let cslw = cursor.read_u16().map_err(|_| truncated(CB_RG_FC_LCB_OFFSET))?;
        if cslw != CSLW {
            return Err(DocError::InvalidCslwCount(cslw));
        }
        let rg_lw = cursor
            .take(usize::from(CSLW) * 4)
            .map_err(|_| truncated(CB_RG_FC_LCB_OFFSET))?;
        let ccp_text = u32_array_le(rg_lw)[3];

        let cb_rg_fc_lcb = cursor
            .read_u16()
            .map_err(|_| truncated(CB_RG_FC_LCB_OFFSET + 2))?;
        if !KNOWN_FC_LCB_COUNTS.contains(&cb_rg_fc_lcb) {
            return Err(DocError::InvalidFclcbCount(cb_rg_fc_lcb));
        }
        let array_len = usize::from(cb_rg_fc_lcb) * 8;
        let fc_lcb = cursor
            .take(array_len)
            .map(u32_array_le)
            .map_err(|_| truncated(CB_RG_FC_LCB_OFFSET + 2 + array_len))?;

        Ok(Self {
            ident,
            nfib,
            lid,
            flags,
            ccp_text,
            fc_lcb,
        })
    }

    /// The wIdent magic number.
    #[inline]
    pub fn ident(&self) -> u16 {
        self.ident
    }

    /// Get the file format version.
    ///
    /// Common values:
    /// - 0x00C1 (193): Word 97 through Word 2003
    /// - 0x0101 (257): Word 2007
    /// - 0x0112 (274): Word 2010+
    #[inline]
    pub fn version(&self) -> u16 {
        self.nfib
    }

    /// Get the language ID.
    #[inline]
    pub fn language_id(&self) -> u16 {
        self.lid
    }

    #[inline]
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// fEncrypted: the document requires a password to open.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags & F_ENCRYPTED != 0
    }

    /// fObfuscated: XOR obfuscation rather than RC4, meaningful when encrypted.
    #[inline]
    pub fn is_obfuscated(&self) -> bool {
        self.flags & F_OBFUSCATED != 0
    }

    /// Get which table stream to use.
    ///
    /// Returns `true` for "1Table", `false` for "0Table".
    #[inline]
    pub fn which_table_stream(&self) -> bool {
        self.flags & F_WHICH_TBL_STM != 0
    }

    /// Name of the table stream selected by fWhichTblStm.
    pub fn table_stream_name(&self) -> &'static str {
        if self.which_table_stream() {
            TABLE1_STREAM
        } else {
            TABLE0_STREAM
        }
    }

    /// Character count of the main document text.
    #[inline]
    pub fn ccp_text(&self) -> u32 {
        self.ccp_text
    }

    /// Get an entry of the flat FibRgFcLcb u32 array.
    ///
    /// Even indices are offsets (fc), odd indices are lengths (lcb).
    pub fn fc_lcb(&self, index: usize) -> Option<u32> {
        self.fc_lcb.get(index).copied()
    }

    /// Offset of the CLX in the table stream.
    pub fn fc_clx(&self) -> u32 {
        self.fc_lcb[FC_CLX_INDEX]
    }

    /// Length of the CLX in bytes.
    pub fn lcb_clx(&self) -> u32 {
        self.fc_lcb[FC_CLX_INDEX + 1]
    }

    /// Slice the CLX out of the table stream.
    pub fn clx_bytes<'a>(&self, table: &'a [u8]) -> Result<&'a [u8]> {
        let (offset, len) = (self.fc_clx(), self.lcb_clx());
        if offset == 0 && len == 0 {
            return Err(DocError::MissingClx);
        }
        let start = offset as usize;
        start
            .checked_add(len as usize)
            .and_then(|end| table.get(start..end))
            .ok_or(DocError::ClxOutOfBounds {
                offset,
                len,
                available: table.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::test_support::encode_fib;

    #[test]
    fn test_parse_valid_fib() {
        let data = encode_fib(0x0200, 1234, 0x100, 0x20, 0x00B7);
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert_eq!(fib.ident(), 0xA5EC);
        assert!(fib.which_table_stream());
        assert_eq!(fib.table_stream_name(), "1Table");
        assert!(!fib.is_encrypted());
        assert_eq!(fib.ccp_text(), 1234);
        assert_eq!(fib.fc_clx(), 0x100);
        assert_eq!(fib.lcb_clx(), 0x20);
        assert_eq!(fib.fc_lcb(FC_CLX_INDEX), Some(0x100));
    }

    #[test]
    fn test_flags() {
        let fib = FileInformationBlock::parse(&encode_fib(0x8100, 0, 0, 0, 0x5D)).unwrap();
        assert!(fib.is_encrypted());
        assert!(fib.is_obfuscated());
        assert_eq!(fib.table_stream_name(), "0Table");
    }

    #[test]
    fn test_invalid_ident() {
        let mut data = encode_fib(0, 0, 0, 0, 0x5D);
        data[0..2].copy_from_slice(&0x1234u16.to_le_bytes());
        assert!(matches!(
            FileInformationBlock::parse(&data),
            Err(DocError::InvalidFibIdent(0x1234))
        ));
    }

    #[test]
    fn test_count_validation() {
        let mut data = encode_fib(0, 0, 0, 0, 0x6C);
        data[32] = 0x0D;
        assert!(matches!(
            FileInformationBlock::parse(&data),
            Err(DocError::InvalidCswCount(0x0D))
        ));

        let mut data = encode_fib(0, 0, 0, 0, 0x6C);
        data[62] = 0x15;
        assert!(matches!(
            FileInformationBlock::parse(&data),
            Err(DocError::InvalidCslwCount(0x15))
        ));

        let mut data = encode_fib(0, 0, 0, 0, 0x6C);
        data[152] = 0x50;
        assert!(matches!(
            FileInformationBlock::parse(&data),
            Err(DocError::InvalidFclcbCount(0x50))
        ));
    }

    #[test]
    fn test_truncated() {
        let data = encode_fib(0, 0, 0, 0, 0x6C);
        assert!(matches!(
            FileInformationBlock::parse(&data[..100]),
            Err(DocError::TruncatedFib { .. })
        ));
        // Header fields present but FibRgFcLcb cut short
        assert!(matches!(
            FileInformationBlock::parse(&data[..200]),
            Err(DocError::TruncatedFib { .. })
        ));
    }

    #[test]
    fn test_clx_bytes() {
        let fib = FileInformationBlock::parse(&encode_fib(0, 0, 4, 3, 0x6C)).unwrap();
        let table = [9u8, 9, 9, 9, 1, 2, 3, 9];
        assert_eq!(fib.clx_bytes(&table).unwrap(), &[1, 2, 3]);
        assert!(matches!(
            fib.clx_bytes(&table[..5]),
            Err(DocError::ClxOutOfBounds { .. })
        ));

        let fib = FileInformationBlock::parse(&encode_fib(0, 0, 0, 0, 0x6C)).unwrap();
        assert!(matches!(fib.clx_bytes(&table), Err(DocError::MissingClx)));

        // A located but empty CLX is left for the CLX parser to reject
        let fib = FileInformationBlock::parse(&encode_fib(0, 0, 4, 0, 0x6C)).unwrap();
        assert_eq!(fib.clx_bytes(&table).unwrap(), &[] as &[u8]);
    }
}
