//! Character encoding utilities for legacy Office text.
//!
//! Legacy Word pieces carry either UTF-16LE or a single-byte Windows code
//! page, and the PowerPoint and Excel text records are UTF-16LE. Decoding is
//! always lossy: malformed input becomes U+FFFD and the caller is told that
//! replacement happened so it can surface a warning.

use encoding_rs::{Encoding, GBK, UTF_16LE};

/// Code page used for compressed Word pieces when nothing else is configured.
pub const DEFAULT_LEGACY_CODEPAGE: u32 = 936;

/// Text produced by a lossy decode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedText {
    pub text: String,
    /// Whether any input had to be replaced with U+FFFD.
    pub had_errors: bool,
}

/// Map Windows codepage identifier to encoding_rs Encoding.
///
/// # Examples
/// ```
/// use oletext::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(936).unwrap();
/// assert_eq!(encoding.name(), "GBK");
/// assert!(codepage_to_encoding(12345).is_none());
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1252 => Some(encoding_rs::WINDOWS_1252),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS),
        936 | 20936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        54936 => Some(encoding_rs::GB18030),
        20932 => Some(encoding_rs::EUC_JP),

        // ISO 8859 series
        28591 => Some(encoding_rs::WINDOWS_1252), // ISO-8859-1 approximation
        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),

        // KOI8 series
        20866 => Some(encoding_rs::KOI8_R),
        21866 => Some(encoding_rs::KOI8_U),

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH),

        65001 => Some(encoding_rs::UTF_8),
        _ => None,
    }
}

/// Resolve the encoding for a configured legacy code page.
///
/// Unknown code pages fall back to GBK.
pub fn legacy_encoding(codepage: u32) -> &'static Encoding {
    codepage_to_encoding(codepage).unwrap_or_else(|| {
        log::warn!("Unsupported legacy code page {codepage}, falling back to GBK");
        GBK
    })
}

/// Decode single-byte (or DBCS) code page text.
pub fn decode_codepage(bytes: &[u8], encoding: &'static Encoding) -> DecodedText {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        had_errors,
    }
}

/// Decode UTF-16LE bytes.
///
/// Surrogate pairs are combined; unpaired surrogates and a dangling odd byte
/// are replaced with U+FFFD.
///
/// # Examples
/// ```
/// use oletext::common::encoding::decode_utf16le;
///
/// let bytes = [0x48, 0x00, 0x69, 0x00, 0x3D, 0xD8, 0x00, 0xDE];
/// let decoded = decode_utf16le(&bytes);
/// assert_eq!(decoded.text, "Hi\u{1F600}");
/// assert!(!decoded.had_errors);
/// ```
pub fn decode_utf16le(bytes: &[u8]) -> DecodedText {
    let (text, had_errors) = UTF_16LE.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        had_errors,
    }
}
