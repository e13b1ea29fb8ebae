//! Text extraction from DOC files.
//!
//! Walks the piece table one piece at a time in ascending CP order, so a
//! request never crosses a piece boundary. A piece that cannot be decoded is
//! skipped and recorded as a warning; the remaining pieces still contribute.
use super::super::package::DocError;
use super::piece_table::Clx;
use crate::common::Extraction;
use crate::common::encoding::legacy_encoding;
use crate::config::ExtractOptions;
use encoding_rs::Encoding;

/// Piece-by-piece text extractor.
pub struct TextExtractor<'a> {
    clx: &'a Clx,
    word_document: &'a [u8],
    encoding: &'static Encoding,
}

impl<'a> TextExtractor<'a> {
    pub fn new(clx: &'a Clx, word_document: &'a [u8], options: &ExtractOptions) -> Self {
        Self {
            clx,
            word_document,
            encoding: legacy_encoding(options.legacy_codepage),
        }
    }

    /// Sweep every piece and concatenate the decoded text.
    ///
    /// With `limit`, only the first `limit` characters after `cp[0]` are
    /// swept (the main document text when given `ccpText`).
    pub fn extract(&self, limit: Option<u32>) -> Extraction {
        let plc = self.clx.plc();
        let first = plc.cp_range().start;
        let stop = limit.map(|ccp| first.saturating_add(ccp));
        let mut out = Extraction::new();

        for index in 0..plc.piece_count() {
            let Some(range) = plc.piece_range(index) else {
                break;
            };
            let end = match stop {
                Some(stop) if range.start >= stop => break,
                Some(stop) => range.end.min(stop),
                None => range.end,
            };
            if range.start == end {
                continue;
            }

            match self
                .clx
                .decode_run(range.start, end - range.start, self.word_document, self.encoding)
            {
                Ok(decoded) => {
                    if decoded.had_errors {
                        out.warn(DocError::TextDecodeFailure { cp: range.start });
                    }
                    out.push_str(&decoded.text);
                },
                Err(e) => out.warn(e),
            }
        }

        out
    }
}
