//! Text extraction from PPT text atoms.

use crate::common::Extraction;
use crate::common::encoding::{DecodedText, decode_utf16le};
use crate::config::ExtractOptions;
use crate::ole::ppt::package::PptError;
use crate::ole::ppt::records::{RecordHeader, RecordVisitor, RecordWalker};

/// Decode a text atom payload. TextCharsAtom, TextBytesAtom and CString
/// payloads are all read as UTF-16LE.
pub fn parse_text_atom(data: &[u8]) -> DecodedText {
    decode_utf16le(data)
}

/// Strip surrounding whitespace and NUL padding.
fn clean(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}

/// Visitor appending the text of every text atom.
pub struct TextCollector<'a> {
    separator: &'a str,
    out: Extraction,
}

impl<'a> TextCollector<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            separator,
            out: Extraction::new(),
        }
    }

    pub fn finish(self) -> Extraction {
        self.out
    }
}

impl RecordVisitor for TextCollector<'_> {
    fn visit_atom(&mut self, header: &RecordHeader, payload: &[u8], offset: usize) {
        if !header.record_type().is_text_atom() {
            return;
        }
        let decoded = parse_text_atom(payload);
        if decoded.had_errors {
            self.out.warn(PptError::TextDecodeFailure { offset });
        }

        let text = clean(&decoded.text);
        if text.is_empty() {
            return;
        }
        self.out.push_str(text);
        self.out.push_str(self.separator);
    }
}

/// Extract the text of a PowerPoint Document stream.
///
/// Every text atom is appended in stream order followed by the configured
/// separator. Subtrees that fail to parse are skipped and reported as
/// warnings.
pub fn extract_text(stream: &[u8], options: &ExtractOptions) -> Extraction {
    let mut collector = TextCollector::new(&options.ppt_atom_separator);
    let warnings = RecordWalker::new(options.max_record_depth).walk(stream, &mut collector);
    let mut out = collector.finish();
    for warning in warnings {
        out.warn(warning);
    }
    out
}
