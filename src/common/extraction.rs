//! Result of a best-effort text extraction.

use super::error::Error;

/// Text recovered from one document plus every localized failure that was
/// skipped on the way.
///
/// Structural failures never produce an `Extraction`; they are returned as an
/// error instead. Warnings are for units (a piece, a record, a subtree) that
/// were dropped while the rest of the document was still decoded.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Recovered text
    pub text: String,
    /// Failures that were skipped
    pub warnings: Vec<Error>,
}

impl Extraction {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap text that was recovered without any skipped units.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            warnings: Vec::new(),
        }
    }

    #[inline]
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Record a skipped unit.
    pub fn warn(&mut self, err: impl Into<Error>) {
        let err = err.into();
        log::warn!("Skipping corrupt unit: {err}");
        self.warnings.push(err);
    }

    /// Whether nothing had to be skipped.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Byte length of the recovered text.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The opaque text buffer handed back to callers.
    pub fn into_bytes(self) -> Vec<u8> {
        self.text.into_bytes()
    }
}
