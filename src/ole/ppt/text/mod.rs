//! Text extraction utilities for PPT records.

pub mod extractor;

pub use extractor::{TextCollector, extract_text, parse_text_atom};
