/// PPT record types and parsing.
///
/// This module provides the record header decoder and the depth-bounded
/// walker over the record tree.
pub mod record;

pub use record::{RecordHeader, RecordVisitor, RecordWalker};
