//! Unified error types for oletext.
//!
//! Each format layer keeps its own error enum; this module folds them into a
//! single [`Error`] and classifies every failure with an [`ErrorKind`].

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, ErrorKind, Result};
