//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type. Nested OLE and IO failures are
//! flattened so callers match on one level only.

use super::types::Error;
use crate::ole::OleError;
use crate::ole::doc::DocError;
use crate::ole::ppt::PptError;
use crate::ole::xls::XlsError;

impl From<OleError> for Error {
    fn from(err: OleError) -> Self {
        match err {
            OleError::Io(e) => Error::Io(e),
            other => Error::Ole(other),
        }
    }
}

impl From<DocError> for Error {
    fn from(err: DocError) -> Self {
        match err {
            DocError::Ole(ole_err) => Error::from(ole_err),
            other => Error::Doc(other),
        }
    }
}

impl From<PptError> for Error {
    fn from(err: PptError) -> Self {
        match err {
            PptError::Ole(ole_err) => Error::from(ole_err),
            other => Error::Ppt(other),
        }
    }
}

impl From<XlsError> for Error {
    fn from(err: XlsError) -> Self {
        match err {
            XlsError::Ole(ole_err) => Error::from(ole_err),
            other => Error::Xls(other),
        }
    }
}
