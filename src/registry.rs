//! Format dispatch: one text parser per file format.
//!
//! A [`ParserRegistry`] maps each [`FileFormat`] to a [`TextParser`]. The
//! default registry wires the three legacy Office decoders plus a
//! pass-through parser for anything unrecognised.

use crate::common::{Error, Extraction, FileFormat, Result, detect_file_format};
use crate::config::ExtractOptions;
use crate::ole::doc::Package as DocPackage;
use crate::ole::ppt::Package as PptPackage;
use crate::ole::xls::XlsWorkbook;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Extracts plain text from one file.
pub trait TextParser: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn parse(&self, path: &Path, options: &ExtractOptions) -> Result<Extraction>;
}

/// Legacy Word documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocParser;

impl TextParser for DocParser {
    fn name(&self) -> &'static str {
        "doc"
    }

    fn parse(&self, path: &Path, options: &ExtractOptions) -> Result<Extraction> {
        Ok(DocPackage::open_with(path, options)?.extract_text()?)
    }
}

/// Legacy PowerPoint presentations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptParser;

impl TextParser for PptParser {
    fn name(&self) -> &'static str {
        "ppt"
    }

    fn parse(&self, path: &Path, options: &ExtractOptions) -> Result<Extraction> {
        Ok(PptPackage::open_with(path, options)?.extract_text()?)
    }
}

/// Legacy Excel workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsParser;

impl TextParser for XlsParser {
    fn name(&self) -> &'static str {
        "xls"
    }

    fn parse(&self, path: &Path, options: &ExtractOptions) -> Result<Extraction> {
        Ok(XlsWorkbook::open_with(path, options)?.extract_text()?)
    }
}

/// Returns the file's bytes as text, replacing invalid UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughParser;

impl TextParser for PassthroughParser {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn parse(&self, path: &Path, _options: &ExtractOptions) -> Result<Extraction> {
        let bytes = std::fs::read(path)?;
        Ok(Extraction::from_text(String::from_utf8_lossy(&bytes)))
    }
}

/// Maps formats to parsers.
///
/// # Examples
///
/// ```rust,no_run
/// use oletext::{ExtractOptions, ParserRegistry};
///
/// let registry = ParserRegistry::with_defaults();
/// let extraction = registry.parse("report.doc", &ExtractOptions::default())?;
/// println!("{} bytes of text", extraction.len());
/// # Ok::<(), oletext::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<FileFormat, Arc<dyn TextParser>>,
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the DOC, PPT and XLS decoders and the pass-through
    /// parser for unknown files.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FileFormat::Doc, DocParser);
        registry.register(FileFormat::Ppt, PptParser);
        registry.register(FileFormat::Xls, XlsParser);
        registry.register(FileFormat::Unknown, PassthroughParser);
        registry
    }

    /// Register `parser` for `format`.
    ///
    /// The first registration wins; later ones are ignored with a warning.
    /// Returns whether the parser was added.
    pub fn register<P: TextParser + 'static>(&mut self, format: FileFormat, parser: P) -> bool {
        if let Some(existing) = self.parsers.get(&format) {
            log::warn!(
                "Parser for {format} already registered ({}), ignoring {}",
                existing.name(),
                parser.name()
            );
            return false;
        }
        self.parsers.insert(format, Arc::new(parser));
        true
    }

    pub fn get(&self, format: FileFormat) -> Option<&dyn TextParser> {
        self.parsers.get(&format).map(|p| p.as_ref())
    }

    /// Detect the format of `path` and extract its text.
    pub fn parse<P: AsRef<Path>>(&self, path: P, options: &ExtractOptions) -> Result<Extraction> {
        let path = path.as_ref();
        self.parse_as(path, detect_file_format(path), options)
    }

    /// Extract text treating `path` as `format`.
    pub fn parse_as<P: AsRef<Path>>(
        &self,
        path: P,
        format: FileFormat,
        options: &ExtractOptions,
    ) -> Result<Extraction> {
        let path = path.as_ref();
        let parser = self
            .get(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;
        log::debug!("Parsing {} with the {} parser", path.display(), parser.name());
        parser.parse(path, options)
    }

    /// Extract many files in parallel; results keep the input order.
    pub fn extract_many<P>(&self, paths: &[P], options: &ExtractOptions) -> Vec<Result<Extraction>>
    where
        P: AsRef<Path> + Sync,
    {
        paths
            .par_iter()
            .map(|path| self.parse(path, options))
            .collect()
    }
}
