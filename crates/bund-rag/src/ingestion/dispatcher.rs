//! Extension-based format dispatch

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::DocumentFormat;

use super::parser::{loader_for, DocumentLoader};

/// Maps file extensions to formats and formats to loaders
#[derive(Debug, Clone)]
pub struct FormatDispatcher {
    registry: HashMap<String, DocumentFormat>,
}

impl FormatDispatcher {
    /// Dispatcher with the default extension table
    pub fn new() -> Self {
        Self::empty()
            .with_extension("json", DocumentFormat::Json)
            .with_extension("pdf", DocumentFormat::Pdf)
            .with_extension("html", DocumentFormat::Html)
            .with_extension("htm", DocumentFormat::Html)
            .with_extension("docx", DocumentFormat::Word)
            .with_extension("doc", DocumentFormat::Word)
            .with_extension("md", DocumentFormat::Markdown)
            .with_extension("markdown", DocumentFormat::Markdown)
            .with_extension("txt", DocumentFormat::Text)
    }

    /// Dispatcher with nothing registered
    pub fn empty() -> Self {
        Self {
            registry: HashMap::new(),
        }
    }

    /// Register (or re-point) an extension, without the leading dot
    pub fn with_extension(mut self, extension: &str, format: DocumentFormat) -> Self {
        self.registry
            .insert(extension.trim_start_matches('.').to_lowercase(), format);
        self
    }

    /// Resolve a filename's format from its extension (case-insensitive)
    pub fn format_for(&self, filename: &str) -> Result<DocumentFormat> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| Error::UnsupportedFormat(format!("'{}' has no file extension", filename)))?;

        self.registry
            .get(&extension)
            .copied()
            .ok_or_else(|| Error::UnsupportedFormat(format!(".{} ({})", extension, filename)))
    }

    /// Resolve the loader for a filename
    pub fn dispatch(&self, filename: &str) -> Result<&'static dyn DocumentLoader> {
        self.format_for(filename).map(loader_for)
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

impl Default for FormatDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
