//! Loading bill documents from disk.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::pdf::{PdfExtractor, PdfPage, PdfProcessor};
use crate::table::{detect_tables, TableSpec, TextTable};
use crate::text::normalize;

/// One bill file with its extracted text and tables.
#[derive(Debug, Clone)]
pub struct BillDocument {
    /// Path of the source file.
    pub path: PathBuf,
    /// Normalized text of all pages, in page order.
    pub text: String,
    /// Raw text per page of the source file.
    pub pages: Vec<PdfPage>,
    /// Tables detected in the normalized text.
    pub tables: Vec<TextTable>,
}

impl BillDocument {
    /// Build a document from raw page texts.
    pub fn from_pages(path: impl Into<PathBuf>, pages: Vec<PdfPage>, specs: &[TableSpec]) -> Self {
        let raw = crate::pdf::concat_pages(&pages);
        let text = normalize(&raw);
        let tables = detect_tables(&text, specs);

        Self {
            path: path.into(),
            text,
            pages,
            tables,
        }
    }

    /// Build a single-page document from text, e.g. a saved text dump.
    pub fn from_text(path: impl Into<PathBuf>, text: &str, specs: &[TableSpec]) -> Self {
        let page = PdfPage {
            number: 1,
            text: text.to_string(),
        };
        Self::from_pages(path, vec![page], specs)
    }

    /// Split into one document per bill.
    ///
    /// Every match of `signature` after the first starts a new bill; text
    /// ahead of the first match stays with the first bill. Tables are
    /// detected again within each bill, so no bill sees another's rows.
    pub fn split_bills(&self, signature: &Regex, specs: &[TableSpec]) -> Vec<BillDocument> {
        let mut bounds: Vec<usize> = signature
            .find_iter(&self.text)
            .skip(1)
            .map(|m| m.start())
            .collect();
        if bounds.is_empty() {
            return vec![self.clone()];
        }

        bounds.insert(0, 0);
        bounds.push(self.text.len());
        bounds
            .windows(2)
            .map(|w| {
                let text = self.text[w[0]..w[1]].trim();
                BillDocument {
                    path: self.path.clone(),
                    text: text.to_string(),
                    pages: self.pages.clone(),
                    tables: detect_tables(text, specs),
                }
            })
            .collect()
    }

    /// File name for reporting.
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    /// Table by spec name.
    pub fn table(&self, name: &str) -> Option<&TextTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// File name of a path, falling back to the full path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Turns a file path into a [`BillDocument`].
pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<BillDocument, LoadError>;

    /// Load files lazily, one at a time, in the given order.
    fn load_each<'a>(
        &'a self,
        paths: &'a [PathBuf],
    ) -> impl Iterator<Item = (&'a Path, Result<BillDocument, LoadError>)> + 'a
    where
        Self: Sized,
    {
        paths.iter().map(move |path| (path.as_path(), self.load(path)))
    }
}

/// Loads PDF files via [`PdfExtractor`].
pub struct PdfLoader {
    specs: Vec<TableSpec>,
}

impl PdfLoader {
    /// Create a loader that detects the given tables.
    pub fn new(specs: &[TableSpec]) -> Self {
        Self {
            specs: specs.to_vec(),
        }
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<BillDocument, LoadError> {
        info!("Loading {}", path.display());

        let data = fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut extractor = PdfExtractor::new();
        extractor.load(&data)?;
        let content = extractor.extract_pages()?;

        if content.text.trim().is_empty() {
            return Err(LoadError::NoText);
        }

        let document = BillDocument::from_pages(path, content.pages, &self.specs);
        debug!(
            "{}: {} chars, {} tables",
            document.file_name(),
            document.text.chars().count(),
            document.tables.len()
        );
        Ok(document)
    }
}
