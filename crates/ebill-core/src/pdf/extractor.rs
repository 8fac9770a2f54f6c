//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf for structure and pdf-extract for text.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Page texts concatenated in page order.
    pub text: String,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

/// Content from a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn extract_with_lopdf(&self) -> Result<Vec<String>> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        doc.get_pages()
            .keys()
            .map(|&number| {
                trace!("lopdf text extraction for page {}", number);
                doc.extract_text(&[number])
                    .map_err(|e| PdfError::TextExtraction(e.to_string()))
            })
            .collect()
    }
}

/// Join page texts in page order, skipping blank pages.
pub fn concat_pages(pages: &[PdfPage]) -> String {
    let mut full_text = String::new();
    for page in pages {
        if page.text.trim().is_empty() {
            continue;
        }
        if !full_text.is_empty() {
            full_text.push_str("\n\n");
        }
        full_text.push_str(&page.text);
    }
    full_text
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Result<PdfContent> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let texts = match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
            Ok(texts) if texts.len() == page_count as usize => texts,
            Ok(texts) => {
                warn!(
                    "pdf-extract returned {} pages for a {}-page document, using lopdf",
                    texts.len(),
                    page_count
                );
                self.extract_with_lopdf()?
            }
            Err(e) => {
                debug!("pdf-extract failed ({}), using lopdf", e);
                self.extract_with_lopdf()?
            }
        };

        let pages: Vec<PdfPage> = texts
            .into_iter()
            .zip(1..)
            .map(|(text, number)| PdfPage { number, text })
            .collect();

        let text = concat_pages(&pages);
        debug!("PDF text: {} pages, {} chars", pages.len(), text.chars().count());

        Ok(PdfContent { text, pages })
    }
}
