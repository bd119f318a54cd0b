//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
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

    /// Load a PDF from bytes into a fresh extractor.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Per-page text through lopdf's own content stream decoder.
    fn extract_pages_lopdf(&self, doc: &Document) -> Vec<PdfPage> {
        doc.get_pages()
            .keys()
            .map(|&number| PdfPage {
                number,
                text: doc.extract_text(&[number]).unwrap_or_default(),
            })
            .collect()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Statements are often "encrypted" with an empty user password.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes.
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

    fn extract_pages(&self) -> Result<Vec<PdfPage>> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        let pages = match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
            Ok(texts) => texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| PdfPage {
                    number: i as u32 + 1,
                    text,
                })
                .collect(),
            Err(e) => {
                warn!("pdf-extract failed ({}), using lopdf text extraction", e);
                self.extract_pages_lopdf(doc)
            }
        };

        for page in &pages {
            debug!("Page {}: {} lines", page.number, page.text.lines().count());
        }

        if pages.is_empty() {
            return Err(PdfError::TextExtraction("no pages yielded text".to_string()));
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PdfConfig;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_extract_without_document() {
        let extractor = PdfExtractor::new();
        assert!(matches!(extractor.extract_pages(), Err(PdfError::Parse(_))));
        assert!(extractor.extract_lines(&PdfConfig::default()).is_err());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            PdfExtractor::from_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
