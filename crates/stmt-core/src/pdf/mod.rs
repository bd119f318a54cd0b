//! PDF statement text source.

mod extractor;

pub use extractor::{PdfExtractor, PdfPage};

use crate::error::PdfError;
use crate::models::{PdfConfig, RawLine};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text of every page, in page order.
    fn extract_pages(&self) -> Result<Vec<PdfPage>>;

    /// Extract numbered statement lines, honouring the page limit.
    ///
    /// An empty result means the document has no text layer; that is not an
    /// error here.
    fn extract_lines(&self, config: &PdfConfig) -> Result<Vec<RawLine>> {
        let mut pages = self.extract_pages()?;
        if config.max_pages > 0 {
            pages.truncate(config.max_pages);
        }

        let text_len: usize = pages.iter().map(|p| p.text.trim().len()).sum();
        if text_len < config.min_text_length {
            return Ok(Vec::new());
        }

        Ok(pages
            .iter()
            .flat_map(|p| RawLine::from_page(p.number, &p.text))
            .collect())
    }
}
