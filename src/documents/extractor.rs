use pdf_extract::{Document, OutputError, PlainTextOutput};

use super::ExtractionError;

/// Turns PDF bytes into text, page by page.
///
/// Each page comes back as its ordered text items; pages are in ascending
/// page order. Joining is left to the caller.
pub trait TextExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, ExtractionError>;
}

/// Extractor backed by `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, ExtractionError> {
        // pdf-extract panics on some malformed inputs
        let pages = std::panic::catch_unwind(|| read_pages(bytes))
            .map_err(|_| ExtractionError::Panicked)?
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        tracing::debug!("Extracted text from {} pages", pages.len());

        Ok(pages.iter().map(|page| page_items(page)).collect())
    }
}

/// Text of every page in the page tree. A page that fails fails the document.
fn read_pages(bytes: &[u8]) -> Result<Vec<String>, OutputError> {
    let mut doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        doc.decrypt("")?;
    }

    collect_pages(doc.get_pages().into_keys(), |page_num| {
        let mut text = String::new();
        {
            let mut output = PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(&doc, &mut output, page_num)?;
        }
        Ok(text)
    })
}

fn collect_pages<F>(
    page_numbers: impl IntoIterator<Item = u32>,
    read_page: F,
) -> Result<Vec<String>, OutputError>
where
    F: FnMut(u32) -> Result<String, OutputError>,
{
    page_numbers.into_iter().map(read_page).collect()
}

/// pdf-extract has no notion of text items; each non-blank output line stands in for one.
fn page_items(page: &str) -> Vec<String> {
    page.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
