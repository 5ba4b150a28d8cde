use anyhow::Result;
use std::panic::{self, AssertUnwindSafe};

const PAGE_BREAK: &str = "\n\n";

/// Turns uploaded PDF bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        // pdf_extract panics on some malformed inputs instead of returning an error
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }));

        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(anyhow::anyhow!("{}", e)),
            Err(_) => Err(anyhow::anyhow!("the PDF library aborted on a malformed document")),
        }
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocumentProcessor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        log::info!("Processing PDF upload ({} bytes)", bytes.len());

        let pages = self.extract_pages(bytes)?;
        let page_count = pages.len();
        let content = concat_pages(pages.iter().map(|page| strip_page_break(page).to_string()));

        log::info!(
            "Extracted {} characters from {} pages",
            content.chars().count(),
            page_count
        );
        Ok(content)
    }
}

/// pdf_extract opens every page's text with a "\n\n" page break.
fn strip_page_break(page: &str) -> &str {
    page.strip_prefix(PAGE_BREAK).unwrap_or(page)
}

/// Joins page texts in document order with no separator.
pub fn concat_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = String>,
{
    pages.into_iter().collect()
}
