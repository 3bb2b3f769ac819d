//! PDF text extraction via lopdf

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::ExtractionCause;

/// Extract every page's text and join the pages in page order
pub(super) fn extract_pdf(path: &Path) -> Result<String, ExtractionCause> {
    let doc = Document::load(path)?;
    let pages = doc.get_pages();
    debug!(?path, page_count = pages.len(), "extract_pdf: loaded document");

    let mut texts = Vec::with_capacity(pages.len());
    for &number in pages.keys() {
        let text = doc.extract_text(&[number])?;
        debug!(page = number, chars = text.len(), "extract_pdf: extracted page");
        texts.push((number, text));
    }

    Ok(assemble_pages(texts))
}

/// Join per-page text in ascending page order, separated by a blank line
///
/// Pages may be supplied in any order.
pub fn assemble_pages(mut pages: Vec<(u32, String)>) -> String {
    pages.sort_by_key(|(number, _)| *number);
    pages
        .into_iter()
        .map(|(_, text)| text.trim().to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}
