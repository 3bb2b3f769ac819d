//! DOCX text extraction via docx-lite

use std::path::Path;

use tracing::{debug, warn};

use super::ExtractionCause;

/// Extract the raw body text of a Word document
pub(super) fn extract_docx(path: &Path) -> Result<String, ExtractionCause> {
    let text = docx_lite::extract_text(path).map_err(|e| ExtractionCause::Docx(e.to_string()))?;

    if text.trim().is_empty() {
        warn!(?path, "extract_docx: document contains no text");
    } else {
        debug!(?path, chars = text.len(), "extract_docx: success");
    }

    Ok(text)
}
