//! Document text extraction
//!
//! Turns an uploaded file (plain text, PDF, or DOCX) into the plain text that
//! is handed to the prompt builder. The file kind is resolved once from the
//! declared MIME type and file name, then handled by exhaustive match.

mod docx;
mod pdf;

pub use pdf::assemble_pages;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Upload extensions offered to the user
pub const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "txt", "md", "json", "pdf", "docx"];

/// Message shown for every extraction failure
pub const EXTRACTION_FAILED: &str = "Failed to read file. Please ensure it is a valid text, PDF, or DOCX file.";

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const ZIP_MIME: &str = "application/zip";

/// How many leading bytes to inspect when sniffing a MIME type
const SNIFF_LEN: usize = 8192;

/// Extraction failed; the display text is the fixed user-facing message
#[derive(Debug, Error)]
#[error("{}", EXTRACTION_FAILED)]
pub struct ExtractionError {
    pub path: PathBuf,
    #[source]
    pub cause: ExtractionCause,
}

/// Internal reason an extraction failed (logged, never shown)
#[derive(Debug, Error)]
pub enum ExtractionCause {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("extraction task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// The closed set of file kinds the extractor knows how to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    Docx,
    /// Recognized binary type we cannot read; carries the MIME type
    Unsupported(String),
}

impl DocumentKind {
    /// Resolve the kind from a declared MIME type, falling back to the extension
    pub fn resolve(mime: Option<&str>, file_name: &str) -> Self {
        debug!(?mime, %file_name, "DocumentKind::resolve: called");
        if let Some(mime) = mime {
            let mime = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            match mime.as_str() {
                PDF_MIME => return Self::Pdf,
                DOCX_MIME => return Self::Docx,
                "application/json" => return Self::PlainText,
                m if m.starts_with("text/") => return Self::PlainText,
                // Generic containers say nothing useful; DOCX files sniff as zip
                "" | ZIP_MIME | "application/octet-stream" => {
                    debug!(%mime, "DocumentKind::resolve: generic MIME, using extension");
                }
                other => {
                    debug!(%other, "DocumentKind::resolve: unsupported MIME");
                    return Self::Unsupported(other.to_string());
                }
            }
        }

        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::PlainText,
        }
    }
}

/// Guess a document MIME type from the file's magic bytes
///
/// Only PDF, DOCX, and zip container guesses are reported. Any other match
/// is dropped, so a sniffed type can never make a file `Unsupported`.
pub fn sniff_mime(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let mut buffer = vec![0u8; SNIFF_LEN];
    let read = file.read(&mut buffer).ok()?;
    let guess = infer::get(&buffer[..read]).map(|t| t.mime_type());
    let mime = guess
        .filter(|m| matches!(*m, PDF_MIME | DOCX_MIME | ZIP_MIME))
        .map(str::to_string);
    debug!(?path, ?guess, ?mime, "sniff_mime: detected");
    mime
}

/// Extract plain text from a file, blocking the current thread
pub fn extract_blocking(path: &Path, mime: Option<&str>) -> Result<String, ExtractionError> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let kind = DocumentKind::resolve(mime, file_name);
    info!(?path, ?kind, "Extracting document text");

    let result = match &kind {
        DocumentKind::PlainText => read_text(path),
        DocumentKind::Pdf => pdf::extract_pdf(path),
        DocumentKind::Docx => docx::extract_docx(path),
        DocumentKind::Unsupported(mime) => Err(ExtractionCause::Unsupported(mime.clone())),
    };

    result
        .inspect(|text| debug!(chars = text.len(), "extract_blocking: success"))
        .map_err(|cause| {
            warn!(?path, error = %cause, "File parsing error");
            ExtractionError {
                path: path.to_path_buf(),
                cause,
            }
        })
}

/// Extract plain text from a file on the blocking thread pool
pub async fn extract(path: &Path, mime: Option<&str>) -> Result<String, ExtractionError> {
    let owned_path = path.to_path_buf();
    let owned_mime = mime.map(str::to_string);
    tokio::task::spawn_blocking(move || extract_blocking(&owned_path, owned_mime.as_deref()))
        .await
        .map_err(|e| {
            warn!(?path, error = %e, "extract: worker failed");
            ExtractionError {
                path: path.to_path_buf(),
                cause: ExtractionCause::Worker(e),
            }
        })?
}

fn read_text(path: &Path) -> Result<String, ExtractionCause> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}
