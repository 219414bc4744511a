//! Document text extraction for uploaded résumés.
//!
//! Never fails: encrypted, corrupt or image-only PDFs all come back as an
//! empty string, and the caller decides whether that rejects the upload.

use bytes::Bytes;
use tracing::{debug, error, warn};

/// Extracts text from PDF bytes on a blocking thread.
pub async fn extract_document_text(bytes: Bytes) -> String {
    match tokio::task::spawn_blocking(move || extract_pdf_text(&bytes)).await {
        Ok(text) => text,
        Err(e) => {
            error!("PDF extraction task failed: {e}");
            String::new()
        }
    }
}

/// Synchronous extraction. `pdf-extract` can panic on malformed input, so the
/// parser call is isolated with `catch_unwind`.
pub fn extract_pdf_text(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {e}");
            return String::new();
        }
        Err(_) => {
            warn!("PDF parser panicked on malformed input");
            return String::new();
        }
    };

    // pdf-extract separates pages with form feeds
    let text = text
        .split('\x0c')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        error!("No text extracted from PDF");
    } else {
        debug!("Total extracted text: {} characters", text.len());
    }
    text
}
