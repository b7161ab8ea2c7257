//! Direct text extraction: read text already embedded in the PDF content
//! streams, page by page, without rendering or recognition.
//!
//! ## Why swallow errors here?
//!
//! Any failure opening or reading the document is treated the same as "no
//! embedded text": the pipeline falls through to the OCR branch instead of
//! aborting. A scanned PDF with a slightly corrupt text layer is still worth
//! an OCR attempt. The failure is logged so it stays observable.

use crate::pipeline::raster::bind_pdfium;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of the direct extraction pass.
///
/// An explicit enum rather than an empty string, so "document has no text
/// layer" cannot be conflated with "extraction returned an empty success".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectText {
    /// Embedded text was found: pages concatenated in document order.
    Found(String),
    /// No usable embedded text (empty, whitespace-only, or extraction
    /// failed). Triggers the OCR fallback.
    Absent,
}

/// Pull embedded text from every page of the document, in page order.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound and
/// not async-safe. Never returns an error: failures map to
/// [`DirectText::Absent`] with a `warn!` diagnostic.
pub async fn extract_embedded_text(pdf_path: &Path) -> DirectText {
    let path = pdf_path.to_path_buf();

    match tokio::task::spawn_blocking(move || extract_embedded_blocking(&path)).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Direct extraction task panicked: {e}");
            DirectText::Absent
        }
    }
}

/// Blocking implementation of the embedded-text pass.
fn extract_embedded_blocking(pdf_path: &Path) -> DirectText {
    let pdfium = match bind_pdfium() {
        Ok(p) => p,
        Err(e) => {
            warn!("Direct extraction skipped, pdfium unavailable: {e}");
            return DirectText::Absent;
        }
    };

    let document = match pdfium.load_pdf_from_file(pdf_path, None) {
        Ok(d) => d,
        Err(e) => {
            warn!(
                "Direct extraction failed to open '{}' ({e:?}), falling through to OCR",
                pdf_path.display()
            );
            return DirectText::Absent;
        }
    };

    let mut text = String::new();
    for page in document.pages().iter() {
        match page.text() {
            Ok(page_text) => text.push_str(&page_text.all()),
            Err(e) => {
                // One unreadable text layer does not disqualify the rest.
                warn!("Skipping unreadable text layer on one page: {e:?}");
            }
        }
    }

    if text.trim().is_empty() {
        debug!("No embedded text in '{}'", pdf_path.display());
        DirectText::Absent
    } else {
        debug!(
            "Found {} bytes of embedded text in '{}'",
            text.len(),
            pdf_path.display()
        );
        DirectText::Found(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_absent_not_error() {
        let result = extract_embedded_text(Path::new("/nonexistent/ghost.pdf")).await;
        assert_eq!(result, DirectText::Absent);
    }

    #[test]
    fn found_and_absent_are_distinct() {
        assert_ne!(DirectText::Found(String::new()), DirectText::Absent);
    }
}
