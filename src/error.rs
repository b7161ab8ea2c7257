//! Error types for the pdf2text library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the run cannot produce any text at all
//!   (missing file, unopenable container, OCR engine cannot initialise).
//!   Returned as `Err(ExtractError)` from the top-level `extract*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed to rasterise or a
//!   single page image failed to recognise, but the rest of the document is
//!   fine. Collected in [`crate::output::ExtractionOutput::page_errors`] so
//!   callers can inspect partial success rather than losing the whole
//!   document to one bad page.
//!
//! Soft failures degrade the result but never abort; cleanup of rasterised
//! page images runs on every exit path regardless of which error fires.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2text library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::ExtractionOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF container cannot be parsed/opened at all.
    #[error("Cannot open PDF '{path}': {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    DocumentOpen { path: PathBuf, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// Direct extraction found no embedded text and the OCR fallback is
    /// switched off in the configuration.
    ///
    /// Deliberately distinct from [`ExtractError::NoTextProduced`] so callers
    /// can tell "no text because OCR was disabled" from "no text despite
    /// trying".
    #[error("No embedded text in '{path}' and OCR fallback is disabled.\nEnable OCR to process scanned documents.")]
    OcrDisabled { path: PathBuf },

    /// Recognition was requested for page images that no longer exist on
    /// disk (deleted externally between rasterisation and recognition).
    /// No recognition is attempted when this fires.
    #[error("Page images missing before recognition: {}", format_paths(.paths))]
    MissingImages { paths: Vec<PathBuf> },

    /// The OCR engine could not be initialised for the requested language
    /// (unknown language code, missing trained data).
    #[error("OCR engine failed to initialise for language '{language}': {detail}\nCheck the language code and that the matching .traineddata is installed (see TESSDATA_PREFIX).")]
    EngineInit { language: String, detail: String },

    /// Neither direct extraction nor OCR yielded any usable text.
    #[error("No text could be extracted from '{path}' (document may be empty or unreadable)")]
    NoTextProduced { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium (e.g. from bblanchon/pdfium-binaries) and either place\n\
libpdfium on the loader path or set PDFIUM_DYNAMIC_LIB_PATH to its directory.\n"
    )]
    PdfiumBinding(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A non-fatal error for a single page or page image.
///
/// Collected in [`crate::output::ExtractionOutput`]. The overall run
/// continues; it can still succeed with a partial result as long as at least
/// one page yields text.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Rasterising one page failed; the page was skipped.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Recognising one page image failed; it contributes zero fragments.
    #[error("Image '{}': recognition failed: {detail}", .image.display())]
    RecognizeFailed { image: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_images_names_every_path() {
        let e = ExtractError::MissingImages {
            paths: vec![
                PathBuf::from("/tmp/doc_page_2.png"),
                PathBuf::from("/tmp/doc_page_5.png"),
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("doc_page_2.png"), "got: {msg}");
        assert!(msg.contains("doc_page_5.png"), "got: {msg}");
    }

    #[test]
    fn ocr_disabled_is_distinguishable_from_no_text() {
        let disabled = ExtractError::OcrDisabled {
            path: PathBuf::from("scan.pdf"),
        };
        let empty = ExtractError::NoTextProduced {
            path: PathBuf::from("scan.pdf"),
        };
        assert!(disabled.to_string().contains("disabled"));
        assert!(!empty.to_string().contains("disabled"));
    }

    #[test]
    fn engine_init_display() {
        let e = ExtractError::EngineInit {
            language: "xyz".into(),
            detail: "no traineddata".into(),
        };
        assert!(e.to_string().contains("xyz"));
        assert!(e.to_string().contains("no traineddata"));
    }

    #[test]
    fn render_failed_display() {
        let e = PageError::RenderFailed {
            page: 3,
            detail: "corrupt content stream".into(),
        };
        assert!(e.to_string().contains("Page 3"));
    }
}
