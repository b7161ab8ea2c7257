//! Result types returned by the extraction pipeline.
//!
//! [`ExtractionOutput`] is everything a caller gets back from one run: the
//! text itself, which path produced it, per-stage timings, and any soft
//! per-page failures. All types serialise to JSON for the CLI's `--json`
//! mode and for callers that log run reports.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// Which pipeline path produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSource {
    /// Text was embedded in the PDF content streams; OCR was never invoked.
    Embedded,
    /// Pages were rasterised and recognised by the OCR engine.
    Ocr,
}

/// The complete result of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// The extracted text. Embedded text preserves page order; OCR text is
    /// fragments joined with `"\n"` in the order images were processed
    /// (submission order in sequential mode, completion order in concurrent
    /// mode).
    pub text: String,

    /// Which path produced the text.
    pub source: TextSource,

    /// Per-stage counters and timings.
    pub stats: ExtractionStats,

    /// Soft failures: pages that did not rasterise and images that did not
    /// recognise. Non-empty `page_errors` with a non-empty `text` means a
    /// partial result.
    pub page_errors: Vec<PageError>,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Page count the rasteriser saw (0 on the embedded path, which never
    /// opens a page-by-page view).
    pub total_pages: usize,
    /// Page images successfully written to disk (0 on the embedded path).
    pub rendered_pages: usize,
    /// Page images that produced at least one fragment.
    pub recognized_images: usize,
    /// OCR fragments aggregated into the output text.
    pub fragment_count: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
    /// Time spent rasterising (0 on the embedded path).
    pub render_duration_ms: u64,
    /// Time spent in recognition (0 on the embedded path).
    pub ocr_duration_ms: u64,
}

/// Document metadata extracted without running the pipeline.
///
/// Returned by [`crate::extract::inspect`]; needs no OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_serialises_to_json() {
        let output = ExtractionOutput {
            text: "hello".into(),
            source: TextSource::Ocr,
            stats: ExtractionStats {
                total_pages: 2,
                rendered_pages: 2,
                recognized_images: 2,
                fragment_count: 5,
                ..Default::default()
            },
            page_errors: vec![PageError::RenderFailed {
                page: 1,
                detail: "boom".into(),
            }],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"Ocr\""));
        assert!(json.contains("\"fragment_count\":5"));
        assert!(json.contains("RenderFailed"));
    }
}
