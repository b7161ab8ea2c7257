//! Pipeline orchestrator and public entry points.
//!
//! One run per invocation: try direct extraction, fall back to
//! rasterise-then-OCR, aggregate, clean up. The decision between the two
//! branches is [`DirectText`], an explicit outcome rather than an empty
//! string, so "the PDF has no text layer" can never be conflated with
//! "extraction crashed".
//!
//! The OCR branch installs a [`PageImageGuard`] immediately after
//! rasterisation, before the recogniser is even initialised. From that
//! point every exit path deletes the page images the run created, including
//! a panic unwinding through the recogniser.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{DocumentMetadata, ExtractionOutput, ExtractionStats, TextSource};
use crate::pipeline::cleanup::PageImageGuard;
use crate::pipeline::direct::{self, DirectText};
use crate::pipeline::ocr::{self, TesseractRecognizer, TextRecognizer};
use crate::pipeline::{input, raster};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Extract the text of a PDF document, using OCR when it has no embedded
/// text layer.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — path to a PDF file the caller keeps alive for the duration
///   of the call; the pipeline never mutates it
/// * `config` — run configuration
///
/// # Returns
/// `Ok(ExtractionOutput)` on success, even when some pages failed (check
/// `output.page_errors`).
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal conditions: missing or
/// unreadable file, unopenable container, OCR disabled with no embedded
/// text, engine-init failure, or no text produced at all.
pub async fn extract(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let total_start = Instant::now();

    // ── Step 1: Validate input ───────────────────────────────────────────
    let pdf_path = input::validate_document(input.as_ref())?;
    info!("Starting extraction: {}", pdf_path.display());

    // ── Step 2: Direct extraction (short-circuit) ────────────────────────
    if let DirectText::Found(text) = direct::extract_embedded_text(&pdf_path).await {
        info!("Embedded text found ({} bytes), OCR skipped", text.len());
        return Ok(ExtractionOutput {
            text,
            source: TextSource::Embedded,
            stats: ExtractionStats {
                total_duration_ms: total_start.elapsed().as_millis() as u64,
                ..Default::default()
            },
            page_errors: Vec::new(),
        });
    }

    // ── Step 3: OCR permission gate ──────────────────────────────────────
    if !config.allow_ocr {
        info!("No embedded text and OCR is disabled, failing fast");
        return Err(ExtractError::OcrDisabled { path: pdf_path });
    }

    // ── Step 4: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let batch =
        raster::rasterize_pages(&pdf_path, config.scale, config.progress_callback.clone()).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {}/{} pages in {}ms",
        batch.images.len(),
        batch.page_count,
        render_duration_ms
    );

    let mut page_errors = batch.failures;
    if batch.images.is_empty() {
        warn!("Rasterisation produced no images");
        return Err(ExtractError::NoTextProduced { path: pdf_path });
    }

    // ── Step 5: Install cleanup guard ────────────────────────────────────
    // Before recogniser init, so even an EngineInit failure leaves no
    // page images behind.
    let rendered_pages = batch.images.len();
    let _guard = PageImageGuard::new(batch.images.clone());

    // ── Step 6: Resolve recogniser ───────────────────────────────────────
    let recognizer = resolve_recognizer(config).await?;

    // ── Step 7: Recognise page images ────────────────────────────────────
    let ocr_start = Instant::now();
    let outcome = ocr::recognize_images(
        &recognizer,
        &batch.images,
        config.parallel_ocr,
        config.concurrency,
        config.progress_callback.clone(),
    )
    .await?;
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    let failed_images = outcome.failures.len();
    let recognized_images = rendered_pages - failed_images;
    page_errors.extend(outcome.failures);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(rendered_pages, recognized_images);
    }

    // ── Step 8: Aggregate ────────────────────────────────────────────────
    if outcome.fragments.is_empty() {
        warn!("Recognition yielded no fragments");
        return Err(ExtractError::NoTextProduced { path: pdf_path });
    }

    let stats = ExtractionStats {
        total_pages: batch.page_count,
        rendered_pages,
        recognized_images,
        fragment_count: outcome.fragments.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        ocr_duration_ms,
    };
    info!(
        "Extraction complete: {} fragments from {}/{} images, {}ms total",
        stats.fragment_count, recognized_images, rendered_pages, stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        text: outcome.fragments.join("\n"),
        source: TextSource::Ocr,
        stats,
        page_errors,
    })
    // _guard drops here: page images removed on this and every earlier
    // return path after step 5.
}

/// Extract text and write it directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let output = extract(input, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, &output.text)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract(input, config))
}

/// Extract text from PDF bytes in memory.
///
/// This is the seam an HTTP upload handler uses: the bytes land in a managed
/// [`tempfile`] that is cleaned up automatically on return or panic — the
/// temp document's lifecycle is independent of (and in addition to) the
/// pipeline's own page-image cleanup.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_path_buf();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(&path, config).await
}

/// Extract document metadata without running the pipeline.
///
/// Needs no OCR engine and renders nothing.
pub async fn inspect(input: impl AsRef<Path>) -> Result<DocumentMetadata, ExtractError> {
    let pdf_path = input::validate_document(input.as_ref())?;
    raster::extract_metadata(&pdf_path).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the recogniser, from most-specific to least-specific.
///
/// 1. **Pre-built recogniser** (`config.recognizer`) — the caller
///    constructed the engine entirely; used as-is. This is what tests inject
///    to observe (or forbid) recognition calls.
/// 2. **Language-based Tesseract** — initialised for `config.language`,
///    probing the engine once so an unknown language fails the run with
///    [`ExtractError::EngineInit`] before any recognition is attempted.
async fn resolve_recognizer(
    config: &ExtractionConfig,
) -> Result<Arc<dyn TextRecognizer>, ExtractError> {
    if let Some(ref recognizer) = config.recognizer {
        return Ok(Arc::clone(recognizer));
    }

    let language = config.language.clone();
    let datapath = config.datapath.clone();

    // Engine init is blocking FFI.
    tokio::task::spawn_blocking(move || {
        TesseractRecognizer::new(&language, datapath.as_deref())
            .map(|r| Arc::new(r) as Arc<dyn TextRecognizer>)
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Recognizer init task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_input_is_file_not_found() {
        let config = ExtractionConfig::default();
        let err = extract("/nonexistent/ghost.pdf", &config).await.unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn non_pdf_bytes_are_rejected() {
        let config = ExtractionConfig::default();
        let err = extract_from_bytes(b"PK\x03\x04 zip, not pdf", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }));
    }
}
