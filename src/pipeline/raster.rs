//! Page rasterisation: render every page of a PDF to an on-disk PNG.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! ## Why sequential over pages?
//!
//! One open pdfium document handle is not safe to drive from several threads
//! at once. Rendering walks the pages in order on a single blocking thread;
//! parallelism lives one stage later, in recognition, where each task owns
//! its own input file.
//!
//! Page images are named `{document-base-name}_page_{n}.png` (1-based) and
//! written into the document's own directory. They are owned by the run that
//! created them and deleted by its cleanup guard.

use crate::error::{ExtractError, PageError};
use crate::output::DocumentMetadata;
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything the rasterisation step produced.
#[derive(Debug)]
pub struct RasterBatch {
    /// Successfully written page images, in page order (possibly partial).
    pub images: Vec<PathBuf>,
    /// Pages that failed to render and were skipped.
    pub failures: Vec<PageError>,
    /// Page count of the source document.
    pub page_count: usize,
}

/// Bind to the system pdfium library.
///
/// `pdfium-render` honours `PDFIUM_DYNAMIC_LIB_PATH` before falling back to
/// the platform loader path.
pub(crate) fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| ExtractError::PdfiumBinding(format!("{e:?}")))
}

/// Rasterise every page of the document at a fixed magnification factor.
///
/// A page that fails to render is skipped and recorded in
/// [`RasterBatch::failures`]; the batch continues. Only a document that
/// cannot be opened at all aborts the step.
///
/// # Errors
/// * [`ExtractError::FileNotFound`] — path vanished before rendering started
/// * [`ExtractError::DocumentOpen`] — the container cannot be parsed
pub async fn rasterize_pages(
    pdf_path: &Path,
    scale: f32,
    progress: Option<ProgressCallback>,
) -> Result<RasterBatch, ExtractError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || rasterize_pages_blocking(&path, scale, progress))
        .await
        .map_err(|e| ExtractError::Internal(format!("Raster task panicked: {e}")))?
}

/// Blocking implementation of page rasterisation.
fn rasterize_pages_blocking(
    pdf_path: &Path,
    scale: f32,
    progress: Option<ProgressCallback>,
) -> Result<RasterBatch, ExtractError> {
    if !pdf_path.exists() {
        return Err(ExtractError::FileNotFound {
            path: pdf_path.to_path_buf(),
        });
    }

    let pdfium = bind_pdfium()?;

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ExtractError::DocumentOpen {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    if let Some(ref cb) = progress {
        cb.on_run_start(page_count);
    }

    let base_name = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let output_dir = pdf_path.parent().unwrap_or_else(|| Path::new("."));

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let mut images = Vec::with_capacity(page_count);
    let mut failures = Vec::new();

    for idx in 0..page_count {
        let page_num = idx + 1;
        let output_path = output_dir.join(format!("{base_name}_page_{page_num}.png"));

        match render_page(&pages, idx, &render_config, &output_path) {
            Ok(()) => {
                debug!("Rendered page {} → {}", page_num, output_path.display());
                if let Some(ref cb) = progress {
                    cb.on_page_rendered(page_num, page_count);
                }
                images.push(output_path);
            }
            Err(detail) => {
                warn!("Skipping page {page_num}: {detail}");
                if let Some(ref cb) = progress {
                    cb.on_page_render_error(page_num, page_count, &detail);
                }
                failures.push(PageError::RenderFailed {
                    page: page_num,
                    detail,
                });
            }
        }
    }

    Ok(RasterBatch {
        images,
        failures,
        page_count,
    })
}

/// Render one page to `output_path`. Any failure is a soft, per-page error.
fn render_page(
    pages: &PdfPages<'_>,
    idx: usize,
    render_config: &PdfRenderConfig,
    output_path: &Path,
) -> Result<(), String> {
    let page = pages.get(idx as u16).map_err(|e| format!("{e:?}"))?;

    let bitmap = page
        .render_with_config(render_config)
        .map_err(|e| format!("{e:?}"))?;

    bitmap
        .as_image()
        .save_with_format(output_path, image::ImageFormat::Png)
        .map_err(|e| format!("PNG write failed: {e}"))
}

/// Extract document metadata from a PDF without rendering pages.
pub async fn extract_metadata(pdf_path: &Path) -> Result<DocumentMetadata, ExtractError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path))
        .await
        .map_err(|e| ExtractError::Internal(format!("Metadata task panicked: {e}")))?
}

/// Blocking implementation of metadata extraction.
fn extract_metadata_blocking(pdf_path: &Path) -> Result<DocumentMetadata, ExtractError> {
    let pdfium = bind_pdfium()?;

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ExtractError::DocumentOpen {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_document_fails_before_rendering() {
        let err = rasterize_pages(Path::new("/nonexistent/ghost.pdf"), 2.0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn garbage_document_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"%PDF-1.4 but nothing else").unwrap();

        let err = rasterize_pages(&path, 2.0, None).await.unwrap_err();
        // Without a usable pdfium library the binding error fires first;
        // with one, the corrupt container does.
        assert!(matches!(
            err,
            ExtractError::DocumentOpen { .. } | ExtractError::PdfiumBinding(_)
        ));
    }
}
