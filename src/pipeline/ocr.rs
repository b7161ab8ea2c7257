//! OCR dispatch: recognise text in rasterised page images.
//!
//! The engine sits behind the [`TextRecognizer`] trait so callers (and
//! tests) can inject their own recogniser through
//! [`crate::config::ExtractionConfigBuilder::recognizer`]; the default is
//! Tesseract via [`TesseractRecognizer`].
//!
//! ## Execution modes
//!
//! * **Concurrent** — one `spawn_blocking` task per image, bounded by
//!   `buffer_unordered(concurrency)`. Fragments aggregate in task-completion
//!   order, which is *not* necessarily page order; that non-determinism is
//!   part of the contract, not a bug to re-sort away.
//! * **Sequential** — strict images-as-submitted order.
//!
//! In both modes an image that fails to recognise contributes zero fragments
//! and does not abort the batch.

use crate::error::{ExtractError, PageError};
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A text-recognition engine for single images.
///
/// `recognize` returns the ordered text fragments found in one image (the
/// engine's internal reading order is preserved within an image). The error
/// side is a plain human-readable detail string; batch recognition demotes
/// it to a soft [`PageError::RecognizeFailed`].
///
/// Implementations must be `Send + Sync`: in concurrent mode one shared
/// instance is called from several blocking threads at once.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<Vec<String>, String>;
}

/// The default recogniser: Tesseract, bound to one language per run.
///
/// Construction probes engine initialisation once so an unknown language or
/// missing trained data fails the run up front with
/// [`ExtractError::EngineInit`], before any recognition is attempted.
/// Each `recognize` call then builds its own engine instance — the
/// `tesseract` API consumes the handle per image, and separate instances are
/// what make concurrent recognition safe.
pub struct TesseractRecognizer {
    language: String,
    datapath: Option<String>,
}

impl TesseractRecognizer {
    /// Create a recogniser for `language`, verifying the engine initialises.
    ///
    /// `datapath` overrides the trained-data directory; `None` defers to
    /// `TESSDATA_PREFIX` and the compiled default.
    pub fn new(language: &str, datapath: Option<&Path>) -> Result<Self, ExtractError> {
        let datapath = datapath.map(|p| p.to_string_lossy().into_owned());

        tesseract::Tesseract::new(datapath.as_deref(), Some(language)).map_err(|e| {
            ExtractError::EngineInit {
                language: language.to_string(),
                detail: e.to_string(),
            }
        })?;

        Ok(Self {
            language: language.to_string(),
            datapath,
        })
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &Path) -> Result<Vec<String>, String> {
        let text = tesseract::Tesseract::new(self.datapath.as_deref(), Some(&self.language))
            .map_err(|e| format!("init: {e}"))?
            .set_image(&image.to_string_lossy())
            .map_err(|e| format!("set_image: {e}"))?
            .recognize()
            .map_err(|e| format!("recognize: {e}"))?
            .get_text()
            .map_err(|e| format!("get_text: {e}"))?;

        // One fragment per non-empty line; aggregation joins with "\n".
        Ok(text
            .lines()
            .map(|l| l.trim_end().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

/// Everything the recognition step produced.
#[derive(Debug, Default)]
pub struct OcrOutcome {
    /// Flattened fragments in the order images were processed.
    pub fragments: Vec<String>,
    /// Images that failed to recognise (zero fragments contributed).
    pub failures: Vec<PageError>,
}

/// Run recognition over every page image.
///
/// Fails fast with [`ExtractError::MissingImages`] — naming every missing
/// path — if any input no longer exists on disk; no recognition is attempted
/// in that case.
pub async fn recognize_images(
    recognizer: &Arc<dyn TextRecognizer>,
    images: &[PathBuf],
    parallel: bool,
    concurrency: usize,
    progress: Option<ProgressCallback>,
) -> Result<OcrOutcome, ExtractError> {
    let missing: Vec<PathBuf> = images.iter().filter(|p| !p.exists()).cloned().collect();
    if !missing.is_empty() {
        return Err(ExtractError::MissingImages { paths: missing });
    }

    let total = images.len();
    debug!(
        "Recognising {total} page images ({} mode)",
        if parallel { "concurrent" } else { "sequential" }
    );

    let results: Vec<(PathBuf, Result<Vec<String>, String>)> = if parallel {
        recognize_concurrent(recognizer, images, concurrency, progress).await
    } else {
        recognize_sequential(recognizer, images, progress).await
    };

    let mut outcome = OcrOutcome::default();
    for (image, result) in results {
        match result {
            Ok(fragments) => outcome.fragments.extend(fragments),
            Err(detail) => {
                warn!("Recognition failed for '{}': {detail}", image.display());
                outcome.failures.push(PageError::RecognizeFailed { image, detail });
            }
        }
    }
    Ok(outcome)
}

/// Recognise one image on the blocking pool; panics demote to a soft error.
async fn recognize_one(
    recognizer: Arc<dyn TextRecognizer>,
    image: PathBuf,
) -> (PathBuf, Result<Vec<String>, String>) {
    let task_image = image.clone();
    let result = tokio::task::spawn_blocking(move || recognizer.recognize(&task_image))
        .await
        .unwrap_or_else(|e| Err(format!("recognition task panicked: {e}")));
    (image, result)
}

/// Concurrent mode: bounded worker pool, completion-order results.
async fn recognize_concurrent(
    recognizer: &Arc<dyn TextRecognizer>,
    images: &[PathBuf],
    concurrency: usize,
    progress: Option<ProgressCallback>,
) -> Vec<(PathBuf, Result<Vec<String>, String>)> {
    let total = images.len();
    let done = Arc::new(AtomicUsize::new(0));

    stream::iter(images.iter().cloned().map(|image| {
        let recognizer = Arc::clone(recognizer);
        let progress = progress.clone();
        let done = Arc::clone(&done);
        async move {
            let (image, result) = recognize_one(recognizer, image).await;
            if let Some(ref cb) = progress {
                let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                cb.on_image_recognized(n, total, result.as_ref().map_or(0, |f| f.len()));
            }
            (image, result)
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await
}

/// Sequential mode: strict submission order.
async fn recognize_sequential(
    recognizer: &Arc<dyn TextRecognizer>,
    images: &[PathBuf],
    progress: Option<ProgressCallback>,
) -> Vec<(PathBuf, Result<Vec<String>, String>)> {
    let total = images.len();
    let mut results = Vec::with_capacity(total);

    for (i, image) in images.iter().cloned().enumerate() {
        let (image, result) = recognize_one(Arc::clone(recognizer), image).await;
        if let Some(ref cb) = progress {
            cb.on_image_recognized(i + 1, total, result.as_ref().map_or(0, |f| f.len()));
        }
        results.push((image, result));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test recogniser: returns the file name as a single fragment, counting
    /// invocations; fails on any path containing "bad".
    struct StubRecognizer {
        calls: AtomicUsize,
    }

    impl StubRecognizer {
        fn arc() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl TextRecognizer for StubRecognizer {
        fn recognize(&self, image: &Path) -> Result<Vec<String>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = image.file_name().unwrap().to_string_lossy().into_owned();
            if name.contains("bad") {
                Err("simulated engine failure".into())
            } else {
                Ok(vec![name])
            }
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        std::fs::write(&p, b"png-ish").unwrap();
        p
    }

    #[tokio::test]
    async fn missing_path_fails_fast_without_recognition() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "doc_page_1.png");
        let gone = dir.path().join("doc_page_2.png");

        let stub = StubRecognizer::arc();
        let recognizer: Arc<dyn TextRecognizer> = stub.clone();

        let err = recognize_images(&recognizer, &[a, gone.clone()], true, 2, None)
            .await
            .unwrap_err();

        match err {
            ExtractError::MissingImages { paths } => assert_eq!(paths, vec![gone]),
            other => panic!("expected MissingImages, got {other:?}"),
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sequential_mode_preserves_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let images: Vec<PathBuf> = (1..=5)
            .map(|i| touch(dir.path(), &format!("doc_page_{i}.png")))
            .collect();

        let recognizer: Arc<dyn TextRecognizer> = StubRecognizer::arc();
        let outcome = recognize_images(&recognizer, &images, false, 1, None)
            .await
            .unwrap();

        let expected: Vec<String> = (1..=5).map(|i| format!("doc_page_{i}.png")).collect();
        assert_eq!(outcome.fragments, expected);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn concurrent_mode_yields_same_fragment_set() {
        let dir = tempfile::tempdir().unwrap();
        let images: Vec<PathBuf> = (1..=8)
            .map(|i| touch(dir.path(), &format!("doc_page_{i}.png")))
            .collect();

        let recognizer: Arc<dyn TextRecognizer> = StubRecognizer::arc();
        let sequential = recognize_images(&recognizer, &images, false, 1, None)
            .await
            .unwrap();
        let concurrent = recognize_images(&recognizer, &images, true, 4, None)
            .await
            .unwrap();

        let mut seq = sequential.fragments.clone();
        let mut conc = concurrent.fragments.clone();
        seq.sort();
        conc.sort();
        assert_eq!(seq, conc);
    }

    #[tokio::test]
    async fn failing_image_degrades_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![
            touch(dir.path(), "doc_page_1.png"),
            touch(dir.path(), "bad_page_2.png"),
            touch(dir.path(), "doc_page_3.png"),
        ];

        let recognizer: Arc<dyn TextRecognizer> = StubRecognizer::arc();
        let outcome = recognize_images(&recognizer, &images, false, 1, None)
            .await
            .unwrap();

        assert_eq!(
            outcome.fragments,
            vec!["doc_page_1.png".to_string(), "doc_page_3.png".to_string()]
        );
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0],
            PageError::RecognizeFailed { .. }
        ));
    }

    #[tokio::test]
    async fn progress_counts_every_image() {
        use crate::progress::ExtractionProgressCallback;

        struct Counting {
            events: AtomicUsize,
        }
        impl ExtractionProgressCallback for Counting {
            fn on_image_recognized(&self, _done: usize, _total: usize, _fragments: usize) {
                self.events.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let images: Vec<PathBuf> = (1..=4)
            .map(|i| touch(dir.path(), &format!("doc_page_{i}.png")))
            .collect();

        let counting = Arc::new(Counting {
            events: AtomicUsize::new(0),
        });
        let recognizer: Arc<dyn TextRecognizer> = StubRecognizer::arc();
        recognize_images(
            &recognizer,
            &images,
            true,
            2,
            Some(counting.clone() as ProgressCallback),
        )
        .await
        .unwrap();

        assert_eq!(counting.events.load(Ordering::SeqCst), 4);
    }
}
