//! Configuration types for a text-extraction run.
//!
//! All run behaviour is controlled through [`ExtractionConfig`], built via
//! its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads and to diff two runs to understand
//! why their outputs differ. The config is immutable for the duration of a
//! run.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::ExtractError;
use crate::pipeline::ocr::TextRecognizer;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2text::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .language("deu")
///     .scale(3.0)
///     .parallel_ocr(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// OCR language code, passed verbatim to the recognizer. Default: `"eng"`.
    ///
    /// Tesseract-style identifiers (`eng`, `deu`, `fra`, or combinations like
    /// `eng+deu`). The matching `.traineddata` must be installed; an unknown
    /// code fails the run with [`ExtractError::EngineInit`].
    pub language: String,

    /// Directory containing Tesseract trained data. Default: `None`.
    ///
    /// `None` lets the engine fall back to `TESSDATA_PREFIX` and its compiled
    /// default search path.
    pub datapath: Option<PathBuf>,

    /// Magnification factor applied uniformly to page width and height when
    /// rasterising. Range: 1.0–4.0. Default: 2.0.
    ///
    /// Higher factors sharpen small print and improve OCR accuracy at the
    /// cost of CPU, memory, and renderer stability on malformed documents.
    /// 2.0 reads body text reliably without the blow-up of 4.0.
    pub scale: f32,

    /// Run OCR over page images concurrently. Default: true.
    ///
    /// Concurrent mode aggregates fragments in task-completion order, which
    /// is not necessarily page order. Callers that need page-ordered output
    /// set this to false and accept the sequential slowdown.
    pub parallel_ocr: bool,

    /// Worker-pool size for concurrent OCR, one task per page image.
    /// Default: 4. Ignored when `parallel_ocr` is false.
    ///
    /// Recognition is CPU-bound; going far beyond the physical core count
    /// buys nothing and inflates peak memory.
    pub concurrency: usize,

    /// Permit the OCR fallback when the document has no embedded text.
    /// Default: true.
    ///
    /// When false and direct extraction comes up empty, the run fails with
    /// [`ExtractError::OcrDisabled`] without rasterising a single page.
    pub allow_ocr: bool,

    /// Pre-constructed recognizer. Takes precedence over `language`-based
    /// Tesseract initialisation. Mainly useful in tests and for callers that
    /// bring their own engine.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,

    /// Progress callback receiving per-page render and per-image OCR events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            datapath: None,
            scale: 2.0,
            parallel_ocr: true,
            concurrency: 4,
            allow_ocr: true,
            recognizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("language", &self.language)
            .field("datapath", &self.datapath)
            .field("scale", &self.scale)
            .field("parallel_ocr", &self.parallel_ocr)
            .field("concurrency", &self.concurrency)
            .field("allow_ocr", &self.allow_ocr)
            .field(
                "recognizer",
                &self.recognizer.as_ref().map(|_| "<dyn TextRecognizer>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn datapath(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.datapath = Some(path.into());
        self
    }

    pub fn scale(mut self, factor: f32) -> Self {
        self.config.scale = factor.clamp(1.0, 4.0);
        self
    }

    pub fn parallel_ocr(mut self, v: bool) -> Self {
        self.config.parallel_ocr = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn allow_ocr(mut self, v: bool) -> Self {
        self.config.allow_ocr = v;
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Language code must not be empty".into(),
            ));
        }
        if !(1.0..=4.0).contains(&c.scale) {
            return Err(ExtractError::InvalidConfig(format!(
                "Scale must be 1.0–4.0, got {}",
                c.scale
            )));
        }
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ExtractionConfig::builder().build().unwrap();
        assert_eq!(config.language, "eng");
        assert_eq!(config.scale, 2.0);
        assert!(config.parallel_ocr);
        assert!(config.allow_ocr);
    }

    #[test]
    fn scale_is_clamped() {
        let config = ExtractionConfig::builder().scale(12.0).build().unwrap();
        assert_eq!(config.scale, 4.0);
        let config = ExtractionConfig::builder().scale(0.1).build().unwrap();
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn empty_language_is_rejected() {
        let err = ExtractionConfig::builder().language("  ").build();
        assert!(matches!(err, Err(ExtractError::InvalidConfig(_))));
    }

    #[test]
    fn concurrency_floor_is_one() {
        let config = ExtractionConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(config.concurrency, 1);
    }
}
