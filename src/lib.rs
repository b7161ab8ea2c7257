//! # pdf2text
//!
//! Extract plain text from PDF documents, with OCR fallback for scanned
//! pages.
//!
//! ## Why this crate?
//!
//! Many PDFs carry their text in the content streams, where it can be read
//! directly and losslessly. Scanned documents carry only page images — for
//! those, the only way to text is rasterising each page and running optical
//! character recognition over it. This crate does the cheap thing first and
//! falls back to the expensive thing only when it has to, behind one call.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Validate  path exists, is readable, starts with %PDF
//!  ├─ 2. Direct    read embedded text via pdfium — nonempty? done.
//!  ├─ 3. Raster    one PNG per page next to the document (spawn_blocking)
//!  ├─ 4. OCR       tesseract over every image, concurrent or sequential
//!  ├─ 5. Aggregate fragments joined with newlines
//!  └─ 6. Cleanup   every page image deleted, on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2text::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let output = extract("document.pdf", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("source: {:?}, {} pages", output.source, output.stats.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2text` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2text = { version = "0.3", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! A run fails fatally only when no text can be produced at all: missing
//! file, unopenable container, OCR engine that won't initialise, or OCR
//! explicitly disabled on a text-free document (a distinct error, so callers
//! can tell "disabled" from "empty"). A single page that won't render or an
//! image that won't recognise degrades the result instead, recorded in
//! [`ExtractionOutput::page_errors`].
//!
//! Concurrent OCR aggregates fragments in task-completion order, not page
//! order. Callers that need page-ordered text disable `parallel_ocr`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{ExtractError, PageError};
pub use extract::{extract, extract_from_bytes, extract_sync, extract_to_file, inspect};
pub use output::{DocumentMetadata, ExtractionOutput, ExtractionStats, TextSource};
pub use pipeline::direct::DirectText;
pub use pipeline::ocr::{TesseractRecognizer, TextRecognizer};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
