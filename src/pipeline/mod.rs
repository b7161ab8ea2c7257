//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. switch the OCR engine) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ direct ──▶ raster ──▶ ocr ──▶ aggregate
//! (path)   (pdfium)   (PNGs)   (tesseract)  (join)
//!                        └──────── cleanup ────┘
//! ```
//!
//! 1. [`input`]   — validate the caller-supplied path and PDF magic bytes
//! 2. [`direct`]  — read embedded text; a non-empty result short-circuits
//!    the whole OCR branch
//! 3. [`raster`]  — write one PNG per page next to the document; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 4. [`ocr`]     — recognise every page image, concurrently or in order
//! 5. [`cleanup`] — Drop guard that deletes the page images on every exit
//!    path, including panics

pub mod cleanup;
pub mod direct;
pub mod input;
pub mod ocr;
pub mod raster;
