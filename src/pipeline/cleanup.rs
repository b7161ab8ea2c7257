//! Scoped cleanup of rasterised page images.
//!
//! Every page image created by a run is deleted before the run returns, on
//! every exit path: success, recogniser-init failure, partial or total OCR
//! failure, and panic-unwind. Implementing that as a `Drop` guard installed
//! right after rasterisation means new failure branches added later cannot
//! leak images — there is no per-branch cleanup call to forget.
//!
//! An individual deletion failure is demoted to a `warn!`; a cleanup hiccup
//! must never mask the run's primary result.

use std::path::PathBuf;
use tracing::{debug, warn};

/// Owns the page images of one run and deletes them on drop.
pub struct PageImageGuard {
    images: Vec<PathBuf>,
}

impl PageImageGuard {
    pub fn new(images: Vec<PathBuf>) -> Self {
        Self { images }
    }
}

impl Drop for PageImageGuard {
    fn drop(&mut self) {
        for image in &self.images {
            match std::fs::remove_file(image) {
                Ok(()) => debug!("Removed page image '{}'", image.display()),
                Err(e) => warn!("Could not remove page image '{}': {e}", image.display()),
            }
        }
    }
}
