//! Progress-callback trait for per-page pipeline events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline rasterises and recognises each page.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a WebSocket, a database record, or a terminal
//! progress bar without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so it works when
//! page images are recognised concurrently.

use std::sync::Arc;

/// Called by the pipeline as it processes each page.
///
/// Implementations must be `Send + Sync`: rasterisation events arrive from a
/// blocking worker thread, and in concurrent OCR mode recognition events may
/// arrive from several threads at once. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the document was opened for rasterisation.
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after one page image was written to disk.
    fn on_page_rendered(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when rasterising one page failed (the page is skipped).
    fn on_page_render_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called when one page image was recognised.
    ///
    /// `fragments` is the number of text fragments the image yielded; zero
    /// means the recogniser failed on it or found nothing.
    fn on_image_recognized(&self, done: usize, total_images: usize, fragments: usize) {
        let _ = (done, total_images, fragments);
    }

    /// Called once after all page images have been attempted.
    fn on_run_complete(&self, total_images: usize, recognized: usize) {
        let _ = (total_images, recognized);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        rendered: AtomicUsize,
        render_errors: AtomicUsize,
        recognized: AtomicUsize,
        final_recognized: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_page_rendered(&self, _page_num: usize, _total_pages: usize) {
            self.rendered.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_render_error(&self, _page_num: usize, _total_pages: usize, _error: &str) {
            self.render_errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_recognized(&self, _done: usize, _total_images: usize, _fragments: usize) {
            self.recognized.fetch_add(1, Ordering::SeqCst);
        }

        fn on_run_complete(&self, _total_images: usize, recognized: usize) {
            self.final_recognized.store(recognized, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(5);
        cb.on_page_rendered(1, 5);
        cb.on_page_render_error(2, 5, "some error");
        cb.on_image_recognized(1, 4, 12);
        cb.on_run_complete(4, 3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            rendered: AtomicUsize::new(0),
            render_errors: AtomicUsize::new(0),
            recognized: AtomicUsize::new(0),
            final_recognized: AtomicUsize::new(0),
        };

        tracker.on_run_start(3);
        tracker.on_page_rendered(1, 3);
        tracker.on_page_rendered(2, 3);
        tracker.on_page_render_error(3, 3, "renderer crash");
        tracker.on_image_recognized(1, 2, 7);
        tracker.on_image_recognized(2, 2, 0);
        tracker.on_run_complete(2, 1);

        assert_eq!(tracker.rendered.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.render_errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.recognized.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.final_recognized.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ExtractionProgressCallback>();
        let cb: Arc<dyn ExtractionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
    }
}
