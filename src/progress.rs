//! Progress-callback trait for per-page run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::RunConfigBuilder::progress_callback`] to receive events
//! as the dispatcher processes each page.
//!
//! Callbacks rather than channels keep the integration point least-invasive:
//! callers can forward events to a terminal progress bar, a log, or a
//! channel of their own without the library knowing how the host application
//! communicates. The trait is `Send + Sync` because pages may complete
//! concurrently under [`crate::DispatchPolicy::Concurrent`].

use std::sync::Arc;

/// Called by the dispatcher as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// Under concurrent dispatch, `on_page_start`, `on_page_complete`, and
/// `on_page_error` may be called from different tasks interleaved in any
/// order. Implementations must protect shared mutable state (`Mutex`,
/// atomics).
pub trait RunProgressCallback: Send + Sync {
    /// Called once after the range is resolved, before any page is rendered.
    fn on_run_start(&self, total_pages: u32) {
        let _ = total_pages;
    }

    /// Called just before a page is handed to the rasterizer.
    fn on_page_start(&self, page_number: u32, total_pages: u32) {
        let _ = (page_number, total_pages);
    }

    /// Called when a page has been rendered and written to disk.
    ///
    /// `bytes` is the size of the PNG file produced for this page.
    fn on_page_complete(&self, page_number: u32, total_pages: u32, bytes: u64) {
        let _ = (page_number, total_pages, bytes);
    }

    /// Called when rendering or writing a page failed.
    fn on_page_error(&self, page_number: u32, total_pages: u32, error: String) {
        let _ = (page_number, total_pages, error);
    }

    /// Called once after the join barrier, with the number of pages that
    /// completed successfully.
    fn on_run_complete(&self, total_pages: u32, completed_pages: u32) {
        let _ = (total_pages, completed_pages);
    }
}

/// A callback that ignores every event.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias for the stored callback type.
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoopProgressCallback>();

        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_page_error(1, 1, "an error".to_string());
    }
}
