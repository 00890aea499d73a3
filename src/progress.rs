//! Progress-callback trait for per-page extraction events.
//!
//! Inject an `Arc<dyn ExtractionProgress>` via
//! [`crate::config::ExtractionConfigBuilder::progress`] to receive real-time
//! events as the pipeline processes each page.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a job-status record, or a
//! terminal progress bar — without the library knowing anything about how the
//! host application communicates. The trait is `Send + Sync` so it works
//! correctly when pages complete concurrently.

/// Called by the extraction pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// Under concurrent strategies `on_page_done` may be called from different
/// threads in any order. Implementations must protect shared mutable state
/// with appropriate synchronisation primitives (e.g. `Mutex`, `AtomicUsize`).
pub trait ExtractionProgress: Send + Sync {
    /// Called once after rasterisation, before any page is recognised.
    ///
    /// `total_pages` is the number of pages that will actually be processed
    /// (pages that failed to rasterise are already excluded).
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page finishes, successfully or not.
    ///
    /// # Arguments
    /// * `index`       — 0-based page index
    /// * `total_pages` — total pages being processed
    /// * `succeeded`   — whether the page produced usable text
    fn on_page_done(&self, index: usize, total_pages: usize, succeeded: bool) {
        let _ = (index, total_pages, succeeded);
    }

    /// Called once after all pages have been attempted (or the run aborted).
    fn on_run_complete(&self, total_pages: usize, succeeded: usize) {
        let _ = (total_pages, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ExtractionProgress for NoopProgress {}
