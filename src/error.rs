//! Error types for the scantext library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the extraction cannot proceed at all
//!   (not a PDF, zero pages rasterised, scratch directory unavailable).
//!   Returned as `Err(ExtractError)` from the top-level `extract*` functions.
//!
//! * [`PageError`] — **Non-fatal under best-effort strategies**: a single page
//!   failed (unreadable raster, enhancement glitch, OCR engine error) but all
//!   other pages are fine. Stored inside [`crate::outcome::PageOutcome`] so
//!   callers can inspect partial success rather than losing the whole document
//!   to one bad page. Under the fail-fast strategy the first `PageError` is
//!   promoted to [`ExtractError::PageFailed`] and aborts the run.
//!
//! The leaf types [`EnhanceError`] and [`RecognizeError`] belong to the two
//! collaborator traits ([`crate::pipeline::enhance::PageEnhancer`],
//! [`crate::pipeline::recognize::Recognizer`]); the page worker folds them
//! into `PageError` together with the page index.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scantext library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::outcome::PageOutcome`] rather than propagated here — except under
/// [`crate::Strategy::Strict`], which promotes the first one to
/// [`ExtractError::PageFailed`].
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The byte buffer does not start with the `%PDF` magic.
    #[error("Input is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: [u8; 4] },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// pdfium could not parse the document at all.
    #[error("PDF could not be parsed: {detail}")]
    Rasterization { detail: String },

    /// The document rasterised to zero usable pages.
    ///
    /// Raised both for genuinely empty documents and when every page failed
    /// to render — an empty result must never be reported as success.
    #[error("Document produced no rasterised pages")]
    NoPages,

    // ── Fan-out errors ────────────────────────────────────────────────────
    /// A page failed under the fail-fast strategy.
    ///
    /// Only [`crate::Strategy::Strict`] surfaces this; best-effort strategies
    /// degrade the page to an empty segment instead.
    #[error("Page {page} failed: {source}")]
    PageFailed {
        page: usize,
        #[source]
        source: PageError,
    },

    /// A worker task panicked or was cancelled mid-run.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    // ── Resource errors ───────────────────────────────────────────────────
    /// The per-run scratch directory could not be created.
    #[error("Failed to create scratch directory: {source}")]
    Scratch {
        #[source]
        source: std::io::Error,
    },

    /// Could not write the output text file (CLI path).
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// An error for a single page.
///
/// Stored alongside [`crate::outcome::PageOutcome`] when a page fails. Under
/// best-effort strategies the overall extraction continues and the page
/// contributes an empty segment.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The rasterised page file could not be read back.
    #[error("Page {page}: raster read failed: {detail}")]
    Read { page: usize, detail: String },

    /// The image enhancer rejected the page.
    #[error("Page {page}: enhancement failed: {detail}")]
    Enhance { page: usize, detail: String },

    /// The OCR engine failed on the page image.
    #[error("Page {page}: recognition failed: {detail}")]
    Recognition { page: usize, detail: String },
}

impl PageError {
    /// The 0-based index of the page this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::Read { page, .. }
            | PageError::Enhance { page, .. }
            | PageError::Recognition { page, .. } => *page,
        }
    }
}

/// Failure of the opaque image-enhancement transform.
#[derive(Debug, Error)]
#[error("{detail}")]
pub struct EnhanceError {
    pub detail: String,
}

impl EnhanceError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Failure of the OCR engine on one image file.
///
/// Carries the image path so failures can be traced back to the on-disk
/// artifact while it still exists.
#[derive(Debug, Error)]
#[error("recognition failed for '{path}': {detail}")]
pub struct RecognizeError {
    pub path: PathBuf,
    pub detail: String,
}

impl RecognizeError {
    pub fn new(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
