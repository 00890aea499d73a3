//! Pipeline stages for scanned-PDF text extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch OCR backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ raster ──▶ [enhance] ──▶ recognize ──▶ postprocess
//!           (pdfium)   (image ops)   (tesseract)   (cleanup)
//! ```
//!
//! 1. [`scratch`]     — per-run arena every stage writes its files into
//! 2. [`raster`]      — rasterise pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`enhance`]     — optional opaque bytes→bytes preprocessing transform
//! 4. [`recognize`]   — OCR engine behind a trait; the only stage that shells
//!    out to an external process
//! 5. [`worker`]      — drives 2–4 for a single page and always yields an
//!    outcome
//! 6. [`postprocess`] — deterministic text cleanup applied to each page's raw
//!    OCR output

pub mod enhance;
pub mod postprocess;
pub mod raster;
pub mod recognize;
pub mod scratch;
pub(crate) mod worker;
