//! # scantext
//!
//! Extract machine-readable text from scanned or image-based PDF documents.
//!
//! ## Why this crate?
//!
//! Text-layer extractors (pdftotext, pdf-extract) return nothing useful for
//! scanned documents — the pages are pictures. This crate rasterises each
//! page into a PNG, optionally enhances the image for recognition accuracy,
//! runs a multilingual OCR pass per page, and reassembles the per-page
//! results into one ordered text stream suitable for downstream use
//! (question generation, flashcards, semantic search).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Scratch    allocate a per-run temp arena (removed on every exit path)
//!  ├─ 2. Raster     rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Enhance    optional grayscale/contrast preprocessing per page
//!  ├─ 4. Recognize  concurrent OCR per page (Tesseract, eng+vie by default)
//!  ├─ 5. Reorder    sort outcomes by page index, join with newlines
//!  └─ 6. Output     Complete(text) or Partial(text, failed pages)
//! ```
//!
//! ## Strategies
//!
//! | Strategy   | Enhancement | Concurrency | Page failure        |
//! |------------|-------------|-------------|---------------------|
//! | `Enhanced` | yes         | bounded     | degrade to empty    |
//! | `Strict`   | no          | sequential  | abort the whole run |
//! | `Direct`   | no          | bounded     | degrade to empty    |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scantext::{extract_text, ExtractionConfig, Strategy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("scan.pdf")?;
//!     let config = ExtractionConfig::default();
//!     match extract_text(&bytes, Strategy::Enhanced, &config).await? {
//!         scantext::Extraction::Complete(text) => println!("{text}"),
//!         scantext::Extraction::Partial { text, failed_pages } => {
//!             eprintln!("pages {failed_pages:?} failed");
//!             println!("{text}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scantext` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! scantext = { version = "0.3", default-features = false }
//! ```
//!
//! ## External requirements
//!
//! The default recognizer shells out to the `tesseract` binary (with the
//! `eng` and `vie` traineddata installed); pdfium is bound dynamically by
//! `pdfium-render`. Both are swappable: inject your own
//! [`pipeline::recognize::Recognizer`] or
//! [`pipeline::enhance::PageEnhancer`] through the config.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod outcome;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, Strategy};
pub use error::{EnhanceError, ExtractError, PageError, RecognizeError};
pub use extract::{extract_file, extract_text, extract_text_sync};
pub use outcome::{Extraction, PageOutcome, RasterPage};
pub use progress::{ExtractionProgress, NoopProgress};
pub use stream::{extract_stream, OutcomeStream};
