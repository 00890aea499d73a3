//! Streaming extraction API: emit page outcomes as they complete.
//!
//! ## Why stream?
//!
//! Large scans take minutes of OCR time. A stream-based API lets callers feed
//! pages into downstream generation as soon as each one is recognised instead
//! of waiting for the whole document. Under concurrent strategies outcomes
//! arrive in **completion order**, not page order — sort by
//! [`PageOutcome::index`] if order matters, or use the eager
//! [`crate::extract::extract_text`] which reorders for you.
//!
//! ## Scratch lifetime
//!
//! The per-run scratch arena rides inside an `Arc` captured by every page
//! future, so the directory lives exactly as long as the last in-flight page
//! and is removed when the stream (and all its futures) drop — abandoning the
//! stream mid-run still cleans up.

use crate::config::{ExtractionConfig, Strategy};
use crate::error::ExtractError;
use crate::extract::build_worker_context;
use crate::outcome::PageOutcome;
use crate::pipeline::scratch::ScratchArena;
use crate::pipeline::{raster, worker};
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of page outcomes.
pub type OutcomeStream = Pin<Box<dyn Stream<Item = PageOutcome> + Send>>;

/// Extract text from an in-memory PDF, streaming page outcomes as they are
/// ready.
///
/// Best-effort strategies emit one outcome per rasterised page, failed pages
/// included (with empty text). [`Strategy::Strict`] processes pages in order
/// and ends the stream right after emitting the first failed outcome.
///
/// # Returns
/// - `Ok(OutcomeStream)` — a stream of [`PageOutcome`]
/// - `Err(ExtractError)` — fatal error (not a PDF, zero pages, scratch failure)
pub async fn extract_stream(
    pdf_bytes: &[u8],
    strategy: Strategy,
    config: &ExtractionConfig,
) -> Result<OutcomeStream, ExtractError> {
    let mut magic = [0u8; 4];
    let n = pdf_bytes.len().min(4);
    magic[..n].copy_from_slice(&pdf_bytes[..n]);
    if &magic != b"%PDF" {
        return Err(ExtractError::NotAPdf { magic });
    }

    let arena = Arc::new(
        ScratchArena::create(config.scratch_root.as_deref())
            .map_err(|e| ExtractError::Scratch { source: e })?,
    );

    info!(
        "Starting streaming extraction: {} bytes, strategy={}",
        pdf_bytes.len(),
        strategy
    );

    // Rasterise eagerly; only recognition is streamed.
    let pages = raster::rasterize(pdf_bytes.to_vec(), config, &arena).await?;
    let ctx = build_worker_context(strategy, config, arena);

    if strategy.concurrent() {
        let concurrency = config.concurrency;
        let s = stream::iter(pages.into_iter().map(move |page| {
            let ctx = Arc::clone(&ctx);
            async move { worker::process_page(page, ctx).await }
        }))
        .buffer_unordered(concurrency);
        Ok(Box::pin(s))
    } else {
        // Sequential fail-fast: emit outcomes in page order and stop after
        // the first failure.
        let s = stream::iter(pages.into_iter())
            .then(move |page| {
                let ctx = Arc::clone(&ctx);
                async move { worker::process_page(page, ctx).await }
            })
            .scan(false, |aborted, outcome| {
                if *aborted {
                    return futures::future::ready(None);
                }
                *aborted = outcome.error.is_some();
                futures::future::ready(Some(outcome))
            });
        Ok(Box::pin(s))
    }
}
