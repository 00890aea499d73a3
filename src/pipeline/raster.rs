//! PDF rasterisation: render every page to a PNG in the scratch arena.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! ## Failure granularity
//!
//! A document that cannot be parsed, or that yields zero usable page images,
//! is a fatal error — every strategy treats it as non-retryable for that
//! document. A single page that fails to render or persist is logged and
//! skipped; it simply never enters the fan-out stage and contributes no
//! segment to the final text.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::outcome::RasterPage;
use crate::pipeline::scratch::ScratchArena;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rasterise all pages of `pdf_bytes` into the arena.
///
/// Pages are returned in original document order with their 0-based index.
pub async fn rasterize(
    pdf_bytes: Vec<u8>,
    config: &ExtractionConfig,
    arena: &Arc<ScratchArena>,
) -> Result<Vec<RasterPage>, ExtractError> {
    let dpi = config.dpi;
    let target_width = config.target_width;
    let target_height = config.target_height;
    let arena = Arc::clone(arena);

    tokio::task::spawn_blocking(move || {
        rasterize_blocking(&pdf_bytes, dpi, target_width, target_height, &arena)
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Raster task panicked: {e}")))?
}

/// Blocking implementation of page rasterisation.
fn rasterize_blocking(
    pdf_bytes: &[u8],
    dpi: u32,
    target_width: u32,
    target_height: u32,
    arena: &ScratchArena,
) -> Result<Vec<RasterPage>, ExtractError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| ExtractError::Rasterization {
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(ExtractError::NoPages);
    }
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width as i32)
        .set_maximum_height(target_height as i32);

    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap = match page.render_with_config(&render_config) {
            Ok(b) => b,
            Err(e) => {
                warn!("Skipping page {}: render failed: {:?}", idx, e);
                continue;
            }
        };

        let image = bitmap.as_image();
        let path = arena.raster_path(idx);
        if let Err(e) = image.save(&path) {
            warn!("Skipping page {}: could not persist raster: {}", idx, e);
            continue;
        }

        debug!(
            "Rendered page {} → {}x{} px at {}",
            idx,
            image.width(),
            image.height(),
            path.display()
        );

        results.push(RasterPage {
            index: idx,
            path,
            width: image.width(),
            height: image.height(),
            dpi,
        });
    }

    if results.is_empty() {
        return Err(ExtractError::NoPages);
    }

    Ok(results)
}
