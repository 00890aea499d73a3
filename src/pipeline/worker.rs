//! The per-page unit of concurrent work.
//!
//! A worker takes one rasterised page through read → (optional) enhance →
//! recognise and always yields a [`PageOutcome`] — never an `Err` — so the
//! orchestrator can reconstruct document order from any completion order and
//! apply its own failure policy. Whether a failed outcome degrades the run or
//! aborts it is the strategy's decision, not the worker's.
//!
//! Every file a worker touches lives inside the run's scratch arena, created
//! there the moment it exists. The arena removes its whole directory when the
//! run ends, so an early return from any step can never leak an artifact.

use crate::error::PageError;
use crate::outcome::{PageOutcome, RasterPage};
use crate::pipeline::enhance::PageEnhancer;
use crate::pipeline::postprocess;
use crate::pipeline::recognize::Recognizer;
use crate::pipeline::scratch::ScratchArena;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Shared, read-only state every page worker needs.
pub(crate) struct WorkerContext {
    /// Present only when the strategy preprocesses pages.
    pub enhancer: Option<Arc<dyn PageEnhancer>>,
    pub recognizer: Arc<dyn Recognizer>,
    pub language: String,
    /// Keeps the scratch directory alive for as long as any worker runs.
    pub arena: Arc<ScratchArena>,
}

/// Process one page to completion.
///
/// Enhancement and recognition are synchronous CPU/subprocess work and run
/// under `spawn_blocking`; the surrounding future only suspends on file I/O
/// and on those blocking-pool handoffs.
pub(crate) async fn process_page(page: RasterPage, ctx: Arc<WorkerContext>) -> PageOutcome {
    let start = Instant::now();
    let index = page.index;

    let raster_bytes = match tokio::fs::read(&page.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Page {}: raster read failed: {}", index, e);
            return PageOutcome::failed(
                index,
                start.elapsed().as_millis() as u64,
                PageError::Read {
                    page: index,
                    detail: e.to_string(),
                },
            );
        }
    };

    // Recognise the enhanced variant when preprocessing is on, else the raw raster.
    let ocr_path = if let Some(enhancer) = &ctx.enhancer {
        let enhancer = Arc::clone(enhancer);
        let enhanced = tokio::task::spawn_blocking(move || enhancer.enhance(&raster_bytes))
            .await
            .unwrap_or_else(|e| {
                Err(crate::error::EnhanceError::new(format!(
                    "enhancement task panicked: {e}"
                )))
            });

        let enhanced_bytes = match enhanced {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Page {}: enhancement failed: {}", index, e);
                return PageOutcome::failed(
                    index,
                    start.elapsed().as_millis() as u64,
                    PageError::Enhance {
                        page: index,
                        detail: e.to_string(),
                    },
                );
            }
        };

        let enhanced_path = ctx.arena.enhanced_path(index);
        if let Err(e) = tokio::fs::write(&enhanced_path, &enhanced_bytes).await {
            warn!("Page {}: could not persist enhanced image: {}", index, e);
            return PageOutcome::failed(
                index,
                start.elapsed().as_millis() as u64,
                PageError::Enhance {
                    page: index,
                    detail: format!("persist: {e}"),
                },
            );
        }
        enhanced_path
    } else {
        page.path.clone()
    };

    let recognizer = Arc::clone(&ctx.recognizer);
    let language = ctx.language.clone();
    let recognized = tokio::task::spawn_blocking(move || recognizer.recognize(&ocr_path, &language))
        .await
        .unwrap_or_else(|e| {
            Err(crate::error::RecognizeError::new(
                page.path.clone(),
                format!("recognition task panicked: {e}"),
            ))
        });

    let duration_ms = start.elapsed().as_millis() as u64;
    match recognized {
        Ok(raw) => {
            let text = postprocess::clean_page_text(&raw);
            debug!("Page {}: {} chars in {}ms", index, text.len(), duration_ms);
            PageOutcome {
                index,
                text,
                duration_ms,
                error: None,
            }
        }
        Err(e) => {
            warn!("Page {}: {}", index, e);
            PageOutcome::failed(
                index,
                duration_ms,
                PageError::Recognition {
                    page: index,
                    detail: e.to_string(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EnhanceError, RecognizeError};
    use std::path::Path;

    struct FixedRecognizer(&'static str);

    impl Recognizer for FixedRecognizer {
        fn recognize(&self, _image: &Path, _language: &str) -> Result<String, RecognizeError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingEnhancer;

    impl PageEnhancer for FailingEnhancer {
        fn enhance(&self, _image_bytes: &[u8]) -> Result<Vec<u8>, EnhanceError> {
            Err(EnhanceError::new("synthetic failure"))
        }
    }

    struct PassthroughEnhancer;

    impl PageEnhancer for PassthroughEnhancer {
        fn enhance(&self, image_bytes: &[u8]) -> Result<Vec<u8>, EnhanceError> {
            Ok(image_bytes.to_vec())
        }
    }

    fn raster_fixture(arena: &ScratchArena, index: usize) -> RasterPage {
        let path = arena.raster_path(index);
        std::fs::write(&path, b"fake png bytes").expect("write fixture");
        RasterPage {
            index,
            path,
            width: 100,
            height: 140,
            dpi: 300,
        }
    }

    fn ctx(
        arena: Arc<ScratchArena>,
        enhancer: Option<Arc<dyn PageEnhancer>>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Arc<WorkerContext> {
        Arc::new(WorkerContext {
            enhancer,
            recognizer,
            language: "eng+vie".into(),
            arena,
        })
    }

    #[tokio::test]
    async fn worker_returns_cleaned_text() {
        let arena = Arc::new(ScratchArena::create(None).unwrap());
        let page = raster_fixture(&arena, 0);
        let ctx = ctx(
            Arc::clone(&arena),
            None,
            Arc::new(FixedRecognizer("  hello\r\nworld  \r\n")),
        );
        let outcome = process_page(page, ctx).await;
        assert!(outcome.succeeded());
        assert_eq!(outcome.text, "hello\nworld");
    }

    #[tokio::test]
    async fn worker_degrades_on_enhancer_failure() {
        let arena = Arc::new(ScratchArena::create(None).unwrap());
        let page = raster_fixture(&arena, 3);
        let ctx = ctx(
            Arc::clone(&arena),
            Some(Arc::new(FailingEnhancer)),
            Arc::new(FixedRecognizer("never reached")),
        );
        let outcome = process_page(page, ctx).await;
        assert!(!outcome.succeeded());
        assert_eq!(outcome.index, 3);
        assert!(outcome.text.is_empty());
        assert!(matches!(outcome.error, Some(PageError::Enhance { page: 3, .. })));
    }

    #[tokio::test]
    async fn worker_persists_enhanced_variant() {
        let arena = Arc::new(ScratchArena::create(None).unwrap());
        let page = raster_fixture(&arena, 1);
        let ctx = ctx(
            Arc::clone(&arena),
            Some(Arc::new(PassthroughEnhancer)),
            Arc::new(FixedRecognizer("ok")),
        );
        let outcome = process_page(page, ctx).await;
        assert!(outcome.succeeded());
        assert!(arena.enhanced_path(1).exists());
    }

    #[tokio::test]
    async fn worker_reports_missing_raster_as_read_error() {
        let arena = Arc::new(ScratchArena::create(None).unwrap());
        let page = RasterPage {
            index: 5,
            path: arena.raster_path(5), // never written
            width: 0,
            height: 0,
            dpi: 300,
        };
        let ctx = ctx(
            Arc::clone(&arena),
            None,
            Arc::new(FixedRecognizer("unused")),
        );
        let outcome = process_page(page, ctx).await;
        assert!(matches!(outcome.error, Some(PageError::Read { page: 5, .. })));
    }
}
