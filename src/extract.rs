//! Extraction entry points and the per-run orchestration.
//!
//! One run moves through fixed stages: validate → rasterise → fan out page
//! workers → reorder → assemble → release scratch. The three strategies share
//! every stage except the fan-out, where they choose between bounded
//! concurrency with per-page degradation and a sequential fail-fast walk.
//!
//! The scratch arena is created first and owned here (shared with workers via
//! `Arc`), so whichever way a run exits — clean result, fatal error, panic —
//! dropping the last arena handle removes every intermediate file.

use crate::config::{ExtractionConfig, Strategy};
use crate::error::ExtractError;
use crate::outcome::{assemble, Extraction, PageOutcome, RasterPage};
use crate::pipeline::enhance::ContrastEnhancer;
use crate::pipeline::raster;
use crate::pipeline::recognize::TesseractRecognizer;
use crate::pipeline::scratch::ScratchArena;
use crate::pipeline::worker::{self, WorkerContext};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract text from an in-memory PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `pdf_bytes` — Raw PDF bytes, owned by the caller for the duration of the call
/// * `strategy`  — Preprocessing / failure policy (see [`Strategy`])
/// * `config`    — Tuning parameters (DPI, language, concurrency, …)
///
/// # Returns
/// `Ok(Extraction::Complete)` when every page recognised,
/// `Ok(Extraction::Partial)` when a best-effort strategy degraded at least one
/// page to an empty segment.
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal conditions: input that is not a
/// PDF, a document that rasterises to zero pages, a scratch-directory failure,
/// or — under [`Strategy::Strict`] — the first page-level failure.
pub async fn extract_text(
    pdf_bytes: &[u8],
    strategy: Strategy,
    config: &ExtractionConfig,
) -> Result<Extraction, ExtractError> {
    let total_start = Instant::now();
    validate_magic(pdf_bytes)?;

    let arena = Arc::new(
        ScratchArena::create(config.scratch_root.as_deref())
            .map_err(|e| ExtractError::Scratch { source: e })?,
    );

    info!(
        "Starting extraction: {} bytes, strategy={}",
        pdf_bytes.len(),
        strategy
    );

    // Stage 1: rasterise. Pages that individually fail to render are already
    // excluded; parse failures and empty documents are fatal.
    let pages = raster::rasterize(pdf_bytes.to_vec(), config, &arena).await?;
    debug!("{} pages rasterised", pages.len());

    // Stage 2: fan out page workers per the strategy's policy.
    let ctx = build_worker_context(strategy, config, Arc::clone(&arena));
    let outcomes = run_pages(pages, strategy, config, ctx).await?;

    // Stage 3: reorder by page index and assemble the final text.
    let (text, ordered) = assemble(outcomes);
    let failed_pages: Vec<usize> = ordered
        .iter()
        .filter(|o| !o.succeeded())
        .map(|o| o.index)
        .collect();

    info!(
        "Extraction complete: {}/{} pages, {}ms",
        ordered.len() - failed_pages.len(),
        ordered.len(),
        total_start.elapsed().as_millis()
    );

    // Stage 4: release scratch. Workers are done, so this is the last handle.
    drop(arena);

    if failed_pages.is_empty() {
        Ok(Extraction::Complete(text))
    } else {
        Ok(Extraction::Partial { text, failed_pages })
    }
}

/// Extract text from a PDF file on disk.
///
/// Convenience wrapper over [`extract_text`] that maps filesystem errors to
/// the corresponding fatal variants.
pub async fn extract_file(
    path: impl AsRef<Path>,
    strategy: Strategy,
    config: &ExtractionConfig,
) -> Result<Extraction, ExtractError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;
    extract_text(&bytes, strategy, config).await
}

/// Synchronous wrapper around [`extract_text`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_text_sync(
    pdf_bytes: &[u8],
    strategy: Strategy,
    config: &ExtractionConfig,
) -> Result<Extraction, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract_text(pdf_bytes, strategy, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Reject inputs that cannot be a PDF before pdfium ever sees them.
fn validate_magic(pdf_bytes: &[u8]) -> Result<(), ExtractError> {
    let mut magic = [0u8; 4];
    let n = pdf_bytes.len().min(4);
    magic[..n].copy_from_slice(&pdf_bytes[..n]);
    if &magic != b"%PDF" {
        return Err(ExtractError::NotAPdf { magic });
    }
    Ok(())
}

/// Resolve the collaborators a worker needs, honouring config injection.
pub(crate) fn build_worker_context(
    strategy: Strategy,
    config: &ExtractionConfig,
    arena: Arc<ScratchArena>,
) -> Arc<WorkerContext> {
    let enhancer = if strategy.uses_enhancement() {
        Some(
            config
                .enhancer
                .clone()
                .unwrap_or_else(|| Arc::new(ContrastEnhancer::default())),
        )
    } else {
        None
    };
    let recognizer = config.recognizer.clone().unwrap_or_else(|| {
        Arc::new(TesseractRecognizer::new(config.tesseract_path.clone()))
    });
    Arc::new(WorkerContext {
        enhancer,
        recognizer,
        language: config.language.clone(),
        arena,
    })
}

/// Run all page workers under the strategy's concurrency and failure policy.
///
/// Concurrent strategies dispatch through a bounded pool
/// (`buffer_unordered(config.concurrency)`), so a 500-page scan queues rather
/// than spawning 500 OCR processes at once. The sequential strategy walks
/// pages in order and aborts on the first failure.
pub(crate) async fn run_pages(
    pages: Vec<RasterPage>,
    strategy: Strategy,
    config: &ExtractionConfig,
    ctx: Arc<WorkerContext>,
) -> Result<Vec<PageOutcome>, ExtractError> {
    let total = pages.len();
    if let Some(p) = &config.progress {
        p.on_run_start(total);
    }

    if strategy.concurrent() {
        let progress = config.progress.clone();
        let outcomes: Vec<PageOutcome> = stream::iter(pages.into_iter().map(|page| {
            let ctx = Arc::clone(&ctx);
            let progress = progress.clone();
            async move {
                let outcome = worker::process_page(page, ctx).await;
                if let Some(p) = &progress {
                    p.on_page_done(outcome.index, total, outcome.succeeded());
                }
                outcome
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

        if let Some(p) = &config.progress {
            p.on_run_complete(total, outcomes.iter().filter(|o| o.succeeded()).count());
        }
        Ok(outcomes)
    } else {
        let mut outcomes = Vec::with_capacity(total);
        for page in pages {
            let outcome = worker::process_page(page, Arc::clone(&ctx)).await;
            if let Some(p) = &config.progress {
                p.on_page_done(outcome.index, total, outcome.succeeded());
            }
            if let Some(error) = outcome.error {
                if let Some(p) = &config.progress {
                    p.on_run_complete(total, outcomes.len());
                }
                return Err(ExtractError::PageFailed {
                    page: error.page(),
                    source: error,
                });
            }
            outcomes.push(outcome);
        }
        if let Some(p) = &config.progress {
            p.on_run_complete(total, outcomes.len());
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EnhanceError, PageError, RecognizeError};
    use crate::pipeline::enhance::PageEnhancer;
    use crate::pipeline::recognize::Recognizer;
    use crate::progress::ExtractionProgress;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ── Stub collaborators ───────────────────────────────────────────────

    /// Recover the 0-based page index from an arena file name
    /// (`page-0007.png` / `page-0007.enhanced.png`).
    fn page_index_of(path: &Path) -> usize {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| {
                n.trim_start_matches("page-")
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse()
                    .ok()
            })
            .expect("arena page path")
    }

    /// Emits "segment N" per page; fails configured indices; sleeps a
    /// per-index pseudo-random delay so completion order is scrambled.
    struct ScriptedRecognizer {
        fail_on: Vec<usize>,
        jitter: bool,
    }

    impl ScriptedRecognizer {
        fn ok() -> Self {
            Self {
                fail_on: vec![],
                jitter: true,
            }
        }

        fn failing_on(fail_on: Vec<usize>) -> Self {
            Self {
                fail_on,
                jitter: true,
            }
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn recognize(&self, image: &Path, _language: &str) -> Result<String, RecognizeError> {
            let index = page_index_of(image);
            if self.jitter {
                // Deterministic scramble: later pages finish earlier.
                std::thread::sleep(Duration::from_millis((index as u64 * 13 + 7) % 40));
            }
            if self.fail_on.contains(&index) {
                return Err(RecognizeError::new(image, "scripted failure"));
            }
            Ok(format!("segment {index}"))
        }
    }

    struct PassthroughEnhancer;

    impl PageEnhancer for PassthroughEnhancer {
        fn enhance(&self, image_bytes: &[u8]) -> Result<Vec<u8>, EnhanceError> {
            Ok(image_bytes.to_vec())
        }
    }

    struct FailingEnhancer {
        fail_on: Vec<usize>,
        calls: AtomicUsize,
    }

    impl PageEnhancer for FailingEnhancer {
        fn enhance(&self, image_bytes: &[u8]) -> Result<Vec<u8>, EnhanceError> {
            // Enhancers only see bytes; the fixture encodes the page index
            // in the byte length so the stub can target one page.
            self.calls.fetch_add(1, Ordering::SeqCst);
            let index = image_bytes.len() % 251;
            if self.fail_on.contains(&index) {
                return Err(EnhanceError::new("scripted enhancer failure"));
            }
            Ok(image_bytes.to_vec())
        }
    }

    struct CountingProgress {
        started: AtomicUsize,
        pages: AtomicUsize,
        completed_runs: AtomicUsize,
    }

    impl CountingProgress {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                started: AtomicUsize::new(0),
                pages: AtomicUsize::new(0),
                completed_runs: AtomicUsize::new(0),
            })
        }
    }

    impl ExtractionProgress for CountingProgress {
        fn on_run_start(&self, total_pages: usize) {
            self.started.store(total_pages, Ordering::SeqCst);
        }
        fn on_page_done(&self, _index: usize, _total: usize, _succeeded: bool) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }
        fn on_run_complete(&self, _total: usize, _succeeded: usize) {
            self.completed_runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────────

    /// Write `n` fake raster files into the arena and return their pages.
    ///
    /// Each file's byte length encodes its page index (mod 251) so byte-only
    /// collaborators (the enhancer) can tell pages apart.
    fn fixture_pages(arena: &ScratchArena, n: usize) -> Vec<RasterPage> {
        (0..n)
            .map(|index| {
                let path = arena.raster_path(index);
                let mut bytes = vec![0u8; 251 + index];
                bytes[0] = 0x89; // PNG-ish lead byte; stubs never decode
                std::fs::write(&path, &bytes).expect("write fixture raster");
                RasterPage {
                    index,
                    path,
                    width: 100,
                    height: 140,
                    dpi: 300,
                }
            })
            .collect()
    }

    fn config_with(
        recognizer: Arc<dyn Recognizer>,
        enhancer: Option<Arc<dyn PageEnhancer>>,
    ) -> ExtractionConfig {
        let mut builder = ExtractionConfig::builder()
            .concurrency(4)
            .recognizer(recognizer);
        if let Some(e) = enhancer {
            builder = builder.enhancer(e);
        }
        builder.build().unwrap()
    }

    async fn run(
        strategy: Strategy,
        config: &ExtractionConfig,
        n: usize,
    ) -> (Result<Vec<PageOutcome>, ExtractError>, std::path::PathBuf) {
        let arena = Arc::new(ScratchArena::create(None).unwrap());
        let arena_path = arena.path().to_path_buf();
        let pages = fixture_pages(&arena, n);
        let ctx = build_worker_context(strategy, config, Arc::clone(&arena));
        let result = run_pages(pages, strategy, config, ctx).await;
        (result, arena_path)
    }

    // ── Ordering under concurrency ───────────────────────────────────────

    #[tokio::test]
    async fn concurrent_outcomes_assemble_in_page_order() {
        let config = config_with(Arc::new(ScriptedRecognizer::ok()), None);
        let (result, _) = run(Strategy::Direct, &config, 8).await;
        let (text, _) = assemble(result.unwrap());
        let expected: Vec<String> = (0..8).map(|i| format!("segment {i}")).collect();
        assert_eq!(text, expected.join("\n"));
    }

    #[tokio::test]
    async fn enhanced_strategy_assembles_in_page_order() {
        let config = config_with(
            Arc::new(ScriptedRecognizer::ok()),
            Some(Arc::new(PassthroughEnhancer)),
        );
        let (result, _) = run(Strategy::Enhanced, &config, 5).await;
        let outcomes = result.unwrap();
        assert!(outcomes.iter().all(|o| o.succeeded()));
        let (text, _) = assemble(outcomes);
        assert!(text.starts_with("segment 0\nsegment 1"));
        assert!(text.ends_with("segment 4"));
    }

    // ── Failure policy per strategy ──────────────────────────────────────

    #[tokio::test]
    async fn best_effort_degrades_failed_page_to_empty_segment() {
        let config = config_with(Arc::new(ScriptedRecognizer::failing_on(vec![1])), None);
        let (result, _) = run(Strategy::Direct, &config, 3).await;
        let outcomes = result.unwrap();
        assert_eq!(outcomes.len(), 3);
        let (text, ordered) = assemble(outcomes);
        assert_eq!(text, "segment 0\n\nsegment 2");
        assert!(!ordered[1].succeeded());
        assert!(matches!(
            ordered[1].error,
            Some(PageError::Recognition { page: 1, .. })
        ));
    }

    #[tokio::test]
    async fn strict_aborts_on_first_failure() {
        let config = config_with(Arc::new(ScriptedRecognizer::failing_on(vec![1])), None);
        let (result, _) = run(Strategy::Strict, &config, 3).await;
        match result {
            Err(ExtractError::PageFailed { page: 1, .. }) => {}
            other => panic!("expected PageFailed for page 1, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn enhancer_failure_degrades_only_its_page() {
        let enhancer = Arc::new(FailingEnhancer {
            fail_on: vec![2],
            calls: AtomicUsize::new(0),
        });
        let config = config_with(Arc::new(ScriptedRecognizer::ok()), Some(enhancer));
        let (result, _) = run(Strategy::Enhanced, &config, 5).await;
        let (text, ordered) = assemble(result.unwrap());
        assert_eq!(ordered.len(), 5);
        assert!(matches!(
            ordered[2].error,
            Some(PageError::Enhance { page: 2, .. })
        ));
        assert_eq!(text, "segment 0\nsegment 1\n\nsegment 3\nsegment 4");
    }

    #[tokio::test]
    async fn direct_strategy_never_invokes_enhancer() {
        // An enhancer scripted to fail every page: if Direct consulted it at
        // all, every outcome would degrade.
        let enhancer = Arc::new(FailingEnhancer {
            fail_on: (0..512).collect(),
            calls: AtomicUsize::new(0),
        });
        let config = config_with(Arc::new(ScriptedRecognizer::ok()), Some(enhancer.clone()));
        let (result, _) = run(Strategy::Direct, &config, 3).await;
        assert!(result.unwrap().iter().all(|o| o.succeeded()));
        assert_eq!(enhancer.calls.load(Ordering::SeqCst), 0);
    }

    // ── Scratch lifecycle ────────────────────────────────────────────────

    #[tokio::test]
    async fn scratch_is_removed_after_successful_run() {
        let config = config_with(Arc::new(ScriptedRecognizer::ok()), None);
        let (result, arena_path) = run(Strategy::Direct, &config, 4).await;
        assert!(result.is_ok());
        assert!(
            !arena_path.exists(),
            "arena must be gone once the last handle drops"
        );
    }

    #[tokio::test]
    async fn scratch_is_removed_after_fail_fast_abort() {
        let config = config_with(Arc::new(ScriptedRecognizer::failing_on(vec![0])), None);
        let (result, arena_path) = run(Strategy::Strict, &config, 4).await;
        assert!(result.is_err());
        assert!(!arena_path.exists());
    }

    // ── Progress events ──────────────────────────────────────────────────

    #[tokio::test]
    async fn progress_sees_every_page_once() {
        let progress = CountingProgress::new();
        let config = ExtractionConfig::builder()
            .concurrency(3)
            .recognizer(Arc::new(ScriptedRecognizer::ok()))
            .progress(progress.clone())
            .build()
            .unwrap();
        let (result, _) = run(Strategy::Direct, &config, 6).await;
        assert!(result.is_ok());
        assert_eq!(progress.started.load(Ordering::SeqCst), 6);
        assert_eq!(progress.pages.load(Ordering::SeqCst), 6);
        assert_eq!(progress.completed_runs.load(Ordering::SeqCst), 1);
    }

    // ── Input validation (public API, no pdfium needed) ──────────────────

    #[tokio::test]
    async fn garbage_bytes_are_rejected_before_rasterisation() {
        let config = ExtractionConfig::default();
        for strategy in [Strategy::Enhanced, Strategy::Strict, Strategy::Direct] {
            let err = extract_text(b"PK\x03\x04 not a pdf", strategy, &config)
                .await
                .unwrap_err();
            assert!(matches!(err, ExtractError::NotAPdf { .. }), "{strategy}");
        }
    }

    #[tokio::test]
    async fn truncated_buffer_is_rejected() {
        let config = ExtractionConfig::default();
        let err = extract_text(b"%P", Strategy::Direct, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn missing_file_maps_to_file_not_found() {
        let config = ExtractionConfig::default();
        let err = extract_file("/definitely/not/here.pdf", Strategy::Direct, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn magic_validation_accepts_pdf_header() {
        assert!(validate_magic(b"%PDF-1.7\n").is_ok());
        assert!(validate_magic(b"%PDX").is_err());
        assert!(validate_magic(b"").is_err());
    }
}
