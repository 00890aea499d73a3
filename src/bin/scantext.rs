//! CLI binary for scantext.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scantext::{extract_file, ExtractionConfig, ExtractionProgress, Strategy};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif]. Works correctly when pages complete out of order
/// (concurrent strategies).
struct CliProgress {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgress {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_run_start` (called once rasterisation has revealed the page count).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Rasterising PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ExtractionProgress for CliProgress {
    fn on_run_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }

    fn on_page_done(&self, index: usize, total_pages: usize, succeeded: bool) {
        if succeeded {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}",
                green("✓"),
                index + 1,
                total_pages,
            ));
        } else {
            self.errors.fetch_add(1, Ordering::SeqCst);
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                red("✗"),
                index + 1,
                total_pages,
                red("recognition failed"),
            ));
        }
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_pages: usize, succeeded: usize) {
        let failed = total_pages.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages recognised successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages recognised  ({} failed)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&succeeded.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic extraction (stdout)
  scantext scan.pdf

  # Extract to file
  scantext scan.pdf -o scan.txt

  # Fail-fast mode: abort on the first unreadable page
  scantext --strategy strict scan.pdf

  # Skip image enhancement
  scantext --strategy direct scan.pdf

  # Different language profile (any installed tesseract traineddata set)
  scantext --lang eng scan.pdf

  # JSON result summary
  scantext --json scan.pdf -o scan.txt

STRATEGIES:
  enhanced   grayscale/contrast preprocessing, concurrent, failed pages
             degrade to empty segments (default)
  strict     no preprocessing, sequential, first page failure aborts the run
  direct     no preprocessing, concurrent, failed pages degrade

ENVIRONMENT VARIABLES:
  SCANTEXT_LANG         Override the OCR language profile
  SCANTEXT_CONCURRENCY  Override the page worker pool size
  PDFIUM_LIB_PATH       Path to an existing libpdfium

SETUP:
  Requires the `tesseract` binary on PATH with the language models you use
  (default profile: eng+vie), and a pdfium shared library reachable by
  pdfium-render."#;

/// Extract text from scanned PDF documents via per-page OCR.
#[derive(Parser, Debug)]
#[command(
    name = "scantext",
    version,
    about = "Extract text from scanned PDF documents via per-page OCR",
    long_about = "Extract machine-readable text from scanned or image-based PDF documents. \
Rasterises every page, optionally enhances the images, runs a multilingual OCR pass per \
page, and reassembles the results in document order.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file.
    input: PathBuf,

    /// Write extracted text to this file instead of stdout.
    #[arg(short, long, env = "SCANTEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Pipeline strategy: enhanced, strict, direct.
    #[arg(short, long, env = "SCANTEXT_STRATEGY", default_value = "enhanced")]
    strategy: Strategy,

    /// Tesseract language profile (e.g. eng, eng+vie).
    #[arg(long, env = "SCANTEXT_LANG", default_value = "eng+vie")]
    lang: String,

    /// Rendering DPI (72–600).
    #[arg(long, env = "SCANTEXT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Number of pages recognised concurrently.
    #[arg(short, long, env = "SCANTEXT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Path to the tesseract binary.
    #[arg(long, env = "SCANTEXT_TESSERACT", default_value = "tesseract")]
    tesseract: String,

    /// Root directory for per-run scratch arenas (default: system temp).
    #[arg(long, env = "SCANTEXT_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Print a JSON result summary to stdout instead of the raw text.
    #[arg(long, env = "SCANTEXT_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "SCANTEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCANTEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCANTEXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ExtractionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.lang.clone())
        .concurrency(cli.concurrency)
        .tesseract_path(cli.tesseract.clone());

    if let Some(ref dir) = cli.scratch_dir {
        builder = builder.scratch_root(dir);
    }
    if show_progress {
        builder = builder.progress(CliProgress::new_dynamic() as Arc<dyn ExtractionProgress>);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run extraction ───────────────────────────────────────────────────
    let start = Instant::now();
    let extraction = extract_file(&cli.input, cli.strategy, &config)
        .await
        .context("Extraction failed")?;
    let duration_ms = start.elapsed().as_millis() as u64;

    // ── Emit output ──────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        write_atomic(output_path, extraction.text())
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {} chars  {}ms  →  {}",
                if extraction.is_complete() {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                extraction.text().len(),
                duration_ms,
                bold(&output_path.display().to_string()),
            );
            if !extraction.failed_pages().is_empty() {
                eprintln!(
                    "   {}",
                    dim(&format!("failed pages: {:?}", extraction.failed_pages()))
                );
            }
        }
    }

    if cli.json {
        let summary = serde_json::json!({
            "strategy": cli.strategy.to_string(),
            "complete": extraction.is_complete(),
            "failed_pages": extraction.failed_pages(),
            "chars": extraction.text().len(),
            "duration_ms": duration_ms,
            "text": if cli.output.is_none() { Some(extraction.text()) } else { None },
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if cli.output.is_none() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(extraction.text().as_bytes())?;
        stdout.write_all(b"\n")?;
    }

    Ok(())
}

/// Atomic write: temp file in the target directory, then rename.
async fn write_atomic(path: &PathBuf, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, text).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
