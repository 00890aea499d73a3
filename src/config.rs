//! Configuration types for text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads and to diff two runs to
//! understand why their outputs differ.
//!
//! Language profile, DPI, and target dimensions live here rather than inside
//! the strategy: strategies choose *policy* (preprocessing, concurrency,
//! failure handling), the config chooses *tuning*. The two are orthogonal and
//! any strategy can run against any config.

use crate::error::ExtractError;
use crate::pipeline::enhance::PageEnhancer;
use crate::pipeline::recognize::Recognizer;
use crate::progress::ExtractionProgress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Pipeline strategy: which preprocessing the run uses and how it reacts to a
/// page-level failure.
///
/// | Variant    | Enhancement | Concurrency            | Page failure        |
/// |------------|-------------|------------------------|---------------------|
/// | `Enhanced` | yes         | bounded concurrent     | degrade to empty    |
/// | `Strict`   | no          | sequential, page order | abort the whole run |
/// | `Direct`   | no          | bounded concurrent     | degrade to empty    |
///
/// `Strict` exists for callers that treat any OCR miss as a symptom of a
/// systemically bad document (corrupted scan, wrong format) and prefer an
/// early fatal error over a text with holes. `Enhanced` and `Direct` maximise
/// extracted coverage for consumers that tolerate missing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Enhance each page image before recognition; degrade failed pages. (default)
    #[default]
    Enhanced,
    /// No enhancement, one page at a time, first failure aborts the run.
    Strict,
    /// No enhancement, concurrent, degrade failed pages.
    Direct,
}

impl Strategy {
    /// Whether the page worker runs the image enhancer before recognition.
    pub fn uses_enhancement(&self) -> bool {
        matches!(self, Strategy::Enhanced)
    }

    /// Whether the first page failure aborts the whole run.
    pub fn fail_fast(&self) -> bool {
        matches!(self, Strategy::Strict)
    }

    /// Whether pages are dispatched concurrently.
    pub fn concurrent(&self) -> bool {
        !matches!(self, Strategy::Strict)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Enhanced => "enhanced",
            Strategy::Strict => "strict",
            Strategy::Direct => "direct",
        };
        f.write_str(s)
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enhanced" => Ok(Strategy::Enhanced),
            "strict" => Ok(Strategy::Strict),
            "direct" => Ok(Strategy::Direct),
            other => Err(format!(
                "unknown strategy '{other}' (expected: enhanced, strict, direct)"
            )),
        }
    }
}

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use scantext::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .dpi(300)
///     .language("eng+vie")
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    ///
    /// 300 DPI is what OCR engines are trained against; below ~200 the
    /// recognition rate on small print drops sharply, while above 400 the
    /// per-page images balloon without measurable accuracy gain.
    pub dpi: u32,

    /// Target rendered page width in pixels. Default: 2480 (A4 at 300 DPI).
    pub target_width: u32,

    /// Maximum rendered page height in pixels. Default: 3508 (A4 at 300 DPI).
    ///
    /// A cap rather than an exact size: pdfium scales to `target_width` and
    /// clamps height, so unusually tall pages cannot exhaust memory.
    pub target_height: u32,

    /// Tesseract language model string. Default: `"eng+vie"`.
    ///
    /// The combined English+Vietnamese profile covers mixed-language study
    /// material in one pass; Tesseract accepts any `+`-joined set of
    /// installed traineddata names.
    pub language: String,

    /// Number of pages recognised concurrently. Default: 4.
    ///
    /// OCR is CPU-bound, so this is a worker-pool size, not a network fan-out
    /// width. Size it to physical cores; oversubscribing slows every page
    /// down without improving throughput.
    pub concurrency: usize,

    /// Path to the tesseract binary. Default: `"tesseract"` (resolved on PATH).
    pub tesseract_path: String,

    /// Root directory for per-run scratch arenas. Default: the system temp dir.
    ///
    /// Each run creates (and removes) its own uniquely named subdirectory
    /// underneath this root; runs never share files.
    pub scratch_root: Option<PathBuf>,

    /// Custom image enhancer. Default: [`crate::pipeline::enhance::ContrastEnhancer`].
    pub enhancer: Option<Arc<dyn PageEnhancer>>,

    /// Custom OCR engine. Default: [`crate::pipeline::recognize::TesseractRecognizer`]
    /// built from `tesseract_path`.
    pub recognizer: Option<Arc<dyn Recognizer>>,

    /// Progress callback receiving run/page lifecycle events.
    pub progress: Option<Arc<dyn ExtractionProgress>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            target_width: 2480,
            target_height: 3508,
            language: "eng+vie".to_string(),
            concurrency: 4,
            tesseract_path: "tesseract".to_string(),
            scratch_root: None,
            enhancer: None,
            recognizer: None,
            progress: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("target_width", &self.target_width)
            .field("target_height", &self.target_height)
            .field("language", &self.language)
            .field("concurrency", &self.concurrency)
            .field("tesseract_path", &self.tesseract_path)
            .field("scratch_root", &self.scratch_root)
            .field("enhancer", &self.enhancer.as_ref().map(|_| "<dyn PageEnhancer>"))
            .field("recognizer", &self.recognizer.as_ref().map(|_| "<dyn Recognizer>"))
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn target_width(mut self, px: u32) -> Self {
        self.config.target_width = px.max(100);
        self
    }

    pub fn target_height(mut self, px: u32) -> Self {
        self.config.target_height = px.max(100);
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<String>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    pub fn enhancer(mut self, enhancer: Arc<dyn PageEnhancer>) -> Self {
        self.config.enhancer = Some(enhancer);
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn progress(mut self, progress: Arc<dyn ExtractionProgress>) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Language profile must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
