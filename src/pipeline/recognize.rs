//! Text recognition: run an OCR engine against one page image.
//!
//! The engine sits behind the [`Recognizer`] trait so tests can substitute a
//! stub and deployments can swap engines without touching the pipeline. The
//! built-in [`TesseractRecognizer`] shells out to the Tesseract CLI
//! (`tesseract <image> stdout -l <lang>`), which keeps the crate free of
//! libtesseract FFI while supporting every installed language model.
//!
//! No retry happens here: retry policy, if any, belongs to the orchestrator's
//! strategy, and the current strategies deliberately do not retry pages.

use crate::error::RecognizeError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// An OCR engine invoked once per page image.
///
/// Calls are synchronous and may be long-running; the page worker dispatches
/// them onto the blocking thread pool.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &Path, language: &str) -> Result<String, RecognizeError>;
}

/// Tesseract CLI adapter.
pub struct TesseractRecognizer {
    binary: String,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Probe whether the configured binary responds to `--version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, image: &Path, language: &str) -> Result<String, RecognizeError> {
        debug!("Running OCR on {} (lang={})", image.display(), language);

        let output = Command::new(&self.binary)
            .arg(image.as_os_str())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .map_err(|e| {
                RecognizeError::new(
                    image,
                    format!("failed to run '{}' (is it installed?): {e}", self.binary),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognizeError::new(
                image,
                format!(
                    "engine exited with code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_unavailable() {
        let r = TesseractRecognizer::new("/nonexistent/tesseract");
        assert!(!r.is_available());
    }

    #[test]
    fn missing_binary_fails_with_path_in_error() {
        let r = TesseractRecognizer::new("/nonexistent/tesseract");
        let err = r
            .recognize(Path::new("/tmp/page-0000.png"), "eng+vie")
            .unwrap_err();
        assert!(err.to_string().contains("page-0000.png"));
        assert!(err.to_string().contains("is it installed"));
    }

    #[test]
    fn default_binary_name_is_on_path_form() {
        let r = TesseractRecognizer::default();
        assert_eq!(r.binary, "tesseract");
    }
}
