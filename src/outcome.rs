//! Result types produced by the extraction pipeline.
//!
//! [`PageOutcome`] is the per-page unit the fan-out stage collects: it is
//! *always* produced, failed or not, so the final ordering can be
//! reconstructed from any completion order. [`Extraction`] is the run-level
//! result and distinguishes a clean run from a degraded one — callers deciding
//! a document status can treat `Partial` differently from `Complete` instead
//! of conflating every non-fatal outcome.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One page's rendered image on disk.
///
/// Created by the rasteriser inside the run's scratch arena; the arena owns
/// the file, so a `RasterPage` is only valid while its run is alive.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// 0-based position within the original PDF — the sole reordering key.
    pub index: usize,
    /// Path of the PNG inside the scratch arena.
    pub path: PathBuf,
    /// Rendered width in pixels.
    pub width: u32,
    /// Rendered height in pixels.
    pub height: u32,
    /// Density the page was rendered at.
    pub dpi: u32,
}

/// The per-page result of one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    /// 0-based page index, copied from the [`RasterPage`].
    pub index: usize,
    /// Recognised text; empty when `error` is set.
    pub text: String,
    /// Wall-clock time the worker spent on this page.
    pub duration_ms: u64,
    /// Set when the page failed at any worker step.
    pub error: Option<PageError>,
}

impl PageOutcome {
    /// Whether the page produced usable text.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// A failed outcome with empty text.
    pub(crate) fn failed(index: usize, duration_ms: u64, error: PageError) -> Self {
        Self {
            index,
            text: String::new(),
            duration_ms,
            error: Some(error),
        }
    }
}

/// The run-level result of a successful (non-fatal) extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extraction {
    /// Every page recognised.
    Complete(String),
    /// At least one page degraded to an empty segment.
    Partial {
        text: String,
        /// 0-based indices of the pages whose segment is empty.
        failed_pages: Vec<usize>,
    },
}

impl Extraction {
    /// The assembled text, regardless of completeness.
    pub fn text(&self) -> &str {
        match self {
            Extraction::Complete(text) => text,
            Extraction::Partial { text, .. } => text,
        }
    }

    /// Consume the result, returning the assembled text.
    pub fn into_text(self) -> String {
        match self {
            Extraction::Complete(text) => text,
            Extraction::Partial { text, .. } => text,
        }
    }

    /// Indices of failed pages; empty for [`Extraction::Complete`].
    pub fn failed_pages(&self) -> &[usize] {
        match self {
            Extraction::Complete(_) => &[],
            Extraction::Partial { failed_pages, .. } => failed_pages,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Extraction::Complete(_))
    }
}

/// Reorder collected outcomes by page index and join their text.
///
/// Concurrent completion order carries no meaning; sorting by index here is
/// the single place the pipeline re-establishes document order. Segments are
/// joined with one newline and the result is trimmed, so the same multiset of
/// outcomes yields byte-identical text in any input permutation.
pub(crate) fn assemble(mut outcomes: Vec<PageOutcome>) -> (String, Vec<PageOutcome>) {
    outcomes.sort_by_key(|o| o.index);
    let text = outcomes
        .iter()
        .map(|o| o.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    (text, outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, text: &str) -> PageOutcome {
        PageOutcome {
            index,
            text: text.to_string(),
            duration_ms: 0,
            error: None,
        }
    }

    #[test]
    fn assemble_sorts_by_index() {
        let (text, ordered) = assemble(vec![
            outcome(2, "three"),
            outcome(0, "one"),
            outcome(1, "two"),
        ]);
        assert_eq!(text, "one\ntwo\nthree");
        assert_eq!(
            ordered.iter().map(|o| o.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn assemble_is_permutation_invariant() {
        let base = vec![outcome(0, "a"), outcome(1, "b"), outcome(2, "c")];
        let permutations: [Vec<usize>; 6] = [
            vec![0, 1, 2],
            vec![0, 2, 1],
            vec![1, 0, 2],
            vec![1, 2, 0],
            vec![2, 0, 1],
            vec![2, 1, 0],
        ];
        let (expected, _) = assemble(base.clone());
        for perm in permutations {
            let shuffled: Vec<PageOutcome> = perm.iter().map(|&i| base[i].clone()).collect();
            let (text, _) = assemble(shuffled);
            assert_eq!(text, expected);
        }
    }

    #[test]
    fn assemble_keeps_empty_segments_in_place() {
        let (text, _) = assemble(vec![
            outcome(0, "first"),
            PageOutcome::failed(
                1,
                0,
                crate::error::PageError::Recognition {
                    page: 1,
                    detail: "boom".into(),
                },
            ),
            outcome(2, "third"),
        ]);
        // The failed page still contributes its (empty) segment between the others.
        assert_eq!(text, "first\n\nthird");
    }

    #[test]
    fn assemble_trims_outer_whitespace() {
        let (text, _) = assemble(vec![outcome(0, ""), outcome(1, "body"), outcome(2, "")]);
        assert_eq!(text, "body");
    }

    #[test]
    fn extraction_accessors() {
        let complete = Extraction::Complete("text".into());
        assert!(complete.is_complete());
        assert!(complete.failed_pages().is_empty());
        assert_eq!(complete.text(), "text");

        let partial = Extraction::Partial {
            text: "text".into(),
            failed_pages: vec![3],
        };
        assert!(!partial.is_complete());
        assert_eq!(partial.failed_pages(), &[3]);
        assert_eq!(partial.into_text(), "text");
    }
}
