//! Post-processing: deterministic cleanup of raw OCR output.
//!
//! OCR engines emit artefacts that are noise for every downstream consumer:
//! Windows line endings, stray control characters from misread glyphs, runs
//! of blank lines where the layout analysis saw empty regions, and trailing
//! whitespace on nearly every line. These rules are cheap, pure, and applied
//! per page before assembly, so the join step only ever sees normalised
//! segments.
//!
//! Rule order matters: line endings are normalised before any line-wise pass,
//! and blank-line collapsing runs after trailing-whitespace removal so that
//! "whitespace-only" lines count as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to one page's raw OCR output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Drop control characters (except newline and tab)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Trim leading/trailing whitespace of the page
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_control_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_crlf() {
        assert_eq!(clean_page_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn strips_control_chars_keeps_tabs() {
        assert_eq!(clean_page_text("col1\tcol2\x07bell\x00"), "col1\tcol2bell");
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(clean_page_text("para one\n\n\n\n\npara two"), "para one\n\npara two");
    }

    #[test]
    fn trims_trailing_spaces_per_line() {
        assert_eq!(clean_page_text("line one   \nline two\t\t"), "line one\nline two");
    }

    #[test]
    fn trims_page_edges() {
        assert_eq!(clean_page_text("\n\n  body  \n\n"), "body");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_page_text(""), "");
        assert_eq!(clean_page_text("\n\n \n"), "");
    }

    #[test]
    fn whitespace_only_lines_count_as_blank() {
        // The run of "   \n" lines must collapse like truly empty ones.
        assert_eq!(clean_page_text("a\n   \n   \n   \nb"), "a\n\nb");
    }
}
