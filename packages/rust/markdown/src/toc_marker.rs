//! Stripping of OSF `@[toc](...)` marker lines.
//!
//! A marker line is one whose whole content, ignoring surrounding whitespace,
//! is `@[toc](<one or more non-')' characters>)`, matched case-insensitively.
//! Every other line passes through byte for byte, and the output ends with a
//! newline exactly when the input does.

use std::sync::LazyLock;

use regex::Regex;

use osfdocs_shared::{FilterStats, MarkerHit};

// Besides Unicode whitespace, the ASCII separators U+001C..U+001F count as
// surrounding whitespace, as they do for Python's `str.isspace`.
static TOC_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s\x1C-\x1F]*@\[toc\]\([^)]+\)[\s\x1C-\x1F]*$").expect("valid regex")
});

/// Whether a single line (without its `\n`) is a TOC marker.
pub fn is_toc_marker(line: &str) -> bool {
    TOC_MARKER_RE.is_match(line)
}

/// Remove every TOC marker line from `markdown`.
///
/// Lines are split on `\n` only, so a `\r` left by CRLF input stays on the
/// kept lines (and counts as trailing whitespace on marker lines).
pub fn strip_toc_markers(markdown: &str) -> String {
    strip_toc_markers_with_stats(markdown).0
}

/// Same as [`strip_toc_markers`], also reporting how many lines were seen and dropped.
pub fn strip_toc_markers_with_stats(markdown: &str) -> (String, FilterStats) {
    let (lines, trailing_newline) = split_lines(markdown);

    let kept: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| !is_toc_marker(line))
        .collect();

    let stats = FilterStats {
        lines_in: lines.len(),
        lines_removed: lines.len() - kept.len(),
    };

    let mut out = kept.join("\n");
    if trailing_newline {
        out.push('\n');
    }

    (out, stats)
}

/// Locate marker lines without modifying the document.
pub fn find_toc_markers(markdown: &str) -> Vec<MarkerHit> {
    let (lines, _) = split_lines(markdown);

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_toc_marker(line))
        .map(|(i, line)| MarkerHit {
            line: i + 1,
            text: (*line).to_string(),
        })
        .collect()
}

/// Split on `\n`, treating one trailing separator as a terminator rather than
/// the start of an empty final line.
fn split_lines(text: &str) -> (Vec<&str>, bool) {
    if text.is_empty() {
        return (Vec::new(), false);
    }

    match text.strip_suffix('\n') {
        Some(body) => (body.split('\n').collect(), true),
        None => (text.split('\n').collect(), false),
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    fn marker_line() -> impl Strategy<Value = String> {
        "[ \t]{0,3}@\\[(toc|TOC|Toc|tOc)\\]\\([^)\n]{1,12}\\)[ \t]{0,3}"
    }

    /// Non-empty lines that can never be markers (no `@`).
    fn plain_line() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 #.,:()\\[\\]*_-]{1,24}"
    }

    /// A document as (line, is_marker) pairs plus a trailing-newline flag.
    fn document() -> impl Strategy<Value = (Vec<(String, bool)>, bool)> {
        let line = prop_oneof![
            plain_line().prop_map(|l| (l, false)),
            marker_line().prop_map(|l| (l, true)),
        ];
        (prop::collection::vec(line, 1..12), any::<bool>())
    }

    fn render(lines: &[(String, bool)], trailing: bool) -> String {
        let mut text = lines
            .iter()
            .map(|(l, _)| l.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if trailing {
            text.push('\n');
        }
        text
    }

    proptest! {
        #[test]
        fn output_is_input_minus_markers((lines, trailing) in document()) {
            let input = render(&lines, trailing);
            let kept: Vec<(String, bool)> =
                lines.iter().filter(|(_, m)| !m).cloned().collect();
            let expected = render(&kept, trailing);

            prop_assert_eq!(strip_toc_markers(&input), expected);
        }

        #[test]
        fn removed_count_matches_markers((lines, trailing) in document()) {
            let input = render(&lines, trailing);
            let markers = lines.iter().filter(|(_, m)| *m).count();

            let (_, stats) = strip_toc_markers_with_stats(&input);
            prop_assert_eq!(stats.lines_in, lines.len());
            prop_assert_eq!(stats.lines_removed, markers);
            prop_assert_eq!(find_toc_markers(&input).len(), markers);
        }

        #[test]
        fn idempotent_on_documents((lines, trailing) in document()) {
            let once = strip_toc_markers(&render(&lines, trailing));
            prop_assert_eq!(strip_toc_markers(&once), once);
        }

        #[test]
        fn idempotent_on_arbitrary_text(text in any::<String>()) {
            let once = strip_toc_markers(&text);
            prop_assert_eq!(strip_toc_markers(&once), once);
        }

        #[test]
        fn trailing_newline_mirrors_input(text in any::<String>()) {
            prop_assert_eq!(strip_toc_markers(&text).ends_with('\n'), text.ends_with('\n'));
        }

        #[test]
        fn text_without_at_sign_is_unchanged(text in "[^@]{0,200}") {
            prop_assert_eq!(strip_toc_markers(&text), text);
        }
    }
}
