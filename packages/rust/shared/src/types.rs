//! Report types shared between the filter, the staging pipeline, and the CLI.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MarkerHit
// ---------------------------------------------------------------------------

/// A single `@[toc](...)` marker line found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerHit {
    /// 1-based line number.
    pub line: usize,
    /// The line exactly as it appears in the source.
    pub text: String,
}

// ---------------------------------------------------------------------------
// FilterStats
// ---------------------------------------------------------------------------

/// Line accounting for one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    /// Lines in the input (a trailing newline does not start a new line).
    pub lines_in: usize,
    /// Marker lines dropped.
    pub lines_removed: usize,
}

impl FilterStats {
    /// Lines that survived the pass.
    pub fn lines_kept(&self) -> usize {
        self.lines_in - self.lines_removed
    }
}

// ---------------------------------------------------------------------------
// FileReport
// ---------------------------------------------------------------------------

/// Markers found in one file during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Path as displayed to the user.
    pub path: String,
    /// Marker lines in document order.
    pub markers: Vec<MarkerHit>,
}

// ---------------------------------------------------------------------------
// BuildSummary
// ---------------------------------------------------------------------------

/// Outcome of staging a filtered docs tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Markdown pages passed through the hook pipeline.
    pub pages_filtered: usize,
    /// Pages whose output differs from the source.
    pub pages_changed: usize,
    /// Non-Markdown files copied verbatim.
    pub files_copied: usize,
    /// Total marker lines stripped across all pages.
    pub markers_removed: usize,
    /// Where the staged tree was written.
    pub out_dir: String,
}
