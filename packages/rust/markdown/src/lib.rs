//! Markdown pre-render hooks for OSF wiki pages.
//!
//! OSF wiki sources carry a non-standard `@[toc](Sections)` line that the
//! documentation renderer would otherwise turn into a broken relative link.
//! The sources stay untouched; the marker is stripped at build time by
//! [`TocMarkerHook`], or directly through [`strip_toc_markers`].

mod hooks;
mod toc_marker;

pub use hooks::{HookPipeline, PageContext, PageHook, TocMarkerHook};
pub use toc_marker::{
    find_toc_markers, is_toc_marker, strip_toc_markers, strip_toc_markers_with_stats,
};
