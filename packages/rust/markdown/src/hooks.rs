//! Pre-render page hooks.
//!
//! A hook receives a page's raw Markdown plus the page's identity and returns
//! the Markdown that should be rendered instead. Hooks run in sequence, each
//! seeing the previous one's output.

use std::path::{Path, PathBuf};

use tracing::debug;

use osfdocs_shared::{FilterStats, HooksConfig};

use crate::toc_marker::strip_toc_markers_with_stats;

/// Identity of the page being processed.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Path of the page source.
    pub src_path: PathBuf,
    /// Root of the docs tree the page belongs to.
    pub docs_dir: PathBuf,
}

impl PageContext {
    pub fn new(src_path: impl Into<PathBuf>, docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_path: src_path.into(),
            docs_dir: docs_dir.into(),
        }
    }

    /// The page path relative to the docs tree, or the full path when the
    /// page lives outside it.
    pub fn rel_path(&self) -> &Path {
        self.src_path
            .strip_prefix(&self.docs_dir)
            .unwrap_or(&self.src_path)
    }
}

/// A transform applied to page Markdown before rendering.
pub trait PageHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return the Markdown to render for `page`.
    fn on_page_markdown(&self, markdown: &str, page: &PageContext) -> String;

    /// Like [`PageHook::on_page_markdown`], also reporting removed lines.
    /// Hooks that never drop lines can keep the default.
    fn on_page_markdown_with_stats(
        &self,
        markdown: &str,
        page: &PageContext,
    ) -> (String, FilterStats) {
        (self.on_page_markdown(markdown, page), FilterStats::default())
    }
}

/// Strips `@[toc](...)` marker lines.
///
/// Output depends only on the Markdown; the page context is used for logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct TocMarkerHook;

impl PageHook for TocMarkerHook {
    fn name(&self) -> &'static str {
        "strip_toc_markers"
    }

    fn on_page_markdown(&self, markdown: &str, page: &PageContext) -> String {
        self.on_page_markdown_with_stats(markdown, page).0
    }

    fn on_page_markdown_with_stats(
        &self,
        markdown: &str,
        page: &PageContext,
    ) -> (String, FilterStats) {
        let (out, stats) = strip_toc_markers_with_stats(markdown);
        if stats.lines_removed > 0 {
            debug!(
                page = %page.rel_path().display(),
                removed = stats.lines_removed,
                "stripped toc markers"
            );
        }
        (out, stats)
    }
}

/// Ordered set of enabled hooks.
#[derive(Default)]
pub struct HookPipeline {
    hooks: Vec<Box<dyn PageHook>>,
}

impl HookPipeline {
    /// Build the pipeline from the `[hooks]` config section.
    pub fn from_config(config: &HooksConfig) -> Self {
        let mut pipeline = Self::default();
        if config.strip_toc_markers {
            pipeline.push(TocMarkerHook);
        }
        pipeline
    }

    /// Append a hook to run after the existing ones.
    pub fn push(&mut self, hook: impl PageHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Names of the enabled hooks, in run order.
    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Run every hook over `markdown` in order.
    pub fn run(&self, markdown: &str, page: &PageContext) -> String {
        self.run_with_stats(markdown, page).0
    }

    /// Run every hook in order, returning the output and the total number of
    /// lines the hooks removed.
    pub fn run_with_stats(&self, markdown: &str, page: &PageContext) -> (String, usize) {
        let mut result = markdown.to_string();
        let mut removed = 0;
        for hook in &self.hooks {
            let (out, stats) = hook.on_page_markdown_with_stats(&result, page);
            result = out;
            removed += stats.lines_removed;
        }
        (result, removed)
    }
}

impl std::fmt::Debug for HookPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookPipeline")
            .field("hooks", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shout;

    impl PageHook for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn on_page_markdown(&self, markdown: &str, _page: &PageContext) -> String {
            markdown.to_uppercase()
        }
    }

    fn page() -> PageContext {
        PageContext::new("docs/home.md", "docs")
    }

    #[test]
    fn toc_hook_strips_marker() {
        let out = TocMarkerHook.on_page_markdown("# Home\n@[toc](Sections)\nHi\n", &page());
        assert_eq!(out, "# Home\nHi\n");
    }

    #[test]
    fn toc_hook_ignores_page_identity() {
        let input = "@[toc](Sections)\nbody";
        let a = TocMarkerHook.on_page_markdown(input, &page());
        let b = TocMarkerHook.on_page_markdown(input, &PageContext::default());
        assert_eq!(a, b);
    }

    #[test]
    fn rel_path_strips_docs_dir() {
        assert_eq!(page().rel_path(), Path::new("home.md"));

        let outside = PageContext::new("/elsewhere/page.md", "docs");
        assert_eq!(outside.rel_path(), Path::new("/elsewhere/page.md"));
    }

    #[test]
    fn toc_hook_reports_removed_lines() {
        let (out, stats) =
            TocMarkerHook.on_page_markdown_with_stats("@[toc](A)\nx\n @[TOC](B) \n", &page());
        assert_eq!(out, "x\n");
        assert_eq!(stats.lines_in, 3);
        assert_eq!(stats.lines_removed, 2);
    }

    #[test]
    fn pipeline_sums_removed_lines_across_hooks() {
        let mut pipeline = HookPipeline::from_config(&HooksConfig::default());
        pipeline.push(Shout);
        pipeline.push(TocMarkerHook);

        let (out, removed) = pipeline.run_with_stats("@[toc](x)\nhello\n", &page());
        assert_eq!(out, "HELLO\n");
        assert_eq!(removed, 1);

        let disabled = HookPipeline::from_config(&HooksConfig {
            strip_toc_markers: false,
        });
        assert_eq!(disabled.run_with_stats("@[toc](x)\n", &page()).1, 0);
    }

    #[test]
    fn pipeline_from_default_config_has_toc_hook() {
        let pipeline = HookPipeline::from_config(&HooksConfig::default());
        assert_eq!(pipeline.names(), vec!["strip_toc_markers"]);
    }

    #[test]
    fn disabled_pipeline_is_identity() {
        let config = HooksConfig {
            strip_toc_markers: false,
        };
        let pipeline = HookPipeline::from_config(&config);
        assert!(pipeline.is_empty());

        let input = "@[toc](Sections)\nbody\n";
        assert_eq!(pipeline.run(input, &page()), input);
    }

    #[test]
    fn hooks_run_in_order() {
        let mut pipeline = HookPipeline::from_config(&HooksConfig::default());
        pipeline.push(Shout);

        // The marker is gone before Shout upper-cases the rest.
        let out = pipeline.run("@[toc](x)\nhello\n", &page());
        assert_eq!(out, "HELLO\n");

        // Reversed order: Shout first still yields a matching marker, since
        // matching is case-insensitive.
        let mut reversed = HookPipeline::default();
        reversed.push(Shout);
        reversed.push(TocMarkerHook);
        assert_eq!(reversed.run("@[toc](x)\nhello\n", &page()), "HELLO\n");
    }
}
