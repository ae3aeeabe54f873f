//! End-to-end `build` pipeline: docs tree → hooks → staged tree.
//!
//! Markdown pages are run through the enabled [`HookPipeline`]; every other
//! file is copied byte for byte. The source tree is only ever read.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use osfdocs_markdown::{HookPipeline, PageContext};
use osfdocs_shared::{AppConfig, BuildSummary, HooksConfig, OsfDocsError, Result};

/// Runtime build configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Wiki sources.
    pub docs_dir: PathBuf,
    /// Staging destination.
    pub out_dir: PathBuf,
    /// Extensions (no dot, case-insensitive) treated as Markdown.
    pub extensions: Vec<String>,
    /// Enabled hooks.
    pub hooks: HooksConfig,
    /// Remove `out_dir` before staging.
    pub clean: bool,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            docs_dir: PathBuf::from(&config.build.docs_dir),
            out_dir: PathBuf::from(&config.build.out_dir),
            extensions: config.build.extensions.clone(),
            hooks: config.hooks.clone(),
            clean: false,
        }
    }
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each file is staged.
    fn file_staged(&self, path: &Path, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, summary: &BuildSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_staged(&self, _path: &Path, _current: usize, _total: usize) {}
    fn done(&self, _summary: &BuildSummary) {}
}

/// Stage a filtered copy of `config.docs_dir` into `config.out_dir`.
///
/// 1. Validate the directory layout
/// 2. Optionally clear the output directory
/// 3. Walk the docs tree (sorted, following symlinks)
/// 4. Filter Markdown pages, copy everything else
#[instrument(skip_all, fields(docs_dir = %config.docs_dir.display(), out_dir = %config.out_dir.display()))]
pub fn build_site(config: &BuildConfig, progress: &dyn ProgressReporter) -> Result<BuildSummary> {
    let start = Instant::now();

    progress.phase("Checking layout");
    let (docs_dir, out_dir) = validate_layout(&config.docs_dir, &config.out_dir)?;

    let pipeline = HookPipeline::from_config(&config.hooks);
    info!(hooks = ?pipeline.names(), "staging docs tree");

    if config.clean && out_dir.exists() {
        progress.phase("Cleaning output directory");
        std::fs::remove_dir_all(&out_dir).map_err(|e| OsfDocsError::io(&out_dir, e))?;
        debug!(path = %out_dir.display(), "removed previous output");
    }
    std::fs::create_dir_all(&out_dir).map_err(|e| OsfDocsError::io(&out_dir, e))?;

    progress.phase("Scanning docs tree");
    let entries = walk_sorted(&docs_dir)?;
    let total = entries.iter().filter(|(_, is_dir)| !is_dir).count();

    progress.phase("Staging pages");
    let mut summary = BuildSummary {
        out_dir: out_dir.display().to_string(),
        ..Default::default()
    };
    let mut staged = 0;

    for (path, is_dir) in &entries {
        let rel = path.strip_prefix(&docs_dir).map_err(|_| {
            OsfDocsError::validation(format!(
                "{} is outside {}",
                path.display(),
                docs_dir.display()
            ))
        })?;
        let dest = out_dir.join(rel);

        if *is_dir {
            std::fs::create_dir_all(&dest).map_err(|e| OsfDocsError::io(&dest, e))?;
            continue;
        }

        if is_markdown(path, &config.extensions) {
            let source = read_page(path)?;
            let page = PageContext::new(path, &docs_dir);
            let (rendered, removed) = pipeline.run_with_stats(&source, &page);

            summary.markers_removed += removed;
            if rendered != source {
                summary.pages_changed += 1;
            }
            summary.pages_filtered += 1;

            std::fs::write(&dest, rendered).map_err(|e| OsfDocsError::io(&dest, e))?;
        } else {
            std::fs::copy(path, &dest).map_err(|e| OsfDocsError::io(path, e))?;
            summary.files_copied += 1;
        }

        staged += 1;
        progress.file_staged(rel, staged, total);
    }

    info!(
        pages = summary.pages_filtered,
        changed = summary.pages_changed,
        copied = summary.files_copied,
        markers = summary.markers_removed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "docs tree staged"
    );

    progress.done(&summary);
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether `path` has one of the Markdown `extensions` (case-insensitive).
pub(crate) fn is_markdown(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Read a page as UTF-8 text.
pub(crate) fn read_page(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| OsfDocsError::io(path, e))?;
    String::from_utf8(bytes)
        .map_err(|e| OsfDocsError::parse(format!("{} is not valid UTF-8: {e}", path.display())))
}

/// Walk `root` in file-name order, returning `(path, is_dir)` pairs.
pub(crate) fn walk_sorted(root: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        entries.push((entry.path().to_path_buf(), entry.file_type().is_dir()));
    }

    Ok(entries)
}

fn walk_error(root: &Path, err: walkdir::Error) -> OsfDocsError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    OsfDocsError::io(path, source)
}

/// Resolve both directories and reject layouts where staging would read its
/// own output or clobber the sources.
///
/// An `out_dir` that contains `docs_dir` is rejected too: mirrored paths such
/// as `out/docs/x.md` would land on the sources themselves.
fn validate_layout(docs_dir: &Path, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    if !docs_dir.is_dir() {
        return Err(OsfDocsError::validation(format!(
            "docs directory '{}' does not exist or is not a directory",
            docs_dir.display()
        )));
    }

    let docs = docs_dir
        .canonicalize()
        .map_err(|e| OsfDocsError::io(docs_dir, e))?;
    let out = resolve_lenient(out_dir)?;

    if out.starts_with(&docs) {
        return Err(OsfDocsError::validation(format!(
            "output directory '{}' must not be inside docs directory '{}'",
            out_dir.display(),
            docs_dir.display()
        )));
    }
    if docs.starts_with(&out) {
        return Err(OsfDocsError::validation(format!(
            "output directory '{}' must not contain docs directory '{}'",
            out_dir.display(),
            docs_dir.display()
        )));
    }

    Ok((docs, out))
}

/// Canonicalize the longest existing ancestor of `path` and re-append the rest.
fn resolve_lenient(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path).map_err(|e| OsfDocsError::io(path, e))?;

    let mut existing = abs.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_owned());
                existing = parent;
            }
            _ => return Ok(abs),
        }
    }

    let mut resolved = existing
        .canonicalize()
        .map_err(|e| OsfDocsError::io(existing, e))?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}
