//! Read-only audit of docs trees for `@[toc](...)` marker lines.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use osfdocs_markdown::find_toc_markers;
use osfdocs_shared::{FileReport, Result};

use crate::pipeline::{is_markdown, read_page, walk_sorted};

/// Scan files and directories for marker lines.
///
/// Files named explicitly are scanned whatever their extension; directories
/// are walked for files matching `extensions`. Only files that contain at
/// least one marker appear in the result, in walk order.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn scan_tree(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<FileReport>> {
    let mut reports = Vec::new();

    for root in paths {
        if root.is_dir() {
            for (path, is_dir) in walk_sorted(root)? {
                if !is_dir && is_markdown(&path, extensions) {
                    reports.extend(scan_file(&path)?);
                }
            }
        } else {
            reports.extend(scan_file(root)?);
        }
    }

    debug!(files_with_markers = reports.len(), "scan complete");
    Ok(reports)
}

fn scan_file(path: &Path) -> Result<Option<FileReport>> {
    let text = read_page(path)?;
    let markers = find_toc_markers(&text);

    if markers.is_empty() {
        return Ok(None);
    }

    Ok(Some(FileReport {
        path: path.display().to_string(),
        markers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use osfdocs_shared::OsfDocsError;

    fn md() -> Vec<String> {
        vec!["md".into()]
    }

    #[test]
    fn reports_only_files_with_markers() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path();
        std::fs::create_dir_all(docs.join("b")).unwrap();
        std::fs::write(docs.join("a.md"), "@[toc](Sections)\ntext\n").unwrap();
        std::fs::write(docs.join("b").join("c.md"), "clean\n").unwrap();
        std::fs::write(docs.join("b").join("d.md"), "x\n  @[TOC](More)\n").unwrap();
        std::fs::write(docs.join("notes.txt"), "@[toc](ignored)\n").unwrap();

        let reports = scan_tree(&[docs.to_path_buf()], &md()).unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports[0].path.ends_with("a.md"));
        assert_eq!(reports[0].markers[0].line, 1);
        assert!(reports[1].path.ends_with("d.md"));
        assert_eq!(reports[1].markers[0].line, 2);
        assert_eq!(reports[1].markers[0].text, "  @[TOC](More)");
    }

    #[test]
    fn explicit_file_ignores_extension_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "@[toc](Sections)\n").unwrap();

        let reports = scan_tree(&[path], &md()).unwrap();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn missing_path_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scan_tree(&[tmp.path().join("absent.md")], &md()).unwrap_err();
        assert!(matches!(err, OsfDocsError::Io { .. }));
    }
}
