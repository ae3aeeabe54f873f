//! Docs-tree orchestration for osfdocs.
//!
//! Ties the Markdown hooks to the filesystem: staging a filtered copy of a
//! docs tree for the renderer (`build_site`) and auditing a tree for marker
//! lines (`scan_tree`).

pub mod pipeline;
pub mod scan;
