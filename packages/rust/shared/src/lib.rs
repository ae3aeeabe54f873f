//! Shared types, error model, and configuration for osfdocs.
//!
//! This crate is the foundation depended on by all other osfdocs crates.
//! It provides:
//! - [`OsfDocsError`]: the unified error type
//! - Report types ([`MarkerHit`], [`FilterStats`], [`FileReport`], [`BuildSummary`])
//! - Configuration ([`AppConfig`], [`BuildSection`], [`HooksConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildSection, HooksConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, write_default_config,
};
pub use error::{OsfDocsError, Result};
pub use types::{BuildSummary, FileReport, FilterStats, MarkerHit};
