//! Application configuration for osfdocs.
//!
//! User config lives at `~/.osfdocs/osfdocs.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OsfDocsError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "osfdocs.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".osfdocs";

// ---------------------------------------------------------------------------
// Config structs (matching osfdocs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Docs tree layout.
    #[serde(default)]
    pub build: BuildSection,

    /// Which pre-render hooks are enabled.
    #[serde(default)]
    pub hooks: HooksConfig,
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Directory holding the wiki Markdown sources (never modified).
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Directory the filtered copy is staged into.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// File extensions treated as Markdown pages (without the dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            out_dir: default_out_dir(),
            extensions: default_extensions(),
        }
    }
}

fn default_docs_dir() -> String {
    "docs".into()
}
fn default_out_dir() -> String {
    "build/docs".into()
}
fn default_extensions() -> Vec<String> {
    vec!["md".into(), "markdown".into()]
}

/// `[hooks]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Strip `@[toc](...)` marker lines before rendering.
    #[serde(default = "default_true")]
    pub strip_toc_markers: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            strip_toc_markers: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.osfdocs/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| OsfDocsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.osfdocs/osfdocs.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| OsfDocsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        OsfDocsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    write_default_config(&path)?;
    Ok(path)
}

/// Write the default config to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| OsfDocsError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| OsfDocsError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| OsfDocsError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("docs_dir"));
        assert!(toml_str.contains("strip_toc_markers = true"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.build.docs_dir, "docs");
        assert_eq!(config.build.out_dir, "build/docs");
        assert_eq!(config.build.extensions, vec!["md", "markdown"]);
        assert!(config.hooks.strip_toc_markers);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml_str = r#"
[build]
docs_dir = "wiki"

[hooks]
strip_toc_markers = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.build.docs_dir, "wiki");
        assert_eq!(config.build.out_dir, "build/docs");
        assert!(!config.hooks.strip_toc_markers);
    }

    #[test]
    fn write_then_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        write_default_config(&path).expect("write");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.build.docs_dir, "docs");
        assert!(loaded.hooks.strip_toc_markers);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[build\ndocs_dir = ").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, OsfDocsError::Config { .. }));
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, OsfDocsError::Io { .. }));
    }
}
