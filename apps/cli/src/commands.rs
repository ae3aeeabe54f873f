//! CLI command definitions, routing, and tracing setup.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use osfdocs_core::pipeline::{BuildConfig, ProgressReporter, build_site};
use osfdocs_core::scan::scan_tree;
use osfdocs_markdown::strip_toc_markers;
use osfdocs_shared::{
    AppConfig, BuildSummary, FileReport, init_config, load_config, load_config_from,
    write_default_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// osfdocs: pre-render hooks for OSF wiki documentation.
#[derive(Parser)]
#[command(
    name = "osfdocs",
    version,
    about = "Strip OSF wiki table-of-contents markers from Markdown before rendering.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.osfdocs/osfdocs.toml.
    #[arg(long, global = true, env = "OSFDOCS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Filter a single page (file or stdin) and print the result.
    Filter {
        /// Input file; reads stdin when omitted or `-`.
        input: Option<PathBuf>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report marker lines without modifying anything.
    Check {
        /// Files or directories to scan (defaults to the configured docs dir).
        paths: Vec<PathBuf>,

        /// Print a JSON report instead of `path:line: text`.
        #[arg(long)]
        json: bool,

        /// Exit with an error if any marker is found.
        #[arg(long)]
        deny: bool,
    },

    /// Stage a filtered copy of the docs tree for the renderer.
    Build {
        /// Wiki sources (overrides `build.docs_dir`).
        #[arg(long)]
        docs_dir: Option<PathBuf>,

        /// Staging destination (overrides `build.out_dir`).
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Leave `@[toc](...)` lines in place.
        #[arg(long)]
        keep_toc_markers: bool,

        /// Remove the output directory before staging.
        #[arg(long)]
        clean: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so that
/// `filter` output on stdout stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "osfdocs=info",
        1 => "osfdocs=debug",
        _ => "osfdocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Filter { input, output } => cmd_filter(input.as_deref(), output.as_deref()),
        Command::Check { paths, json, deny } => cmd_check(config_path, paths, json, deny),
        Command::Build {
            docs_dir,
            out_dir,
            keep_toc_markers,
            clean,
        } => cmd_build(config_path, docs_dir, out_dir, keep_toc_markers, clean),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the `--config` file if given, else the user config (or defaults).
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_filter(input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let bytes = match input {
        Some(p) if p != Path::new("-") => {
            std::fs::read(p).wrap_err_with(|| format!("failed to read '{}'", p.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .wrap_err("failed to read stdin")?;
            buf
        }
    };

    let filtered = filter_bytes(bytes)?;

    match output {
        Some(p) => std::fs::write(p, &filtered)
            .wrap_err_with(|| format!("failed to write '{}'", p.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(filtered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Decode a page as UTF-8 and strip its markers.
fn filter_bytes(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|e| eyre!("input is not valid UTF-8: {e}"))?;
    Ok(strip_toc_markers(&text))
}

fn cmd_check(config_path: Option<&Path>, paths: Vec<PathBuf>, json: bool, deny: bool) -> Result<()> {
    let config = resolve_config(config_path)?;

    let paths = if paths.is_empty() {
        vec![PathBuf::from(&config.build.docs_dir)]
    } else {
        paths
    };

    info!(paths = paths.len(), "scanning for toc markers");
    let reports = scan_tree(&paths, &config.build.extensions)?;

    print!("{}", render_reports(&reports, json)?);
    enforce_deny(&reports, deny)
}

/// Render reports as a JSON array or as `path:line: text` lines.
fn render_reports(reports: &[FileReport], json: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(reports)?))
    } else {
        Ok(format_reports(reports))
    }
}

/// Fail when `deny` is set and any marker was found.
fn enforce_deny(reports: &[FileReport], deny: bool) -> Result<()> {
    let total: usize = reports.iter().map(|r| r.markers.len()).sum();
    if deny && total > 0 {
        return Err(eyre!(
            "found {total} toc marker line(s) in {} file(s)",
            reports.len()
        ));
    }
    Ok(())
}

/// Render reports as `path:line: text`, one marker per line.
fn format_reports(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        for hit in &report.markers {
            out.push_str(&format!("{}:{}: {}\n", report.path, hit.line, hit.text.trim()));
        }
    }
    out
}

fn cmd_build(
    config_path: Option<&Path>,
    docs_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    keep_toc_markers: bool,
    clean: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let build_config = merge_build_config(&config, docs_dir, out_dir, keep_toc_markers, clean);

    info!(
        docs_dir = %build_config.docs_dir.display(),
        out_dir = %build_config.out_dir.display(),
        "building docs tree"
    );

    let reporter = CliProgress::new();
    let summary = build_site(&build_config, &reporter)?;

    println!();
    println!("  Docs tree staged!");
    println!("  Pages:    {}", summary.pages_filtered);
    println!("  Changed:  {}", summary.pages_changed);
    println!("  Markers:  {}", summary.markers_removed);
    println!("  Copied:   {}", summary.files_copied);
    println!("  Output:   {}", summary.out_dir);
    println!();

    Ok(())
}

/// Apply CLI flags on top of the file config.
fn merge_build_config(
    config: &AppConfig,
    docs_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    keep_toc_markers: bool,
    clean: bool,
) -> BuildConfig {
    let mut build = BuildConfig::from(config);
    if let Some(dir) = docs_dir {
        build.docs_dir = dir;
    }
    if let Some(dir) = out_dir {
        build.out_dir = dir;
    }
    if keep_toc_markers {
        build.hooks.strip_toc_markers = false;
    }
    build.clean = clean;
    build
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => {
            write_default_config(p)?;
            p.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn file_staged(&self, path: &Path, current: usize, total: usize) {
        self.bar
            .set_message(format!("Staging [{current}/{total}] {}", path.display()));
    }

    fn done(&self, _summary: &BuildSummary) {
        self.bar.finish_and_clear();
    }
}
