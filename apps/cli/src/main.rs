//! osfdocs CLI: build-time hooks for rendering OSF wiki pages.
//!
//! Strips the wiki's `@[toc](...)` marker lines from Markdown without
//! touching the sources, either per page or by staging a filtered docs tree.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
