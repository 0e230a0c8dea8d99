//! Command-line interface.

mod progress;
mod scrape;

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, LoadOptions};
use crate::models::SchemaVersion;

#[derive(Parser)]
#[command(name = "evictions")]
#[command(about = "Scrape municipal civil eviction filings into a CSV dataset")]
#[command(version)]
pub struct Cli {
    /// Dataset CSV to create or update
    dataset: PathBuf,

    /// mmddyyyy dates: none updates to today, END updates to END,
    /// START END builds a new file
    #[arg(num_args = 0..=2)]
    dates: Vec<String>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Show the browser window instead of running headless
    #[arg(long)]
    show_browser: bool,

    /// Chrome/Chromium executable
    #[arg(long, env = "EVICTIONS_CHROME")]
    chrome: Option<PathBuf>,

    /// Column layout for the written dataset
    #[arg(long, value_enum)]
    schema: Option<SchemaVersion>,

    /// Directory for issue files (defaults to the dataset's directory)
    #[arg(long)]
    issues_dir: Option<PathBuf>,

    /// Do not re-check pending cases for dispositions
    #[arg(long)]
    skip_dispositions: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config.clone(),
    };
    let mut config = load_config(&options).await?;

    if cli.show_browser {
        config.browser.headless = false;
    }
    if let Some(chrome) = cli.chrome {
        config.browser.chrome_path = Some(chrome);
    }
    if let Some(schema) = cli.schema {
        config.portal.schema = schema;
    }

    let issues_dir = cli.issues_dir.or_else(|| config.issues_dir());

    scrape::cmd_scrape(
        &config,
        &cli.dataset,
        &cli.dates,
        issues_dir.as_deref(),
        !cli.skip_dispositions,
    )
    .await
}
