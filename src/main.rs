use anyhow::{Context, Result};
use clap::Parser;
use data_sweep::Cleaner;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Remove scratch files from data/files and data/keys
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory the data patterns are resolved against
    #[arg(short = 'C', long = "dir", default_value = ".")]
    dir: PathBuf,

    /// Log each match and deletion to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "data_sweep=debug" } else { "data_sweep=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries only the removal notices
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cleaner = Cleaner::with_defaults()
        .context("Built-in cleanup patterns are invalid")?
        .with_root(&cli.dir);

    let result = cleaner
        .run()
        .with_context(|| format!("Cleaning {} failed", cli.dir.display()))?;
    info!("{}", result.display_status());

    Ok(())
}
