use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use common::config::Config;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

mod commands;

/// Inspect and rewrite modbus device templates.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("could not read config {:?}", path))?,
        None => Config::default(),
    };

    let level = Level::from_str(&config.log_level)
        .with_context(|| format!("unknown log level `{}`", config.log_level))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    debug!(?config, "starting");

    commands::run(args.command, &config)
}
