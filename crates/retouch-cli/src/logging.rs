//! Logger setup.
//!
//! Log output goes to stderr unless a log file is given, in which case it
//! is appended to that file (one run after another, like a journal).
//! `RUST_LOG` is honoured; `--verbose` raises the default level to debug.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Default filter when `RUST_LOG` is unset.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = default_level(verbose);
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.as_str()));
    if verbose {
        builder.filter_level(level);
    }
    builder.format_timestamp_secs();

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder
        .try_init()
        .context("Failed to initialise logging")?;
    Ok(())
}
