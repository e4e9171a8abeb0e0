//! Load → decode → save, with the progress lines printed between stages.

use anyhow::{Context as _, Result};
use msgpipe_core::{DecodeMode, decode, load};
use msgpipe_storage::Storage;
use serde::Serialize;
use std::path::PathBuf;

use crate::ensure_db_dir;

pub(crate) struct Options {
    pub messages: PathBuf,
    pub categories: PathBuf,
    pub database: PathBuf,
    pub table: String,
    pub mode: DecodeMode,
    /// Suppress progress lines.
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct RunSummary {
    pub messages: PathBuf,
    pub categories: PathBuf,
    pub database: PathBuf,
    pub table: String,
    pub mode: DecodeMode,
    pub rows_loaded: usize,
    pub dropped_invalid: usize,
    pub rows_written: usize,
    pub indicators: Vec<String>,
}

pub(crate) fn run(opts: &Options) -> Result<RunSummary> {
    progress(
        opts,
        &format!(
            "Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}",
            opts.messages.display(),
            opts.categories.display()
        ),
    );
    let combined = load(&opts.messages, &opts.categories).context("failed to load input files")?;
    let rows_loaded = combined.len();

    progress(opts, "Cleaning data...");
    let report = decode(combined, opts.mode).context("failed to decode categories")?;

    progress(opts, &format!("Saving data...\n    DATABASE: {}", opts.database.display()));
    ensure_db_dir(&opts.database)?;
    let storage = Storage::new(&opts.database)
        .with_context(|| format!("failed to open database {}", opts.database.display()))?;
    let rows_written = storage
        .replace_table(&opts.table, &report.decoded)
        .with_context(|| format!("failed to write table {}", opts.table))?;

    progress(opts, "Cleaned data saved to database!");

    Ok(RunSummary {
        messages: opts.messages.clone(),
        categories: opts.categories.clone(),
        database: opts.database.clone(),
        table: opts.table.clone(),
        mode: opts.mode,
        rows_loaded,
        dropped_invalid: report.dropped_invalid,
        rows_written,
        indicators: report.schema.names().to_vec(),
    })
}

fn progress(opts: &Options, line: &str) {
    if !opts.quiet {
        println!("{line}");
    }
}
