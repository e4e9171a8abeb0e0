use anyhow::Result;
use clap::Parser;
use msgpipe_core::{DecodeMode, decode_mode_from_env, table_name_from_env};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "msgpipe")]
#[command(
    about = "Merge message and category CSVs, decode the packed labels and save the result to SQLite",
    long_about = None,
    after_help = "Example: msgpipe disaster_messages.csv disaster_categories.csv DisasterResponse.db"
)]
struct Cli {
    /// Messages CSV; must have an `id` column
    messages: PathBuf,
    /// Categories CSV; must have `id` and `categories` columns
    categories: PathBuf,
    /// SQLite database file to write
    database: PathBuf,
    /// Destination table [env: MSGPIPE_TABLE] [default: Dataset]
    #[arg(short, long)]
    table: Option<String>,
    /// Decoding mode, `strict` or `lenient` [env: MSGPIPE_DECODE_MODE] [default: lenient]
    #[arg(long, value_name = "MODE")]
    mode: Option<DecodeMode>,
    /// Shorthand for `--mode strict`: reject rows without labels, with label names that
    /// differ from the first row, or with values outside 0-2
    #[arg(long, conflicts_with = "mode")]
    strict: bool,
    /// Print a JSON run summary instead of progress lines
    #[arg(long)]
    json: bool,
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = commands::process::Options {
        messages: cli.messages,
        categories: cli.categories,
        database: cli.database,
        table: cli.table.unwrap_or_else(table_name_from_env),
        mode: cli
            .mode
            .or(cli.strict.then_some(DecodeMode::Strict))
            .unwrap_or_else(decode_mode_from_env),
        quiet: cli.json,
    };

    let summary = commands::process::run(&options)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
