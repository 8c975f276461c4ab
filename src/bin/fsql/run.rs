//! Command execution for fsql.

use std::io::{self, Write};

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use fsql::{
    MismatchPolicy, ReadOptions, RecordBatchReader, ScanRequest, StoreConfig, Table,
};
use futures_util::TryStreamExt;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command, LogLevel, ReadArgs, Selection};

/// Initialize logging with the specified level, unless `RUST_LOG` is set.
///
/// Logs are written to stderr so stdout remains clean for program output.
pub fn init_logging(level: LogLevel) -> Result<()> {
    let level: Level = level.into();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = StoreConfig::load(cli.config.as_deref()).context("loading store configuration")?;
    match cli.command {
        Command::Ls(selection) => list(&selection, &config).await,
        Command::Read(args) => read(&args, &config).await,
    }
}

fn open_table(selection: &Selection, config: &StoreConfig) -> Result<(Table, fsql::Expr)> {
    let (pattern, predicate) = selection.pattern_and_predicate()?;
    let table = Table::open(&selection.url, config)
        .with_context(|| format!("opening {}", selection.url))?
        .with_pattern(pattern);
    info!(root = %table.root(), predicate = %predicate, "scanning table");
    Ok((table, predicate))
}

fn request<'a>(table: &'a Table, selection: &Selection, predicate: fsql::Expr) -> ScanRequest<'a> {
    let policy = if selection.strict {
        MismatchPolicy::Error
    } else {
        MismatchPolicy::Skip
    };
    ScanRequest::new(table)
        .with_predicate(predicate)
        .on_mismatch(policy)
        .ignore_hidden(!selection.include_hidden)
        .generate_from_predicate(selection.generate)
}

async fn list(selection: &Selection, config: &StoreConfig) -> Result<()> {
    let (table, predicate) = open_table(selection, config)?;
    let mut files = request(&table, selection, predicate).files();
    let mut stdout = io::stdout().lock();
    let mut count = 0usize;
    while let Some(file) = files.try_next().await? {
        writeln!(stdout, "{}", file.to_json()?)?;
        count += 1;
    }
    info!(files = count, "listing finished");
    Ok(())
}

async fn read(args: &ReadArgs, config: &StoreConfig) -> Result<()> {
    let (table, predicate) = open_table(&args.selection, config)?;
    let options = ReadOptions::builder()
        .format(args.format.into())
        .error_mode(args.error_mode())
        .max_concurrency(args.concurrency)
        .build();
    let outcome = request(&table, &args.selection, predicate)
        .read(&RecordBatchReader::new(), &options)
        .await?;

    for failure in outcome.failures() {
        eprintln!("Skipped {}: {}", failure.file.location, failure.reason);
    }
    let batch = outcome.into_data();
    println!("{}", pretty_format_batches(&[batch])?);
    Ok(())
}
