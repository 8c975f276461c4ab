//! CLI argument definitions for fsql.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fsql::{
    DateLayout, DateRange, ErrorMode, Expr, InputFormat, PathPattern, PatternStyle,
    expr::simplify,
};
use tracing::Level;

/// Query partitioned tables stored as directory trees.
///
/// ## Examples
///
/// List hive-partitioned files of one year:
///   fsql ls s3://bucket/events --pattern "year:int/month:int" -f "year=2022"
///
/// Read a fixed-layout table between two dates:
///   fsql read ./logs --style fixed --date-range 2022/04/28..2022/05/02
#[derive(Parser, Debug)]
#[command(name = "fsql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with per-scheme object store options
    #[arg(long, global = true, env = "FSQL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print matching files as JSON lines
    Ls(Selection),

    /// Load matching files into one table and print it
    Read(ReadArgs),
}

/// Which table and which of its files.
#[derive(Args, Debug)]
pub struct Selection {
    /// Table location: s3://bucket/prefix, file:///path, or a local path
    pub url: String,

    /// Directory pattern, e.g. "year:int/month:int/kind=[a,b]"
    ///
    /// Without a pattern (and without --date-range) the tree is crawled as
    /// key=value directories of any depth.
    #[arg(long)]
    pub pattern: Option<String>,

    /// How shorthand segments appear in the tree
    #[arg(long, value_enum, default_value = "hive")]
    pub style: StyleArg,

    /// Expose each file name as a column, optionally with enumerated names
    #[arg(long)]
    pub file_column: Option<String>,

    /// Partition filter (can be specified multiple times, all must hold)
    ///
    /// "col=v1,v2" for set membership, or a comparison such as "col>=v",
    /// "col<v", "col!=v".
    #[arg(long = "filter", short = 'f')]
    pub filters: Vec<String>,

    /// Date range "start..end[:year,month,day]", end exclusive
    ///
    /// Without --pattern the directories are generated from the range instead
    /// of listed.
    #[arg(long)]
    pub date_range: Option<String>,

    /// Zero-pad generated months and days
    #[arg(long)]
    pub zero_pad: bool,

    /// Fail on names that do not fit the pattern instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Derive directory names from "=" filters instead of listing
    #[arg(long)]
    pub generate: bool,

    /// Do not skip names starting with "." or "_"
    #[arg(long)]
    pub include_hidden: bool,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// File format
    #[arg(long, value_enum, default_value = "auto")]
    pub format: FormatArg,

    /// Report unreadable files instead of failing
    #[arg(long)]
    pub collect_errors: bool,

    /// Files read concurrently
    #[arg(long, default_value = "32", value_parser = parse_positive_usize)]
    pub concurrency: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StyleArg {
    Hive,
    Fixed,
}

impl From<StyleArg> for PatternStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Hive => PatternStyle::Hive,
            StyleArg::Fixed => PatternStyle::Fixed,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Auto,
    Parquet,
    Csv,
    Json,
}

impl From<FormatArg> for InputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Auto => InputFormat::Auto,
            FormatArg::Parquet => InputFormat::Parquet,
            FormatArg::Csv => InputFormat::Csv,
            FormatArg::Json => InputFormat::Json,
        }
    }
}

impl ReadArgs {
    pub fn error_mode(&self) -> ErrorMode {
        if self.collect_errors {
            ErrorMode::Collect
        } else {
            ErrorMode::FailFast
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// A parsed `--date-range` value.
#[derive(Debug, PartialEq)]
pub struct DateRangeArg {
    pub range: DateRange,
    pub columns: [String; 3],
}

impl Selection {
    /// Pattern and predicate described by the arguments.
    pub fn pattern_and_predicate(&self) -> Result<(PathPattern, Expr)> {
        let mut predicate: Vec<Expr> = self
            .filters
            .iter()
            .map(String::as_str)
            .map(parse_filter)
            .collect::<Result<_>>()?;
        let date_range = self.date_range.as_deref().map(parse_date_range).transpose()?;

        let style = PatternStyle::from(self.style);
        let mut pattern = match (&self.pattern, &date_range) {
            (Some(desc), _) => PathPattern::parse(desc, style)?,
            (None, Some(arg)) => {
                let [year, month, day] = &arg.columns;
                let layout = DateLayout::new()
                    .with_names(year, month, day)
                    .with_style(style)
                    .with_zero_padding(self.zero_pad);
                PathPattern::date_range(arg.range, layout)?
            }
            (None, None) => PathPattern::auto(),
        };
        if let Some(column) = &self.file_column {
            pattern = pattern.with_file_column(column)?;
        }
        if let Some(arg) = date_range {
            let [year, month, day] = arg.columns;
            predicate.push(Expr::date_range_on(arg.range, year, month, day));
        }
        Ok((pattern, simplify(Expr::and(predicate))))
    }
}

/// `col=v1,v2`, `col!=v`, `col<v`, `col<=v`, `col>v` or `col>=v`.
pub fn parse_filter(raw: &str) -> Result<Expr> {
    let at = raw
        .find(['<', '>', '=', '!'])
        .ok_or_else(|| anyhow!("filter '{raw}' has no operator"))?;
    let (column, rest) = raw.split_at(at);
    let column = column.trim();
    if column.is_empty() {
        bail!("filter '{raw}' has no column");
    }
    let (op, value) = ["<=", ">=", "!=", "<", ">", "="]
        .iter()
        .find_map(|op| rest.strip_prefix(op).map(|value| (*op, value.trim())))
        .ok_or_else(|| anyhow!("filter '{raw}' has an unknown operator"))?;
    let expr = match op {
        "=" => {
            let values: Vec<&str> = value.split(',').map(str::trim).collect();
            if values.len() == 1 {
                Expr::eq(column, values[0])
            } else {
                Expr::in_list(column, values)
            }
        }
        "!=" => Expr::not_eq(column, value),
        "<" => Expr::lt(column, value),
        "<=" => Expr::lt_eq(column, value),
        ">" => Expr::gt(column, value),
        _ => Expr::gt_eq(column, value),
    };
    Ok(expr)
}

/// `start..end` with optional `:year,month,day` column names.
pub fn parse_date_range(raw: &str) -> Result<DateRangeArg> {
    let (range, columns) = match raw.split_once(':') {
        Some((range, columns)) => (range, Some(columns)),
        None => (raw, None),
    };
    let range: DateRange = range
        .parse()
        .with_context(|| format!("invalid date range '{raw}'"))?;
    let columns = match columns {
        None => ["year".to_string(), "month".to_string(), "day".to_string()],
        Some(names) => {
            let names: Vec<String> = names.split(',').map(|n| n.trim().to_string()).collect();
            names
                .try_into()
                .map_err(|_| anyhow!("date range columns must be year,month,day names"))?
        }
    };
    Ok(DateRangeArg { range, columns })
}

fn parse_positive_usize(s: &str) -> std::result::Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(value)
}
