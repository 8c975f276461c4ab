use std::fmt;

use object_store::path::Path;

use crate::error::{FsqlError, Result};

/// Encoding of the files of a table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum InputFormat {
    /// Decide per file from its extension
    #[default]
    Auto,
    Parquet,
    Csv,
    /// Newline-delimited JSON objects
    Json,
}

impl InputFormat {
    /// Format of the file at `location`, detecting it from the extension for `Auto`.
    pub fn resolve(self, location: &Path) -> Result<InputFormat> {
        if self != InputFormat::Auto {
            return Ok(self);
        }
        let extension = location
            .extension()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "parquet" | "pq" => Ok(InputFormat::Parquet),
            "csv" => Ok(InputFormat::Csv),
            "json" | "jsonl" | "ndjson" => Ok(InputFormat::Json),
            "xlsx" | "xls" => Err(FsqlError::UnsupportedFormat {
                location: location.to_string(),
                reason: "spreadsheets are not supported, export them to csv".to_string(),
            }),
            other => Err(FsqlError::UnsupportedFormat {
                location: location.to_string(),
                reason: format!("cannot detect format from extension '{other}'"),
            }),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Auto => "auto",
            InputFormat::Parquet => "parquet",
            InputFormat::Csv => "csv",
            InputFormat::Json => "json",
        };
        f.write_str(name)
    }
}
