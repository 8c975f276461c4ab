use arrow_schema::ArrowError;
use datafusion_common::DataFusionError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = FsqlError> = std::result::Result<T, E>;

/// Errors raised while building patterns, crawling a table or reading its files.
#[derive(Debug, Error)]
pub enum FsqlError {
    /// The path pattern description could not be parsed
    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern (or segment) text
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// A column was bound twice, either in a pattern or while descending the tree
    #[error("duplicate key inserted: {column}")]
    DuplicateColumn {
        /// Name of the repeated column
        column: String,
    },

    /// A raw path value could not be parsed into the declared column type
    #[error("Cannot parse '{raw}' as {data_type} for column '{column}'")]
    InvalidPartitionValue {
        column: String,
        raw: String,
        data_type: String,
    },

    /// A name did not fit its pattern segment and the scan runs in strict mode
    #[error("Name '{name}' under '{location}' does not match segment '{segment}'")]
    SegmentMismatch {
        location: String,
        name: String,
        segment: String,
    },

    /// A directory was found below the last pattern level in strict mode
    #[error("no partitions remaining: unexpected directory '{location}'")]
    UnexpectedDirectory {
        /// Location of the directory
        location: String,
    },

    /// A column range or date range with `min > max`
    #[error("invalid range: {reason}")]
    InvalidRange {
        /// Description of the range
        reason: String,
    },

    /// A date literal could not be parsed
    #[error("Invalid date '{input}', expected yyyy/mm/dd or yyyy-mm-dd")]
    InvalidDate {
        /// The rejected text
        input: String,
    },

    /// The input format of a file is unknown or not handled by the reader
    #[error("Unsupported format for '{location}': {reason}")]
    UnsupportedFormat { location: String, reason: String },

    /// The table location could not be resolved to an object store
    #[error("Invalid table location '{url}': {reason}")]
    InvalidLocation { url: String, reason: String },

    /// A file could not be decoded and the read runs in fail-fast mode
    #[error("Failed to read '{location}': {reason}")]
    ReadFailed { location: String, reason: String },

    #[error("Object store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Value error: {0}")]
    Value(#[from] DataFusionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FsqlError {
    pub(crate) fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        FsqlError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn duplicate(column: impl Into<String>) -> Self {
        FsqlError::DuplicateColumn {
            column: column.into(),
        }
    }
}
