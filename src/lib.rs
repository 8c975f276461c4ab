//! Partition discovery and pruning for tables stored as directory trees.
//!
//! A [`PathPattern`] says how directory and file names encode column values
//! (`year=2022/month=4/part-0.parquet`, `2022/04/30/events.json`, ...). A
//! [`Crawler`] walks the tree lazily, evaluating an [`Expr`] over the columns bound
//! so far and skipping every subtree where it is already false. Readers then turn
//! the surviving files into Arrow batches, JSON records or plain listings.
//!
//! ```no_run
//! use fsql::{Expr, PathPattern, ReadOptions, RecordBatchReader, StoreConfig, Table};
//!
//! # async fn run() -> fsql::Result<()> {
//! let table = Table::open("s3://bucket/events", &StoreConfig::from_env())?
//!     .with_pattern(PathPattern::hive("year:int/month:int")?);
//! let outcome = table
//!     .scan()
//!     .with_predicate(Expr::and(vec![
//!         Expr::eq("year", 2022i64),
//!         Expr::gt_eq("month", 6i64),
//!     ]))
//!     .read(&RecordBatchReader::new(), &ReadOptions::default())
//!     .await?;
//! println!("{} rows", outcome.data().num_rows());
//! # Ok(())
//! # }
//! ```

pub mod crawl;
pub mod date;
mod error;
pub mod expr;
mod ord;
pub mod partition;
pub mod pattern;
pub mod prune;
pub mod reader;
mod request;
pub mod store;
mod table;

pub use crawl::{Crawler, MismatchPolicy, ScanOptions, ScanOptionsBuilder};
pub use date::{DateField, DateRange, parse_date};
pub use error::{FsqlError, Result};
pub use expr::{CmpOp, ColumnRange, CustomPredicate, Expr, RangeOrdering, TriState};
pub use partition::{Partition, PartitionValue, PartitionedFile};
pub use pattern::{
    ColumnSpec, ColumnType, DateLayout, HIVE_NULL, Level, PathPattern, PatternStyle, Placeholder,
    Segment,
};
pub use reader::{
    ErrorMode, FileListReader, InputFormat, PartitionReader, ReadFailure, ReadOptions,
    ReadOptionsBuilder, ReadOutcome, Record, RecordBatchReader, RecordsReader, read_all,
};
pub use request::ScanRequest;
pub use store::StoreConfig;
pub use table::Table;

/// Open `location` with the environment's store configuration, discover the files
/// matching `predicate` and convert them with `reader`.
pub async fn read_partitioned_table<R: PartitionReader>(
    location: &str,
    pattern: PathPattern,
    predicate: Expr,
    reader: &R,
) -> Result<ReadOutcome<R::Output>> {
    let table = Table::open(location, &StoreConfig::from_env())?.with_pattern(pattern);
    table
        .scan()
        .with_predicate(predicate)
        .read(reader, &ReadOptions::default())
        .await
}
