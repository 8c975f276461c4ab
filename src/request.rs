use futures_util::{TryStreamExt, stream::BoxStream};

use crate::{
    crawl::{Crawler, MismatchPolicy, ScanOptions, ScanOptionsBuilder},
    error::Result,
    expr::{Expr, simplify},
    partition::PartitionedFile,
    reader::{PartitionReader, ReadOptions, ReadOutcome, read_all},
    table::Table,
};

/// Builder for one scan of a [`Table`].
///
/// Provides a fluent API for configuring discovery without building
/// [`ScanOptions`] separately.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use fsql::{Expr, PathPattern, ScanRequest, Table};
/// use object_store::memory::InMemory;
///
/// # async fn run() -> fsql::Result<()> {
/// let table = Table::new(Arc::new(InMemory::new()), "events")
///     .with_pattern(PathPattern::hive("year:int/kind")?);
///
/// let files = ScanRequest::new(&table)
///     .with_predicate(Expr::and(vec![
///         Expr::gt_eq("year", 2021i64),
///         Expr::in_list("kind", ["click", "view"]),
///     ]))
///     .generate_from_predicate(true)
///     .collect_files()
///     .await?;
/// println!("{} files", files.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScanRequest<'a> {
    table: &'a Table,
    predicate: Expr,
    options: ScanOptionsBuilder,
}

impl<'a> ScanRequest<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            predicate: Expr::True,
            options: ScanOptions::builder(),
        }
    }

    /// Sets the predicate over partition columns. Defaults to [`Expr::True`].
    pub fn with_predicate(mut self, predicate: Expr) -> Self {
        self.predicate = predicate;
        self
    }

    /// Replaces every option set so far.
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = ScanOptions::builder()
            .ignore_hidden(options.ignore_hidden())
            .on_mismatch(options.on_mismatch())
            .generate_from_predicate(options.generate_from_predicate());
        self
    }

    /// Skips names starting with `.` or `_`. Defaults to `true`.
    pub fn ignore_hidden(mut self, ignore: bool) -> Self {
        self.options = self.options.ignore_hidden(ignore);
        self
    }

    pub fn on_mismatch(mut self, policy: MismatchPolicy) -> Self {
        self.options = self.options.on_mismatch(policy);
        self
    }

    /// Derives candidate names from `=` and `IN` constraints instead of listing.
    /// Defaults to `false`.
    pub fn generate_from_predicate(mut self, enable: bool) -> Self {
        self.options = self.options.generate_from_predicate(enable);
        self
    }

    fn crawler(&self) -> Crawler {
        Crawler::new(
            self.table.store().clone(),
            self.table.pattern().clone(),
            simplify(self.predicate.clone()),
            self.options.clone().build(),
        )
    }

    /// Lazily discover the accepted files.
    pub fn files(&self) -> BoxStream<'static, Result<PartitionedFile>> {
        self.crawler().discover(self.table.root().clone())
    }

    pub async fn collect_files(&self) -> Result<Vec<PartitionedFile>> {
        self.files().try_collect().await
    }

    /// Discover the accepted files and convert them with `reader`.
    pub async fn read<R: PartitionReader>(
        &self,
        reader: &R,
        options: &ReadOptions,
    ) -> Result<ReadOutcome<R::Output>> {
        let files = self.collect_files().await?;
        read_all(self.table.store(), files, reader, options).await
    }
}
