//! Lazy, level-by-level discovery of the files of a partitioned table.
//!
//! The walk is a depth-first traversal driven by an explicit stack. Each
//! directory is listed at most once, and only when the stream is polled far
//! enough to need it. Subtrees whose partial column assignment falsifies the
//! predicate are never listed.

use std::{cmp::Ordering, collections::VecDeque, fmt, sync::Arc};

use arrow_schema::DataType;
use datafusion_common::ScalarValue;
use futures_util::{StreamExt, stream::BoxStream};
use object_store::{ObjectStore, path::Path};
use tracing::{debug, warn};

use crate::{
    error::{FsqlError, Result},
    expr::{Expr, candidate_values},
    ord::{self, scalar_as_i64},
    partition::{Partition, PartitionValue, PartitionedFile, extend_columns},
    pattern::{Level, NameMatch, PathPattern, Segment, Step, column::render_value},
    prune,
};

mod listing;
mod options;

use listing::{head_file, is_hidden, list_directory};
pub use options::{MismatchPolicy, ScanOptions, ScanOptionsBuilder};

/// Counters for one discovery run, logged when the stream is exhausted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct CrawlStats {
    pub(crate) directories_listed: usize,
    pub(crate) subtrees_pruned: usize,
    pub(crate) candidates_generated: usize,
    pub(crate) files_yielded: usize,
}

struct CrawlerInner {
    store: Arc<dyn ObjectStore>,
    pattern: PathPattern,
    predicate: Expr,
    options: ScanOptions,
}

/// Discovers the files of a table that may satisfy a predicate.
#[derive(Clone)]
pub struct Crawler {
    inner: Arc<CrawlerInner>,
}

impl fmt::Debug for Crawler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crawler")
            .field("store", &self.inner.store.to_string())
            .field("pattern", &self.inner.pattern)
            .field("predicate", &self.inner.predicate.to_string())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl Crawler {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        pattern: PathPattern,
        predicate: Expr,
        options: ScanOptions,
    ) -> Self {
        Self {
            inner: Arc::new(CrawlerInner {
                store,
                pattern,
                predicate,
                options,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.inner.store
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.inner.pattern
    }

    pub fn predicate(&self) -> &Expr {
        &self.inner.predicate
    }

    /// Stream the accepted files below `root`.
    ///
    /// For every directory, the accepted files of its subdirectories come first (in
    /// name order), followed by its own accepted files (in name order). The stream
    /// ends after the first error.
    pub fn discover(&self, root: Path) -> BoxStream<'static, Result<PartitionedFile>> {
        let walk = Walk::new(self.clone(), root);
        futures_util::stream::try_unfold(walk, |mut walk| async move {
            Ok(walk.next_file().await?.map(|file| (file, walk)))
        })
        .boxed()
    }
}

enum Frame {
    Visit { partition: Partition, depth: usize },
    Files(VecDeque<PartitionedFile>),
}

struct Walk {
    crawler: Crawler,
    root: Path,
    stack: Vec<Frame>,
    stats: CrawlStats,
}

impl Walk {
    fn new(crawler: Crawler, root: Path) -> Self {
        let stack = vec![Frame::Visit {
            partition: Partition::root(root.clone()),
            depth: 0,
        }];
        Self {
            crawler,
            root,
            stack,
            stats: CrawlStats::default(),
        }
    }

    async fn next_file(&mut self) -> Result<Option<PartitionedFile>> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Files(mut files) => {
                    if let Some(file) = files.pop_front() {
                        if !files.is_empty() {
                            self.stack.push(Frame::Files(files));
                        }
                        self.stats.files_yielded += 1;
                        return Ok(Some(file));
                    }
                }
                Frame::Visit { partition, depth } => self.visit(partition, depth).await?,
            }
        }
        debug!(root = %self.root, stats = ?self.stats, "discovery finished");
        Ok(None)
    }

    async fn visit(&mut self, partition: Partition, depth: usize) -> Result<()> {
        let crawler = self.crawler.clone();
        let (children, files) = match crawler.inner.pattern.step(depth) {
            Step::Descend(level) => (self.descend(level, &partition).await?, Vec::new()),
            Step::Auto => self.auto(&partition).await?,
            Step::Terminal => (Vec::new(), self.terminal(&partition).await?),
        };
        if !files.is_empty() {
            self.stack.push(Frame::Files(files.into()));
        }
        for child in children.into_iter().rev() {
            self.stack.push(Frame::Visit {
                partition: child,
                depth: depth + 1,
            });
        }
        Ok(())
    }

    async fn descend(&mut self, level: &Level, partition: &Partition) -> Result<Vec<Partition>> {
        let crawler = self.crawler.clone();
        let inner = &crawler.inner;
        let mut children = Vec::new();
        if let Some(names) = self.level_candidates(level, partition) {
            self.stats.candidates_generated += names.len();
            for name in names {
                let NameMatch::Matched(captures) = level.segment.match_name(&name) else {
                    continue;
                };
                let values = bind_captures(&level.segment, &captures)?;
                let child = partition.expand_by(&name, values)?;
                self.keep_if_possible(child, &mut children);
            }
            return Ok(children);
        }

        let listing = list_directory(inner.store.as_ref(), &partition.location).await?;
        self.stats.directories_listed += 1;
        if !listing.files.is_empty() {
            debug!(
                location = %partition.location,
                files = listing.files.len(),
                "ignoring files above the last partition level"
            );
        }
        for dir in listing.directories {
            let name = dir.filename().unwrap_or_default().to_string();
            if inner.options.ignore_hidden() && is_hidden(&name) {
                continue;
            }
            let captures = match level.segment.match_name(&name) {
                NameMatch::Matched(captures) => captures,
                NameMatch::Excluded => continue,
                NameMatch::Mismatch => {
                    self.mismatch(&partition.location, &name, &level.segment)?;
                    continue;
                }
            };
            let values = bind_captures(&level.segment, &captures)?;
            let child = partition.expand_to(dir, values)?;
            self.keep_if_possible(child, &mut children);
        }
        Ok(children)
    }

    async fn auto(
        &mut self,
        partition: &Partition,
    ) -> Result<(Vec<Partition>, Vec<PartitionedFile>)> {
        let crawler = self.crawler.clone();
        let inner = &crawler.inner;
        let listing = list_directory(inner.store.as_ref(), &partition.location).await?;
        self.stats.directories_listed += 1;
        let mut children = Vec::new();
        for dir in listing.directories {
            let name = dir.filename().unwrap_or_default().to_string();
            if inner.options.ignore_hidden() && is_hidden(&name) {
                continue;
            }
            let Some((key, raw)) = name
                .split_once('=')
                .filter(|(key, raw)| !key.is_empty() && !raw.is_empty())
            else {
                self.mismatch(&partition.location, &name, &"key=value")?;
                continue;
            };
            let value = inner.pattern.auto_type(key).parse_value(key, raw)?;
            let child = partition.expand_to(dir, [PartitionValue::new(key, value)])?;
            self.keep_if_possible(child, &mut children);
        }
        let files = self.accept_files(partition, listing.files)?;
        Ok((children, files))
    }

    async fn terminal(&mut self, partition: &Partition) -> Result<Vec<PartitionedFile>> {
        let crawler = self.crawler.clone();
        let inner = &crawler.inner;
        let file_segment = inner.pattern.file_segment();
        if file_segment.is_none() && !prune::matches(&inner.predicate, &partition.columns) {
            self.stats.subtrees_pruned += 1;
            return Ok(Vec::new());
        }

        if let Some(segment) = file_segment {
            if let Some(names) = self.segment_candidates(segment) {
                self.stats.candidates_generated += names.len();
                let mut probed = Vec::new();
                for name in names {
                    let location = partition.location.child(name.as_str());
                    if let Some(meta) = head_file(inner.store.as_ref(), &location).await? {
                        probed.push(meta);
                    }
                }
                return self.accept_files(partition, probed);
            }
        }

        let listing = list_directory(inner.store.as_ref(), &partition.location).await?;
        self.stats.directories_listed += 1;
        for dir in &listing.directories {
            let name = dir.filename().unwrap_or_default();
            if inner.options.ignore_hidden() && is_hidden(name) {
                continue;
            }
            match inner.options.on_mismatch() {
                MismatchPolicy::Skip => {
                    warn!(location = %dir, "skipping directory below the last partition level");
                }
                MismatchPolicy::Error => {
                    return Err(FsqlError::UnexpectedDirectory {
                        location: dir.to_string(),
                    });
                }
            }
        }
        self.accept_files(partition, listing.files)
    }

    /// Parse file names (when the pattern has a file segment) and keep those the
    /// predicate accepts for certain.
    fn accept_files(
        &self,
        partition: &Partition,
        files: Vec<object_store::ObjectMeta>,
    ) -> Result<Vec<PartitionedFile>> {
        let inner = &self.crawler.inner;
        let file_segment = inner.pattern.file_segment();
        let mut accepted = Vec::new();
        for meta in files {
            let name = meta.location.filename().unwrap_or_default().to_string();
            if inner.options.ignore_hidden() && is_hidden(&name) {
                continue;
            }
            let columns = match file_segment {
                None => partition.columns.clone(),
                Some(segment) => match segment.match_name(&name) {
                    NameMatch::Matched(captures) => {
                        extend_columns(&partition.columns, bind_captures(segment, &captures)?)?
                    }
                    NameMatch::Excluded => continue,
                    NameMatch::Mismatch => {
                        self.mismatch(&partition.location, &name, segment)?;
                        continue;
                    }
                },
            };
            if prune::matches(&inner.predicate, &columns) {
                accepted.push(PartitionedFile::from_meta(meta, columns));
            } else {
                debug!(location = %meta.location, "file rejected by predicate");
            }
        }
        Ok(accepted)
    }

    fn keep_if_possible(&mut self, child: Partition, children: &mut Vec<Partition>) {
        if prune::may_match(&self.crawler.inner.predicate, &child.columns) {
            children.push(child);
        } else {
            self.stats.subtrees_pruned += 1;
            debug!(location = %child.location, "pruned subtree");
        }
    }

    fn mismatch(&self, location: &Path, name: &str, segment: &dyn fmt::Display) -> Result<()> {
        match self.crawler.inner.options.on_mismatch() {
            MismatchPolicy::Skip => {
                debug!(location = %location, name, segment = %segment, "skipping mismatched name");
                Ok(())
            }
            MismatchPolicy::Error => Err(FsqlError::SegmentMismatch {
                location: location.to_string(),
                name: name.to_string(),
                segment: segment.to_string(),
            }),
        }
    }

    fn level_candidates(&self, level: &Level, partition: &Partition) -> Option<Vec<String>> {
        if let Some(calendar) = &level.calendar {
            let year = partition.value(&calendar.year).and_then(scalar_as_i64);
            let month = partition.value(&calendar.month).and_then(scalar_as_i64);
            return Some(calendar.candidates(&level.segment, year, month));
        }
        self.segment_candidates(&level.segment)
    }

    /// Enumerated values first, then (when enabled) the predicate's set constraints.
    fn segment_candidates(&self, segment: &Segment) -> Option<Vec<String>> {
        let inner = &self.crawler.inner;
        let from_predicate = inner.options.generate_from_predicate();
        segment.candidates_with(|placeholder| {
            if let Some(values) = &placeholder.values {
                return Some(values.clone());
            }
            if !from_predicate {
                return None;
            }
            let column_type = placeholder.column.data_type.data_type();
            candidate_values(&inner.predicate, &placeholder.column.name)?
                .iter()
                .filter_map(|value| as_column_value(value, &column_type))
                .map(|value| render_value(&value))
                .collect()
        })
    }
}

/// The literal in the column's own type, or `None` when no value of the column
/// can equal it.
fn as_column_value(literal: &ScalarValue, column_type: &DataType) -> Option<ScalarValue> {
    let value = ord::coerce(literal, column_type)?;
    (ord::compare(&value, literal) == Some(Ordering::Equal)).then_some(value)
}

fn bind_captures(segment: &Segment, captures: &[&str]) -> Result<Vec<PartitionValue>> {
    segment
        .placeholders()
        .iter()
        .zip(captures)
        .map(|(placeholder, raw)| {
            let column = &placeholder.column;
            let value = column.data_type.parse_value(&column.name, raw)?;
            Ok(PartitionValue::new(column.name.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures_util::TryStreamExt;
    use object_store::{PutPayload, memory::InMemory};

    use super::*;
    use crate::{
        date::DateRange,
        pattern::{DateLayout, PatternStyle},
    };

    async fn store_with(paths: &[&str]) -> Arc<dyn ObjectStore> {
        let store = InMemory::new();
        for path in paths {
            store
                .put(&Path::from(*path), PutPayload::from(Bytes::from_static(b"k\n1\n")))
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    async fn walk_all(walk: &mut Walk) -> Vec<String> {
        let mut found = Vec::new();
        while let Some(file) = walk.next_file().await.unwrap() {
            found.push(file.location.to_string());
        }
        found
    }

    fn crawler(store: Arc<dyn ObjectStore>, pattern: PathPattern, predicate: Expr) -> Crawler {
        Crawler::new(store, pattern, predicate, ScanOptions::default())
    }

    #[tokio::test]
    async fn subdirectories_come_before_own_files() {
        let store = store_with(&["t/a.csv", "t/c=2/f.csv", "t/c=1/f.csv", "t/c=1/d=x/g.csv"]).await;
        let crawler = crawler(store, PathPattern::auto(), Expr::True);
        let files: Vec<_> = crawler
            .discover(Path::from("t"))
            .map_ok(|f| f.location.to_string())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(
            files,
            vec!["t/c=1/d=x/g.csv", "t/c=1/f.csv", "t/c=2/f.csv", "t/a.csv"]
        );
    }

    #[tokio::test]
    async fn pruned_subtrees_are_not_listed() {
        let store = store_with(&["t/c=1/d=1/f.csv", "t/c=2/d=1/f.csv", "t/c=3/d=1/f.csv"]).await;
        let crawler = crawler(
            store,
            PathPattern::hive("c/d").unwrap(),
            Expr::eq("c", "2"),
        );
        let mut walk = Walk::new(crawler, Path::from("t"));
        assert_eq!(walk_all(&mut walk).await, vec!["t/c=2/d=1/f.csv"]);
        assert_eq!(walk.stats.subtrees_pruned, 2);
        // root, c=2 and c=2/d=1
        assert_eq!(walk.stats.directories_listed, 3);
    }

    #[tokio::test]
    async fn enumerated_levels_skip_listing() {
        let store = store_with(&["t/c=a/f.csv", "t/c=b/f.csv", "t/c=z/f.csv"]).await;
        let crawler = crawler(store, PathPattern::hive("c=[a,b,q]").unwrap(), Expr::True);
        let mut walk = Walk::new(crawler, Path::from("t"));
        assert_eq!(walk_all(&mut walk).await, vec!["t/c=a/f.csv", "t/c=b/f.csv"]);
        assert_eq!(walk.stats.candidates_generated, 3);
        // only the three leaf directories, one of them missing
        assert_eq!(walk.stats.directories_listed, 3);
    }

    #[tokio::test]
    async fn predicate_driven_generation() {
        let store = store_with(&["t/c=1/f.csv", "t/c=7/f.csv", "t/c=9/f.csv"]).await;
        let options = ScanOptions::builder().generate_from_predicate(true).build();
        let crawler = Crawler::new(
            store,
            PathPattern::hive("c:int").unwrap(),
            Expr::in_list("c", [ScalarValue::Int64(Some(7)), ScalarValue::Int64(Some(9))]),
            options,
        );
        let mut walk = Walk::new(crawler, Path::from("t"));
        assert_eq!(walk_all(&mut walk).await, vec!["t/c=7/f.csv", "t/c=9/f.csv"]);
        assert_eq!(walk.stats.candidates_generated, 2);
    }

    #[tokio::test]
    async fn generated_files_are_probed() {
        let store = store_with(&["t/a/i_will_be_there.json", "t/b/other.json"]).await;
        let pattern = PathPattern::fixed("c")
            .unwrap()
            .with_file_column("fname=[i_will_be_there.json,missing.json]")
            .unwrap();
        let crawler = crawler(store, pattern, Expr::True);
        let mut walk = Walk::new(crawler, Path::from("t"));
        assert_eq!(walk_all(&mut walk).await, vec!["t/a/i_will_be_there.json"]);
    }

    #[tokio::test]
    async fn calendar_generation_stays_inside_range() {
        let store = store_with(&[
            "t/2022/4/29/f.csv",
            "t/2022/4/30/f.csv",
            "t/2022/5/1/f.csv",
            "t/2022/5/2/f.csv",
        ])
        .await;
        let range = DateRange::parse("2022/4/30", "2022/5/2").unwrap();
        let layout = DateLayout::new()
            .with_names("annus", "month", "day")
            .with_style(PatternStyle::Fixed);
        let pattern = PathPattern::date_range(range, layout).unwrap();
        let mut walk = Walk::new(crawler(store, pattern, Expr::True), Path::from("t"));
        let mut found = Vec::new();
        while let Some(file) = walk.next_file().await.unwrap() {
            found.push((file.location.to_string(), file.columns));
        }
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "t/2022/4/30/f.csv");
        assert_eq!(found[1].0, "t/2022/5/1/f.csv");
        assert_eq!(
            found[1].1,
            vec![
                PartitionValue::new("annus", ScalarValue::Int64(Some(2022))),
                PartitionValue::new("month", ScalarValue::Int64(Some(5))),
                PartitionValue::new("day", ScalarValue::Int64(Some(1))),
            ]
        );
    }

    #[tokio::test]
    async fn strict_policy_rejects_mismatches() {
        let store = store_with(&["t/c=1/f.csv", "t/oops/f.csv"]).await;
        let options = ScanOptions::builder()
            .on_mismatch(MismatchPolicy::Error)
            .build();
        let crawler = Crawler::new(store.clone(), PathPattern::hive("c").unwrap(), Expr::True, options);
        let err = crawler
            .discover(Path::from("t"))
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(err, FsqlError::SegmentMismatch { ref name, .. } if name == "oops"));

        let lenient = crawler_with_default(store);
        let files: Vec<_> = lenient.discover(Path::from("t")).try_collect().await.unwrap();
        assert_eq!(files.len(), 1);
    }

    fn crawler_with_default(store: Arc<dyn ObjectStore>) -> Crawler {
        crawler(store, PathPattern::hive("c").unwrap(), Expr::True)
    }

    #[tokio::test]
    async fn hidden_entries_are_ignored() {
        let store = store_with(&["t/c=1/f.csv", "t/c=1/_SUCCESS", "t/_tmp/f.csv"]).await;
        let files: Vec<_> = crawler_with_default(store)
            .discover(Path::from("t"))
            .try_collect()
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "f.csv");
    }
}
