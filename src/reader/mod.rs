//! Converters from discovered files into in-memory data.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use object_store::ObjectStore;
use tracing::{debug, warn};

use crate::{
    error::{FsqlError, Result},
    partition::PartitionedFile,
};

mod batch;
mod files;
mod format;
mod options;
mod records;
mod result;

pub use batch::RecordBatchReader;
pub use files::FileListReader;
pub use format::InputFormat;
pub use options::{ErrorMode, ReadOptions, ReadOptionsBuilder};
pub use records::{Record, RecordsReader};
pub use result::{ReadFailure, ReadOutcome};

/// Turns the content of partitioned files into one output value.
pub trait PartitionReader: Send + Sync {
    type Output: Send;

    /// Whether [`read_file`](Self::read_file) looks at the file content. When
    /// `false` nothing is downloaded and `content` is empty.
    fn needs_content(&self) -> bool {
        true
    }

    /// Decode one file, merging its partition columns into the result.
    fn read_file(
        &self,
        file: &PartitionedFile,
        content: Bytes,
        options: &ReadOptions,
    ) -> Result<Self::Output>;

    /// Combine per-file outputs, given in discovery order.
    fn concat(&self, parts: Vec<Self::Output>) -> Result<Self::Output>;
}

/// Fetch and decode `files` concurrently, keeping their order.
pub async fn read_all<R: PartitionReader>(
    store: &Arc<dyn ObjectStore>,
    files: Vec<PartitionedFile>,
    reader: &R,
    options: &ReadOptions,
) -> Result<ReadOutcome<R::Output>> {
    let total = files.len();
    let mut decoded = stream::iter(files)
        .map(|file| async move {
            let output = read_one(store.as_ref(), &file, reader, options).await;
            (file, output)
        })
        .buffered(options.max_concurrency());

    let mut parts = Vec::with_capacity(total);
    let mut failures = Vec::new();
    while let Some((file, output)) = decoded.next().await {
        match (output, options.error_mode()) {
            (Ok(part), _) => parts.push(part),
            (Err(err), ErrorMode::FailFast) => {
                return Err(FsqlError::ReadFailed {
                    location: file.location.to_string(),
                    reason: err.to_string(),
                });
            }
            (Err(err), ErrorMode::Collect) => {
                warn!(location = %file.location, error = %err, "skipping unreadable file");
                failures.push(ReadFailure {
                    file,
                    reason: err.to_string(),
                });
            }
        }
    }
    debug!(files = total, failed = failures.len(), "read finished");
    let data = reader.concat(parts)?;
    Ok(ReadOutcome { data, failures })
}

async fn read_one<R: PartitionReader>(
    store: &dyn ObjectStore,
    file: &PartitionedFile,
    reader: &R,
    options: &ReadOptions,
) -> Result<R::Output> {
    let content = if reader.needs_content() {
        file.fetch(store).await?
    } else {
        Bytes::new()
    };
    reader.read_file(file, content, options)
}
