use bytes::Bytes;

use super::{PartitionReader, ReadOptions};
use crate::{error::Result, partition::PartitionedFile};

/// Returns the discovered files themselves without reading them.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileListReader;

impl PartitionReader for FileListReader {
    type Output = Vec<PartitionedFile>;

    fn needs_content(&self) -> bool {
        false
    }

    fn read_file(
        &self,
        file: &PartitionedFile,
        _content: Bytes,
        _options: &ReadOptions,
    ) -> Result<Self::Output> {
        Ok(vec![file.clone()])
    }

    fn concat(&self, parts: Vec<Self::Output>) -> Result<Self::Output> {
        Ok(parts.into_iter().flatten().collect())
    }
}
