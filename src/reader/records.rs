use bytes::Bytes;
use serde_json::{Map, Value};

use super::{InputFormat, PartitionReader, ReadOptions};
use crate::{
    error::{FsqlError, Result},
    partition::{PartitionedFile, scalar_to_json},
};

/// One JSON object, partition columns included.
pub type Record = Map<String, Value>;

/// Reads tables whose files each hold a single JSON object.
///
/// Partition columns are written into every record and replace same-named keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordsReader;

impl PartitionReader for RecordsReader {
    type Output = Vec<Record>;

    fn read_file(
        &self,
        file: &PartitionedFile,
        content: Bytes,
        options: &ReadOptions,
    ) -> Result<Self::Output> {
        let format = options.format().resolve(&file.location)?;
        if format != InputFormat::Json {
            return Err(FsqlError::UnsupportedFormat {
                location: file.location.to_string(),
                reason: format!("records can only be read from json, not {format}"),
            });
        }
        let mut record: Record = serde_json::from_slice(&content)?;
        for column in &file.columns {
            record.insert(column.name.clone(), scalar_to_json(&column.value));
        }
        Ok(vec![record])
    }

    fn concat(&self, parts: Vec<Self::Output>) -> Result<Self::Output> {
        Ok(parts.into_iter().flatten().collect())
    }
}
