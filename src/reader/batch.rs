use std::{io::Cursor, sync::Arc};

use arrow::{
    array::{ArrayRef, new_null_array},
    compute::{cast, concat_batches},
    csv::{self, reader::Format},
    json,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use arrow_schema::{DataType, Field, FieldRef, Schema, SchemaRef};
use bytes::Bytes;
use futures_util::{StreamExt, stream::BoxStream};
use object_store::ObjectStore;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::{InputFormat, PartitionReader, ReadOptions};
use crate::{
    error::Result,
    partition::{PartitionValue, PartitionedFile},
};

/// Decodes Parquet, CSV and JSON-lines files into Arrow record batches.
///
/// Every partition column becomes a constant column of its pattern type appended
/// to the file's own columns; a data column with the same name is replaced.
/// Files with different schemas are combined over the union of their columns,
/// missing values being null.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordBatchReader;

impl RecordBatchReader {
    pub fn new() -> Self {
        Self
    }

    /// Decode files as they arrive, one batch per file, keeping their order.
    pub fn stream(
        &self,
        store: Arc<dyn ObjectStore>,
        files: BoxStream<'static, Result<PartitionedFile>>,
        options: ReadOptions,
    ) -> BoxStream<'static, Result<RecordBatch>> {
        let reader = *self;
        let concurrency = options.max_concurrency();
        files
            .map(move |file| {
                let store = store.clone();
                let options = options.clone();
                async move {
                    let file = file?;
                    let content = file.fetch(store.as_ref()).await?;
                    reader.read_file(&file, content, &options)
                }
            })
            .buffered(concurrency)
            .boxed()
    }
}

impl PartitionReader for RecordBatchReader {
    type Output = RecordBatch;

    fn read_file(
        &self,
        file: &PartitionedFile,
        content: Bytes,
        options: &ReadOptions,
    ) -> Result<RecordBatch> {
        let batch = match options.format().resolve(&file.location)? {
            InputFormat::Parquet => decode_parquet(content, options)?,
            InputFormat::Csv => decode_csv(&content, options)?,
            InputFormat::Json | InputFormat::Auto => decode_json(&content, options)?,
        };
        with_partition_columns(batch, &file.columns)
    }

    /// No parts gives an empty batch without columns.
    fn concat(&self, parts: Vec<RecordBatch>) -> Result<RecordBatch> {
        if parts.is_empty() {
            return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
        }
        let schema = union_schema(&parts);
        let aligned = parts
            .iter()
            .map(|batch| align(batch, &schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(concat_batches(&schema, &aligned)?)
    }
}

/// Columns in order of first appearance, all nullable. A column inferred with
/// different types in different files takes a type both can be cast to.
fn union_schema(parts: &[RecordBatch]) -> SchemaRef {
    let mut fields: Vec<(String, DataType)> = Vec::new();
    for batch in parts {
        for field in batch.schema().fields() {
            match fields.iter_mut().find(|(name, _)| name == field.name()) {
                Some((_, data_type)) => *data_type = widen(data_type, field.data_type()),
                None => fields.push((field.name().clone(), field.data_type().clone())),
            }
        }
    }
    Arc::new(Schema::new(
        fields
            .into_iter()
            .map(|(name, data_type)| Field::new(name, data_type, true))
            .collect::<Vec<_>>(),
    ))
}

fn widen(left: &DataType, right: &DataType) -> DataType {
    match (left, right) {
        _ if left == right => left.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        _ if left.is_numeric() && right.is_numeric() => DataType::Float64,
        _ => DataType::Utf8,
    }
}

fn decode_parquet(content: Bytes, options: &ReadOptions) -> Result<RecordBatch> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(content)?;
    let schema = builder.schema().clone();
    let batches = builder
        .with_batch_size(options.batch_size())
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn decode_csv(content: &[u8], options: &ReadOptions) -> Result<RecordBatch> {
    let format = Format::default()
        .with_header(options.csv_header())
        .with_delimiter(options.csv_delimiter());
    let (schema, _) = format.infer_schema(Cursor::new(content), None)?;
    let schema = Arc::new(schema);
    let batches = csv::ReaderBuilder::new(schema.clone())
        .with_header(options.csv_header())
        .with_delimiter(options.csv_delimiter())
        .with_batch_size(options.batch_size())
        .build(Cursor::new(content))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn decode_json(content: &[u8], options: &ReadOptions) -> Result<RecordBatch> {
    let (schema, _) = json::reader::infer_json_schema(Cursor::new(content), None)?;
    let schema = Arc::new(schema);
    let batches = json::ReaderBuilder::new(schema.clone())
        .with_batch_size(options.batch_size())
        .build(Cursor::new(content))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn with_partition_columns(batch: RecordBatch, columns: &[PartitionValue]) -> Result<RecordBatch> {
    if columns.is_empty() {
        return Ok(batch);
    }
    let rows = batch.num_rows();
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = Vec::with_capacity(schema.fields().len() + columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(fields.capacity());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if columns.iter().any(|column| column.name == *field.name()) {
            continue;
        }
        fields.push(field.clone());
        arrays.push(array.clone());
    }
    for column in columns {
        fields.push(Arc::new(Field::new(
            column.name.as_str(),
            column.value.data_type(),
            true,
        )));
        arrays.push(column.value.to_array_of_size(rows)?);
    }
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}

fn align(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    let columns = schema
        .fields()
        .iter()
        .map(|field| match batch.column_by_name(field.name()) {
            Some(array) if array.data_type() == field.data_type() => Ok(array.clone()),
            Some(array) => Ok(cast(array, field.data_type())?),
            None => Ok(new_null_array(field.data_type(), rows)),
        })
        .collect::<Result<Vec<_>>>()?;
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(
        schema.clone(),
        columns,
        &options,
    )?)
}
