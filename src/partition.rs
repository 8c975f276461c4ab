use std::{fmt, future::Future};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use datafusion_common::ScalarValue;
use object_store::{ObjectMeta, ObjectStore, path::Path};
use serde::Serialize;
use tracing::warn;

use crate::{
    error::{FsqlError, Result},
    pattern::column::render_value,
};

/// A partition column bound to a value.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionValue {
    pub name: String,
    pub value: ScalarValue,
}

impl PartitionValue {
    pub fn new(name: impl Into<String>, value: ScalarValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for PartitionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match render_value(&self.value) {
            Some(raw) => write!(f, "{}={}", self.name, raw),
            None => write!(f, "{}={}", self.name, self.value),
        }
    }
}

/// A directory reached during discovery, with the columns bound along its path.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub location: Path,
    pub columns: Vec<PartitionValue>,
}

impl Partition {
    pub fn root(location: Path) -> Self {
        Self {
            location,
            columns: Vec::new(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&ScalarValue> {
        find_value(&self.columns, name)
    }

    /// Child partition one level down.
    ///
    /// Fails with [`FsqlError::DuplicateColumn`] if a column is assigned twice.
    pub fn expand_by(
        &self,
        name: &str,
        values: impl IntoIterator<Item = PartitionValue>,
    ) -> Result<Partition> {
        self.expand_to(self.location.child(name), values)
    }

    /// Like [`Partition::expand_by`] for a child location taken verbatim from a listing.
    pub(crate) fn expand_to(
        &self,
        location: Path,
        values: impl IntoIterator<Item = PartitionValue>,
    ) -> Result<Partition> {
        Ok(Partition {
            location,
            columns: extend_columns(&self.columns, values)?,
        })
    }
}

/// A leaf file accepted by the predicate.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionedFile {
    pub location: Path,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    /// Partition values in path order, file columns last
    pub columns: Vec<PartitionValue>,
}

impl PartitionedFile {
    pub(crate) fn from_meta(meta: ObjectMeta, columns: Vec<PartitionValue>) -> Self {
        Self {
            location: meta.location,
            size: meta.size,
            last_modified: Some(meta.last_modified),
            columns,
        }
    }

    pub fn value(&self, name: &str) -> Option<&ScalarValue> {
        find_value(&self.columns, name)
    }

    /// Last path component.
    pub fn file_name(&self) -> &str {
        self.location.filename().unwrap_or_default()
    }

    /// Download the whole object. A file reported missing is requested once more,
    /// since listings of eventually consistent stores can run ahead of reads.
    pub async fn fetch(&self, store: &dyn ObjectStore) -> Result<Bytes> {
        let location = &self.location;
        retry_not_found(location, || async move {
            store.get(location).await?.bytes().await
        })
        .await
    }

    /// JSON view used by listings: `{"location", "size", "columns": {..}}`.
    pub fn to_json(&self) -> Result<String> {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let value = scalar_to_json(&column.value);
                (column.name.clone(), value)
            })
            .collect();
        let listing = FileListing {
            location: self.location.as_ref(),
            size: self.size,
            last_modified: self.last_modified.map(|ts| ts.to_rfc3339()),
            columns,
        };
        Ok(serde_json::to_string(&listing)?)
    }
}

#[derive(Serialize)]
struct FileListing<'a> {
    location: &'a str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    columns: serde_json::Map<String, serde_json::Value>,
}

pub(crate) fn scalar_to_json(value: &ScalarValue) -> serde_json::Value {
    use serde_json::Value;

    if value.is_null() {
        return Value::Null;
    }
    match value {
        ScalarValue::Int64(Some(v)) => Value::from(*v),
        ScalarValue::Float64(Some(v)) => Value::from(*v),
        ScalarValue::Boolean(Some(v)) => Value::from(*v),
        other => render_value(other)
            .map(Value::String)
            .unwrap_or_else(|| Value::String(other.to_string())),
    }
}

pub(crate) fn find_value<'a>(columns: &'a [PartitionValue], name: &str) -> Option<&'a ScalarValue> {
    columns
        .iter()
        .find(|column| column.name == name)
        .map(|column| &column.value)
}

pub(crate) fn extend_columns(
    columns: &[PartitionValue],
    values: impl IntoIterator<Item = PartitionValue>,
) -> Result<Vec<PartitionValue>> {
    let mut extended = columns.to_vec();
    for value in values {
        if extended.iter().any(|column| column.name == value.name) {
            return Err(FsqlError::duplicate(value.name));
        }
        extended.push(value);
    }
    Ok(extended)
}

async fn retry_not_found<T, F, Fut>(location: &Path, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = object_store::Result<T>>,
{
    match attempt().await {
        Err(object_store::Error::NotFound { .. }) => {
            warn!(location = %location, "file not found, attempting to read it again");
            Ok(attempt().await?)
        }
        other => Ok(other?),
    }
}
