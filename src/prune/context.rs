use datafusion_common::ScalarValue;

use crate::partition::{PartitionValue, find_value};

/// Columns bound so far while descending a tree.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PartitionContext<'a> {
    pub(crate) columns: &'a [PartitionValue],
}

impl<'a> PartitionContext<'a> {
    pub(crate) fn new(columns: &'a [PartitionValue]) -> Self {
        Self { columns }
    }

    pub(crate) fn value(&self, column: &str) -> Option<&'a ScalarValue> {
        find_value(self.columns, column)
    }
}
