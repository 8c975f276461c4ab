use crate::partition::PartitionedFile;

/// A file that could not be read while running in [`ErrorMode::Collect`](super::ErrorMode::Collect).
#[derive(Clone, Debug, PartialEq)]
pub struct ReadFailure {
    pub file: PartitionedFile,
    pub reason: String,
}

/// Converted data plus the files that were skipped on the way.
///
/// Failures are only ever recorded in [`ErrorMode::Collect`](super::ErrorMode::Collect);
/// in fail-fast mode the first failure is returned as an error instead.
#[derive(Clone, Debug)]
pub struct ReadOutcome<T> {
    pub(crate) data: T,
    pub(crate) failures: Vec<ReadFailure>,
}

impl<T> ReadOutcome<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn failures(&self) -> &[ReadFailure] {
        &self.failures
    }

    /// Check if every discovered file was read
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_parts(self) -> (T, Vec<ReadFailure>) {
        (self.data, self.failures)
    }
}
