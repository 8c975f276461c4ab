/// What to do with a name that does not fit the pattern at its level.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MismatchPolicy {
    /// Log at debug level and ignore the entry
    #[default]
    Skip,
    /// Abort the scan with [`FsqlError::SegmentMismatch`](crate::FsqlError::SegmentMismatch)
    /// or [`FsqlError::UnexpectedDirectory`](crate::FsqlError::UnexpectedDirectory)
    Error,
}

/// Options controlling partition discovery.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    ignore_hidden: bool,
    on_mismatch: MismatchPolicy,
    generate_from_predicate: bool,
}

impl ScanOptions {
    /// Create a new builder for ScanOptions
    ///
    /// # Example
    /// ```
    /// use fsql::{MismatchPolicy, ScanOptions};
    ///
    /// let options = ScanOptions::builder()
    ///     .on_mismatch(MismatchPolicy::Error)
    ///     .generate_from_predicate(true)
    ///     .build();
    /// assert!(options.ignore_hidden());
    /// ```
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::default()
    }

    /// Check if names starting with `.` or `_` are skipped
    pub fn ignore_hidden(&self) -> bool {
        self.ignore_hidden
    }

    pub fn on_mismatch(&self) -> MismatchPolicy {
        self.on_mismatch
    }

    /// Check if equality and IN constraints of the predicate replace listing
    pub fn generate_from_predicate(&self) -> bool {
        self.generate_from_predicate
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_hidden: true,
            on_mismatch: MismatchPolicy::Skip,
            generate_from_predicate: false,
        }
    }
}

/// Builder for ScanOptions
#[derive(Clone, Debug, Default)]
pub struct ScanOptionsBuilder {
    ignore_hidden: Option<bool>,
    on_mismatch: Option<MismatchPolicy>,
    generate_from_predicate: Option<bool>,
}

impl ScanOptionsBuilder {
    /// Skip hidden entries such as `_SUCCESS` or `.crc` files (default: true)
    pub fn ignore_hidden(mut self, value: bool) -> Self {
        self.ignore_hidden = Some(value);
        self
    }

    /// Policy for names that do not fit their segment (default: skip)
    pub fn on_mismatch(mut self, policy: MismatchPolicy) -> Self {
        self.on_mismatch = Some(policy);
        self
    }

    /// Generate child names from `col = v` and `col IN (..)` constraints (default: false)
    ///
    /// Generated names are probed instead of listed. Values are rendered in their
    /// canonical form, so `7` never matches a directory written as `07`.
    pub fn generate_from_predicate(mut self, value: bool) -> Self {
        self.generate_from_predicate = Some(value);
        self
    }

    /// Build the ScanOptions
    pub fn build(self) -> ScanOptions {
        ScanOptions {
            ignore_hidden: self.ignore_hidden.unwrap_or(true),
            on_mismatch: self.on_mismatch.unwrap_or_default(),
            generate_from_predicate: self.generate_from_predicate.unwrap_or(false),
        }
    }
}
