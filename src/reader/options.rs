use super::format::InputFormat;

/// What [`read_all`](super::read_all) does when a file cannot be read.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ErrorMode {
    /// Abort with the first failure
    #[default]
    FailFast,
    /// Record the failure and keep reading the other files
    Collect,
}

/// Options controlling how discovered files are read.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    format: InputFormat,
    error_mode: ErrorMode,
    max_concurrency: usize,
    csv_header: bool,
    csv_delimiter: u8,
    batch_size: usize,
}

impl ReadOptions {
    /// Create a new builder for ReadOptions
    ///
    /// # Example
    /// ```
    /// use fsql::{ErrorMode, InputFormat, ReadOptions};
    ///
    /// let options = ReadOptions::builder()
    ///     .format(InputFormat::Csv)
    ///     .error_mode(ErrorMode::Collect)
    ///     .csv_delimiter(b';')
    ///     .build();
    /// assert_eq!(options.max_concurrency(), 32);
    /// ```
    pub fn builder() -> ReadOptionsBuilder {
        ReadOptionsBuilder::default()
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Number of files fetched and decoded at the same time
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Check if the first CSV line holds column names
    pub fn csv_header(&self) -> bool {
        self.csv_header
    }

    pub fn csv_delimiter(&self) -> u8 {
        self.csv_delimiter
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptionsBuilder::default().build()
    }
}

/// Builder for ReadOptions
#[derive(Clone, Debug, Default)]
pub struct ReadOptionsBuilder {
    format: Option<InputFormat>,
    error_mode: Option<ErrorMode>,
    max_concurrency: Option<usize>,
    csv_header: Option<bool>,
    csv_delimiter: Option<u8>,
    batch_size: Option<usize>,
}

impl ReadOptionsBuilder {
    /// File format (default: detected from the extension)
    pub fn format(mut self, format: InputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Failure handling (default: fail fast)
    pub fn error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = Some(mode);
        self
    }

    /// Files in flight at once (default: 32, minimum 1)
    pub fn max_concurrency(mut self, value: usize) -> Self {
        self.max_concurrency = Some(value.max(1));
        self
    }

    /// Whether CSV files start with a header line (default: true)
    pub fn csv_header(mut self, value: bool) -> Self {
        self.csv_header = Some(value);
        self
    }

    /// CSV field separator (default: `,`)
    pub fn csv_delimiter(mut self, value: u8) -> Self {
        self.csv_delimiter = Some(value);
        self
    }

    /// Rows per decoded batch (default: 8192)
    pub fn batch_size(mut self, value: usize) -> Self {
        self.batch_size = Some(value.max(1));
        self
    }

    /// Build the ReadOptions
    pub fn build(self) -> ReadOptions {
        ReadOptions {
            format: self.format.unwrap_or_default(),
            error_mode: self.error_mode.unwrap_or_default(),
            max_concurrency: self.max_concurrency.unwrap_or(32),
            csv_header: self.csv_header.unwrap_or(true),
            csv_delimiter: self.csv_delimiter.unwrap_or(b','),
            batch_size: self.batch_size.unwrap_or(8192),
        }
    }
}
