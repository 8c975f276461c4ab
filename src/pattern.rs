//! Declarative mapping from directory and file names to partition columns.
//!
//! ```text
//! PathPattern
//!     ├─ Auto                 key=value at any depth, files everywhere
//!     └─ Levels
//!          ├─ Level 0..n      one Segment per directory, optional generator
//!          └─ file segment    parses file names into columns
//! ```

use std::collections::HashSet;

use crate::{
    date::{DateField, DateRange},
    error::{FsqlError, Result},
};

pub(crate) mod column;
mod segment;

pub use column::{ColumnSpec, ColumnType, HIVE_NULL};
pub(crate) use segment::NameMatch;
pub use segment::{Placeholder, Segment};

/// How shorthand segments are rendered in the tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PatternStyle {
    /// `name=value`
    #[default]
    Hive,
    /// `value`
    Fixed,
}

/// Naming and rendering of a year/month/day directory layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DateLayout {
    year: String,
    month: String,
    day: String,
    style: PatternStyle,
    zero_pad: bool,
}

impl Default for DateLayout {
    fn default() -> Self {
        Self {
            year: "year".to_string(),
            month: "month".to_string(),
            day: "day".to_string(),
            style: PatternStyle::Hive,
            zero_pad: false,
        }
    }
}

impl DateLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(
        mut self,
        year: impl Into<String>,
        month: impl Into<String>,
        day: impl Into<String>,
    ) -> Self {
        self.year = year.into();
        self.month = month.into();
        self.day = day.into();
        self
    }

    pub fn with_style(mut self, style: PatternStyle) -> Self {
        self.style = style;
        self
    }

    /// Render months and days as `04` instead of `4`.
    pub fn with_zero_padding(mut self, zero_pad: bool) -> Self {
        self.zero_pad = zero_pad;
        self
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn day(&self) -> &str {
        &self.day
    }
}

/// Produces child names for a level from the values bound by its ancestors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Calendar {
    pub(crate) range: DateRange,
    pub(crate) field: DateField,
    pub(crate) year: String,
    pub(crate) month: String,
    pub(crate) zero_pad: bool,
}

/// One directory level of a [`PathPattern`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Level {
    pub(crate) segment: Segment,
    pub(crate) calendar: Option<Calendar>,
}

impl Level {
    pub fn segment(&self) -> &Segment {
        &self.segment
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Layout {
    Auto { types: Vec<ColumnSpec> },
    Levels(Vec<Level>),
}

/// What the crawler does with the contents of a directory at a given depth.
#[derive(Debug)]
pub(crate) enum Step<'a> {
    /// Parse subdirectories with this level; files are ignored
    Descend(&'a Level),
    /// Parse subdirectories as `key=value` and also take files
    Auto,
    /// Take files; subdirectories are unexpected
    Terminal,
}

/// The grammar of a partitioned table's paths.
///
/// # Examples
///
/// ```
/// use fsql::{PathPattern, PatternStyle};
///
/// // year=2022/month=4/<files>
/// let hive = PathPattern::hive("year:int/month:int").unwrap();
/// assert_eq!(hive.depth(), Some(2));
///
/// // 2022/4/30/<file> with the file name exposed as column `fname`
/// let fixed = PathPattern::parse("y/m/d", PatternStyle::Fixed)
///     .unwrap()
///     .with_file_column("fname")
///     .unwrap();
/// assert_eq!(fixed.columns().len(), 4);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathPattern {
    layout: Layout,
    file: Option<Segment>,
}

impl Default for PathPattern {
    fn default() -> Self {
        Self::auto()
    }
}

impl PathPattern {
    /// Unbounded hive-style crawl.
    pub fn auto() -> Self {
        Self {
            layout: Layout::Auto { types: Vec::new() },
            file: None,
        }
    }

    /// A table with no partition directories.
    pub fn flat() -> Self {
        Self {
            layout: Layout::Levels(Vec::new()),
            file: None,
        }
    }

    pub fn hive(desc: &str) -> Result<Self> {
        Self::parse(desc, PatternStyle::Hive)
    }

    pub fn fixed(desc: &str) -> Result<Self> {
        Self::parse(desc, PatternStyle::Fixed)
    }

    /// Parse a `/`-separated list of directory segments.
    pub fn parse(desc: &str, style: PatternStyle) -> Result<Self> {
        let trimmed = desc.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(FsqlError::invalid_pattern(desc, "empty pattern"));
        }
        let hive = style == PatternStyle::Hive;
        let levels = trimmed
            .split('/')
            .map(|segment| {
                Ok(Level {
                    segment: Segment::parse(segment, hive)?,
                    calendar: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let pattern = Self {
            layout: Layout::Levels(levels),
            file: None,
        };
        pattern.check_unique()?;
        Ok(pattern)
    }

    /// Three generated levels covering `range`; nothing outside it is listed.
    pub fn date_range(range: DateRange, layout: DateLayout) -> Result<Self> {
        let hive = layout.style == PatternStyle::Hive;
        let level = |name: &str, field: DateField, data_type: ColumnType| -> Result<Level> {
            let segment = Segment::shorthand(&format!("{name}:{data_type}"), hive)?;
            Ok(Level {
                segment,
                calendar: Some(Calendar {
                    range,
                    field,
                    year: layout.year.clone(),
                    month: layout.month.clone(),
                    zero_pad: layout.zero_pad,
                }),
            })
        };
        let levels = vec![
            level(&layout.year, DateField::Year, ColumnType::Int64)?,
            level(&layout.month, DateField::Month, ColumnType::Int64)?,
            level(&layout.day, DateField::Day, ColumnType::Int64)?,
        ];
        let pattern = Self {
            layout: Layout::Levels(levels),
            file: None,
        };
        pattern.check_unique()?;
        Ok(pattern)
    }

    /// Expose each file's full name as a column.
    ///
    /// The column may enumerate names (`fname=[a.csv,b.csv]`), in which case files are
    /// checked directly instead of listed.
    pub fn with_file_column(self, column: &str) -> Result<Self> {
        let segment = Segment::shorthand(column, false)?;
        self.with_file(segment)
    }

    /// Parse file names with a template such as `part-{id:int}.csv`.
    pub fn with_file_segment(self, template: &str) -> Result<Self> {
        let segment = Segment::template(template)?;
        self.with_file(segment)
    }

    /// Declare the type of an `Auto` column; other auto columns stay `Utf8`.
    pub fn with_column_type(mut self, name: impl Into<String>, data_type: ColumnType) -> Self {
        if let Layout::Auto { types } = &mut self.layout {
            let name = name.into();
            types.retain(|spec| spec.name != name);
            types.push(ColumnSpec::new(name, data_type));
        }
        self
    }

    fn with_file(mut self, segment: Segment) -> Result<Self> {
        self.file = Some(segment);
        self.check_unique()?;
        Ok(self)
    }

    fn check_unique(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in self.columns() {
            if !seen.insert(column.name.as_str()) {
                return Err(FsqlError::duplicate(column.name.clone()));
            }
        }
        Ok(())
    }

    /// Declared columns in path order; empty for `Auto` apart from the file column.
    pub fn columns(&self) -> Vec<&ColumnSpec> {
        let levels: &[Level] = match &self.layout {
            Layout::Auto { .. } => &[],
            Layout::Levels(levels) => levels,
        };
        levels
            .iter()
            .flat_map(|level| level.segment.columns())
            .chain(self.file.iter().flat_map(Segment::columns))
            .collect()
    }

    /// Number of directory levels, `None` for `Auto`.
    pub fn depth(&self) -> Option<usize> {
        match &self.layout {
            Layout::Auto { .. } => None,
            Layout::Levels(levels) => Some(levels.len()),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self.layout, Layout::Auto { .. })
    }

    pub fn levels(&self) -> &[Level] {
        match &self.layout {
            Layout::Auto { .. } => &[],
            Layout::Levels(levels) => levels,
        }
    }

    pub fn file_segment(&self) -> Option<&Segment> {
        self.file.as_ref()
    }

    pub(crate) fn step(&self, depth: usize) -> Step<'_> {
        match &self.layout {
            Layout::Auto { .. } => Step::Auto,
            Layout::Levels(levels) => match levels.get(depth) {
                Some(level) => Step::Descend(level),
                None => Step::Terminal,
            },
        }
    }

    /// Type of an `Auto` column.
    pub(crate) fn auto_type(&self, name: &str) -> ColumnType {
        match &self.layout {
            Layout::Auto { types } => types
                .iter()
                .find(|spec| spec.name == name)
                .map(|spec| spec.data_type)
                .unwrap_or_default(),
            Layout::Levels(_) => ColumnType::Utf8,
        }
    }
}

impl Calendar {
    /// Names for this level given the raw `year`/`month` values bound above it.
    pub(crate) fn candidates(
        &self,
        segment: &Segment,
        year: Option<i64>,
        month: Option<i64>,
    ) -> Vec<String> {
        let year = year.and_then(|y| i32::try_from(y).ok());
        let month = month.and_then(|m| u32::try_from(m).ok());
        self.range
            .field_values(self.field, year, month)
            .into_iter()
            .filter_map(|value| {
                let raw = match self.field {
                    DateField::Year => value.to_string(),
                    DateField::Month | DateField::Day if self.zero_pad => format!("{value:02}"),
                    DateField::Month | DateField::Day => value.to_string(),
                };
                segment.render(&[&raw])
            })
            .collect()
    }
}
