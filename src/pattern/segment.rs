//! Single path components: literal text interleaved with column placeholders.

use std::fmt;

use super::column::{ColumnSpec, ColumnType};
use crate::error::{FsqlError, Result};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Part {
    Literal(String),
    Placeholder(usize),
}

/// A column slot inside a segment, with the values it may be generated from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placeholder {
    pub column: ColumnSpec,
    /// Admissible raw values; `None` means any value, found by listing.
    pub values: Option<Vec<String>>,
}

/// Outcome of matching a child name against a segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum NameMatch<'n> {
    /// Raw captures, one per placeholder in order
    Matched(Vec<&'n str>),
    /// The name fits the shape but a capture is not among the enumerated values
    Excluded,
    Mismatch,
}

/// One path component of a [`PathPattern`](super::PathPattern).
///
/// A segment is built from one of two forms:
/// - shorthand `name[:type][=value | =[v1,v2]]`, rendered as `name=value` in hive
///   style or as the bare value in fixed style;
/// - a template with `{name[:type][=[v1,v2]]}` placeholders and literal text around them,
///   e.g. `dt={day:date}` or `part-{id:int}.parquet`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segment {
    source: String,
    parts: Vec<Part>,
    placeholders: Vec<Placeholder>,
}

impl Segment {
    /// Parse a shorthand segment; `hive` selects the `name=value` rendering.
    pub fn shorthand(desc: &str, hive: bool) -> Result<Self> {
        let placeholder = parse_placeholder(desc, desc)?;
        let mut parts = Vec::with_capacity(2);
        if hive {
            parts.push(Part::Literal(format!("{}=", placeholder.column.name)));
        }
        parts.push(Part::Placeholder(0));
        Ok(Self {
            source: desc.to_string(),
            parts,
            placeholders: vec![placeholder],
        })
    }

    /// Parse a `{...}` template segment.
    pub fn template(desc: &str) -> Result<Self> {
        if desc.is_empty() {
            return Err(FsqlError::invalid_pattern(desc, "empty segment"));
        }
        let mut parts = Vec::new();
        let mut placeholders = Vec::new();
        let mut literal = String::new();
        let mut rest = desc;
        while let Some(open) = rest.find(['{', '}']) {
            if rest[open..].starts_with('}') {
                return Err(FsqlError::invalid_pattern(desc, "unbalanced '}'"));
            }
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| FsqlError::invalid_pattern(desc, "unclosed '{'"))?;
            let inner = &after[..close];
            if inner.contains('{') {
                return Err(FsqlError::invalid_pattern(desc, "nested '{'"));
            }
            if literal.is_empty() && matches!(parts.last(), Some(Part::Placeholder(_))) {
                return Err(FsqlError::invalid_pattern(
                    desc,
                    "placeholders must be separated by literal text",
                ));
            }
            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            placeholders.push(parse_placeholder(inner, desc)?);
            parts.push(Part::Placeholder(placeholders.len() - 1));
            rest = &after[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }
        Ok(Self {
            source: desc.to_string(),
            parts,
            placeholders,
        })
    }

    /// Template when the text contains `{`, shorthand otherwise.
    pub fn parse(desc: &str, hive: bool) -> Result<Self> {
        if desc.contains(['{', '}']) {
            Self::template(desc)
        } else {
            Self::shorthand(desc, hive)
        }
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.placeholders.iter().map(|p| &p.column)
    }

    /// Match `name` and return the raw value of each column, or `None` when
    /// the name does not fit. Enumerated values are not enforced here.
    pub fn parse_name<'n>(&self, name: &'n str) -> Option<Vec<(&ColumnSpec, &'n str)>> {
        let mut captures = Vec::with_capacity(self.placeholders.len());
        if !match_parts(&self.parts, name, &mut captures) {
            return None;
        }
        Some(self.columns().zip(captures).collect())
    }

    pub(crate) fn match_name<'n>(&self, name: &'n str) -> NameMatch<'n> {
        let mut captures = Vec::with_capacity(self.placeholders.len());
        if !match_parts(&self.parts, name, &mut captures) {
            return NameMatch::Mismatch;
        }
        let admitted = self
            .placeholders
            .iter()
            .zip(&captures)
            .all(|(p, raw)| p.values.as_ref().is_none_or(|v| v.iter().any(|v| v == raw)));
        if admitted {
            NameMatch::Matched(captures)
        } else {
            NameMatch::Excluded
        }
    }

    /// Names to try without listing, when every placeholder is enumerated.
    pub fn candidates(&self) -> Option<Vec<String>> {
        self.candidates_with(|p| p.values.clone())
    }

    /// Cartesian product of the per-placeholder values supplied by `values_for`;
    /// `None` as soon as one placeholder has no finite value set.
    pub(crate) fn candidates_with<F>(&self, mut values_for: F) -> Option<Vec<String>>
    where
        F: FnMut(&Placeholder) -> Option<Vec<String>>,
    {
        let mut choices = Vec::with_capacity(self.placeholders.len());
        for placeholder in &self.placeholders {
            choices.push(values_for(placeholder)?);
        }
        let mut names = vec![String::new()];
        for part in &self.parts {
            names = match part {
                Part::Literal(text) => names
                    .into_iter()
                    .map(|mut name| {
                        name.push_str(text);
                        name
                    })
                    .collect(),
                Part::Placeholder(idx) => names
                    .iter()
                    .flat_map(|name| choices[*idx].iter().map(move |v| format!("{name}{v}")))
                    .collect(),
            };
        }
        Some(names)
    }

    /// Render the segment with one raw value per placeholder.
    pub fn render(&self, values: &[&str]) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Placeholder(idx) => out.push_str(values.get(*idx)?),
            }
        }
        Some(out)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// `name[:type][=value | =[v1,v2]]`
fn parse_placeholder(spec: &str, segment: &str) -> Result<Placeholder> {
    let (head, values) = match spec.split_once('=') {
        Some((head, tail)) => (head, Some(parse_values(tail, segment)?)),
        None => (spec, None),
    };
    let (name, data_type) = match head.split_once(':') {
        Some((name, tag)) => {
            let data_type = ColumnType::from_tag(tag).ok_or_else(|| {
                FsqlError::invalid_pattern(segment, format!("unknown column type '{tag}'"))
            })?;
            (name.trim(), data_type)
        }
        None => (head.trim(), ColumnType::Utf8),
    };
    if name.is_empty() {
        return Err(FsqlError::invalid_pattern(segment, "empty column name"));
    }
    if name.contains(['/', '[', ']', ',']) {
        return Err(FsqlError::invalid_pattern(
            segment,
            format!("invalid column name '{name}'"),
        ));
    }
    Ok(Placeholder {
        column: ColumnSpec::new(name, data_type),
        values,
    })
}

fn parse_values(tail: &str, segment: &str) -> Result<Vec<String>> {
    let values: Vec<String> = match tail.strip_prefix('[') {
        Some(list) => list
            .strip_suffix(']')
            .ok_or_else(|| FsqlError::invalid_pattern(segment, "unclosed '['"))?
            .split(',')
            .map(|v| v.trim().to_string())
            .collect(),
        None => vec![tail.to_string()],
    };
    if values.iter().any(String::is_empty) {
        return Err(FsqlError::invalid_pattern(segment, "empty enumerated value"));
    }
    Ok(values)
}

/// Backtracking matcher; captures are non-empty and the shortest capture is tried first.
fn match_parts<'n>(parts: &[Part], name: &'n str, out: &mut Vec<&'n str>) -> bool {
    match parts.split_first() {
        None => name.is_empty(),
        Some((Part::Literal(text), rest)) => name
            .strip_prefix(text.as_str())
            .is_some_and(|tail| match_parts(rest, tail, out)),
        Some((Part::Placeholder(_), [])) => {
            if name.is_empty() {
                return false;
            }
            out.push(name);
            true
        }
        Some((Part::Placeholder(_), rest)) => {
            let Some(Part::Literal(next)) = rest.first() else {
                return false;
            };
            for (idx, _) in name.char_indices().skip(1) {
                if !name[idx..].starts_with(next.as_str()) {
                    continue;
                }
                let mark = out.len();
                out.push(&name[..idx]);
                if match_parts(rest, &name[idx..], out) {
                    return true;
                }
                out.truncate(mark);
            }
            false
        }
    }
}
