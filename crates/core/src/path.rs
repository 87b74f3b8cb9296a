//! Dotted/bracketed paths over values: parse, read, write, delete.
//!
//! Serialized form is `a.b[0].c[-1]` -- dot-separated fields, bracketed
//! signed indices. Negative indices count from the end of a sequence.
//! Writes auto-vivify missing parents.

use std::fmt;

use indexmap::IndexMap;

use crate::error::ParseError;
use crate::limits::Limits;
use crate::value::Value;

/// One path step: a map field or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(i64),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{}", name),
            Segment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A parsed path. The empty path (zero segments) addresses nothing:
/// reads miss, writes are no-ops, deletes fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub segments: Vec<Segment>,
}

/// Failure writing through a path (a resolved negative index out of
/// range). Vivification makes every other write succeed.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteError {
    pub message: String,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WriteError {}

impl Path {
    /// Parse with the default limits.
    pub fn parse(text: &str) -> Result<Path, ParseError> {
        Path::parse_with(text, &Limits::default())
    }

    /// Parse `head ( '.' field | '[' signed_int ']' )*`. Whitespace is
    /// not permitted anywhere inside a path.
    pub fn parse_with(text: &str, limits: &Limits) -> Result<Path, ParseError> {
        if text.is_empty() {
            return Ok(Path { segments: vec![] });
        }
        if text.chars().count() > limits.max_path_length {
            return Err(ParseError::new(
                0,
                format!("path exceeds maximum length of {}", limits.max_path_length),
            ));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut segments = Vec::new();
        let mut pos = 0usize;
        let mut expect_field = true; // head position, or just after '.'

        while pos < chars.len() {
            let c = chars[pos];
            if c.is_whitespace() {
                return Err(ParseError::new(pos, "whitespace is not allowed in a path"));
            }
            if c == '[' {
                if expect_field && segments.is_empty() {
                    return Err(ParseError::new(pos, "path must start with a field name"));
                }
                if expect_field {
                    return Err(ParseError::new(pos, "expected field name after '.'"));
                }
                let start = pos;
                pos += 1;
                let mut digits = String::new();
                while pos < chars.len() && chars[pos] != ']' {
                    digits.push(chars[pos]);
                    pos += 1;
                }
                if pos >= chars.len() {
                    return Err(ParseError::new(start, "unclosed '[' in path"));
                }
                pos += 1; // consume ']'
                let index: i64 = digits.parse().map_err(|_| {
                    ParseError::new(start, format!("invalid index '{}' in path", digits))
                })?;
                segments.push(Segment::Index(index));
                continue;
            }
            if c == ']' {
                return Err(ParseError::new(pos, "unexpected ']' in path"));
            }
            if c == '.' {
                if expect_field {
                    return Err(ParseError::new(pos, "expected field name, got '.'"));
                }
                expect_field = true;
                pos += 1;
                continue;
            }

            // Field name: everything up to the next '.', '[' or ']'
            let start = pos;
            let mut name = String::new();
            while pos < chars.len() {
                let fc = chars[pos];
                if fc == '.' || fc == '[' || fc == ']' {
                    break;
                }
                if fc.is_whitespace() {
                    return Err(ParseError::new(pos, "whitespace is not allowed in a path"));
                }
                name.push(fc);
                pos += 1;
            }
            if name.is_empty() {
                return Err(ParseError::new(start, "empty field name in path"));
            }
            if !expect_field {
                return Err(ParseError::new(start, "expected '.' or '[' between segments"));
            }
            expect_field = false;
            segments.push(Segment::Field(name));
        }

        if expect_field {
            return Err(ParseError::new(chars.len(), "path ends with a trailing '.'"));
        }
        Path::from_segments(segments, limits)
    }

    /// Build a path from pre-assembled segments, enforcing the limits.
    pub fn from_segments(segments: Vec<Segment>, limits: &Limits) -> Result<Path, ParseError> {
        if segments.len() > limits.max_path_depth {
            return Err(ParseError::new(
                0,
                format!("path exceeds maximum depth of {}", limits.max_path_depth),
            ));
        }
        let path = Path { segments };
        if path.to_string().chars().count() > limits.max_path_length {
            return Err(ParseError::new(
                0,
                format!("path exceeds maximum length of {}", limits.max_path_length),
            ));
        }
        Ok(path)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path minus its last segment, with that segment.
    pub fn split_last(&self) -> Option<(Path, &Segment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            Path {
                segments: parent.to_vec(),
            },
            last,
        ))
    }

    /// Walk the path through `value`. Negative indices are normalized
    /// against the sequence length; misses return `None`.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        if self.segments.is_empty() {
            return None;
        }
        let mut cur = value;
        for seg in &self.segments {
            cur = step(cur, seg)?;
        }
        Some(cur)
    }

    pub fn resolve_mut<'a>(&self, value: &'a mut Value) -> Option<&'a mut Value> {
        if self.segments.is_empty() {
            return None;
        }
        let mut cur = value;
        for seg in &self.segments {
            cur = step_mut(cur, seg)?;
        }
        Some(cur)
    }

    /// True when the path addresses a present entry -- including one that
    /// holds an explicit null.
    pub fn exists(&self, value: &Value) -> bool {
        self.resolve(value).is_some()
    }

    /// Write through the path, creating missing parents: a missing parent
    /// before a field becomes a map, before an index becomes a sequence,
    /// and writing past the end of a sequence fills the gap with nulls.
    /// The empty path is a no-op.
    pub fn set(&self, value: &mut Value, new: Value) -> Result<(), WriteError> {
        if self.segments.is_empty() {
            return Ok(());
        }
        set_inner(value, &self.segments, new)
    }

    /// Remove the entry the path addresses. Returns false when a prefix
    /// is missing, the final parent is the wrong kind, or an index is out
    /// of bounds.
    pub fn delete(&self, value: &mut Value) -> bool {
        let Some((parent_path, last)) = self.split_last() else {
            return false;
        };
        let parent = if parent_path.is_empty() {
            value
        } else {
            match parent_path.resolve_mut(value) {
                Some(p) => p,
                None => return false,
            }
        };
        match (parent, last) {
            (Value::Map(entries), Segment::Field(name)) => entries.shift_remove(name).is_some(),
            (Value::Seq(items), Segment::Index(i)) => {
                match normalize_index(*i, items.len()) {
                    Some(idx) => {
                        items.remove(idx);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Normalize a possibly negative index against `len`. `None` when the
/// normalized index falls outside `0..len`.
pub fn normalize_index(i: i64, len: usize) -> Option<usize> {
    let idx = if i < 0 { len as i64 + i } else { i };
    if idx < 0 || idx >= len as i64 {
        None
    } else {
        Some(idx as usize)
    }
}

fn step<'a>(cur: &'a Value, seg: &Segment) -> Option<&'a Value> {
    match (cur, seg) {
        (Value::Map(entries), Segment::Field(name)) => entries.get(name),
        (Value::Seq(items), Segment::Index(i)) => {
            normalize_index(*i, items.len()).map(|idx| &items[idx])
        }
        _ => None,
    }
}

fn step_mut<'a>(cur: &'a mut Value, seg: &Segment) -> Option<&'a mut Value> {
    match (cur, seg) {
        (Value::Map(entries), Segment::Field(name)) => entries.get_mut(name),
        (Value::Seq(items), Segment::Index(i)) => {
            let idx = normalize_index(*i, items.len())?;
            Some(&mut items[idx])
        }
        _ => None,
    }
}

fn set_inner(cur: &mut Value, segs: &[Segment], new: Value) -> Result<(), WriteError> {
    match &segs[0] {
        Segment::Field(name) => {
            if !matches!(cur, Value::Map(_)) {
                *cur = Value::Map(IndexMap::new());
            }
            let Value::Map(entries) = cur else {
                unreachable!("vivified a map above");
            };
            if segs.len() == 1 {
                entries.insert(name.clone(), new);
                return Ok(());
            }
            let child = entries.entry(name.clone()).or_insert(Value::Null);
            set_inner(child, &segs[1..], new)
        }
        Segment::Index(i) => {
            if !matches!(cur, Value::Seq(_)) {
                *cur = Value::Seq(Vec::new());
            }
            let Value::Seq(items) = cur else {
                unreachable!("vivified a sequence above");
            };
            let idx = if *i < 0 {
                normalize_index(*i, items.len()).ok_or_else(|| WriteError {
                    message: format!(
                        "index {} out of range for sequence of length {}",
                        i,
                        items.len()
                    ),
                })?
            } else {
                let idx = *i as usize;
                if idx >= items.len() {
                    items.resize(idx + 1, Value::Null);
                }
                idx
            };
            if segs.len() == 1 {
                items[idx] = new;
                Ok(())
            } else {
                set_inner(&mut items[idx], &segs[1..], new)
            }
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
