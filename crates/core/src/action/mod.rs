//! The action DSL: transformations of a front-matter value.
//!
//! One action per rule, `KEYWORD path args…` with case-insensitive
//! keywords. `MOVE_WHERE` and `UPDATE_WHERE` embed condition fragments,
//! which are carved out of the source text by span and handed to the
//! condition parser.

pub mod lexer;
pub mod parser;

use std::fmt;

use crate::condition::Condition;
use crate::error::ParseError;
use crate::limits::Limits;
use crate::path::Path;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Where a MOVE_WHERE block lands. A numeric `TO i` collapses in the
/// parser: 0 becomes `Start`, anything else becomes `End`.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveTarget {
    Start,
    End,
    After(Condition),
    Before(Condition),
}

/// Action AST -- one constructor per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Set { path: Path, value: Value },
    Add { path: Path, value: Value },
    /// Also spelled CLEAR
    Delete { path: Path },
    Rename { from: Path, to: Path },
    Append { path: Path, value: Value },
    Prepend { path: Path, value: Value },
    InsertAt { path: Path, value: Value, index: i64 },
    InsertAfter { path: Path, value: Value, anchor: Value },
    InsertBefore { path: Path, value: Value, anchor: Value },
    Remove { path: Path, value: Value },
    RemoveAll { path: Path, value: Value },
    RemoveAt { path: Path, index: i64 },
    Replace { path: Path, old: Value, new: Value },
    ReplaceAll { path: Path, old: Value, new: Value },
    Deduplicate { path: Path },
    Sort { path: Path, order: SortOrder },
    SortBy { path: Path, field: String, order: SortOrder },
    Move { path: Path, from: i64, to: i64 },
    MoveWhere {
        path: Path,
        condition: Condition,
        target: MoveTarget,
    },
    UpdateWhere {
        path: Path,
        condition: Condition,
        updates: Vec<(Path, Value)>,
    },
    /// Deep merge: maps recurse, everything else is replaced
    Merge { path: Path, object: Value },
    /// Shallow merge: every source key replaces the target key
    MergeOverwrite { path: Path, object: Value },
}

impl SortOrder {
    pub fn name(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Canonical source form; `parse(action.to_string())` reproduces the
/// AST. Keywords come out uppercase, values in literal syntax.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lit = crate::literal::render;
        match self {
            Action::Set { path, value } => write!(f, "SET {} {}", path, lit(value)),
            Action::Add { path, value } => write!(f, "ADD {} {}", path, lit(value)),
            Action::Delete { path } => write!(f, "DELETE {}", path),
            Action::Rename { from, to } => write!(f, "RENAME {} {}", from, to),
            Action::Append { path, value } => write!(f, "APPEND {} {}", path, lit(value)),
            Action::Prepend { path, value } => write!(f, "PREPEND {} {}", path, lit(value)),
            Action::InsertAt { path, value, index } => {
                write!(f, "INSERT_AT {} {} AT {}", path, lit(value), index)
            }
            Action::InsertAfter {
                path,
                value,
                anchor,
            } => write!(f, "INSERT_AFTER {} {} AFTER {}", path, lit(value), lit(anchor)),
            Action::InsertBefore {
                path,
                value,
                anchor,
            } => write!(
                f,
                "INSERT_BEFORE {} {} BEFORE {}",
                path,
                lit(value),
                lit(anchor)
            ),
            Action::Remove { path, value } => write!(f, "REMOVE {} {}", path, lit(value)),
            Action::RemoveAll { path, value } => {
                write!(f, "REMOVE_ALL {} {}", path, lit(value))
            }
            Action::RemoveAt { path, index } => write!(f, "REMOVE_AT {} {}", path, index),
            Action::Replace { path, old, new } => {
                write!(f, "REPLACE {} {} WITH {}", path, lit(old), lit(new))
            }
            Action::ReplaceAll { path, old, new } => {
                write!(f, "REPLACE_ALL {} {} WITH {}", path, lit(old), lit(new))
            }
            Action::Deduplicate { path } => write!(f, "DEDUPLICATE {}", path),
            Action::Sort { path, order } => write!(f, "SORT {} {}", path, order.name()),
            Action::SortBy { path, field, order } => {
                write!(f, "SORT_BY {} BY {} {}", path, field, order.name())
            }
            Action::Move { path, from, to } => {
                write!(f, "MOVE {} FROM {} TO {}", path, from, to)
            }
            Action::MoveWhere {
                path,
                condition,
                target,
            } => {
                write!(f, "MOVE_WHERE {} WHERE {} ", path, condition)?;
                match target {
                    MoveTarget::Start => write!(f, "TO START"),
                    MoveTarget::End => write!(f, "TO END"),
                    MoveTarget::After(anchor) => write!(f, "AFTER {}", anchor),
                    MoveTarget::Before(anchor) => write!(f, "BEFORE {}", anchor),
                }
            }
            Action::UpdateWhere {
                path,
                condition,
                updates,
            } => {
                write!(f, "UPDATE_WHERE {} WHERE {} SET ", path, condition)?;
                for (i, (field, value)) in updates.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", field, lit(value))?;
                }
                Ok(())
            }
            Action::Merge { path, object } => write!(f, "MERGE {} {}", path, lit(object)),
            Action::MergeOverwrite { path, object } => {
                write!(f, "MERGE_OVERWRITE {} {}", path, lit(object))
            }
        }
    }
}

/// Parse an action with default limits.
pub fn parse(text: &str) -> Result<Action, ParseError> {
    parse_with(text, &Limits::default())
}

/// Parse an action, enforcing the given path limits.
pub fn parse_with(text: &str, limits: &Limits) -> Result<Action, ParseError> {
    let tokens = lexer::lex(text)?;
    parser::parse(text, &tokens, limits)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
