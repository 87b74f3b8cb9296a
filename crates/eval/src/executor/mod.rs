//! Action execution.
//!
//! Applies an action AST to a value in place. Hard failures (type
//! mismatches, required indices out of bounds) come back as `ExecError`;
//! no-op situations (REMOVE of an absent value, UPDATE_WHERE with zero
//! matches) come back as warnings on a successful outcome. A successful
//! action that changed nothing reports `modified == false`.

mod array;
mod conditional;
mod merge;
mod scalar;

use marq_core::{Action, Limits, Path, Value};

use crate::error::ExecError;

/// Outcome of one executed action. `changes` holds one human-readable
/// line per mutation for the host's log.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub modified: bool,
    pub changes: Vec<String>,
    pub warning: Option<String>,
}

impl ActionOutcome {
    pub(crate) fn unchanged() -> Self {
        ActionOutcome {
            modified: false,
            changes: Vec::new(),
            warning: None,
        }
    }

    pub(crate) fn changed(line: String) -> Self {
        ActionOutcome {
            modified: true,
            changes: vec![line],
            warning: None,
        }
    }

    pub(crate) fn warning(message: impl Into<String>) -> Self {
        ActionOutcome {
            modified: false,
            changes: Vec::new(),
            warning: Some(message.into()),
        }
    }

    pub(crate) fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warning = Some(message.into());
        self
    }
}

/// Execute with default limits.
pub fn execute(action: &Action, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    execute_with(action, value, &Limits::default())
}

/// Apply `action` to `value` in place.
pub fn execute_with(
    action: &Action,
    value: &mut Value,
    limits: &Limits,
) -> Result<ActionOutcome, ExecError> {
    match action {
        Action::Set { path, value: v } => scalar::set(path, v, value),
        Action::Add { path, value: v } => scalar::add(path, v, value),
        Action::Delete { path } => scalar::delete(path, value),
        Action::Rename { from, to } => scalar::rename(from, to, value),

        Action::Append { path, value: v } => array::append(path, v, value),
        Action::Prepend { path, value: v } => array::prepend(path, v, value),
        Action::InsertAt { path, value: v, index } => array::insert_at(path, v, *index, value),
        Action::InsertAfter {
            path,
            value: v,
            anchor,
        } => array::insert_near(path, v, anchor, true, value),
        Action::InsertBefore {
            path,
            value: v,
            anchor,
        } => array::insert_near(path, v, anchor, false, value),
        Action::Remove { path, value: v } => array::remove(path, v, false, value),
        Action::RemoveAll { path, value: v } => array::remove(path, v, true, value),
        Action::RemoveAt { path, index } => array::remove_at(path, *index, value),
        Action::Replace { path, old, new } => array::replace(path, old, new, false, value),
        Action::ReplaceAll { path, old, new } => array::replace(path, old, new, true, value),
        Action::Deduplicate { path } => array::deduplicate(path, value),
        Action::Sort { path, order } => array::sort(path, *order, value),
        Action::SortBy { path, field, order } => array::sort_by(path, field, *order, value),
        Action::Move { path, from, to } => array::mv(path, *from, *to, value),

        Action::MoveWhere {
            path,
            condition,
            target,
        } => conditional::move_where(path, condition, target, value, limits),
        Action::UpdateWhere {
            path,
            condition,
            updates,
        } => conditional::update_where(path, condition, updates, value, limits),

        Action::Merge { path, object } => merge::merge(path, object, true, value),
        Action::MergeOverwrite { path, object } => merge::merge(path, object, false, value),
    }
}

/// Mutable sequence at a path known to exist. The caller checks
/// `path.exists()` first; a present non-array is a hard error.
pub(crate) fn seq_existing<'a>(
    value: &'a mut Value,
    path: &Path,
) -> Result<&'a mut Vec<Value>, ExecError> {
    match path.resolve_mut(value) {
        Some(Value::Seq(items)) => Ok(items),
        Some(other) => Err(ExecError::NotAnArray {
            path: path.to_string(),
            got: other.type_name().to_string(),
        }),
        None => Err(ExecError::MissingPath {
            path: path.to_string(),
        }),
    }
}

/// Mutable map at a path known to exist.
pub(crate) fn map_existing<'a>(
    value: &'a mut Value,
    path: &Path,
) -> Result<&'a mut indexmap::IndexMap<String, Value>, ExecError> {
    match path.resolve_mut(value) {
        Some(Value::Map(entries)) => Ok(entries),
        Some(other) => Err(ExecError::NotAnObject {
            path: path.to_string(),
            got: other.type_name().to_string(),
        }),
        None => Err(ExecError::MissingPath {
            path: path.to_string(),
        }),
    }
}

/// Compact JSON rendering of a sequence for change-log lines.
pub(crate) fn seq_json(items: &[Value]) -> String {
    Value::Seq(items.to_vec()).to_json_string()
}
