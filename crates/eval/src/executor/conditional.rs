//! MOVE_WHERE and UPDATE_WHERE: array operations driven by an embedded
//! condition. The condition is evaluated with each element as scope.

use marq_core::condition::Condition;
use marq_core::{Limits, MoveTarget, Path, Value};

use crate::condition::evaluate_with;
use crate::error::ExecError;
use crate::executor::{seq_existing, seq_json, ActionOutcome};

/// For every matching element, apply the `(field, value)` pairs in
/// written order. Zero matches is a warning.
pub fn update_where(
    path: &Path,
    condition: &Condition,
    updates: &[(Path, Value)],
    value: &mut Value,
    limits: &Limits,
) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Ok(ActionOutcome::warning(format!(
            "'{}' does not exist; UPDATE_WHERE skipped",
            path
        )));
    }
    let items = seq_existing(value, path)?;
    let mut matched = 0usize;
    let mut changed = false;
    for item in items.iter_mut() {
        if !evaluate_with(condition, item, limits)? {
            continue;
        }
        matched += 1;
        for (field, new) in updates {
            if field.resolve(item) == Some(new) {
                continue;
            }
            field.set(item, new.clone())?;
            changed = true;
        }
    }
    if matched == 0 {
        return Ok(ActionOutcome::warning(format!(
            "no elements of '{}' matched",
            path
        )));
    }
    if !changed {
        return Ok(ActionOutcome::unchanged());
    }
    Ok(ActionOutcome::changed(format!(
        "UPDATE_WHERE {} updated {} element(s)",
        path, matched
    )))
}

/// Collect every matching element in original order, remove them, and
/// reinsert them as one contiguous block at the target. An AFTER/BEFORE
/// anchor that matches nothing leaves the sequence untouched with a
/// warning.
pub fn move_where(
    path: &Path,
    condition: &Condition,
    target: &MoveTarget,
    value: &mut Value,
    limits: &Limits,
) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Ok(ActionOutcome::warning(format!(
            "'{}' does not exist; MOVE_WHERE skipped",
            path
        )));
    }
    let items = seq_existing(value, path)?;

    let mut block = Vec::new();
    let mut rest = Vec::new();
    for item in items.iter() {
        if evaluate_with(condition, item, limits)? {
            block.push(item.clone());
        } else {
            rest.push(item.clone());
        }
    }
    if block.is_empty() {
        return Ok(ActionOutcome::warning(format!(
            "no elements of '{}' matched",
            path
        )));
    }

    let insert_at = match target {
        MoveTarget::Start => 0,
        MoveTarget::End => rest.len(),
        MoveTarget::After(anchor) | MoveTarget::Before(anchor) => {
            let found = first_match(&rest, anchor, limits)?;
            match found {
                Some(i) => {
                    if matches!(target, MoveTarget::After(_)) {
                        i + 1
                    } else {
                        i
                    }
                }
                None => {
                    return Ok(ActionOutcome::warning(format!(
                        "no anchor element matched in '{}'",
                        path
                    )))
                }
            }
        }
    };

    let mut rearranged = rest;
    rearranged.splice(insert_at..insert_at, block);
    if rearranged == *items {
        return Ok(ActionOutcome::unchanged());
    }
    *items = rearranged;
    Ok(ActionOutcome::changed(format!(
        "MOVE_WHERE {} -> {}",
        path,
        seq_json(items)
    )))
}

fn first_match(
    items: &[Value],
    condition: &Condition,
    limits: &Limits,
) -> Result<Option<usize>, ExecError> {
    for (i, item) in items.iter().enumerate() {
        if evaluate_with(condition, item, limits)? {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
