//! MERGE (deep) and MERGE_OVERWRITE (shallow).

use indexmap::IndexMap;
use marq_core::{Path, Value};

use crate::error::ExecError;
use crate::executor::{map_existing, ActionOutcome};

/// Merge `object` into the map at `path`. Deep: keys present on both
/// sides recurse when both values are maps, otherwise the source value
/// replaces the target (arrays included). Shallow: every source key
/// replaces the target key. A missing target is created outright.
pub fn merge(
    path: &Path,
    object: &Value,
    deep: bool,
    value: &mut Value,
) -> Result<ActionOutcome, ExecError> {
    let verb = if deep { "MERGE" } else { "MERGE_OVERWRITE" };
    let source = match object.as_map() {
        Some(entries) => entries,
        None => {
            return Err(ExecError::NotAnObject {
                path: path.to_string(),
                got: object.type_name().to_string(),
            })
        }
    };
    if !path.exists(value) {
        path.set(value, object.clone())?;
        return Ok(ActionOutcome::changed(format!(
            "{} {} created {}",
            verb,
            path,
            object.to_json_string()
        )));
    }
    let target = map_existing(value, path)?;
    let changed = if deep {
        deep_merge(target, source)
    } else {
        shallow_merge(target, source)
    };
    if !changed {
        return Ok(ActionOutcome::unchanged());
    }
    Ok(ActionOutcome::changed(format!(
        "{} {} {}",
        verb,
        path,
        object.to_json_string()
    )))
}

fn deep_merge(target: &mut IndexMap<String, Value>, source: &IndexMap<String, Value>) -> bool {
    let mut changed = false;
    for (key, sv) in source {
        match (target.get_mut(key), sv) {
            (Some(Value::Map(tm)), Value::Map(sm)) => {
                if deep_merge(tm, sm) {
                    changed = true;
                }
            }
            (Some(tv), _) => {
                if tv != sv {
                    *tv = sv.clone();
                    changed = true;
                }
            }
            (None, _) => {
                target.insert(key.clone(), sv.clone());
                changed = true;
            }
        }
    }
    changed
}

fn shallow_merge(target: &mut IndexMap<String, Value>, source: &IndexMap<String, Value>) -> bool {
    let mut changed = false;
    for (key, sv) in source {
        if target.get(key) != Some(sv) {
            target.insert(key.clone(), sv.clone());
            changed = true;
        }
    }
    changed
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
