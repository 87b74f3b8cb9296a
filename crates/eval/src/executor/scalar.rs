//! SET / ADD / DELETE / RENAME.

use indexmap::IndexMap;
use marq_core::path::Segment;
use marq_core::{Path, Value};

use crate::error::ExecError;
use crate::executor::ActionOutcome;

/// SET overwrites unconditionally, vivifying missing parents. Writing a
/// value equal to the current one is not a modification.
pub fn set(path: &Path, new: &Value, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if path.resolve(value) == Some(new) {
        return Ok(ActionOutcome::unchanged());
    }
    path.set(value, new.clone())?;
    Ok(ActionOutcome::changed(format!(
        "SET {} {}",
        path,
        new.to_json_string()
    )))
}

/// ADD writes only when the field is missing; an existing field is left
/// alone with a warning.
pub fn add(path: &Path, new: &Value, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if path.exists(value) {
        return Ok(ActionOutcome::warning(format!(
            "'{}' already exists; ADD left it unchanged",
            path
        )));
    }
    path.set(value, new.clone())?;
    Ok(ActionOutcome::changed(format!(
        "ADD {} {}",
        path,
        new.to_json_string()
    )))
}

/// DELETE of an absent path is a clean no-op.
pub fn delete(path: &Path, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if path.delete(value) {
        Ok(ActionOutcome::changed(format!("DELETE {}", path)))
    } else {
        Ok(ActionOutcome::unchanged())
    }
}

/// RENAME keeps the old key's position when both paths live in the same
/// parent map; across parents it degrades to delete + set. Overwriting
/// an existing destination succeeds with a warning.
pub fn rename(from: &Path, to: &Path, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if from == to {
        return Ok(ActionOutcome::unchanged());
    }
    let Some(moved) = from.resolve(value).cloned() else {
        return Ok(ActionOutcome::warning(format!(
            "'{}' does not exist; RENAME skipped",
            from
        )));
    };
    let overwrote = to.exists(value);

    let same_parent = match (from.split_last(), to.split_last()) {
        (Some((fp, Segment::Field(fk))), Some((tp, Segment::Field(tk)))) if fp == tp => {
            Some((fp, fk.clone(), tk.clone()))
        }
        _ => None,
    };

    match same_parent {
        Some((parent, from_key, to_key)) => {
            let parent_val = if parent.is_empty() {
                &mut *value
            } else {
                parent
                    .resolve_mut(value)
                    .ok_or_else(|| ExecError::MissingPath {
                        path: parent.to_string(),
                    })?
            };
            match parent_val {
                Value::Map(entries) => {
                    let mut rebuilt = IndexMap::with_capacity(entries.len());
                    for (key, val) in entries.drain(..) {
                        if key == to_key && key != from_key {
                            continue; // displaced by the renamed entry
                        }
                        if key == from_key {
                            rebuilt.insert(to_key.clone(), val);
                        } else {
                            rebuilt.insert(key, val);
                        }
                    }
                    *entries = rebuilt;
                }
                other => {
                    return Err(ExecError::NotAnObject {
                        path: parent.to_string(),
                        got: other.type_name().to_string(),
                    })
                }
            }
        }
        None => {
            from.delete(value);
            to.set(value, moved)?;
        }
    }

    let outcome = ActionOutcome::changed(format!("RENAME {} -> {}", from, to));
    if overwrote {
        Ok(outcome.with_warning(format!("'{}' already existed and was overwritten", to)))
    } else {
        Ok(outcome)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crate::executor::execute;
    use marq_core::{parse_action, Value};

    fn doc(json: &str) -> Value {
        Value::from_json(&serde_json::from_str(json).unwrap())
    }

    fn run(action: &str, value: &mut Value) -> crate::executor::ActionOutcome {
        execute(&parse_action(action).unwrap(), value).unwrap()
    }

    #[test]
    fn set_overwrites_and_vivifies() {
        let mut v = doc(r#"{"status":"draft"}"#);
        let out = run(r#"SET status "reviewed""#, &mut v);
        assert!(out.modified);
        assert_eq!(v, doc(r#"{"status":"reviewed"}"#));

        let out = run(r#"SET meta.author "kim""#, &mut v);
        assert!(out.modified);
        assert_eq!(
            v,
            doc(r#"{"status":"reviewed","meta":{"author":"kim"}}"#)
        );
    }

    #[test]
    fn set_same_value_is_not_a_modification() {
        let mut v = doc(r#"{"n":5}"#);
        let out = run("SET n 5", &mut v);
        assert!(!out.modified);
        assert!(out.warning.is_none());
    }

    #[test]
    fn add_only_writes_missing_fields() {
        let mut v = doc(r#"{"status":"draft"}"#);
        let out = run(r#"ADD status "x""#, &mut v);
        assert!(!out.modified);
        assert!(out.warning.is_some());
        assert_eq!(v, doc(r#"{"status":"draft"}"#));

        let out = run(r#"ADD priority 1"#, &mut v);
        assert!(out.modified);
        assert_eq!(v, doc(r#"{"status":"draft","priority":1}"#));
    }

    #[test]
    fn delete_missing_is_clean_noop() {
        let mut v = doc(r#"{"a":1}"#);
        let out = run("DELETE gone", &mut v);
        assert!(!out.modified);
        assert!(out.warning.is_none());
        let out = run("DELETE a", &mut v);
        assert!(out.modified);
        assert_eq!(v, doc("{}"));
    }

    #[test]
    fn clear_is_delete() {
        let mut v = doc(r#"{"a":1}"#);
        run("CLEAR a", &mut v);
        assert_eq!(v, doc("{}"));
    }

    #[test]
    fn rename_keeps_position_in_parent() {
        let mut v = doc(r#"{"a":1,"old":2,"z":3}"#);
        let out = run("RENAME old fresh", &mut v);
        assert!(out.modified);
        let keys: Vec<_> = v.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "fresh", "z"]);
        assert_eq!(v.as_map().unwrap()["fresh"], Value::Int(2));
    }

    #[test]
    fn rename_missing_is_a_warning() {
        let mut v = doc(r#"{"a":1}"#);
        let out = run("RENAME gone b", &mut v);
        assert!(!out.modified);
        assert!(out.warning.is_some());
    }

    #[test]
    fn rename_overwrites_with_warning() {
        let mut v = doc(r#"{"old":1,"target":2}"#);
        let out = run("RENAME old target", &mut v);
        assert!(out.modified);
        assert!(out.warning.is_some());
        assert_eq!(v, doc(r#"{"target":1}"#));
    }

    #[test]
    fn rename_across_parents() {
        let mut v = doc(r#"{"a":{"x":1},"b":{}}"#);
        let out = run("RENAME a.x b.y", &mut v);
        assert!(out.modified);
        assert_eq!(v, doc(r#"{"a":{},"b":{"y":1}}"#));
    }
}
