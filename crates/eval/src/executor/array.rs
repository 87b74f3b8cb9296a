//! Sequence operations: APPEND through MOVE.

use marq_core::path::normalize_index;
use marq_core::{Path, SortOrder, Value};

use crate::error::ExecError;
use crate::executor::{seq_existing, seq_json, ActionOutcome};

/// APPEND / PREPEND create the sequence when the path is missing.
pub fn append(path: &Path, item: &Value, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    push_end(path, item, value, true)
}

pub fn prepend(path: &Path, item: &Value, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    push_end(path, item, value, false)
}

fn push_end(
    path: &Path,
    item: &Value,
    value: &mut Value,
    at_end: bool,
) -> Result<ActionOutcome, ExecError> {
    let verb = if at_end { "APPEND" } else { "PREPEND" };
    if !path.exists(value) {
        path.set(value, Value::Seq(vec![item.clone()]))?;
        return Ok(ActionOutcome::changed(format!(
            "{} {} {} -> {}",
            verb,
            path,
            item.to_json_string(),
            seq_json(&[item.clone()])
        )));
    }
    let items = seq_existing(value, path)?;
    if at_end {
        items.push(item.clone());
    } else {
        items.insert(0, item.clone());
    }
    Ok(ActionOutcome::changed(format!(
        "{} {} {} -> {}",
        verb,
        path,
        item.to_json_string(),
        seq_json(items)
    )))
}

/// INSERT_AT. Negative indices are relative to the length; `index == len`
/// appends. A missing path is only tolerated for index 0, which creates
/// the sequence.
pub fn insert_at(
    path: &Path,
    item: &Value,
    index: i64,
    value: &mut Value,
) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        if index == 0 {
            path.set(value, Value::Seq(vec![item.clone()]))?;
            return Ok(ActionOutcome::changed(format!(
                "INSERT_AT {} {} AT 0",
                path,
                item.to_json_string()
            )));
        }
        return Err(ExecError::MissingPath {
            path: path.to_string(),
        });
    }
    let items = seq_existing(value, path)?;
    let len = items.len() as i64;
    let idx = if index < 0 { len + index } else { index };
    if idx < 0 || idx > len {
        return Err(ExecError::OutOfBounds {
            path: path.to_string(),
            index,
            len: items.len(),
        });
    }
    items.insert(idx as usize, item.clone());
    Ok(ActionOutcome::changed(format!(
        "INSERT_AT {} {} AT {}",
        path,
        item.to_json_string(),
        idx
    )))
}

/// INSERT_AFTER / INSERT_BEFORE a value anchor. An absent anchor is a
/// warning no-op.
pub fn insert_near(
    path: &Path,
    item: &Value,
    anchor: &Value,
    after: bool,
    value: &mut Value,
) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Err(ExecError::MissingPath {
            path: path.to_string(),
        });
    }
    let items = seq_existing(value, path)?;
    let verb = if after { "INSERT_AFTER" } else { "INSERT_BEFORE" };
    match items.iter().position(|x| x == anchor) {
        Some(i) => {
            let at = if after { i + 1 } else { i };
            items.insert(at, item.clone());
            Ok(ActionOutcome::changed(format!(
                "{} {} {} -> {}",
                verb,
                path,
                item.to_json_string(),
                seq_json(items)
            )))
        }
        None => Ok(ActionOutcome::warning(format!(
            "{} found no {} in '{}'",
            verb,
            anchor.to_json_string(),
            path
        ))),
    }
}

/// REMOVE takes the first match, REMOVE_ALL every match. A missing path
/// or absent value is a warning, never an error.
pub fn remove(
    path: &Path,
    needle: &Value,
    all: bool,
    value: &mut Value,
) -> Result<ActionOutcome, ExecError> {
    let verb = if all { "REMOVE_ALL" } else { "REMOVE" };
    if !path.exists(value) {
        return Ok(ActionOutcome::warning(format!(
            "'{}' does not exist; {} skipped",
            path, verb
        )));
    }
    let items = seq_existing(value, path)?;
    let removed = if all {
        let before = items.len();
        items.retain(|x| x != needle);
        before - items.len()
    } else {
        match items.iter().position(|x| x == needle) {
            Some(i) => {
                items.remove(i);
                1
            }
            None => 0,
        }
    };
    if removed == 0 {
        return Ok(ActionOutcome::warning(format!(
            "{} not found in '{}'",
            needle.to_json_string(),
            path
        )));
    }
    Ok(ActionOutcome::changed(format!(
        "{} {} {} -> {}",
        verb,
        path,
        needle.to_json_string(),
        seq_json(items)
    )))
}

/// REMOVE_AT requires the path and a valid (possibly negative) index.
pub fn remove_at(path: &Path, index: i64, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Err(ExecError::MissingPath {
            path: path.to_string(),
        });
    }
    let items = seq_existing(value, path)?;
    let idx = normalize_index(index, items.len()).ok_or_else(|| ExecError::OutOfBounds {
        path: path.to_string(),
        index,
        len: items.len(),
    })?;
    let gone = items.remove(idx);
    Ok(ActionOutcome::changed(format!(
        "REMOVE_AT {} [{}] removed {}",
        path,
        idx,
        gone.to_json_string()
    )))
}

/// REPLACE swaps the first match, REPLACE_ALL every match.
pub fn replace(
    path: &Path,
    old: &Value,
    new: &Value,
    all: bool,
    value: &mut Value,
) -> Result<ActionOutcome, ExecError> {
    let verb = if all { "REPLACE_ALL" } else { "REPLACE" };
    if !path.exists(value) {
        return Ok(ActionOutcome::warning(format!(
            "'{}' does not exist; {} skipped",
            path, verb
        )));
    }
    let items = seq_existing(value, path)?;
    let mut count = 0usize;
    for item in items.iter_mut() {
        if item == old {
            *item = new.clone();
            count += 1;
            if !all {
                break;
            }
        }
    }
    if count == 0 {
        return Ok(ActionOutcome::warning(format!(
            "{} not found in '{}'",
            old.to_json_string(),
            path
        )));
    }
    if old == new {
        return Ok(ActionOutcome::unchanged());
    }
    Ok(ActionOutcome::changed(format!(
        "{} {} {} WITH {} -> {}",
        verb,
        path,
        old.to_json_string(),
        new.to_json_string(),
        seq_json(items)
    )))
}

/// Stable: the first occurrence of each element survives.
pub fn deduplicate(path: &Path, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Ok(ActionOutcome::unchanged());
    }
    let items = seq_existing(value, path)?;
    let before = items.len();
    let mut kept: Vec<Value> = Vec::with_capacity(before);
    for item in items.drain(..) {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    *items = kept;
    if items.len() == before {
        return Ok(ActionOutcome::unchanged());
    }
    Ok(ActionOutcome::changed(format!(
        "DEDUPLICATE {} ({} -> {} elements)",
        path,
        before,
        items.len()
    )))
}

/// Stable sort with cross-type ordering null < bool < number < string.
pub fn sort(path: &Path, order: SortOrder, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Ok(ActionOutcome::unchanged());
    }
    let items = seq_existing(value, path)?;
    let before = items.clone();
    match order {
        SortOrder::Asc => items.sort_by(|a, b| a.sort_cmp(b)),
        SortOrder::Desc => items.sort_by(|a, b| b.sort_cmp(a)),
    }
    if *items == before {
        return Ok(ActionOutcome::unchanged());
    }
    Ok(ActionOutcome::changed(format!(
        "SORT {} {} -> {}",
        path,
        order.name(),
        seq_json(items)
    )))
}

/// SORT_BY extracts `field` from each element; the elements must be
/// maps, and a missing field sorts as null.
pub fn sort_by(
    path: &Path,
    field: &str,
    order: SortOrder,
    value: &mut Value,
) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Ok(ActionOutcome::unchanged());
    }
    let items = seq_existing(value, path)?;
    for (i, item) in items.iter().enumerate() {
        if !matches!(item, Value::Map(_)) {
            return Err(ExecError::ElementNotObject {
                path: path.to_string(),
                index: i,
            });
        }
    }
    let key = |v: &Value| -> Value {
        v.as_map()
            .and_then(|m| m.get(field))
            .cloned()
            .unwrap_or(Value::Null)
    };
    let before = items.clone();
    match order {
        SortOrder::Asc => items.sort_by(|a, b| key(a).sort_cmp(&key(b))),
        SortOrder::Desc => items.sort_by(|a, b| key(b).sort_cmp(&key(a))),
    }
    if *items == before {
        return Ok(ActionOutcome::unchanged());
    }
    Ok(ActionOutcome::changed(format!(
        "SORT_BY {} BY {} {}",
        path,
        field,
        order.name()
    )))
}

/// MOVE removes first; the destination index lives in the post-removal
/// sequence, so moving to the end is `len - 1`.
pub fn mv(path: &Path, from: i64, to: i64, value: &mut Value) -> Result<ActionOutcome, ExecError> {
    if !path.exists(value) {
        return Err(ExecError::MissingPath {
            path: path.to_string(),
        });
    }
    let items = seq_existing(value, path)?;
    let from_idx = normalize_index(from, items.len()).ok_or_else(|| ExecError::OutOfBounds {
        path: path.to_string(),
        index: from,
        len: items.len(),
    })?;
    let elem = items.remove(from_idx);
    let len_post = items.len() as i64;
    let to_idx = if to < 0 { len_post + to } else { to };
    if to_idx < 0 || to_idx > len_post {
        return Err(ExecError::OutOfBounds {
            path: path.to_string(),
            index: to,
            len: items.len(),
        });
    }
    items.insert(to_idx as usize, elem);
    if from_idx == to_idx as usize {
        return Ok(ActionOutcome::unchanged());
    }
    Ok(ActionOutcome::changed(format!(
        "MOVE {} FROM {} TO {} -> {}",
        path,
        from_idx,
        to_idx,
        seq_json(items)
    )))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crate::error::ExecError;
    use crate::executor::{execute, ActionOutcome};
    use marq_core::{parse_action, Value};

    fn doc(json: &str) -> Value {
        Value::from_json(&serde_json::from_str(json).unwrap())
    }

    fn run(action: &str, value: &mut Value) -> ActionOutcome {
        execute(&parse_action(action).unwrap(), value).unwrap()
    }

    fn run_err(action: &str, value: &mut Value) -> ExecError {
        execute(&parse_action(action).unwrap(), value).unwrap_err()
    }

    #[test]
    fn append_to_existing_array() {
        let mut v = doc(r#"{"tags":["work","project"]}"#);
        let out = run(r#"APPEND tags "urgent""#, &mut v);
        assert!(out.modified);
        assert_eq!(v, doc(r#"{"tags":["work","project","urgent"]}"#));
    }

    #[test]
    fn append_creates_missing_sequence() {
        let mut v = doc("{}");
        run(r#"APPEND tags "first""#, &mut v);
        assert_eq!(v, doc(r#"{"tags":["first"]}"#));
    }

    #[test]
    fn append_to_non_array_is_an_error() {
        let mut v = doc(r#"{"status":"draft"}"#);
        assert!(matches!(
            run_err(r#"APPEND status "x""#, &mut v),
            ExecError::NotAnArray { .. }
        ));
    }

    #[test]
    fn prepend_inserts_at_front() {
        let mut v = doc(r#"{"xs":[2,3]}"#);
        run("PREPEND xs 1", &mut v);
        assert_eq!(v, doc(r#"{"xs":[1,2,3]}"#));
    }

    #[test]
    fn insert_at_positions() {
        let mut v = doc(r#"{"xs":["a","c"]}"#);
        run(r#"INSERT_AT xs "b" AT 1"#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["a","b","c"]}"#));
        // index == len appends
        run(r#"INSERT_AT xs "d" AT 3"#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["a","b","c","d"]}"#));
        // negative counts from the end
        run(r#"INSERT_AT xs "x" AT -1"#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["a","b","c","x","d"]}"#));
        assert!(matches!(
            run_err(r#"INSERT_AT xs "y" AT 99"#, &mut v),
            ExecError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn insert_at_zero_creates_sequence() {
        let mut v = doc("{}");
        run(r#"INSERT_AT xs "a" AT 0"#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["a"]}"#));
        let mut v = doc("{}");
        assert!(matches!(
            run_err(r#"INSERT_AT xs "a" AT 1"#, &mut v),
            ExecError::MissingPath { .. }
        ));
    }

    #[test]
    fn insert_after_and_before_anchor() {
        let mut v = doc(r#"{"xs":["a","c"]}"#);
        run(r#"INSERT_AFTER xs "b" AFTER "a""#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["a","b","c"]}"#));
        run(r#"INSERT_BEFORE xs "z" BEFORE "a""#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["z","a","b","c"]}"#));
        let out = run(r#"INSERT_AFTER xs "q" AFTER "missing""#, &mut v);
        assert!(!out.modified);
        assert!(out.warning.is_some());
    }

    #[test]
    fn remove_first_match_only() {
        let mut v = doc(r#"{"xs":[1,2,1]}"#);
        run("REMOVE xs 1", &mut v);
        assert_eq!(v, doc(r#"{"xs":[2,1]}"#));
    }

    #[test]
    fn remove_all_matches() {
        let mut v = doc(r#"{"xs":[1,2,1,3,1]}"#);
        run("REMOVE_ALL xs 1", &mut v);
        assert_eq!(v, doc(r#"{"xs":[2,3]}"#));
    }

    #[test]
    fn remove_missing_value_is_warning() {
        let mut v = doc(r#"{"tags":["a"]}"#);
        let out = run(r#"REMOVE tags "z""#, &mut v);
        assert!(!out.modified);
        assert!(out.warning.is_some());
        assert_eq!(v, doc(r#"{"tags":["a"]}"#));
        // missing path too
        let out = run(r#"REMOVE gone "z""#, &mut v);
        assert!(out.warning.is_some());
    }

    #[test]
    fn remove_at_bounds() {
        let mut v = doc(r#"{"xs":[1,2,3]}"#);
        run("REMOVE_AT xs -1", &mut v);
        assert_eq!(v, doc(r#"{"xs":[1,2]}"#));
        assert!(matches!(
            run_err("REMOVE_AT xs 5", &mut v),
            ExecError::OutOfBounds { .. }
        ));
        let mut empty = doc("{}");
        assert!(matches!(
            run_err("REMOVE_AT gone 0", &mut empty),
            ExecError::MissingPath { .. }
        ));
    }

    #[test]
    fn replace_first_and_all() {
        let mut v = doc(r#"{"xs":["a","b","a"]}"#);
        run(r#"REPLACE xs "a" WITH "x""#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["x","b","a"]}"#));
        let mut v = doc(r#"{"xs":["a","b","a"]}"#);
        run(r#"REPLACE_ALL xs "a" WITH "x""#, &mut v);
        assert_eq!(v, doc(r#"{"xs":["x","b","x"]}"#));
        let out = run(r#"REPLACE xs "nope" WITH "y""#, &mut v);
        assert!(out.warning.is_some());
    }

    #[test]
    fn deduplicate_is_stable_and_idempotent() {
        let mut v = doc(r#"{"xs":[3,1,3,2,1]}"#);
        let out = run("DEDUPLICATE xs", &mut v);
        assert!(out.modified);
        assert_eq!(v, doc(r#"{"xs":[3,1,2]}"#));
        let out = run("DEDUPLICATE xs", &mut v);
        assert!(!out.modified);
        assert_eq!(v, doc(r#"{"xs":[3,1,2]}"#));
    }

    #[test]
    fn deduplicate_missing_path_is_noop() {
        let mut v = doc("{}");
        let out = run("DEDUPLICATE gone", &mut v);
        assert!(!out.modified);
        assert!(out.warning.is_none());
    }

    #[test]
    fn sort_asc_desc_and_mixed_types() {
        let mut v = doc(r#"{"xs":[2,1,3]}"#);
        run("SORT xs", &mut v);
        assert_eq!(v, doc(r#"{"xs":[1,2,3]}"#));
        run("SORT xs DESC", &mut v);
        assert_eq!(v, doc(r#"{"xs":[3,2,1]}"#));

        let mut v = doc(r#"{"xs":["b",2,true,null,1.5,"a"]}"#);
        run("SORT xs", &mut v);
        assert_eq!(v, doc(r#"{"xs":[null,true,1.5,2,"a","b"]}"#));
    }

    #[test]
    fn sort_missing_is_noop_non_array_is_error() {
        let mut v = doc(r#"{"s":"x"}"#);
        let out = run("SORT gone", &mut v);
        assert!(!out.modified);
        assert!(matches!(run_err("SORT s", &mut v), ExecError::NotAnArray { .. }));
    }

    #[test]
    fn sort_by_field_missing_field_sorts_as_null() {
        let mut v = doc(r#"{"ts":[{"p":2},{"n":"x"},{"p":1}]}"#);
        run("SORT_BY ts BY p", &mut v);
        assert_eq!(v, doc(r#"{"ts":[{"n":"x"},{"p":1},{"p":2}]}"#));
        let mut v = doc(r#"{"ts":[{"p":1},5]}"#);
        assert!(matches!(
            run_err("SORT_BY ts BY p", &mut v),
            ExecError::ElementNotObject { index: 1, .. }
        ));
    }

    #[test]
    fn move_is_remove_then_insert() {
        let mut v = doc(r#"{"xs":["a","b","c","d"]}"#);
        run("MOVE xs FROM 0 TO 2", &mut v);
        assert_eq!(v, doc(r#"{"xs":["b","c","a","d"]}"#));
        // move to end: post-removal len - 1
        let mut v = doc(r#"{"xs":["a","b","c"]}"#);
        run("MOVE xs FROM 0 TO 2", &mut v);
        assert_eq!(v, doc(r#"{"xs":["b","c","a"]}"#));
        // negative indices normalize
        let mut v = doc(r#"{"xs":["a","b","c"]}"#);
        run("MOVE xs FROM -1 TO 0", &mut v);
        assert_eq!(v, doc(r#"{"xs":["c","a","b"]}"#));
        let mut v = doc(r#"{"xs":["a"]}"#);
        assert!(matches!(
            run_err("MOVE xs FROM 5 TO 0", &mut v),
            ExecError::OutOfBounds { .. }
        ));
    }
}
