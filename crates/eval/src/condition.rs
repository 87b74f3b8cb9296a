//! Condition evaluation.
//!
//! Every predicate produces a boolean; missing data never raises.
//! The semantics worth remembering:
//!
//! - `!=` is true for a missing path; every other comparison is false.
//! - equality coerces between Int and Float only, never string↔number.
//! - relational operators need both sides numeric.
//! - `empty` is false for a missing path or null, true for an empty
//!   sequence/string/map.
//! - `has` is containment on sequences; missing or non-sequence is false.
//! - quantifiers are false over missing, non-array or empty targets, and
//!   the element becomes the evaluation scope inside the body.

use marq_core::condition::{CompareOp, CondLiteral, Condition, QuantifierKind, TypeKind};
use marq_core::path::{Path, Segment};
use marq_core::{Limits, Value};

use crate::error::EvalError;
use crate::pattern;

/// Evaluate a condition against a value with default limits.
pub fn evaluate(cond: &Condition, value: &Value) -> Result<bool, EvalError> {
    evaluate_with(cond, value, &Limits::default())
}

/// Evaluate a condition against a value.
pub fn evaluate_with(cond: &Condition, value: &Value, limits: &Limits) -> Result<bool, EvalError> {
    match cond {
        Condition::Comparison { left, op, right } => eval_comparison(left, *op, right, value, limits),

        Condition::Existence { path, negated } => {
            let present = resolve(value, path).is_some();
            Ok(present != *negated)
        }

        Condition::TypeCheck {
            path,
            kind,
            negated,
        } => {
            let matches = match resolve(value, path) {
                None => false,
                Some(v) => type_matches(&v, *kind),
            };
            Ok(matches != *negated)
        }

        Condition::EmptyCheck { path, negated } => {
            let empty = match resolve(value, path) {
                None => false,
                Some(v) => v.is_empty_container(),
            };
            Ok(empty != *negated)
        }

        Condition::Has {
            path,
            value: needle,
            negated,
        } => {
            let contains = match resolve(value, path) {
                Some(Value::Seq(items)) => items.iter().any(|item| item == needle),
                _ => false,
            };
            Ok(contains != *negated)
        }

        Condition::Quantifier { kind, array, body } => {
            let items = match resolve(value, array) {
                Some(Value::Seq(items)) => items,
                _ => return Ok(false),
            };
            if items.is_empty() {
                return Ok(false);
            }
            match kind {
                QuantifierKind::Any => {
                    for item in &items {
                        if evaluate_with(body, item, limits)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                QuantifierKind::All => {
                    for item in &items {
                        if !evaluate_with(body, item, limits)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
            }
        }

        Condition::Not(inner) => Ok(!evaluate_with(inner, value, limits)?),
        Condition::And(l, r) => {
            Ok(evaluate_with(l, value, limits)? && evaluate_with(r, value, limits)?)
        }
        Condition::Or(l, r) => {
            Ok(evaluate_with(l, value, limits)? || evaluate_with(r, value, limits)?)
        }
    }
}

fn eval_comparison(
    left: &Path,
    op: CompareOp,
    right: &CondLiteral,
    value: &Value,
    limits: &Limits,
) -> Result<bool, EvalError> {
    let resolved = resolve(value, left);

    if op == CompareOp::Matches {
        let (pat, flags) = match right {
            CondLiteral::Regex { pattern, flags } => (pattern.as_str(), flags.as_str()),
            CondLiteral::Scalar(Value::String(s)) => (s.as_str(), ""),
            CondLiteral::Scalar(_) => return Ok(false),
        };
        let re = pattern::compile(pat, flags, limits)?;
        return match resolved {
            Some(Value::String(s)) => pattern::is_match_budgeted(&re, &s, limits),
            _ => Ok(false),
        };
    }

    let lit = match right {
        CondLiteral::Scalar(v) => v,
        CondLiteral::Regex { .. } => return Ok(false),
    };

    match op {
        CompareOp::Eq => Ok(resolved.as_ref().map_or(false, |v| v == lit)),
        CompareOp::Neq => Ok(resolved.as_ref().map_or(true, |v| v != lit)),
        CompareOp::Lt | CompareOp::Lte | CompareOp::Gt | CompareOp::Gte => {
            let (a, b) = match (resolved.as_ref().and_then(Value::as_f64), lit.as_f64()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Ok(false),
            };
            Ok(match op {
                CompareOp::Lt => a < b,
                CompareOp::Lte => a <= b,
                CompareOp::Gt => a > b,
                CompareOp::Gte => a >= b,
                _ => unreachable!(),
            })
        }
        CompareOp::Matches => unreachable!(),
    }
}

fn type_matches(v: &Value, kind: TypeKind) -> bool {
    match kind {
        TypeKind::String => matches!(v, Value::String(_)),
        TypeKind::Number => v.is_number(),
        TypeKind::Boolean => matches!(v, Value::Bool(_)),
        TypeKind::Array => matches!(v, Value::Seq(_)),
        TypeKind::Object => matches!(v, Value::Map(_)),
        TypeKind::Null => v.is_null(),
    }
}

/// Resolve a path for reading, with the `length` pseudo-segment: when
/// the path misses and its final segment is the field `length`, the
/// parent's size is produced instead.
fn resolve(value: &Value, path: &Path) -> Option<Value> {
    if let Some(v) = path.resolve(value) {
        return Some(v.clone());
    }
    if let Some((parent, Segment::Field(name))) = path.split_last() {
        if name == "length" {
            let target = if parent.is_empty() {
                Some(value)
            } else {
                parent.resolve(value)
            };
            if let Some(len) = target.and_then(Value::length) {
                return Some(Value::Int(len as i64));
            }
        }
    }
    None
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use marq_core::parse_condition;

    fn doc(json: &str) -> Value {
        Value::from_json(&serde_json::from_str(json).unwrap())
    }

    fn check(cond: &str, json: &str) -> bool {
        evaluate(&parse_condition(cond).unwrap(), &doc(json)).unwrap()
    }

    #[test]
    fn comparison_equality() {
        assert!(check(r#"status = "draft""#, r#"{"status":"draft"}"#));
        assert!(!check(r#"status = "draft""#, r#"{"status":"final"}"#));
        assert!(check("n = 3", r#"{"n":3.0}"#));
        assert!(!check(r#"n = "3""#, r#"{"n":3}"#));
    }

    #[test]
    fn missing_path_truth_table() {
        assert!(check("gone != 1", "{}"));
        assert!(!check("gone = 1", "{}"));
        assert!(!check("gone < 1", "{}"));
        assert!(!check("gone >= 1", "{}"));
    }

    #[test]
    fn relational_needs_numbers() {
        assert!(check("n < 10", r#"{"n":5}"#));
        assert!(check("n <= 5", r#"{"n":5}"#));
        assert!(!check(r#"s < 10"#, r#"{"s":"5"}"#));
        assert!(!check("b > 0", r#"{"b":true}"#));
    }

    #[test]
    fn regex_matching() {
        assert!(check("title ~ /^Draft/", r#"{"title":"Draft: notes"}"#));
        assert!(check("title ~ /^draft/i", r#"{"title":"Draft: notes"}"#));
        assert!(!check("title ~ /^draft/", r#"{"title":"Draft"}"#));
        // missing or non-string left side is false, not an error
        assert!(!check("gone ~ /x/", "{}"));
        assert!(!check("n ~ /1/", r#"{"n":1}"#));
    }

    #[test]
    fn regex_guards_surface_as_errors() {
        let cond = parse_condition("title ~ /a+*/").unwrap();
        assert!(matches!(
            evaluate(&cond, &doc(r#"{"title":"x"}"#)),
            Err(EvalError::UnsafePattern { .. })
        ));
    }

    #[test]
    fn existence_includes_explicit_null() {
        assert!(check("a exists", r#"{"a":null}"#));
        assert!(!check("a !exists", r#"{"a":null}"#));
        assert!(check("b !exists", r#"{"a":null}"#));
    }

    #[test]
    fn empty_truth_table_exhaustive() {
        // missing
        assert!(!check("x empty", "{}"));
        assert!(check("x !empty", "{}"));
        // explicit null
        assert!(!check("x empty", r#"{"x":null}"#));
        assert!(check("x !empty", r#"{"x":null}"#));
        // empty sequence
        assert!(check("x empty", r#"{"x":[]}"#));
        assert!(!check("x !empty", r#"{"x":[]}"#));
        // empty string
        assert!(check("x empty", r#"{"x":""}"#));
        assert!(!check("x !empty", r#"{"x":""}"#));
        // empty map
        assert!(check("x empty", r#"{"x":{}}"#));
        assert!(!check("x !empty", r#"{"x":{}}"#));
        // otherwise
        assert!(!check("x empty", r#"{"x":[1]}"#));
        assert!(check("x !empty", r#"{"x":[1]}"#));
        assert!(!check("x empty", r#"{"x":0}"#));
        assert!(check("x !empty", r#"{"x":0}"#));
    }

    #[test]
    fn type_checks() {
        assert!(check("x :string", r#"{"x":"s"}"#));
        assert!(check("x :number", r#"{"x":1}"#));
        assert!(check("x :number", r#"{"x":1.5}"#));
        assert!(check("x :boolean", r#"{"x":true}"#));
        assert!(check("x :array", r#"{"x":[]}"#));
        assert!(check("x :object", r#"{"x":{}}"#));
        assert!(check("x :null", r#"{"x":null}"#));
        // object excludes arrays
        assert!(!check("x :object", r#"{"x":[]}"#));
        // missing path: positive check false, negated true
        assert!(!check("gone :string", "{}"));
        assert!(check("gone !:string", "{}"));
    }

    #[test]
    fn has_containment() {
        let json = r#"{"tags":["work","project"],"n":5}"#;
        assert!(check(r#"tags has "work""#, json));
        assert!(!check(r#"tags has "play""#, json));
        assert!(check(r#"tags !has "play""#, json));
        // missing or non-sequence: has false, !has true
        assert!(!check(r#"gone has "x""#, json));
        assert!(check(r#"gone !has "x""#, json));
        assert!(!check(r#"n has 5"#, json));
    }

    #[test]
    fn quantifiers() {
        let json = r#"{"tasks":[{"s":"done"},{"s":"pending"}]}"#;
        assert!(check(r#"ANY tasks WHERE s = "pending""#, json));
        assert!(!check(r#"ALL tasks WHERE s = "pending""#, json));
        assert!(check(r#"ALL tasks WHERE s exists"#, json));
        // missing, non-array and empty targets are false for both
        assert!(!check(r#"ANY gone WHERE s = 1"#, json));
        assert!(!check(r#"ALL gone WHERE s = 1"#, json));
        assert!(!check(r#"ANY tasks WHERE s = 1"#, r#"{"tasks":[]}"#));
        assert!(!check(r#"ALL tasks WHERE s = 1"#, r#"{"tasks":[]}"#));
        assert!(!check(r#"ANY tasks WHERE s = 1"#, r#"{"tasks":5}"#));
    }

    #[test]
    fn nested_quantifiers_rebind_scope() {
        let json = r#"{"projects":[
            {"tasks":[{"status":"done"}]},
            {"tasks":[{"status":"pending"}]}
        ]}"#;
        assert!(check(
            r#"ANY projects WHERE ANY tasks WHERE status = "pending""#,
            json
        ));
        assert!(!check(
            r#"ALL projects WHERE ANY tasks WHERE status = "pending""#,
            json
        ));
    }

    #[test]
    fn boolean_operators() {
        let json = r#"{"a":1,"b":2}"#;
        assert!(check("a = 1 AND b = 2", json));
        assert!(!check("a = 1 AND b = 3", json));
        assert!(check("a = 9 OR b = 2", json));
        assert!(check("NOT a = 9", json));
    }

    #[test]
    fn length_pseudo_segment() {
        let json = r#"{"tags":["a","b","c"],"title":"héllo","cfg":{"a":1}}"#;
        assert!(check("tags.length = 3", json));
        assert!(check("title.length = 5", json));
        assert!(check("cfg.length = 1", json));
        assert!(!check("gone.length = 0", json));
        // a real key named length wins over the pseudo-segment
        assert!(check("m.length = 9", r#"{"m":{"length":9,"x":1}}"#));
    }
}
