//! Dynamic value model for front-matter documents.
//!
//! A `Value` is the in-memory form of one note's front matter. Maps keep
//! insertion order (`IndexMap`) so an untouched document round-trips
//! through the YAML codec without reordering keys.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;

/// One front-matter value. `Int` and `Float` are distinct variants but
/// compare numerically equal when they represent the same number.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Seq(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Human-readable type name for error messages and type checks.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Seq(_) => "array",
            Value::Map(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric view of `Int` and `Float`, `None` for everything else.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Size of a container or string (chars, not bytes). `None` for
    /// scalars that have no length.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Seq(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            Value::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Emptiness in the sense of the `empty` predicate: only sequences,
    /// strings and maps can be empty. Null and scalars are not.
    pub fn is_empty_container(&self) -> bool {
        self.length() == Some(0)
    }

    /// Rank used for cross-type ordering in SORT:
    /// null < bool < number < string < array < object.
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
            Value::Seq(_) => 4,
            Value::Map(_) => 5,
        }
    }

    /// Total ordering for sorting. Within a type: normal ordering;
    /// numbers cross-compare by value; containers compare equal so a
    /// stable sort leaves their relative order alone.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        let (ra, rb) = (self.type_rank(), other.type_rank());
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => {
                if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                } else {
                    Ordering::Equal
                }
            }
        }
    }

    /// Convert from a parsed JSON value. JSON numbers become `Int` when
    /// they fit an i64 exactly, `Float` otherwise.
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Seq(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => {
                let mut map = IndexMap::new();
                for (k, v) in entries {
                    map.insert(k.clone(), Value::from_json(v));
                }
                Value::Map(map)
            }
        }
    }

    /// Convert to JSON. Non-finite floats degrade to null, matching what
    /// serde_json would emit.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Seq(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in entries {
                    obj.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(obj)
            }
        }
    }

    /// Compact JSON rendering, used by change-log lines. Strings come out
    /// quoted, unlike `Display`.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// Equality with numeric coercion between `Int` and `Float` only.
/// String-to-number equality is intentionally absent.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            _ => false,
        }
    }
}

/// Canonical scalar text, used by the template resolver: strings render
/// bare, containers render as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Seq(_) | Value::Map(_) => write!(f, "{}", self.to_json_string()),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_float_numeric_equality() {
        assert_eq!(Value::Int(3), Value::Float(3.0));
        assert_eq!(Value::Float(3.0), Value::Int(3));
        assert_ne!(Value::Int(3), Value::Float(3.5));
    }

    #[test]
    fn string_number_never_equal() {
        assert_ne!(Value::String("3".to_string()), Value::Int(3));
    }

    #[test]
    fn map_equality_ignores_key_order() {
        let mut a = IndexMap::new();
        a.insert("x".to_string(), Value::Int(1));
        a.insert("y".to_string(), Value::Int(2));
        let mut b = IndexMap::new();
        b.insert("y".to_string(), Value::Int(2));
        b.insert("x".to_string(), Value::Int(1));
        assert_eq!(Value::Map(a), Value::Map(b));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Int(1).type_name(), "number");
        assert_eq!(Value::Float(1.0).type_name(), "number");
        assert_eq!(Value::Seq(vec![]).type_name(), "array");
        assert_eq!(Value::Map(IndexMap::new()).type_name(), "object");
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        assert_eq!(Value::String("héllo".to_string()).length(), Some(5));
    }

    #[test]
    fn sort_cmp_cross_type_rank() {
        assert_eq!(
            Value::Null.sort_cmp(&Value::Bool(false)),
            Ordering::Less
        );
        assert_eq!(
            Value::Bool(true).sort_cmp(&Value::Int(0)),
            Ordering::Less
        );
        assert_eq!(
            Value::Int(9).sort_cmp(&Value::String("a".to_string())),
            Ordering::Less
        );
    }

    #[test]
    fn sort_cmp_numbers_cross_compare() {
        assert_eq!(Value::Int(2).sort_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.5).sort_cmp(&Value::Int(3)), Ordering::Greater);
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b":1,"a":[true,null],"c":{"z":"s"}}"#).unwrap();
        let v = Value::from_json(&json);
        let keys: Vec<_> = v.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(v.to_json(), json);
    }

    #[test]
    fn display_is_canonical_scalar_text() {
        assert_eq!(Value::String("plain".to_string()).to_string(), "plain");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(
            Value::Seq(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1,2]"
        );
    }
}
