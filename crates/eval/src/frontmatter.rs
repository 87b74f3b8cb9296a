//! Front-matter codec: split a note into `(front matter, body)` and join
//! them back. Body bytes are preserved exactly; unchanged mapping keys
//! keep their position through a round trip (the YAML mapping type is
//! insertion-ordered). The permissive core schema accepts the built-in
//! scalars and stringifies scalar keys; language tags are rejected.

use indexmap::IndexMap;
use marq_core::Value;

use crate::error::CodecError;

/// Split a note into its front matter and body. A note without an
/// opening fence has an empty map and the whole text as body.
pub fn split(text: &str) -> Result<(Value, String), CodecError> {
    let after_open = if let Some(rest) = text.strip_prefix("---\n") {
        rest
    } else if let Some(rest) = text.strip_prefix("---\r\n") {
        rest
    } else {
        return Ok((Value::Map(IndexMap::new()), text.to_string()));
    };

    let Some((yaml, body)) = split_at_closing_fence(after_open) else {
        // no closing fence: not front matter at all
        return Ok((Value::Map(IndexMap::new()), text.to_string()));
    };

    let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| CodecError::Yaml {
        message: e.to_string(),
    })?;
    let map = match parsed {
        serde_yaml::Value::Null => Value::Map(IndexMap::new()),
        serde_yaml::Value::Mapping(_) => yaml_to_value(&parsed)?,
        other => {
            return Err(CodecError::NotAMapping {
                got: yaml_kind(&other).to_string(),
            })
        }
    };
    Ok((map, body.to_string()))
}

/// Join front matter and body back into note text. An empty map emits no
/// fences: the body comes back unchanged.
pub fn join(map: &Value, body: &str) -> Result<String, CodecError> {
    let entries = match map {
        Value::Map(entries) => entries,
        other => {
            return Err(CodecError::NotAMapping {
                got: other.type_name().to_string(),
            })
        }
    };
    if entries.is_empty() {
        return Ok(body.to_string());
    }
    let yaml = serde_yaml::to_string(&value_to_yaml(map)).map_err(|e| CodecError::Yaml {
        message: e.to_string(),
    })?;
    Ok(format!("---\n{}---\n{}", yaml, body))
}

/// Find the first line that is exactly `---` (the closing fence).
/// Returns the YAML block and everything after the fence line.
fn split_at_closing_fence(text: &str) -> Option<(&str, &str)> {
    let mut line_start = 0usize;
    loop {
        let line_end = match text[line_start..].find('\n') {
            Some(off) => line_start + off,
            None => text.len(),
        };
        let line = text[line_start..line_end].trim_end_matches('\r');
        if line == "---" {
            let body_start = if line_end < text.len() {
                line_end + 1
            } else {
                text.len()
            };
            return Some((&text[..line_start], &text[body_start..]));
        }
        if line_end >= text.len() {
            return None;
        }
        line_start = line_end + 1;
    }
}

fn yaml_kind(v: &serde_yaml::Value) -> &'static str {
    match v {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

fn yaml_to_value(v: &serde_yaml::Value) -> Result<Value, CodecError> {
    match v {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                Ok(Value::Float(n.as_f64().unwrap_or(0.0)))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(items) => {
            let converted: Result<Vec<Value>, CodecError> =
                items.iter().map(yaml_to_value).collect();
            Ok(Value::Seq(converted?))
        }
        serde_yaml::Value::Mapping(entries) => {
            let mut map = IndexMap::with_capacity(entries.len());
            for (k, v) in entries {
                map.insert(scalar_key(k)?, yaml_to_value(v)?);
            }
            Ok(Value::Map(map))
        }
        serde_yaml::Value::Tagged(tagged) => Err(CodecError::TaggedValue {
            tag: tagged.tag.to_string(),
        }),
    }
}

/// Scalar mapping keys are stringified; anything else is rejected.
fn scalar_key(k: &serde_yaml::Value) -> Result<String, CodecError> {
    match k {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        _ => Err(CodecError::NonScalarKey),
    }
}

fn value_to_yaml(v: &Value) -> serde_yaml::Value {
    match v {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(i) => serde_yaml::Value::Number((*i).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Seq(items) => {
            serde_yaml::Value::Sequence(items.iter().map(value_to_yaml).collect())
        }
        Value::Map(entries) => {
            let mut mapping = serde_yaml::Mapping::with_capacity(entries.len());
            for (k, v) in entries {
                mapping.insert(
                    serde_yaml::Value::String(k.clone()),
                    value_to_yaml(v),
                );
            }
            serde_yaml::Value::Mapping(mapping)
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
    fn split_basic_note() {
        let text = "---\ntitle: Hello\ntags:\n  - a\n  - b\n---\nBody line.\n";
        let (fm, body) = split(text).unwrap();
        assert_eq!(body, "Body line.\n");
        let map = fm.as_map().unwrap();
        assert_eq!(map["title"], Value::String("Hello".to_string()));
        assert_eq!(
            map["tags"],
            Value::Seq(vec![
                Value::String("a".to_string()),
                Value::String("b".to_string())
            ])
        );
    }

    #[test]
    fn split_without_front_matter() {
        let text = "Just a note.\n---\nnot front matter\n";
        let (fm, body) = split(text).unwrap();
        assert!(fm.as_map().unwrap().is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn split_unclosed_fence_is_all_body() {
        let text = "---\ntitle: Hello\nno closing fence\n";
        let (fm, body) = split(text).unwrap();
        assert!(fm.as_map().unwrap().is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn split_preserves_key_order() {
        let text = "---\nzebra: 1\nalpha: 2\nmid: 3\n---\n";
        let (fm, _) = split(text).unwrap();
        let keys: Vec<_> = fm.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zebra", "alpha", "mid"]);
    }

    #[test]
    fn join_preserves_body_bytes() {
        let body = "Line 1\n\n  indented\r\nLine 3";
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Int(1));
        let joined = join(&Value::Map(map), body).unwrap();
        assert!(joined.ends_with(body));
        assert!(joined.starts_with("---\n"));
    }

    #[test]
    fn join_empty_map_emits_no_fences() {
        assert_eq!(
            join(&Value::Map(IndexMap::new()), "body only").unwrap(),
            "body only"
        );
    }

    #[test]
    fn round_trip_is_stable() {
        let mut map = IndexMap::new();
        map.insert("zebra".to_string(), Value::Int(1));
        map.insert("alpha".to_string(), Value::String("two".to_string()));
        map.insert(
            "items".to_string(),
            Value::Seq(vec![Value::Bool(true), Value::Null]),
        );
        let v = Value::Map(map);

        let once = join(&v, "").unwrap();
        let (reparsed, body) = split(&once).unwrap();
        assert_eq!(body, "");
        assert_eq!(reparsed, v);
        let twice = join(&reparsed, "").unwrap();
        assert_eq!(once, twice);

        // key order survives
        let keys: Vec<_> = reparsed.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zebra", "alpha", "items"]);
    }

    #[test]
    fn tags_are_rejected() {
        let text = "---\nx: !!python/object {}\n---\n";
        assert!(split(text).is_err());
    }

    #[test]
    fn scalar_keys_are_stringified() {
        let text = "---\n2024: year\ntrue: yes\n---\n";
        let (fm, _) = split(text).unwrap();
        let map = fm.as_map().unwrap();
        assert!(map.contains_key("2024"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn scalar_front_matter_is_rejected() {
        let text = "---\njust a string\n---\n";
        assert!(matches!(
            split(text),
            Err(CodecError::NotAMapping { .. })
        ));
    }
}
