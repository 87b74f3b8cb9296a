//! Literal value parsing: quoted strings, numbers, booleans, null, and
//! JSON arrays/objects. Ingested JSON is scanned for keys that would be
//! dangerous to downstream JSON consumers (`__proto__`, `constructor`,
//! `prototype`) and rejected.

use crate::error::ParseError;
use crate::value::Value;

/// Keys rejected anywhere inside an ingested JSON literal.
pub const FORBIDDEN_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Parse a literal token into a value. Unquoted text that is not a
/// number, boolean or null is a plain string.
pub fn parse_literal(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    let first = match trimmed.chars().next() {
        Some(c) => c,
        None => return Ok(Value::String(String::new())),
    };
    if first == '"' || first == '\'' {
        return parse_quoted(trimmed);
    }
    if first == '{' || first == '[' {
        return parse_json(trimmed);
    }
    if let Some(v) = parse_number(trimmed) {
        return Ok(v);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        "null" => Ok(Value::Null),
        _ => Ok(Value::String(trimmed.to_string())),
    }
}

/// Parse a JSON array or object literal, then guard its keys.
pub fn parse_json(text: &str) -> Result<Value, ParseError> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| ParseError::new(0, format!("invalid JSON literal: {}", e)))?;
    let value = Value::from_json(&json);
    check_unsafe_keys(&value)?;
    Ok(value)
}

/// Reject any map key equal to a forbidden name, at any depth.
pub fn check_unsafe_keys(value: &Value) -> Result<(), ParseError> {
    match value {
        Value::Map(entries) => {
            for (key, child) in entries {
                if FORBIDDEN_KEYS.contains(&key.as_str()) {
                    return Err(ParseError::new(
                        0,
                        format!("unsafe properties: key '{}' is not allowed", key),
                    ));
                }
                check_unsafe_keys(child)?;
            }
            Ok(())
        }
        Value::Seq(items) => {
            for item in items {
                check_unsafe_keys(item)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Render a value as literal source text that parses back to the same
/// value: strings come out double-quoted with escapes, floats always
/// carry a decimal point, containers render as JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                format!("{:.1}", f)
            } else {
                f.to_string()
            }
        }
        Value::String(s) => quote(s),
        Value::Seq(_) | Value::Map(_) => value.to_json_string(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// `-?\d+(\.\d+)?` -- anything else is not a number literal.
fn parse_number(text: &str) -> Option<Value> {
    let body = text.strip_prefix('-').unwrap_or(text);
    if body.is_empty() {
        return None;
    }
    let mut parts = body.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();
    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match frac_part {
        None => text.parse::<i64>().ok().map(Value::Int),
        Some(frac) => {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            text.parse::<f64>().ok().map(Value::Float)
        }
    }
}

fn parse_quoted(text: &str) -> Result<Value, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let quote = chars[0];
    let mut out = String::new();
    let mut pos = 1usize;
    loop {
        if pos >= chars.len() {
            return Err(ParseError::new(0, "unterminated string literal"));
        }
        let c = chars[pos];
        if c == quote {
            pos += 1;
            break;
        }
        if c == '\\' {
            pos += 1;
            if pos >= chars.len() {
                return Err(ParseError::new(pos, "unterminated escape in string"));
            }
            match chars[pos] {
                '"' => out.push('"'),
                '\'' => out.push('\''),
                '\\' => out.push('\\'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
            pos += 1;
            continue;
        }
        out.push(c);
        pos += 1;
    }
    if pos != chars.len() {
        return Err(ParseError::new(pos, "trailing characters after string literal"));
    }
    Ok(Value::String(out))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_strings_with_escapes() {
        assert_eq!(
            parse_literal(r#""a\"b\n""#).unwrap(),
            Value::String("a\"b\n".to_string())
        );
        assert_eq!(
            parse_literal(r#"'it\'s'"#).unwrap(),
            Value::String("it's".to_string())
        );
        assert!(parse_literal(r#""open"#).is_err());
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_literal("42").unwrap(), Value::Int(42));
        assert_eq!(parse_literal("-7").unwrap(), Value::Int(-7));
        assert_eq!(parse_literal("3.5").unwrap(), Value::Float(3.5));
        // not numbers per the grammar: stay strings
        assert_eq!(parse_literal("1.").unwrap(), Value::String("1.".to_string()));
        assert_eq!(
            parse_literal("1e3").unwrap(),
            Value::String("1e3".to_string())
        );
    }

    #[test]
    fn keywords_case_insensitive() {
        assert_eq!(parse_literal("TRUE").unwrap(), Value::Bool(true));
        assert_eq!(parse_literal("False").unwrap(), Value::Bool(false));
        assert_eq!(parse_literal("NULL").unwrap(), Value::Null);
    }

    #[test]
    fn bare_text_is_string() {
        assert_eq!(
            parse_literal("draft").unwrap(),
            Value::String("draft".to_string())
        );
    }

    #[test]
    fn json_array_and_object() {
        let v = parse_literal(r#"[1,"a",{"k":true}]"#).unwrap();
        assert_eq!(v.as_seq().unwrap().len(), 3);
        let v = parse_literal(r#"{"a":1}"#).unwrap();
        assert_eq!(v.as_map().unwrap().get("a"), Some(&Value::Int(1)));
        assert!(parse_literal("{broken").is_err());
    }

    #[test]
    fn render_round_trips() {
        let cases = [
            Value::Null,
            Value::Bool(true),
            Value::Int(-7),
            Value::Float(3.0),
            Value::Float(-2.5),
            Value::String("plain".to_string()),
            Value::String("quo\"te\nline".to_string()),
            Value::String("TRUE".to_string()),
        ];
        for value in cases {
            let text = render(&value);
            let reparsed = parse_literal(&text).unwrap();
            assert_eq!(reparsed, value, "render/parse mismatch for {}", text);
            // Float stays Float, Int stays Int
            assert_eq!(
                std::mem::discriminant(&reparsed),
                std::mem::discriminant(&value)
            );
        }
    }

    #[test]
    fn forbidden_keys_rejected_at_any_depth() {
        for bad in [
            r#"{"__proto__":{}}"#,
            r#"{"a":{"constructor":1}}"#,
            r#"[{"deep":[{"prototype":null}]}]"#,
        ] {
            let err = parse_literal(bad).unwrap_err();
            assert!(err.message.contains("unsafe properties"), "{}", err.message);
        }
        // similar but safe names pass
        assert!(parse_literal(r#"{"proto":1,"construct":2}"#).is_ok());
    }
}
