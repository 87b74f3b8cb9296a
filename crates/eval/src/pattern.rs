//! Regex guard rails.
//!
//! The `regex` crate gives linear-time matching, but the guard rails are
//! kept anyway: a length cap, a deny-list of pathological shapes, and a
//! wall-clock check after each match call. Patterns that trip a guard
//! never reach the engine.

use std::time::{Duration, Instant};

use marq_core::Limits;
use regex::{Regex, RegexBuilder};

use crate::error::EvalError;

/// Literal shapes rejected outright: stacked quantifiers and repeated
/// dot-star pairs.
const FORBIDDEN_SHAPES: [&str; 5] = ["+*", "*+", "++", "**", ".*.*"];

/// Validate a pattern against the guard rails without compiling it.
pub fn check_pattern(pattern: &str, limits: &Limits) -> Result<(), EvalError> {
    let length = pattern.chars().count();
    if length > limits.max_regex_length {
        return Err(EvalError::PatternTooLong {
            length,
            max: limits.max_regex_length,
        });
    }
    for shape in FORBIDDEN_SHAPES {
        if pattern.contains(shape) {
            return Err(EvalError::UnsafePattern {
                pattern: pattern.to_string(),
                reason: format!("contains '{}'", shape),
            });
        }
    }
    if has_open_ended_repetition(pattern) {
        return Err(EvalError::UnsafePattern {
            pattern: pattern.to_string(),
            reason: "contains an open-ended repetition '{n,}'".to_string(),
        });
    }
    Ok(())
}

/// `{n,}` -- a counted repetition with no upper bound.
fn has_open_ended_repetition(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut pos = 0usize;
    while pos < chars.len() {
        if chars[pos] == '{' {
            let mut j = pos + 1;
            let mut digits = 0usize;
            while j < chars.len() && chars[j].is_ascii_digit() {
                digits += 1;
                j += 1;
            }
            if digits > 0 && j + 1 < chars.len() && chars[j] == ',' && chars[j + 1] == '}' {
                return true;
            }
        }
        pos += 1;
    }
    false
}

/// Guard, then compile. Flags follow the familiar `/re/flags` set:
/// `i` case-insensitive, `m` multi-line, `s` dot-matches-newline;
/// `g` and `u` are accepted and ignored.
pub fn compile(pattern: &str, flags: &str, limits: &Limits) -> Result<Regex, EvalError> {
    check_pattern(pattern, limits)?;
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'g' | 'u' => {}
            other => {
                return Err(EvalError::InvalidRegex {
                    message: format!("unknown flag '{}'", other),
                })
            }
        }
    }
    builder.build().map_err(|e| EvalError::InvalidRegex {
        message: e.to_string(),
    })
}

/// Run one match under the wall-clock budget.
pub fn is_match_budgeted(re: &Regex, text: &str, limits: &Limits) -> Result<bool, EvalError> {
    let budget = Duration::from_millis(limits.regex_timeout_ms);
    let started = Instant::now();
    let hit = re.is_match(text);
    if started.elapsed() > budget {
        return Err(EvalError::RegexTimeout {
            budget_ms: limits.regex_timeout_ms,
        });
    }
    Ok(hit)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> Limits {
        Limits::default()
    }

    #[test]
    fn length_cap() {
        let long = "a".repeat(201);
        assert!(matches!(
            check_pattern(&long, &limits()),
            Err(EvalError::PatternTooLong { .. })
        ));
        assert!(check_pattern(&"a".repeat(200), &limits()).is_ok());
    }

    #[test]
    fn forbidden_shapes() {
        assert!(check_pattern("a+*", &limits()).is_err());
        assert!(check_pattern("a*+", &limits()).is_err());
        assert!(check_pattern("a++", &limits()).is_err());
        assert!(check_pattern("a**", &limits()).is_err());
        assert!(check_pattern(".*.*", &limits()).is_err());
        assert!(check_pattern("a{3,}", &limits()).is_err());
        assert!(check_pattern("a{3,5}", &limits()).is_ok());
        assert!(check_pattern("^draft-[0-9]+$", &limits()).is_ok());
    }

    #[test]
    fn flags_map_to_builder() {
        let re = compile("abc", "i", &limits()).unwrap();
        assert!(re.is_match("ABC"));
        let re = compile("^b$", "m", &limits()).unwrap();
        assert!(re.is_match("a\nb"));
        assert!(compile("a", "q", &limits()).is_err());
        // g and u are tolerated
        assert!(compile("a", "gu", &limits()).is_ok());
    }

    #[test]
    fn invalid_syntax_is_an_error() {
        assert!(matches!(
            compile("(unclosed", "", &limits()),
            Err(EvalError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn budgeted_match_passes_normally() {
        let re = compile("needle", "", &limits()).unwrap();
        assert!(is_match_budgeted(&re, "hay needle hay", &limits()).unwrap());
        assert!(!is_match_budgeted(&re, "just hay", &limits()).unwrap());
    }
}
