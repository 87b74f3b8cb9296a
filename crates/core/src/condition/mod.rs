//! The condition DSL: predicates over a front-matter value.
//!
//! `status = "draft" AND tags !empty` style expressions. Precedence,
//! lowest to highest: `OR` < `AND` < `NOT` < atom. An atom is a
//! parenthesized expression, a quantifier (`ANY p WHERE …`,
//! `ALL p WHERE …`) or a single predicate on a path.

pub mod lexer;
pub mod parser;

use std::fmt;

use crate::error::ParseError;
use crate::limits::Limits;
use crate::path::Path;
use crate::value::Value;

/// Comparison operators usable between a path and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    /// `~` -- regex match
    Matches,
}

/// Kinds checkable with `:type` / `!:type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl TypeKind {
    pub fn parse(word: &str) -> Option<TypeKind> {
        match word {
            "string" => Some(TypeKind::String),
            "number" => Some(TypeKind::Number),
            "boolean" => Some(TypeKind::Boolean),
            "array" => Some(TypeKind::Array),
            "object" => Some(TypeKind::Object),
            "null" => Some(TypeKind::Null),
            _ => None,
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum CondLiteral {
    Scalar(Value),
    Regex { pattern: String, flags: String },
}

/// `ANY` is existential, `ALL` universal. Both are false over a missing,
/// non-array or empty target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    Any,
    All,
}

/// Condition AST. Paths are resolved against the evaluation scope --
/// the document for a top-level condition, the bound element inside a
/// quantifier body.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison {
        left: Path,
        op: CompareOp,
        right: CondLiteral,
    },
    Existence {
        path: Path,
        negated: bool,
    },
    TypeCheck {
        path: Path,
        kind: TypeKind,
        negated: bool,
    },
    EmptyCheck {
        path: Path,
        negated: bool,
    },
    Has {
        path: Path,
        value: Value,
        negated: bool,
    },
    Quantifier {
        kind: QuantifierKind,
        array: Path,
        body: Box<Condition>,
    },
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Matches => "~",
        }
    }
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::String => "string",
            TypeKind::Number => "number",
            TypeKind::Boolean => "boolean",
            TypeKind::Array => "array",
            TypeKind::Object => "object",
            TypeKind::Null => "null",
        }
    }
}

impl fmt::Display for CondLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondLiteral::Scalar(v) => write!(f, "{}", crate::literal::render(v)),
            CondLiteral::Regex { pattern, flags } => {
                write!(f, "/{}/{}", pattern.replace('/', "\\/"), flags)
            }
        }
    }
}

/// Canonical source form; `parse(cond.to_string())` reproduces the AST.
/// Compound children are parenthesized so quantifier bodies (which are
/// greedy to the right) cannot swallow trailing operators on re-parse.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn child(c: &Condition, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match c {
                Condition::And(..)
                | Condition::Or(..)
                | Condition::Not(_)
                | Condition::Quantifier { .. } => write!(f, "({})", c),
                _ => write!(f, "{}", c),
            }
        }
        match self {
            Condition::Comparison { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Condition::Existence { path, negated } => {
                write!(f, "{} {}exists", path, if *negated { "!" } else { "" })
            }
            Condition::TypeCheck {
                path,
                kind,
                negated,
            } => write!(f, "{} {}:{}", path, if *negated { "!" } else { "" }, kind.name()),
            Condition::EmptyCheck { path, negated } => {
                write!(f, "{} {}empty", path, if *negated { "!" } else { "" })
            }
            Condition::Has {
                path,
                value,
                negated,
            } => write!(
                f,
                "{} {}has {}",
                path,
                if *negated { "!" } else { "" },
                crate::literal::render(value)
            ),
            Condition::Quantifier { kind, array, body } => {
                let word = match kind {
                    QuantifierKind::Any => "ANY",
                    QuantifierKind::All => "ALL",
                };
                write!(f, "{} {} WHERE {}", word, array, body)
            }
            Condition::Not(inner) => {
                write!(f, "NOT ")?;
                child(inner, f)
            }
            Condition::And(l, r) => {
                child(l, f)?;
                write!(f, " AND ")?;
                child(r, f)
            }
            Condition::Or(l, r) => {
                child(l, f)?;
                write!(f, " OR ")?;
                child(r, f)
            }
        }
    }
}

/// Parse a condition with default limits.
pub fn parse(text: &str) -> Result<Condition, ParseError> {
    parse_with(text, &Limits::default())
}

/// Parse a condition, enforcing the given path limits.
pub fn parse_with(text: &str, limits: &Limits) -> Result<Condition, ParseError> {
    let tokens = lexer::lex(text)?;
    parser::parse(&tokens, limits)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_the_parser() {
        let samples = [
            r#"status = "draft""#,
            r#"a != null"#,
            r#"n >= -2.5"#,
            r#"title ~ /^a\/b/i"#,
            r#"a exists"#,
            r#"a !exists"#,
            r#"a empty"#,
            r#"a !empty"#,
            r#"a :string"#,
            r#"a !:object"#,
            r#"tags has "x""#,
            r#"tags !has 3"#,
            r#"a = 1 AND b = 2 OR NOT c = 3"#,
            r#"ANY tasks WHERE done = false"#,
            r#"ALL projects WHERE ANY tasks WHERE s = "p""#,
            r#"(a = 1 OR b = 2) AND c = 3"#,
            r#"items[-1].name.length > 4"#,
        ];
        for text in samples {
            let parsed = parse(text).unwrap();
            let printed = parsed.to_string();
            let reparsed = parse(&printed)
                .unwrap_or_else(|e| panic!("re-parse of '{}' failed: {}", printed, e));
            assert_eq!(parsed, reparsed, "round trip changed '{}' -> '{}'", text, printed);
        }
    }

    #[test]
    fn display_quotes_strings_that_look_like_keywords() {
        let cond = parse(r#"a = "TRUE""#).unwrap();
        assert_eq!(cond.to_string(), r#"a = "TRUE""#);
        assert_eq!(parse(&cond.to_string()).unwrap(), cond);
    }
}
