//! marq-core: the rule language for bulk front-matter mutation.
//!
//! Provides the value model, the path resolver, and the lexer/parser
//! pairs for the condition and action DSLs. Evaluation and execution
//! live in `marq-eval`; this crate never touches the clock, the
//! filesystem or a regex engine.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Value`] -- dynamic tagged value, insertion-ordered maps
//! - [`Path`] -- dotted/bracketed paths with read/write/delete ops
//! - [`Condition`] / [`parse_condition()`] -- predicate DSL
//! - [`Action`] / [`parse_action()`] -- action DSL
//! - [`Limits`] -- configurable safety floors
//! - [`ParseError`] -- lexer/parser error type

pub mod action;
pub mod condition;
pub mod error;
pub mod limits;
pub mod literal;
pub mod path;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use action::{Action, MoveTarget, SortOrder};
pub use condition::{CompareOp, CondLiteral, Condition, QuantifierKind, TypeKind};
pub use error::ParseError;
pub use limits::Limits;
pub use path::{Path, Segment};
pub use value::Value;

// ── Convenience re-exports: parser entry points ──────────────────────

pub use action::parse as parse_action;
pub use action::parse_with as parse_action_with;
pub use condition::parse as parse_condition;
pub use condition::parse_with as parse_condition_with;
