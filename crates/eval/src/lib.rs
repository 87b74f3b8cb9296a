//! marq-eval: the rule runtime for bulk front-matter mutation.
//!
//! Consumes the language types from `marq-core` and provides condition
//! evaluation, action execution, template expansion, the front-matter
//! codec and the per-file rule engine.
//!
//! # Public API
//!
//! The five entry points, re-exported at the crate root:
//!
//! - [`parse_condition()`] / [`parse_action()`] -- from `marq-core`
//! - [`evaluate()`] -- condition against a value
//! - [`execute()`] -- action against a mutable value
//! - [`run_rule()`] -- the full per-file pipeline, returning a
//!   [`FileResult`]
//!
//! Plus the codec ([`frontmatter::split`] / [`frontmatter::join`]), the
//! note-level convenience [`run_rule_on_note()`], and the persisted
//! rule-store loader in [`store`].

pub mod condition;
pub mod engine;
pub mod error;
pub mod executor;
pub mod frontmatter;
pub mod pattern;
pub mod store;
pub mod template;

// ── Convenience re-exports: key types ────────────────────────────────

pub use engine::{FileResult, FileStatus, Rule, RuleOptions};
pub use error::{CodecError, EvalError, ExecError};
pub use executor::ActionOutcome;
pub use template::FileContext;

pub use marq_core::{
    parse_action, parse_action_with, parse_condition, parse_condition_with, Action, Condition,
    Limits, ParseError, Value,
};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use condition::{evaluate, evaluate_with};
pub use engine::{run_rule, run_rule_on_note, run_rule_with, run_rules, validate_rule};
pub use executor::{execute, execute_with};
