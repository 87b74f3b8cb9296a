//! Rule orchestration: condition → templates → action → classification.
//!
//! `run_rule` never mutates the value it is given. The action runs on a
//! clone, and on any error the clone is discarded, so the caller always
//! holds `new_value == original_value` when `status == Error`.

use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::debug;

use marq_core::{parse_action_with, parse_condition_with, Limits, ParseError, Value};

use crate::condition::evaluate_with;
use crate::error::CodecError;
use crate::executor::{execute_with, ActionOutcome};
use crate::frontmatter;
use crate::template::{expand_with, FileContext};

/// One stored rule. The engine reads `condition`, `action` and
/// `options`; `scope` belongs to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub name: String,
    /// Empty means unconditional.
    pub condition: String,
    pub action: String,
    pub scope: Option<String>,
    pub options: RuleOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOptions {
    pub backup: bool,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Rule {
            id: id.into(),
            name: name.into(),
            condition: condition.into(),
            action: action.into(),
            scope: None,
            options: RuleOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Success,
    Warning,
    Error,
    Skipped,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Success => "success",
            FileStatus::Warning => "warning",
            FileStatus::Error => "error",
            FileStatus::Skipped => "skipped",
        }
    }
}

/// Outcome of applying one rule to one value.
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    pub status: FileStatus,
    pub modified: bool,
    pub changes: Vec<String>,
    pub original_value: Value,
    pub new_value: Value,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub duration_ms: u64,
}

impl FileResult {
    /// Host-facing JSON record.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status.as_str(),
            "modified": self.modified,
            "changes": self.changes,
            "originalValue": self.original_value.to_json(),
            "newValue": self.new_value.to_json(),
            "error": self.error,
            "warning": self.warning,
            "durationMs": self.duration_ms,
        })
    }
}

/// Apply a rule with default limits.
pub fn run_rule(
    rule: &Rule,
    value: &Value,
    ctx: &FileContext,
    now: DateTime<Local>,
) -> FileResult {
    run_rule_with(rule, value, ctx, now, &Limits::default())
}

/// Apply a rule to a value. The sequence is fixed: evaluate the
/// condition first (a false condition means the action text is never
/// even template-expanded), then expand, parse and execute the action
/// on a clone, then classify.
pub fn run_rule_with(
    rule: &Rule,
    value: &Value,
    ctx: &FileContext,
    now: DateTime<Local>,
    limits: &Limits,
) -> FileResult {
    let started = Instant::now();
    debug!(rule = %rule.id, file = %ctx.path, "applying rule");

    if !rule.condition.trim().is_empty() {
        let cond = match parse_condition_with(&rule.condition, limits) {
            Ok(cond) => cond,
            Err(e) => return error_result(value, e.to_string(), started),
        };
        match evaluate_with(&cond, value, limits) {
            Ok(true) => {}
            Ok(false) => {
                debug!(rule = %rule.id, "condition false, skipping");
                return skipped_result(value, started);
            }
            Err(e) => return error_result(value, e.to_string(), started),
        }
    }

    let expanded = match expand_with(&rule.action, value, ctx, now, limits) {
        Ok(text) => text,
        Err(e) => return error_result(value, e.to_string(), started),
    };
    let action = match parse_action_with(&expanded, limits) {
        Ok(action) => action,
        Err(e) => return error_result(value, e.to_string(), started),
    };

    let mut working = value.clone();
    match execute_with(&action, &mut working, limits) {
        Ok(outcome) => classify(value, working, outcome, started),
        // the partially mutated clone is dropped here
        Err(e) => error_result(value, e.to_string(), started),
    }
}

/// Apply rules in order, each seeing the value the previous one
/// produced. A rule that errors contributes nothing to the running
/// value; the per-rule results record what happened. Returns the
/// results and the final value.
pub fn run_rules(
    rules: &[Rule],
    value: &Value,
    ctx: &FileContext,
    now: DateTime<Local>,
    limits: &Limits,
) -> (Vec<FileResult>, Value) {
    let mut current = value.clone();
    let mut results = Vec::with_capacity(rules.len());
    for rule in rules {
        let result = run_rule_with(rule, &current, ctx, now, limits);
        if result.modified && result.status != FileStatus::Error {
            current = result.new_value.clone();
        }
        results.push(result);
    }
    (results, current)
}

/// Convenience over the codec: split the note, run the rule on its
/// front matter, and join the new front matter back over the untouched
/// body. The new text is `Some` only when there is something to persist.
pub fn run_rule_on_note(
    rule: &Rule,
    text: &str,
    ctx: &FileContext,
    now: DateTime<Local>,
    limits: &Limits,
) -> Result<(FileResult, Option<String>), CodecError> {
    let (front_matter, body) = frontmatter::split(text)?;
    let result = run_rule_with(rule, &front_matter, ctx, now, limits);
    let new_text = if result.modified && result.status != FileStatus::Error {
        Some(frontmatter::join(&result.new_value, &body)?)
    } else {
        None
    };
    Ok((result, new_text))
}

/// Parse-only check of a rule, for save-time validation. The action is
/// checked only when it carries no template placeholders, since those
/// are substituted before parsing.
pub fn validate_rule(rule: &Rule) -> Vec<ParseError> {
    let mut errors = Vec::new();
    if !rule.condition.trim().is_empty() {
        if let Err(e) = parse_condition_with(&rule.condition, &Limits::default()) {
            errors.push(e);
        }
    }
    if !rule.action.contains("{{") {
        if let Err(e) = parse_action_with(&rule.action, &Limits::default()) {
            errors.push(e);
        }
    }
    errors
}

fn classify(
    original: &Value,
    working: Value,
    outcome: ActionOutcome,
    started: Instant,
) -> FileResult {
    let status = match (outcome.modified, &outcome.warning) {
        (true, None) => FileStatus::Success,
        (false, None) => FileStatus::Skipped,
        (_, Some(_)) => FileStatus::Warning,
    };
    FileResult {
        status,
        modified: outcome.modified,
        changes: outcome.changes,
        original_value: original.clone(),
        new_value: working,
        error: None,
        warning: outcome.warning,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

fn skipped_result(value: &Value, started: Instant) -> FileResult {
    FileResult {
        status: FileStatus::Skipped,
        modified: false,
        changes: Vec::new(),
        original_value: value.clone(),
        new_value: value.clone(),
        error: None,
        warning: None,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

fn error_result(value: &Value, message: String, started: Instant) -> FileResult {
    FileResult {
        status: FileStatus::Error,
        modified: false,
        changes: Vec::new(),
        original_value: value.clone(),
        new_value: value.clone(),
        error: Some(message),
        warning: None,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
