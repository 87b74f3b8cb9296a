use std::fmt;

use marq_core::path::WriteError;

/// Errors raised while evaluating a condition or expanding templates.
/// No mutation has happened when one of these surfaces.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Pattern rejected by the guard rails before compilation.
    UnsafePattern { pattern: String, reason: String },
    /// Pattern longer than the configured cap.
    PatternTooLong { length: usize, max: usize },
    /// Pattern rejected by the regex engine, or an unknown flag.
    InvalidRegex { message: String },
    /// A single match exceeded the wall-clock budget.
    RegexTimeout { budget_ms: u64 },
    /// `{{name}}` with a name the resolver does not know.
    UnknownTemplate { name: String },
    /// `{{fm:path}}` whose path is absent from the front matter.
    MissingTemplateTarget { path: String },
    /// `{{fm:path}}` whose path does not parse.
    BadTemplatePath { message: String },
    /// `{{date:FORMAT}}` with a format chrono rejects.
    InvalidDateFormat { format: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnsafePattern { pattern, reason } => {
                write!(f, "unsafe pattern '{}': {}", pattern, reason)
            }
            EvalError::PatternTooLong { length, max } => {
                write!(f, "unsafe pattern: {} chars exceeds the {} char cap", length, max)
            }
            EvalError::InvalidRegex { message } => {
                write!(f, "invalid regex: {}", message)
            }
            EvalError::RegexTimeout { budget_ms } => {
                write!(f, "regex execution timeout after {} ms", budget_ms)
            }
            EvalError::UnknownTemplate { name } => {
                write!(f, "unknown template variable '{}'", name)
            }
            EvalError::MissingTemplateTarget { path } => {
                write!(f, "front matter has no value at '{}'", path)
            }
            EvalError::BadTemplatePath { message } => {
                write!(f, "invalid front-matter path in template: {}", message)
            }
            EvalError::InvalidDateFormat { format } => {
                write!(f, "invalid date format '{}'", format)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Hard failures applying an action. The engine discards the working
/// copy when one of these surfaces, so callers never observe a
/// partially mutated value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecError {
    /// Array-oriented action aimed at a non-array value.
    NotAnArray { path: String, got: String },
    /// Map-oriented action aimed at a non-map value.
    NotAnObject { path: String, got: String },
    /// The action requires the path to exist.
    MissingPath { path: String },
    /// Index outside the valid range for the sequence.
    OutOfBounds { path: String, index: i64, len: usize },
    /// SORT_BY over a sequence with a non-map element.
    ElementNotObject { path: String, index: usize },
    /// Writing through the path failed.
    Write { message: String },
    /// An embedded WHERE condition failed to evaluate.
    Condition(EvalError),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::NotAnArray { path, got } => {
                write!(f, "'{}' is {}, expected an array", path, got)
            }
            ExecError::NotAnObject { path, got } => {
                write!(f, "'{}' is {}, expected an object", path, got)
            }
            ExecError::MissingPath { path } => {
                write!(f, "'{}' does not exist", path)
            }
            ExecError::OutOfBounds { path, index, len } => {
                write!(
                    f,
                    "index {} out of bounds for '{}' of length {}",
                    index, path, len
                )
            }
            ExecError::ElementNotObject { path, index } => {
                write!(f, "element {} of '{}' is not an object", index, path)
            }
            ExecError::Write { message } => write!(f, "{}", message),
            ExecError::Condition(e) => write!(f, "condition failed: {}", e),
        }
    }
}

impl std::error::Error for ExecError {}

impl From<WriteError> for ExecError {
    fn from(e: WriteError) -> Self {
        ExecError::Write { message: e.message }
    }
}

impl From<EvalError> for ExecError {
    fn from(e: EvalError) -> Self {
        ExecError::Condition(e)
    }
}

/// Front-matter codec failures.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The YAML block did not parse.
    Yaml { message: String },
    /// Front matter is valid YAML but not a mapping.
    NotAMapping { got: String },
    /// A mapping key is not a scalar.
    NonScalarKey,
    /// Language-specific tags are not part of the permissive core schema.
    TaggedValue { tag: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Yaml { message } => write!(f, "invalid front matter: {}", message),
            CodecError::NotAMapping { got } => {
                write!(f, "front matter must be a mapping, got {}", got)
            }
            CodecError::NonScalarKey => write!(f, "front-matter keys must be scalars"),
            CodecError::TaggedValue { tag } => {
                write!(f, "unsupported YAML tag '{}'", tag)
            }
        }
    }
}

impl std::error::Error for CodecError {}
