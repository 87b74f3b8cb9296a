use std::fmt;

use serde::{Deserialize, Serialize};

/// A lexer or parser failure in the condition DSL, action DSL, a path,
/// or a literal. `pos` is the byte offset of the offending token in the
/// source text (0 when no better position is known).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseError {
    pub pos: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: usize, message: impl Into<String>) -> Self {
        ParseError {
            pos,
            message: message.into(),
        }
    }

    /// Error with no meaningful source position.
    pub fn msg(message: impl Into<String>) -> Self {
        ParseError::new(0, message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}: {}", self.pos, self.message)
    }
}

impl std::error::Error for ParseError {}
