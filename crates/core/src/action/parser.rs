use crate::action::lexer::{Spanned, Token};
use crate::action::{Action, MoveTarget, SortOrder};
use crate::condition::{self, Condition};
use crate::error::ParseError;
use crate::limits::Limits;
use crate::literal;
use crate::path::Path;
use crate::value::Value;

pub fn parse(src: &str, tokens: &[Spanned], limits: &Limits) -> Result<Action, ParseError> {
    let chars: Vec<char> = src.chars().collect();
    let mut p = Parser {
        chars,
        tokens,
        pos: 0,
        limits,
    };
    let action = p.parse_action()?;
    if p.peek() != &Token::Eof {
        return Err(p.err(format!("unexpected trailing token {:?}", p.peek())));
    }
    Ok(action)
}

struct Parser<'a> {
    chars: Vec<char>,
    tokens: &'a [Spanned],
    pos: usize,
    limits: &'a Limits,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.cur().start, msg)
    }

    fn is_kw(&self, kw: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    fn expect_kw(&mut self, kw: &str) -> Result<(), ParseError> {
        if self.is_kw(kw) {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {:?}", kw, self.peek())))
        }
    }

    fn take_word(&mut self) -> Result<String, ParseError> {
        if let Token::Word(w) = self.peek().clone() {
            self.advance();
            Ok(w)
        } else {
            Err(self.err(format!("expected a word, got {:?}", self.peek())))
        }
    }

    fn parse_path(&mut self) -> Result<Path, ParseError> {
        let start = self.cur().start;
        let word = self
            .take_word()
            .map_err(|_| ParseError::new(start, "expected a path"))?;
        Path::parse_with(&word, self.limits).map_err(|e| ParseError::new(start + e.pos, e.message))
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let start = self.cur().start;
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            Token::Json(raw) => {
                self.advance();
                literal::parse_json(&raw).map_err(|e| ParseError::new(start, e.message))
            }
            Token::Word(w) => {
                self.advance();
                literal::parse_literal(&w).map_err(|e| ParseError::new(start, e.message))
            }
            other => Err(self.err(format!("expected a value, got {:?}", other))),
        }
    }

    fn parse_index(&mut self) -> Result<i64, ParseError> {
        let start = self.cur().start;
        let word = self.take_word()?;
        word.parse::<i64>()
            .map_err(|_| ParseError::new(start, format!("expected an integer index, got '{}'", word)))
    }

    fn parse_object(&mut self, op: &str) -> Result<Value, ParseError> {
        let start = self.cur().start;
        let value = self.parse_value()?;
        if !matches!(value, Value::Map(_)) {
            return Err(ParseError::new(
                start,
                format!("{} requires a JSON object literal", op),
            ));
        }
        Ok(value)
    }

    fn parse_sort_order(&mut self) -> SortOrder {
        if self.is_kw("desc") {
            self.advance();
            SortOrder::Desc
        } else {
            if self.is_kw("asc") {
                self.advance();
            }
            SortOrder::Asc
        }
    }

    /// Collect tokens up to (not including) the first word in `stops` --
    /// or to end of input when `stops` is empty -- slice that span out of
    /// the source, and run it through the condition parser.
    fn parse_condition_fragment(&mut self, stops: &[&str]) -> Result<Condition, ParseError> {
        let first = self.pos;
        while self.peek() != &Token::Eof {
            if let Token::Word(w) = self.peek() {
                if stops.iter().any(|s| w.eq_ignore_ascii_case(s)) {
                    break;
                }
            }
            self.advance();
        }
        if self.pos == first {
            return Err(self.err("expected a condition"));
        }
        if !stops.is_empty() && self.peek() == &Token::Eof {
            return Err(self.err(format!("expected one of {:?} after the condition", stops)));
        }
        let start = self.tokens[first].start;
        let end = self.tokens[self.pos - 1].end;
        let text: String = self.chars[start..end].iter().collect();
        condition::parse_with(&text, self.limits)
            .map_err(|e| ParseError::new(start + e.pos, e.message))
    }

    fn parse_action(&mut self) -> Result<Action, ParseError> {
        let start = self.cur().start;
        let kw = self
            .take_word()
            .map_err(|_| ParseError::new(start, "expected an action keyword"))?;

        match kw.to_ascii_uppercase().as_str() {
            "SET" => Ok(Action::Set {
                path: self.parse_path()?,
                value: self.parse_value()?,
            }),
            "ADD" => Ok(Action::Add {
                path: self.parse_path()?,
                value: self.parse_value()?,
            }),
            "DELETE" | "CLEAR" => Ok(Action::Delete {
                path: self.parse_path()?,
            }),
            "RENAME" => Ok(Action::Rename {
                from: self.parse_path()?,
                to: self.parse_path()?,
            }),
            "APPEND" => Ok(Action::Append {
                path: self.parse_path()?,
                value: self.parse_value()?,
            }),
            "PREPEND" => Ok(Action::Prepend {
                path: self.parse_path()?,
                value: self.parse_value()?,
            }),
            "INSERT_AT" => {
                let path = self.parse_path()?;
                let value = self.parse_value()?;
                self.expect_kw("at")?;
                let index = self.parse_index()?;
                Ok(Action::InsertAt { path, value, index })
            }
            "INSERT_AFTER" => {
                let path = self.parse_path()?;
                let value = self.parse_value()?;
                self.expect_kw("after")?;
                let anchor = self.parse_value()?;
                Ok(Action::InsertAfter {
                    path,
                    value,
                    anchor,
                })
            }
            "INSERT_BEFORE" => {
                let path = self.parse_path()?;
                let value = self.parse_value()?;
                self.expect_kw("before")?;
                let anchor = self.parse_value()?;
                Ok(Action::InsertBefore {
                    path,
                    value,
                    anchor,
                })
            }
            "REMOVE" => Ok(Action::Remove {
                path: self.parse_path()?,
                value: self.parse_value()?,
            }),
            "REMOVE_ALL" => Ok(Action::RemoveAll {
                path: self.parse_path()?,
                value: self.parse_value()?,
            }),
            "REMOVE_AT" => Ok(Action::RemoveAt {
                path: self.parse_path()?,
                index: self.parse_index()?,
            }),
            "REPLACE" => {
                let path = self.parse_path()?;
                let old = self.parse_value()?;
                self.expect_kw("with")?;
                let new = self.parse_value()?;
                Ok(Action::Replace { path, old, new })
            }
            "REPLACE_ALL" => {
                let path = self.parse_path()?;
                let old = self.parse_value()?;
                self.expect_kw("with")?;
                let new = self.parse_value()?;
                Ok(Action::ReplaceAll { path, old, new })
            }
            "DEDUPLICATE" => Ok(Action::Deduplicate {
                path: self.parse_path()?,
            }),
            "SORT" => {
                let path = self.parse_path()?;
                let order = self.parse_sort_order();
                Ok(Action::Sort { path, order })
            }
            "SORT_BY" => {
                let path = self.parse_path()?;
                self.expect_kw("by")?;
                let field = self.take_word()?;
                let order = self.parse_sort_order();
                Ok(Action::SortBy { path, field, order })
            }
            "MOVE" => {
                let path = self.parse_path()?;
                self.expect_kw("from")?;
                let from = self.parse_index()?;
                self.expect_kw("to")?;
                let to = self.parse_index()?;
                Ok(Action::Move { path, from, to })
            }
            "MOVE_WHERE" => {
                let path = self.parse_path()?;
                self.expect_kw("where")?;
                let condition = self.parse_condition_fragment(&["to", "after", "before"])?;
                let target = self.parse_move_target()?;
                Ok(Action::MoveWhere {
                    path,
                    condition,
                    target,
                })
            }
            "UPDATE_WHERE" => {
                let path = self.parse_path()?;
                self.expect_kw("where")?;
                let condition = self.parse_condition_fragment(&["set"])?;
                self.expect_kw("set")?;
                let mut updates = Vec::new();
                loop {
                    let field = self.parse_path()?;
                    let value = self.parse_value()?;
                    updates.push((field, value));
                    if self.peek() == &Token::Comma {
                        self.advance();
                        continue;
                    }
                    break;
                }
                Ok(Action::UpdateWhere {
                    path,
                    condition,
                    updates,
                })
            }
            "MERGE" => Ok(Action::Merge {
                path: self.parse_path()?,
                object: self.parse_object("MERGE")?,
            }),
            "MERGE_OVERWRITE" => Ok(Action::MergeOverwrite {
                path: self.parse_path()?,
                object: self.parse_object("MERGE_OVERWRITE")?,
            }),
            other => Err(ParseError::new(
                start,
                format!("unknown action '{}'", other),
            )),
        }
    }

    fn parse_move_target(&mut self) -> Result<MoveTarget, ParseError> {
        if self.is_kw("after") {
            self.advance();
            let cond = self.parse_condition_fragment(&[])?;
            return Ok(MoveTarget::After(cond));
        }
        if self.is_kw("before") {
            self.advance();
            let cond = self.parse_condition_fragment(&[])?;
            return Ok(MoveTarget::Before(cond));
        }
        self.expect_kw("to")?;
        let start = self.cur().start;
        let word = self.take_word()?;
        if word.eq_ignore_ascii_case("start") {
            return Ok(MoveTarget::Start);
        }
        if word.eq_ignore_ascii_case("end") {
            return Ok(MoveTarget::End);
        }
        // Numeric TO targets collapse: 0 means START, anything else END.
        match word.parse::<i64>() {
            Ok(0) => Ok(MoveTarget::Start),
            Ok(_) => Ok(MoveTarget::End),
            Err(_) => Err(ParseError::new(
                start,
                format!("expected START, END or an index after TO, got '{}'", word),
            )),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
