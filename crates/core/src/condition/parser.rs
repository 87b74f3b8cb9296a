use crate::condition::lexer::{Spanned, Token};
use crate::condition::{CompareOp, CondLiteral, Condition, QuantifierKind};
use crate::error::ParseError;
use crate::limits::Limits;
use crate::path::{Path, Segment};
use crate::value::Value;

pub fn parse(tokens: &[Spanned], limits: &Limits) -> Result<Condition, ParseError> {
    let mut p = Parser {
        tokens,
        pos: 0,
        limits,
    };
    let cond = p.parse_or()?;
    if p.peek() != &Token::Eof {
        return Err(p.err(format!("unexpected trailing token {:?}", p.peek())));
    }
    Ok(cond)
}

struct Parser<'a> {
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

    fn cur_pos(&self) -> usize {
        self.cur().pos
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.cur_pos(), msg)
    }

    /// Case-insensitive keyword check.
    fn is_kw(&self, kw: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.is_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_kw(&mut self, kw: &str) -> Result<(), ParseError> {
        if self.eat_kw(kw) {
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {:?}", kw.to_uppercase(), self.peek())))
        }
    }

    fn parse_or(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat_kw("or") {
            let right = self.parse_and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_unary()?;
        while self.eat_kw("and") {
            let right = self.parse_unary()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Condition, ParseError> {
        if self.eat_kw("not") {
            let inner = self.parse_unary()?;
            return Ok(Condition::Not(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Condition, ParseError> {
        if self.peek() == &Token::LParen {
            self.advance();
            let inner = self.parse_or()?;
            if self.peek() != &Token::RParen {
                return Err(self.err("expected ')'"));
            }
            self.advance();
            return Ok(inner);
        }

        for (kw, kind) in [("any", QuantifierKind::Any), ("all", QuantifierKind::All)] {
            if self.is_kw(kw) {
                self.advance();
                let array = self.parse_path()?;
                self.expect_kw("where")?;
                // The body extends as far right as it can; parenthesize
                // to bind it tighter.
                let body = self.parse_or()?;
                return Ok(Condition::Quantifier {
                    kind,
                    array,
                    body: Box::new(body),
                });
            }
        }

        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> Result<Condition, ParseError> {
        let path = self.parse_path()?;

        if self.peek() == &Token::Bang {
            self.advance();
            if let Token::TypeIs(kind) = *self.peek() {
                self.advance();
                return Ok(Condition::TypeCheck {
                    path,
                    kind,
                    negated: true,
                });
            }
            if self.eat_kw("has") {
                let value = self.parse_scalar_literal()?;
                return Ok(Condition::Has {
                    path,
                    value,
                    negated: true,
                });
            }
            if self.eat_kw("empty") {
                return Ok(Condition::EmptyCheck {
                    path,
                    negated: true,
                });
            }
            if self.eat_kw("exists") {
                return Ok(Condition::Existence {
                    path,
                    negated: true,
                });
            }
            return Err(self.err(format!(
                "expected 'has', 'empty', 'exists' or a type check after '!', got {:?}",
                self.peek()
            )));
        }

        if let Token::TypeIs(kind) = *self.peek() {
            self.advance();
            return Ok(Condition::TypeCheck {
                path,
                kind,
                negated: false,
            });
        }
        if self.eat_kw("has") {
            let value = self.parse_scalar_literal()?;
            return Ok(Condition::Has {
                path,
                value,
                negated: false,
            });
        }
        if self.eat_kw("empty") {
            return Ok(Condition::EmptyCheck {
                path,
                negated: false,
            });
        }
        if self.eat_kw("exists") {
            return Ok(Condition::Existence {
                path,
                negated: false,
            });
        }

        let op = match self.peek() {
            Token::Eq => CompareOp::Eq,
            Token::Neq => CompareOp::Neq,
            Token::Lt => CompareOp::Lt,
            Token::Lte => CompareOp::Lte,
            Token::Gt => CompareOp::Gt,
            Token::Gte => CompareOp::Gte,
            Token::Tilde => CompareOp::Matches,
            other => {
                return Err(self.err(format!("expected a predicate operator, got {:?}", other)))
            }
        };
        self.advance();

        let right = if op == CompareOp::Matches {
            match self.peek().clone() {
                Token::Regex { pattern, flags } => {
                    self.advance();
                    CondLiteral::Regex { pattern, flags }
                }
                // a plain string is a pattern with no flags
                Token::Str(s) => {
                    self.advance();
                    CondLiteral::Regex {
                        pattern: s,
                        flags: String::new(),
                    }
                }
                other => return Err(self.err(format!("expected a regex after '~', got {:?}", other))),
            }
        } else {
            CondLiteral::Scalar(self.parse_scalar_literal()?)
        };

        Ok(Condition::Comparison {
            left: path,
            op,
            right,
        })
    }

    fn parse_scalar_literal(&mut self) -> Result<Value, ParseError> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            Token::Int(n) => {
                self.advance();
                Ok(Value::Int(n))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Value::Float(f))
            }
            Token::Word(w) => {
                self.advance();
                match w.to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    _ => Ok(Value::String(w)),
                }
            }
            other => Err(self.err(format!("expected a literal, got {:?}", other))),
        }
    }

    fn parse_path(&mut self) -> Result<Path, ParseError> {
        let head = match self.peek().clone() {
            Token::Word(w) => {
                self.advance();
                w
            }
            other => return Err(self.err(format!("expected a path, got {:?}", other))),
        };
        let mut segments = vec![Segment::Field(head)];
        loop {
            match self.peek().clone() {
                Token::Dot => {
                    self.advance();
                    match self.peek().clone() {
                        Token::Word(w) => {
                            self.advance();
                            segments.push(Segment::Field(w));
                        }
                        other => {
                            return Err(
                                self.err(format!("expected field name after '.', got {:?}", other))
                            )
                        }
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = match self.peek().clone() {
                        Token::Int(n) => {
                            self.advance();
                            n
                        }
                        other => {
                            return Err(self.err(format!("expected index, got {:?}", other)))
                        }
                    };
                    if self.peek() != &Token::RBracket {
                        return Err(self.err("expected ']'"));
                    }
                    self.advance();
                    segments.push(Segment::Index(index));
                }
                _ => break,
            }
        }
        Path::from_segments(segments, self.limits)
            .map_err(|e| ParseError::new(self.cur_pos(), e.message))
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
