//! Word-oriented tokenizer for the action DSL.
//!
//! Unlike the condition lexer, operators are not split out: a token is a
//! quoted string, a balanced JSON literal, a regex literal, a comma, or
//! a whitespace-delimited word (`APPEND`, `tags[0]`, `-1`, `=` all lex
//! as words). Every token carries its char span in the source so that
//! embedded condition fragments can be carved back out verbatim.

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword, path, operator or bare literal
    Word(String),
    /// Quoted string, escapes resolved
    Str(String),
    /// Raw text of a balanced `{…}` or `[…]` literal
    Json(String),
    /// Regex literal `/pattern/flags` (appears inside WHERE fragments)
    Regex { pattern: String, flags: String },
    Comma,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    /// Char offsets into the source, `start..end`
    pub start: usize,
    pub end: usize,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;

        if c == ',' {
            pos += 1;
            tokens.push(Spanned {
                token: Token::Comma,
                start,
                end: pos,
            });
            continue;
        }

        // Quoted string
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(ParseError::new(start, "unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(ParseError::new(start, "unterminated escape in string"));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\'' => s.push('\''),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                start,
                end: pos,
            });
            continue;
        }

        // JSON literal: balanced braces/brackets, strings inside respected
        if c == '{' || c == '[' {
            let close = if c == '{' { '}' } else { ']' };
            let open = c;
            let mut depth = 0usize;
            let mut raw = String::new();
            let mut in_str = false;
            loop {
                if pos >= chars.len() {
                    return Err(ParseError::new(
                        start,
                        format!("unbalanced '{}' in JSON literal", open),
                    ));
                }
                let jc = chars[pos];
                raw.push(jc);
                if in_str {
                    if jc == '\\' {
                        if pos + 1 < chars.len() {
                            raw.push(chars[pos + 1]);
                            pos += 1;
                        }
                    } else if jc == '"' {
                        in_str = false;
                    }
                } else if jc == '"' {
                    in_str = true;
                } else if jc == open {
                    depth += 1;
                } else if jc == close {
                    depth -= 1;
                    if depth == 0 {
                        pos += 1;
                        break;
                    }
                }
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Json(raw),
                start,
                end: pos,
            });
            continue;
        }

        // Regex literal
        if c == '/' {
            pos += 1;
            let mut pattern = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(ParseError::new(start, "unterminated regex literal"));
                }
                let rc = chars[pos];
                if rc == '/' {
                    pos += 1;
                    break;
                }
                if rc == '\\' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
                    pattern.push('/');
                    pos += 2;
                    continue;
                }
                pattern.push(rc);
                pos += 1;
            }
            let mut flags = String::new();
            while pos < chars.len() && chars[pos].is_ascii_alphabetic() {
                flags.push(chars[pos]);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Regex { pattern, flags },
                start,
                end: pos,
            });
            continue;
        }

        // Word: everything up to whitespace or comma
        let mut word = String::new();
        while pos < chars.len() && !chars[pos].is_whitespace() && chars[pos] != ',' {
            word.push(chars[pos]);
            pos += 1;
        }
        tokens.push(Spanned {
            token: Token::Word(word),
            start,
            end: pos,
        });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        start: chars.len(),
        end: chars.len(),
    });
    Ok(tokens)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
