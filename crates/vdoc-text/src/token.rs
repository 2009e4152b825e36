//! Line tokenization for the text format.
//!
//! Records are whitespace-separated tokens; strings are double-quoted with
//! a small escape set (`\\`, `\"`, `\n`, `\t`). The tokenizer reports
//! errors by offending fragment so the reader can attach line numbers.

use std::fmt;

/// One token on a record line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word (keyword, number, hex payload).
    Word(String),
    /// A quoted string with escapes resolved.
    Quoted(String),
}

impl Token {
    /// The token text as written, for error reporting.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Word(word) => word,
            Self::Quoted(text) => text,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

/// Tokenization failure: the offending fragment and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    pub fragment: String,
    pub message: &'static str,
}

/// Split one line into tokens.
pub fn tokenize(line: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if ch == '"' {
            chars.next();
            tokens.push(Token::Quoted(read_quoted(&mut chars)?));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                if c == '"' {
                    return Err(TokenizeError {
                        fragment: word,
                        message: "unexpected quote inside bare token",
                    });
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String, TokenizeError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => {
                return Err(TokenizeError {
                    fragment: text,
                    message: "unterminated quoted string",
                });
            }
            Some('"') => return Ok(text),
            Some('\\') => match chars.next() {
                Some('\\') => text.push('\\'),
                Some('"') => text.push('"'),
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                _ => {
                    return Err(TokenizeError {
                        fragment: text,
                        message: "invalid escape sequence",
                    });
                }
            },
            Some(other) => text.push(other),
        }
    }
}

/// Quote and escape a string for writing.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
