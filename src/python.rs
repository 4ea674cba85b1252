//! Minimal Python lexer
//!
//! Just enough of Python's lexical grammar to read a `setup.py` reliably:
//! string literals (all prefixes and quote styles), comments, identifiers,
//! numbers and single-character operators. Anything inside a string or a
//! comment can never be mistaken for code, which is what makes keyword
//! detection robust against odd formatting.

use crate::error::{Error, Result};
use crate::source::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A string literal. `value` has simple escapes decoded unless the literal is raw.
    Str(StrLiteral),
    Comment,
    Ident(String),
    Number,
    Op(char),
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLiteral {
    pub value: String,
    /// Span of the text between the quotes.
    pub content: Span,
    pub quote: char,
    pub triple: bool,
    /// True when `value` is byte-for-byte the source text between the quotes.
    pub verbatim: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the token's first byte.
    pub line: usize,
    /// Byte column of the token's first byte.
    pub column: usize,
}

impl Token {
    pub fn is_op(&self, op: char) -> bool {
        self.kind == TokenKind::Op(op)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn str_literal(&self) -> Option<&StrLiteral> {
        match &self.kind {
            TokenKind::Str(lit) => Some(lit),
            _ => None,
        }
    }
}

/// String prefixes that may precede a quote (compared lowercase).
const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

/// Split Python source into tokens.
///
/// Fails only on string literals that never close; brackets are not checked here.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    line_start: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        // A leading BOM is not part of the program text.
        let pos = if src.starts_with('\u{FEFF}') { 3 } else { 0 };
        Self {
            src,
            bytes: src.as_bytes(),
            pos,
            line: 1,
            line_start: pos,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b'\n' => {
                    self.push(TokenKind::Newline, self.pos, self.pos + 1);
                    self.pos += 1;
                    self.new_line();
                }
                b' ' | b'\t' | b'\r' | b'\x0c' => self.pos += 1,
                b'\\' if self.peek(1) == Some(b'\n') => {
                    self.pos += 2;
                    self.new_line();
                }
                b'\\' if self.peek(1) == Some(b'\r') && self.peek(2) == Some(b'\n') => {
                    self.pos += 3;
                    self.new_line();
                }
                b'#' => {
                    let start = self.pos;
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                    self.push(TokenKind::Comment, start, self.pos);
                }
                b'\'' | b'"' => self.string(self.pos, false)?,
                b'0'..=b'9' => {
                    let start = self.pos;
                    while self.pos < self.bytes.len()
                        && (self.bytes[self.pos].is_ascii_alphanumeric()
                            || matches!(self.bytes[self.pos], b'.' | b'_'))
                    {
                        self.pos += 1;
                    }
                    self.push(TokenKind::Number, start, self.pos);
                }
                _ if is_ident_start(b) => self.ident_or_prefixed_string()?,
                _ => {
                    let start = self.pos;
                    let ch = self.src[start..].chars().next().unwrap_or('\u{FFFD}');
                    self.pos += ch.len_utf8();
                    self.push(TokenKind::Op(ch), start, self.pos);
                }
            }
        }
        Ok(self.tokens)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.push_at(kind, start, end, self.line, start - self.line_start);
    }

    fn push_at(&mut self, kind: TokenKind, start: usize, end: usize, line: usize, column: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, end),
            line,
            column,
        });
    }

    fn ident_or_prefixed_string(&mut self) -> Result<()> {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let word = &self.src[start..self.pos];

        if matches!(self.peek(0), Some(b'\'' | b'"'))
            && STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str())
        {
            let raw = word.contains(|c| c == 'r' || c == 'R');
            return self.string(start, raw);
        }

        self.push(TokenKind::Ident(word.to_string()), start, self.pos);
        Ok(())
    }

    /// Lex a string literal whose opening quote is at `self.pos`.
    /// `token_start` includes any prefix letters.
    fn string(&mut self, token_start: usize, raw: bool) -> Result<()> {
        let line = self.line;
        let column = token_start - self.line_start;
        let quote = self.bytes[self.pos];
        let triple = self.peek(1) == Some(quote) && self.peek(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let content_start = self.pos;
        let mut value = String::new();
        let mut verbatim = true;

        loop {
            if self.pos >= self.bytes.len() {
                return Err(Error::UnterminatedString { line });
            }
            let b = self.bytes[self.pos];

            if b == quote {
                if !triple {
                    break;
                }
                if self.peek(1) == Some(quote) && self.peek(2) == Some(quote) {
                    break;
                }
            }

            match b {
                b'\n' if !triple => return Err(Error::UnterminatedString { line }),
                b'\n' => {
                    value.push('\n');
                    self.pos += 1;
                    self.new_line();
                }
                b'\\' => {
                    let Some(next) = self.src[self.pos + 1..].chars().next() else {
                        return Err(Error::UnterminatedString { line });
                    };
                    if raw {
                        value.push('\\');
                        value.push(next);
                    } else {
                        verbatim = false;
                        match next {
                            'n' => value.push('\n'),
                            't' => value.push('\t'),
                            '\\' | '\'' | '"' => value.push(next),
                            '\n' => {}
                            other => {
                                value.push('\\');
                                value.push(other);
                            }
                        }
                    }
                    self.pos += 1 + next.len_utf8();
                    if next == '\n' {
                        self.new_line();
                    }
                }
                _ => {
                    let ch = self.src[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }

        let content = Span::new(content_start, self.pos);
        self.pos += if triple { 3 } else { 1 };

        let literal = StrLiteral {
            value,
            content,
            quote: quote as char,
            triple,
            verbatim,
        };
        self.push_at(TokenKind::Str(literal), token_start, self.pos, line, column);
        Ok(())
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}
