//! Tokenizer for Swift declaration source.
//!
//! The lexer only needs to be precise enough for declaration headers and
//! member signatures. Bodies are skipped by brace matching, so expression
//! syntax is reduced to identifiers, literals and single-character
//! punctuation. Line comments are kept as tokens because marker annotations
//! live in them; block comments are dropped.
//!
//! Every token carries its byte span so the parser can copy default-value
//! expressions verbatim out of the source.

use thiserror::Error;

/// Byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword (backtick-escaped names are unescaped).
    Ident(String),
    /// Line comment body without the leading slashes.
    Comment(String),
    StringLit,
    Number,
    /// `->`
    Arrow,
    /// Any other single punctuation character.
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the first character.
    pub line: usize,
}

impl Token {
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(w) if w == word)
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(w) => Some(w),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting on line {line}")]
    UnterminatedString { line: usize },

    #[error("unterminated block comment starting on line {line}")]
    UnterminatedComment { line: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnterminatedString { line } | LexError::UnterminatedComment { line } => *line,
        }
    }
}

/// Tokenize a whole source unit.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(c) = self.peek_char() {
            let start = self.pos;
            let line = self.line;

            if c == '\n' {
                self.line += 1;
                self.pos += 1;
            } else if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if self.starts_with("//") {
                self.line_comment(start, line);
            } else if self.starts_with("/*") {
                self.block_comment(line)?;
            } else if c == '"' || (c == '#' && self.peek_at(1) == Some(b'"')) {
                self.string(line)?;
                self.push(TokenKind::StringLit, start, line);
            } else if c == '`' {
                self.escaped_ident(start, line);
            } else if c.is_ascii_digit() {
                self.number();
                self.push(TokenKind::Number, start, line);
            } else if c == '_' || c.is_alphabetic() {
                self.ident(start, line);
            } else if self.starts_with("->") {
                self.pos += 2;
                self.push(TokenKind::Arrow, start, line);
            } else {
                self.pos += c.len_utf8();
                self.push(TokenKind::Punct(c), start, line);
            }
        }
        Ok(self.tokens)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.bytes[self.pos..].starts_with(pattern.as_bytes())
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        self.tokens.push(Token {
            kind,
            span: Span {
                start,
                end: self.pos,
            },
            line,
        });
    }

    fn line_comment(&mut self, start: usize, line: usize) {
        let rest = &self.source[self.pos..];
        let len = rest.find('\n').unwrap_or(rest.len());
        let body = rest[..len].trim_start_matches('/').trim().to_string();
        self.pos += len;
        self.push(TokenKind::Comment(body), start, line);
    }

    fn block_comment(&mut self, line: usize) -> Result<(), LexError> {
        let mut depth = 0usize;
        while self.pos < self.bytes.len() {
            if self.starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if self.starts_with("*/") {
                depth -= 1;
                self.pos += 2;
                if depth == 0 {
                    return Ok(());
                }
            } else {
                if self.bytes[self.pos] == b'\n' {
                    self.line += 1;
                }
                self.pos += 1;
            }
        }
        Err(LexError::UnterminatedComment { line })
    }

    /// Consume a string literal, including raw (`#"..."#`) and multi-line forms.
    fn string(&mut self, line: usize) -> Result<(), LexError> {
        let mut hashes = 0usize;
        while self.peek_at(0) == Some(b'#') {
            hashes += 1;
            self.pos += 1;
        }
        let multiline = self.starts_with("\"\"\"");
        let quote = if multiline { "\"\"\"" } else { "\"" };
        self.pos += quote.len();
        let terminator = format!("{quote}{}", "#".repeat(hashes));

        while self.pos < self.bytes.len() {
            if self.starts_with(&terminator) {
                self.pos += terminator.len();
                return Ok(());
            }
            match self.bytes[self.pos] {
                b'\\' if hashes == 0 => self.pos += 2,
                b'\n' if !multiline => return Err(LexError::UnterminatedString { line }),
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        Err(LexError::UnterminatedString { line })
    }

    fn escaped_ident(&mut self, start: usize, line: usize) {
        self.pos += 1;
        let rest = &self.source[self.pos..];
        let len = rest.find(['`', '\n']).unwrap_or(rest.len());
        let name = rest[..len].to_string();
        self.pos += len;
        if self.peek_at(0) == Some(b'`') {
            self.pos += 1;
        }
        self.push(TokenKind::Ident(name), start, line);
    }

    fn number(&mut self) {
        while let Some(c) = self.peek_char() {
            let fraction = c == '.' && self.peek_at(1).is_some_and(|b| b.is_ascii_digit());
            if c.is_ascii_alphanumeric() || c == '_' || fraction {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn ident(&mut self, start: usize, line: usize) {
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_alphanumeric() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let word = self.source[start..self.pos].to_string();
        self.push(TokenKind::Ident(word), start, line);
    }
}
