// sprig-reader - Lexer for sprig
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for sprig source code.
//!
//! Converts source text into tokens, each tagged with the source name, line
//! and column it started at.

use std::fmt;
use std::rc::Rc;

/// Where a token or form was read from. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub source: Rc<str>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(source: &str, line: usize, column: usize) -> Self {
        Position {
            source: Rc::from(source),
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Delimiters
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }
    SetOpen,  // #{

    // Reader macros
    Quote, // '
    Deref, // @

    // Literals
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    /// `\c` character literal
    Char(char),
    Regex(String),
    /// `#name` tagged literal prefix, e.g. `#inst`
    Tag(String),

    Symbol(String),
    /// Keyword body without colons; `auto` for `::name`
    Keyword { text: String, auto: bool },

    Eof,
}

impl Token {
    /// The closing delimiter text, for closing tokens.
    #[must_use]
    pub fn closer(&self) -> Option<char> {
        match self {
            Token::RParen => Some(')'),
            Token::RBracket => Some(']'),
            Token::RBrace => Some('}'),
            _ => None,
        }
    }
}

/// A fatal read error with the position it occurred at.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadError {
    pub message: String,
    pub position: Position,
}

impl ReadError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        ReadError {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for ReadError {}

/// Lexer for sprig source code.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    source: Rc<str>,
}

impl Lexer {
    pub fn new(text: &str, source: &str) -> Self {
        Lexer {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            source: Rc::from(source),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// The current read position.
    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            source: Rc::clone(&self.source),
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error<T>(&self, message: impl Into<String>, at: &Position) -> Result<T, ReadError> {
        Err(ReadError::new(message, at.clone()))
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if is_whitespace(c) {
                self.advance();
            } else if c == ';' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Read the next token and the position it started at.
    pub fn next_token(&mut self) -> Result<(Token, Position), ReadError> {
        self.skip_whitespace_and_comments();
        let start = self.position();

        let Some(c) = self.peek() else {
            return Ok((Token::Eof, start));
        };

        let token = match c {
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            '[' => self.single(Token::LBracket),
            ']' => self.single(Token::RBracket),
            '{' => self.single(Token::LBrace),
            '}' => self.single(Token::RBrace),
            '\'' => self.single(Token::Quote),
            '@' => self.single(Token::Deref),
            '"' => {
                self.advance();
                Token::Str(self.read_string(&start)?)
            }
            '\\' => {
                self.advance();
                Token::Char(self.read_char(&start)?)
            }
            ':' => self.read_keyword(&start)?,
            '#' => self.read_dispatch(&start)?,
            c if c.is_ascii_digit() => self.read_number(&start)?,
            '+' | '-' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                self.read_number(&start)?
            }
            c if is_symbol_char(c) => self.read_symbol(),
            c => return self.error(format!("can't handle character '{}'", c), &start),
        };
        Ok((token, start))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn read_string(&mut self, start: &Position) -> Result<String, ReadError> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return self.error("EOF while reading string", start),
                Some('"') => return Ok(s),
                Some('\\') => match self.advance() {
                    None => return self.error("EOF while reading string", start),
                    Some('n') => s.push('\n'),
                    Some('r') => s.push('\r'),
                    Some('t') => s.push('\t'),
                    Some('v') => s.push('\u{0b}'),
                    Some('b') => s.push('\u{08}'),
                    Some('f') => s.push('\u{0c}'),
                    // Unrecognised escapes pass through, which covers \" and \\
                    Some(other) => s.push(other),
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn read_char(&mut self, start: &Position) -> Result<char, ReadError> {
        let Some(first) = self.advance() else {
            return self.error("EOF while reading character", start);
        };
        if !first.is_alphabetic() || !self.peek().is_some_and(|c| c.is_alphanumeric()) {
            return Ok(first);
        }

        let mut name = String::from(first);
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric()) {
            name.push(c);
            self.advance();
        }

        match name.as_str() {
            "newline" => Ok('\n'),
            "space" => Ok(' '),
            "tab" => Ok('\t'),
            "return" => Ok('\r'),
            "formfeed" => Ok('\u{0c}'),
            "backspace" => Ok('\u{08}'),
            _ => {
                let code_point = name
                    .strip_prefix('u')
                    .filter(|hex| hex.len() == 4)
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32);
                match code_point {
                    Some(c) => Ok(c),
                    None => self.error(format!("invalid character escape: \\{}", name), start),
                }
            }
        }
    }

    fn read_keyword(&mut self, start: &Position) -> Result<Token, ReadError> {
        self.advance();
        let auto = self.peek() == Some(':');
        if auto {
            self.advance();
        }
        let text = self.take_symbol_chars();
        if text.is_empty() {
            return self.error("invalid keyword: no name after ':'", start);
        }
        Ok(Token::Keyword { text, auto })
    }

    fn read_dispatch(&mut self, start: &Position) -> Result<Token, ReadError> {
        self.advance();
        match self.peek() {
            Some('{') => {
                self.advance();
                Ok(Token::SetOpen)
            }
            Some('"') => {
                self.advance();
                self.read_regex(start).map(Token::Regex)
            }
            Some('#') => {
                self.advance();
                match self.take_symbol_chars().as_str() {
                    "Inf" => Ok(Token::Number(f64::INFINITY)),
                    "-Inf" => Ok(Token::Number(f64::NEG_INFINITY)),
                    "NaN" => Ok(Token::Number(f64::NAN)),
                    other => self.error(format!("unknown symbolic value: ##{}", other), start),
                }
            }
            Some(c) if c.is_alphabetic() => Ok(Token::Tag(self.take_symbol_chars())),
            Some(c) => self.error(format!("can't handle character '#{}'", c), start),
            None => self.error("EOF after '#'", start),
        }
    }

    /// Regex bodies keep their backslashes; `\"` does not end the literal.
    fn read_regex(&mut self, start: &Position) -> Result<String, ReadError> {
        let mut pattern = String::new();
        loop {
            match self.advance() {
                None => return self.error("EOF while reading regex", start),
                Some('"') => return Ok(pattern),
                Some('\\') => {
                    pattern.push('\\');
                    match self.advance() {
                        Some(c) => pattern.push(c),
                        None => return self.error("EOF while reading regex", start),
                    }
                }
                Some(c) => pattern.push(c),
            }
        }
    }

    fn read_number(&mut self, start: &Position) -> Result<Token, ReadError> {
        let mut text = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            text.push(sign);
            self.advance();
        }
        while let Some(c) = self
            .peek()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '_')
        {
            if c != '_' {
                text.push(c);
            }
            self.advance();
        }

        if let Some(c) = self.peek().filter(|c| is_symbol_char(*c)) {
            return self.error(format!("invalid number: unexpected '{}' after {}", c, text), start);
        }
        if text.matches('.').count() > 1 {
            return self.error(format!("malformed number {}: second decimal point", text), start);
        }
        match text.parse::<f64>() {
            Ok(n) => Ok(Token::Number(n)),
            Err(_) => self.error(format!("invalid number: {}", text), start),
        }
    }

    fn take_symbol_chars(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|c| is_symbol_char(*c)) {
            text.push(c);
            self.advance();
        }
        text
    }

    fn read_symbol(&mut self) -> Token {
        let text = self.take_symbol_chars();
        match text.as_str() {
            "nil" => Token::Nil,
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            _ => Token::Symbol(text),
        }
    }
}

/// Separators: space, tab, newlines and comma.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | ',')
}

#[must_use]
pub fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '_' | '.' | '/' | '-' | '!' | '?' | '*' | '$' | '=' | '<' | '>' | '&' | '+' | '~'
                | '|' | '%'
        )
}
