//! Cypher Lexer.

use pgcypher_common::utils::error::SourceSpan;

/// A token in Cypher.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Token text as written.
    pub text: String,
    /// Source span.
    pub span: SourceSpan,
}

/// Token kinds in Cypher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    /// MATCH keyword.
    Match,
    /// WHERE keyword.
    Where,
    /// RETURN keyword.
    Return,
    /// AND keyword.
    And,
    /// OR keyword.
    Or,
    /// NOT keyword.
    Not,
    /// AS keyword.
    As,
    /// DISTINCT keyword.
    Distinct,
    /// TRUE keyword.
    True,
    /// FALSE keyword.
    False,
    /// NULL keyword.
    Null,

    // Literals
    /// Integer literal.
    Integer,
    /// Float literal.
    Float,
    /// String literal, quotes included.
    String,

    /// Identifier.
    Identifier,
    /// Parameter (`$name`).
    Parameter,

    // Operators
    /// =
    Eq,
    /// <>
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// ^
    Caret,
    /// ->
    Arrow,
    /// <-
    LeftArrow,

    // Punctuation
    /// (
    LParen,
    /// )
    RParen,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// .
    Dot,
    /// ..
    DotDot,
    /// :
    Colon,
    /// |
    Pipe,

    /// A character or literal the lexer could not read.
    Error,
    /// End of input.
    Eof,
}

/// Cypher lexer.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token. Past the end of input this keeps returning
    /// [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let line = self.line;
        let column = self.column;

        let Some(c) = self.peek() else {
            return self.make_token(TokenKind::Eof, start, line, column);
        };

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '|' => self.single(TokenKind::Pipe),
            '=' => self.single(TokenKind::Eq),
            '+' => self.single(TokenKind::Plus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '^' => self.single(TokenKind::Caret),
            '.' => {
                self.advance();
                if self.peek() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '-' => {
                self.advance();
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '<' => {
                self.advance();
                match self.peek() {
                    Some('=') => {
                        self.advance();
                        TokenKind::Le
                    }
                    Some('>') => {
                        self.advance();
                        TokenKind::Ne
                    }
                    Some('-') => {
                        self.advance();
                        TokenKind::LeftArrow
                    }
                    _ => TokenKind::Lt,
                }
            }
            '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '\'' | '"' => self.scan_string(c),
            '$' => {
                self.advance();
                if self.peek().is_some_and(is_identifier_start) {
                    self.scan_identifier_tail();
                    TokenKind::Parameter
                } else {
                    TokenKind::Error
                }
            }
            '`' => self.scan_quoted_identifier(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_identifier_start(c) => {
                self.scan_identifier_tail();
                keyword(&self.input[start..self.position])
            }
            _ => self.single(TokenKind::Error),
        };

        self.make_token(kind, start, line, column)
    }

    fn make_token(&self, kind: TokenKind, start: usize, line: u32, column: u32) -> Token {
        let text = match kind {
            // Backticks are not part of the name.
            TokenKind::Identifier if self.input[start..].starts_with('`') => {
                let raw = &self.input[start..self.position];
                raw[1..raw.len() - 1].to_string()
            }
            _ => self.input[start..self.position].to_string(),
        };
        Token {
            kind,
            text,
            span: SourceSpan::new(start, self.position, line, column),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.advance(),
                // Line comment
                Some('/') if self.peek_second() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_identifier_tail(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }
    }

    fn scan_quoted_identifier(&mut self) -> TokenKind {
        self.advance();
        while let Some(c) = self.peek() {
            self.advance();
            if c == '`' {
                return TokenKind::Identifier;
            }
        }
        TokenKind::Error
    }

    fn scan_number(&mut self) -> TokenKind {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // `1..3` is a range, not a float.
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            return TokenKind::Float;
        }

        TokenKind::Integer
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance();
        while let Some(c) = self.peek() {
            self.advance();
            if c == '\\' {
                self.advance();
            } else if c == quote {
                return TokenKind::String;
            }
        }
        TokenKind::Error
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn keyword(text: &str) -> TokenKind {
    match text.to_ascii_uppercase().as_str() {
        "MATCH" => TokenKind::Match,
        "WHERE" => TokenKind::Where,
        "RETURN" => TokenKind::Return,
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "AS" => TokenKind::As,
        "DISTINCT" => TokenKind::Distinct,
        "TRUE" => TokenKind::True,
        "FALSE" => TokenKind::False,
        "NULL" => TokenKind::Null,
        _ => TokenKind::Identifier,
    }
}
