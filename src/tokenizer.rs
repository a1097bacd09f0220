//! Source tokenizer
//!
//! Turns Canterbury source text into a flat token stream. Scanning does not
//! stop at the first bad character: every lexical error is collected and
//! returned together so the user sees all of them at once.

use crate::error::SyntaxError;
use crate::token::{Literal, Token, TokenType};

pub struct Tokenizer {
    src: Vec<char>,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
    start: usize,
    curr: usize,
    line: usize,
}

impl Tokenizer {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.chars().collect(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            curr: 0,
            line: 1,
        }
    }

    /// Scan the whole source. The stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<SyntaxError>> {
        while self.has_next() {
            // We are at the beginning of the next lexeme.
            self.start = self.curr;
            self.next();
        }

        self.tokens
            .push(Token::new(TokenType::Eof, "", None, self.line));

        if self.errors.is_empty() {
            tracing::debug!(tokens = self.tokens.len(), "tokenized source");
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn has_next(&self) -> bool {
        self.curr < self.src.len()
    }

    fn advance(&mut self) -> char {
        let c = self.src[self.curr];
        self.curr += 1;
        c
    }

    fn peek(&self) -> char {
        self.src.get(self.curr).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.src.get(self.curr + 1).copied().unwrap_or('\0')
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() != expected || !self.has_next() {
            return false;
        }
        self.curr += 1;
        true
    }

    fn text(&self, from: usize, to: usize) -> String {
        self.src[from..to].iter().collect()
    }

    fn add_token(&mut self, kind: TokenType) {
        self.add_literal(kind, None);
    }

    fn add_literal(&mut self, kind: TokenType, literal: Option<Literal>) {
        let lexeme = self.text(self.start, self.curr);
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn error(&mut self, message: &str) {
        self.errors.push(SyntaxError::at_line(self.line, message));
    }

    fn next(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '+' => self.add_token(TokenType::Plus),
            '*' => self.add_token(TokenType::Star),
            '/' => self.add_token(TokenType::Slash),
            ',' => self.add_token(TokenType::Comma),
            '!' => self.add_token(TokenType::Bang),
            '=' => self.add_token(TokenType::Equal),
            '&' => self.add_token(TokenType::BitAnd),
            '|' => self.add_token(TokenType::BitOr),
            '~' => self.add_token(TokenType::BitNeg),
            ';' => self.add_token(TokenType::Semicolon),
            'λ' => self.add_token(TokenType::Func),
            '-' => {
                let kind = if self.matches('>') {
                    TokenType::Arrow
                } else {
                    TokenType::Minus
                };
                self.add_token(kind);
            }
            ':' => {
                let kind = if self.matches('=') {
                    TokenType::Walrus
                } else {
                    TokenType::Colon
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') {
                    TokenType::LesserEqual
                } else if self.matches('>') {
                    TokenType::Unequal
                } else {
                    TokenType::Lesser
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(kind);
            }
            '#' => {
                while self.peek() != '\n' && self.has_next() {
                    self.advance();
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' | '\'' => self.string(c),
            c if c.is_ascii_digit() => self.number(c),
            '_' if !is_alpha_numeric(self.peek()) => self.add_token(TokenType::Underscore),
            c if is_alpha(c) => self.identifier(),
            _ => self.error("Unexpected character."),
        }
    }

    fn string(&mut self, delim: char) {
        while self.has_next() && self.peek() != delim {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if !self.has_next() {
            self.error("Unterminated string.");
            return;
        }

        // closing delimiter
        self.advance();

        let value = self.text(self.start + 1, self.curr - 1);
        self.add_literal(TokenType::Str, Some(Literal::Str(value)));
    }

    fn number(&mut self, first: char) {
        if first == '0' {
            match self.peek() {
                'b' => return self.radix(2),
                'x' => return self.radix(16),
                _ => {}
            }
        }

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' {
            if !self.peek_next().is_ascii_digit() {
                // consume the dot so scanning resumes after it
                self.advance();
                self.error("Unexpected character.");
                return;
            }
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.text(self.start, self.curr);
        match text.parse::<f64>() {
            Ok(value) => self.add_literal(TokenType::Num, Some(Literal::Num(value))),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn radix(&mut self, radix: u32) {
        // skip the 'b' / 'x' marker
        self.advance();
        let digits_start = self.curr;
        while self.peek().is_digit(radix) {
            self.advance();
        }

        let digits = self.text(digits_start, self.curr);
        match u64::from_str_radix(&digits, radix) {
            Ok(value) => self.add_literal(TokenType::Num, Some(Literal::Num(value as f64))),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn identifier(&mut self) {
        while is_alpha_numeric(self.peek()) {
            self.advance();
        }

        let text = self.text(self.start, self.curr);
        let kind = TokenType::keyword(&text).unwrap_or(TokenType::Identifier);
        self.add_token(kind);
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alpha_numeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

/// Convenience wrapper around [`Tokenizer`]
pub fn tokenize(src: &str) -> Result<Vec<Token>, Vec<SyntaxError>> {
    Tokenizer::new(src).tokenize()
}
