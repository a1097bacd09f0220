//! Lexical tokens

use std::fmt;

use serde::Serialize;

/// Every kind of token the tokenizer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    // Single-char tokens
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Minus,
    Plus,
    Star,
    Slash,
    Comma,
    Colon,
    Bang,
    Equal,
    BitAnd,
    BitOr,
    BitNeg,
    Underscore,
    Semicolon,

    // Multi-char tokens
    And,
    Or,
    Unequal,
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
    Arrow,
    Walrus,

    // Literals
    Num,
    Str,
    Identifier,

    // Keywords
    Func,
    Struct,
    SelfKw,
    For,
    While,
    If,
    Elif,
    Else,
    Match,
    Against,
    Is,
    True,
    False,
    Null,
    Import,
    Return,

    Eof,
}

impl TokenType {
    /// Keyword lookup for identifier-shaped lexemes
    pub fn keyword(text: &str) -> Option<TokenType> {
        let kind = match text {
            "and" => TokenType::And,
            "or" => TokenType::Or,
            "func" | "lambda" => TokenType::Func,
            "struct" => TokenType::Struct,
            "self" => TokenType::SelfKw,
            "for" => TokenType::For,
            "while" => TokenType::While,
            "if" => TokenType::If,
            "elif" => TokenType::Elif,
            "else" => TokenType::Else,
            "match" => TokenType::Match,
            "against" => TokenType::Against,
            "is" => TokenType::Is,
            "true" => TokenType::True,
            "false" => TokenType::False,
            "null" => TokenType::Null,
            "import" => TokenType::Import,
            "return" => TokenType::Return,
            _ => return None,
        };
        Some(kind)
    }
}

/// Literal payload of `NUM` and `STR` tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Num(f64),
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Num(n) => write!(f, "{}", n),
            Literal::Str(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenType,
    pub lexeme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenType, lexeme: impl Into<String>, literal: Option<Literal>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "[{:?} {} {}]", self.kind, self.lexeme, literal),
            None => write!(f, "[{:?} {}]", self.kind, self.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenType::keyword("lambda"), Some(TokenType::Func));
        assert_eq!(TokenType::keyword("func"), Some(TokenType::Func));
        assert_eq!(TokenType::keyword("against"), Some(TokenType::Against));
        assert_eq!(TokenType::keyword("print"), None);
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenType::Num, "0x1F", Some(Literal::Num(31.0)), 2);
        assert_eq!(token.to_string(), "[Num 0x1F 31]");

        let token = Token::new(TokenType::Walrus, ":=", None, 1);
        assert_eq!(token.to_string(), "[Walrus :=]");
    }
}
