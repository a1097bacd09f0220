//! Error types for Canterbury
//!
//! Uses `thiserror` for library errors. Syntax errors are collected in bulk,
//! runtime errors abort the current source unit.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::token::{Token, TokenType};

/// Result type alias for Canterbury operations
pub type CanterburyResult<T> = Result<T, CanterburyError>;

/// Where a syntax error was detected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "lexeme", rename_all = "snake_case")]
pub enum Location {
    /// Reported by the tokenizer, no token exists yet
    Line,
    /// At the end of input
    End,
    /// At a specific lexeme
    Lexeme(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line => Ok(()),
            Location::End => write!(f, " at end"),
            Location::Lexeme(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// A lexical or grammatical error in source text
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub location: Location,
    pub message: String,
}

impl SyntaxError {
    /// Error raised while scanning, before a token exists
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            location: Location::Line,
            message: message.into(),
        }
    }

    /// Error raised at a parsed token
    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let location = if token.kind == TokenType::Eof {
            Location::End
        } else {
            Location::Lexeme(token.lexeme.clone())
        };
        Self {
            line: token.line,
            location,
            message: message.into(),
        }
    }
}

/// An error raised while executing a program
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: token.line,
        }
    }
}

/// Main error type for Canterbury operations
#[derive(Error, Debug)]
pub enum CanterburyError {
    /// One or more syntax errors; the program was not run
    #[error("{}", render_syntax_errors(.0))]
    Syntax(Vec<SyntaxError>),

    /// Execution aborted
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Script file could not be read
    #[error("could not read {path}: {source}")]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CanterburyError {
    /// Process exit code following the sysexits convention
    pub fn exit_code(&self) -> i32 {
        match self {
            CanterburyError::Syntax(_) => 65,
            CanterburyError::Runtime(_) => 70,
            CanterburyError::ReadScript { .. } | CanterburyError::Io(_) => 74,
            CanterburyError::InvalidConfig { .. } => 78,
        }
    }
}

impl From<Vec<SyntaxError>> for CanterburyError {
    fn from(errors: Vec<SyntaxError>) -> Self {
        CanterburyError::Syntax(errors)
    }
}

fn render_syntax_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
