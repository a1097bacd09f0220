//! Canterbury - a small dynamically typed scripting language
//!
//! Source text flows through [`tokenizer`] into [`parser`], and the resulting
//! statements are executed by the tree-walking [`interpreter`]. The [`runner`]
//! ties the stages together for scripts and the interactive session.

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod logging;
pub mod parser;
pub mod runner;
pub mod token;
pub mod tokenizer;

// Re-exports for convenience
pub use config::Config;
pub use error::{CanterburyError, CanterburyResult, RuntimeError, SyntaxError};
pub use interpreter::{Interpreter, InterpreterOptions, Value};
pub use parser::parse;
pub use runner::{Emit, Session, SessionOptions};
pub use token::{Token, TokenType};
pub use tokenizer::tokenize;
