//! Source runner: files, the interactive session, and `--emit` dumps

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;

use crate::error::{CanterburyError, CanterburyResult};
use crate::interpreter::{Interpreter, InterpreterOptions, Value};
use crate::{parser, tokenizer};

/// Pipeline stage to dump instead of executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Emit {
    Tokens,
    Ast,
}

/// How a [`Session`] treats each source unit
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub interpreter: InterpreterOptions,
    pub emit: Option<Emit>,
    pub json: bool,
}

/// An interpreter plus the settings that shape its output.
///
/// Global state persists between [`Session::run_source`] calls, which is what
/// the REPL relies on.
pub struct Session {
    interpreter: Interpreter,
    interrupt: Arc<AtomicBool>,
    emit: Option<Emit>,
    json: bool,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self::with_interpreter(Interpreter::new(options.interpreter), options.emit, options.json)
    }

    /// Wrap a preconfigured interpreter (custom output or input streams)
    pub fn with_interpreter(interpreter: Interpreter, emit: Option<Emit>, json: bool) -> Self {
        let interrupt = Arc::new(AtomicBool::new(false));
        Self {
            interpreter: interpreter.with_interrupt(Arc::clone(&interrupt)),
            interrupt,
            emit,
            json,
        }
    }

    /// Flag that aborts the running program when set (wired to Ctrl-C)
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Tokenize, parse and run (or dump) one unit of source
    pub fn run_source(&mut self, source: &str) -> CanterburyResult<Value> {
        let tokens = tokenizer::tokenize(source)?;
        if self.emit == Some(Emit::Tokens) {
            let text = if self.json {
                to_json(&tokens)?
            } else {
                tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>().join("\n")
            };
            self.interpreter.write_line(&text)?;
            return Ok(Value::Null);
        }

        let stmts = parser::parse(tokens)?;
        if self.emit == Some(Emit::Ast) {
            let text = if self.json {
                to_json(&stmts)?
            } else {
                format!("{:#?}", stmts)
            };
            self.interpreter.write_line(&text)?;
            return Ok(Value::Null);
        }

        tracing::trace!(statements = stmts.len(), "executing");
        Ok(self.interpreter.interpret(&stmts)?)
    }

    /// Run a script file as a single unit
    pub fn run_file(&mut self, path: &Path) -> CanterburyResult<Value> {
        let source = fs::read_to_string(path).map_err(|source| CanterburyError::ReadScript {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "running script");
        self.run_source(&source)
    }

    /// Read-eval loop over the interpreter's input stream.
    ///
    /// Each line is its own source unit. Errors go to `diagnostics` and the
    /// session carries on; only end of input stops it.
    pub fn repl(&mut self, prompt: Option<&str>, diagnostics: &mut dyn Write) -> CanterburyResult<()> {
        loop {
            if let Some(prompt) = prompt {
                self.interpreter.write_str(prompt)?;
            }
            let Some(line) = self.interpreter.read_line()? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            self.interrupt.store(false, Ordering::SeqCst);
            if let Err(error) = self.run_source(&line) {
                report(&error, self.json, diagnostics)?;
            }
        }
        tracing::debug!("end of input, leaving session");
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

/// Write an error the way the CLI shows it: plain text, or one JSON object per line
pub fn report(error: &CanterburyError, json: bool, out: &mut dyn Write) -> std::io::Result<()> {
    if json {
        writeln!(out, "{}", error_json(error))
    } else {
        writeln!(out, "{}", error)
    }
}

/// Structured form of an error for `--json`
pub fn error_json(error: &CanterburyError) -> serde_json::Value {
    match error {
        CanterburyError::Syntax(errors) => json!({
            "error": "syntax",
            "errors": errors,
        }),
        CanterburyError::Runtime(error) => json!({
            "error": "runtime",
            "message": error.message,
            "line": error.line,
        }),
        CanterburyError::InvalidConfig { file, message } => json!({
            "error": "config",
            "file": file,
            "message": message,
        }),
        other => json!({
            "error": "io",
            "message": other.to_string(),
        }),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> CanterburyResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CanterburyError::Io(e.into()))
}
