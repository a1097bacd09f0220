//! Common test utilities for Canterbury CLI and program tests.
//!
//! - `TestEnv`: isolated working and config directories plus a CLI runner
//! - `run_program`: run source through the library and capture `print` output

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::rc::Rc;

use canterbury::{CanterburyError, Interpreter, InterpreterOptions, Session};
use tempfile::TempDir;

/// Result of running the canterbury binary
#[derive(Debug)]
pub struct TestResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for TestResult {
    fn from(output: Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Isolated environment: a temp working directory and a temp XDG config home
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_home: TempDir::new().unwrap(),
        }
    }

    /// Write a file relative to the working directory
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.work_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Write the user-level config file
    pub fn write_user_config(&self, contents: &str) -> PathBuf {
        let dir = self.config_home.path().join("canterbury");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with(args, "", &[])
    }

    /// Run with piped stdin and extra environment variables
    pub fn run_with(&self, args: &[&str], stdin: &str, env: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_canterbury"));
        cmd.args(args)
            .current_dir(self.work_dir.path())
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env_remove("CANTERBURY_LOG")
            .env_remove("CANTERBURY_PROMPT")
            .env_remove("CANTERBURY_MAX_CALL_DEPTH")
            .env_remove("CANTERBURY_MODULES")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap().into()
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }
}

/// `Write` sink whose contents stay readable after the interpreter takes it
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run a whole program; returns what it printed or the error it stopped on
pub fn run_program(source: &str) -> Result<String, (String, CanterburyError)> {
    run_program_with(source, InterpreterOptions::default(), "")
}

pub fn run_program_with(
    source: &str,
    options: InterpreterOptions,
    stdin: &str,
) -> Result<String, (String, CanterburyError)> {
    let out = SharedBuffer::default();
    let interpreter = Interpreter::new(options)
        .with_output(out.clone())
        .with_input(Cursor::new(stdin.to_string()));
    let mut session = Session::with_interpreter(interpreter, None, false);
    match session.run_source(source) {
        Ok(_) => Ok(out.contents()),
        Err(err) => Err((out.contents(), err)),
    }
}

/// Output of a program that must succeed
pub fn output_of(source: &str) -> String {
    match run_program(source) {
        Ok(out) => out,
        Err((out, err)) => panic!("program failed: {err}\noutput so far:\n{out}"),
    }
}

/// Error message of a program that must fail
pub fn error_of(source: &str) -> String {
    match run_program(source) {
        Ok(out) => panic!("program succeeded unexpectedly, output:\n{out}"),
        Err((_, err)) => err.to_string(),
    }
}
