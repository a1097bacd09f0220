//! Canterbury CLI
//!
//! Usage: canterbury [OPTIONS] [SCRIPT]
//!
//! With a script, runs it and exits. Without one, reads statements from
//! stdin one line at a time.

mod cli;

use std::io;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use canterbury::{config, logging, runner, CanterburyError, Session, SessionOptions};
use clap::Parser;
use is_terminal::IsTerminal;

use crate::cli::Cli;

/// sysexits EX_USAGE
const EXIT_USAGE: u8 = 64;

/// Deeply nested source recurses in both the parser and the interpreter
const STACK_SIZE: usize = 64 * 1024 * 1024;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::setup_logging(cli.verbose, cli.quiet, cli.json);
    let json = cli.json;

    let outcome = std::thread::Builder::new()
        .name("canterbury".to_string())
        .stack_size(STACK_SIZE)
        .spawn(move || run(&cli))
        .context("failed to start interpreter thread")
        .and_then(|handle| {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("interpreter thread panicked"))?
        });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<CanterburyError>() {
            Some(error) => {
                let _ = runner::report(error, json, &mut io::stderr());
                ExitCode::from(error.exit_code() as u8)
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let loaded = config::resolve(cli.config.as_deref())?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let mut session = Session::new(SessionOptions {
        interpreter: loaded.config.interpreter_options(),
        emit: cli.emit,
        json: cli.json,
    });

    match &cli.script {
        Some(path) => {
            session.run_file(path)?;
        }
        None => {
            let interrupt = session.interrupt_flag();
            ctrlc::set_handler(move || interrupt.store(true, Ordering::SeqCst))
                .context("failed to install Ctrl-C handler")?;

            let prompt = io::stdin()
                .is_terminal()
                .then_some(loaded.config.repl.prompt.as_str());
            session.repl(prompt, &mut io::stderr())?;
        }
    }
    Ok(())
}
