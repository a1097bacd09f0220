use std::path::PathBuf;

use canterbury::Emit;
use clap::Parser;

/// Canterbury - run a script, or start an interactive session without one
#[derive(Parser, Debug)]
#[command(name = "canterbury")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'canterbury' without a script to read statements from stdin.")]
pub struct Cli {
    /// Script to run
    pub script: Option<PathBuf>,

    /// Print a pipeline stage instead of running
    #[arg(long, value_enum)]
    pub emit: Option<Emit>,

    /// JSON output for --emit and error reports
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file (defaults to ./canterbury.toml, then the user config)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
