//! Driver configuration from command-line arguments and environment.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments.
///
/// Reads from environment variables when the flag is absent:
/// - `LIBRARY_DB`: path to the persisted command log (default: `state.db`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Parser)]
#[command(
    name = "library",
    about = "Reads a list of commands from a file and executes them against the library"
)]
pub struct Args {
    /// Path to the DB file holding the library state.
    #[arg(long, env = "LIBRARY_DB", default_value = "state.db")]
    pub db: PathBuf,

    /// Tracing filter directive.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Newline-delimited JSON commands file, or `-` for stdin.
    pub commands: String,
}

/// Where user commands are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    Stdin,
    File(PathBuf),
}

impl CommandSource {
    /// Interprets a path argument, treating `-` as stdin.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            CommandSource::Stdin
        } else {
            CommandSource::File(PathBuf::from(arg))
        }
    }
}

impl std::fmt::Display for CommandSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandSource::Stdin => f.write_str("stdin"),
            CommandSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub commands: CommandSource,
    pub log_level: String,
}

impl Config {
    /// Parses the process arguments, falling back to environment variables
    /// and defaults.
    pub fn from_args() -> Self {
        Self::from(Args::parse())
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            db_path: args.db,
            commands: CommandSource::from_arg(&args.commands),
            log_level: args.log_level,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("state.db"),
            commands: CommandSource::Stdin,
            log_level: "info".to_string(),
        }
    }
}
