//! Driver error types.

use std::path::PathBuf;
use std::process::ExitCode;

use commands::CommandError;
use common::ErrorKind;

/// Failures that stop a driver run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The DB file could not be opened or created.
    #[error("failed to open DB file {path}: {source}")]
    OpenDb {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted state could not be replayed.
    #[error("failed to load library from DB file {path}: {source}")]
    LoadDb {
        path: PathBuf,
        #[source]
        source: CommandError,
    },

    /// The commands file could not be opened.
    #[error("failed to open commands file {path}: {source}")]
    OpenCommands {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A user command failed to decode or execute.
    #[error("failed to execute commands from {origin}: {source}")]
    Execute {
        origin: String,
        #[source]
        source: CommandError,
    },

    /// The store could not be serialized.
    #[error("failed to export library: {0}")]
    Export(#[source] CommandError),

    /// The new state could not be written in place of the DB file.
    #[error("failed to save DB file {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Classifies the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::LoadDb { source, .. }
            | CliError::Execute { source, .. }
            | CliError::Export(source) => source.kind(),
            CliError::OpenDb { .. } | CliError::OpenCommands { .. } | CliError::Persist { .. } => {
                ErrorKind::Io
            }
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }

    /// Whether the DB file was left untouched by this run.
    ///
    /// Every failure before the final rename leaves the previous state in place.
    pub fn db_unchanged(&self) -> bool {
        !matches!(self, CliError::Persist { .. })
    }
}
