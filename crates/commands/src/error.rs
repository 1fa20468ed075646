//! Command layer error types.

use catalog_store::LibraryError;
use common::ErrorKind;
use thiserror::Error;

use crate::command::CommandName;

/// A command that reached the store and was rejected.
///
/// Carries the narration written for the failure alongside the store error,
/// which is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{narration}")]
pub struct ExecutionError {
    /// Human readable account of what was attempted and why it failed.
    pub narration: String,

    /// The error returned by the store.
    #[source]
    pub source: LibraryError,
}

impl ExecutionError {
    pub fn new(narration: impl Into<String>, source: LibraryError) -> Self {
        Self {
            narration: narration.into(),
            source,
        }
    }

    /// Returns the category of the underlying store error.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Errors that can occur while decoding, executing or replaying commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The record names a command that does not exist.
    #[error("unknown command type, {0}")]
    UnknownCommand(String),

    /// The arguments do not have the shape the command expects.
    #[error("malformed arguments for {command}, {source}")]
    MalformedPayload {
        command: CommandName,
        #[source]
        source: serde_json::Error,
    },

    /// The line is not a `{"name": ..., "arguments": ...}` record.
    #[error("malformed command record, {0}")]
    InvalidRecord(#[source] serde_json::Error),

    /// A command could not be serialized.
    #[error("failed to encode command, {0}")]
    Encode(#[source] serde_json::Error),

    /// The store rejected the command.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Reading a command log failed.
    #[error("failed to read library state, {0}")]
    Read(#[source] std::io::Error),

    /// Writing a command log or narration failed.
    #[error("failed to write library state, {0}")]
    Write(#[source] std::io::Error),

    /// A record could not be decoded at this line of the log.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<CommandError>,
    },
}

impl CommandError {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            CommandError::MalformedPayload { .. }
            | CommandError::InvalidRecord(_)
            | CommandError::Encode(_) => ErrorKind::MalformedPayload,
            CommandError::Execution(err) => err.kind(),
            CommandError::Read(_) | CommandError::Write(_) => ErrorKind::Io,
            CommandError::AtLine { source, .. } => source.kind(),
        }
    }

    /// Returns the store error behind this failure, if the store was reached.
    pub fn library_error(&self) -> Option<&LibraryError> {
        match self {
            CommandError::Execution(err) => Some(&err.source),
            CommandError::AtLine { source, .. } => source.library_error(),
            _ => None,
        }
    }

    /// Attaches the 1-based log line this error was raised at.
    pub fn at_line(self, line: usize) -> Self {
        CommandError::AtLine {
            line,
            source: Box::new(self),
        }
    }
}

/// Result type for command layer operations.
pub type Result<T> = std::result::Result<T, CommandError>;
