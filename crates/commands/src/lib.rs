//! Command layer for the library ledger.
//!
//! This crate provides:
//! - the closed set of commands and their `{"name", "arguments"}` encoding
//! - dispatch of each command to a [`LibraryStore`], with a narration of the outcome
//! - catalog and account reports
//! - replay of a command log into a store, and export of a store as a log

pub mod command;
pub mod dispatch;
pub mod error;
pub mod replay;
pub mod report;

pub use catalog_store::{InMemoryLibrary, LibraryError, LibraryStore};
pub use command::{
    AddBook, AddCopies, CheckoutBook, Command, CommandName, CreateAccount, RawCommand,
    RemoveCopies, ReturnBook,
};
pub use dispatch::ExecutionResult;
pub use error::{CommandError, ExecutionError, Result};
pub use replay::{
    CommandStream, ImportOptions, ImportSummary, export, export_stream, import,
    import_with_output, snapshot_commands,
};
