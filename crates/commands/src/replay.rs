//! Command log replay and export.
//!
//! A command log is newline-delimited JSON, one command record per line.
//! Exporting a store produces a log that, replayed into an empty store,
//! rebuilds an equivalent store. The same format carries batches of user
//! commands, so persisted state and pending actions are read the same way.

use std::pin::Pin;

use catalog_store::{LibrarySnapshot, LibraryStore};
use futures_core::Stream;
use futures_util::{StreamExt, stream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::command::{AddBook, CheckoutBook, Command, CreateAccount};
use crate::error::{CommandError, Result};

/// A stream of commands.
pub type CommandStream = Pin<Box<dyn Stream<Item = Command> + Send>>;

/// Options for replaying a command log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Write the narration of each command to the output.
    ///
    /// Off when loading persisted state, on when running user commands.
    pub log_output: bool,
}

impl ImportOptions {
    /// Options that narrate every command.
    pub fn with_output() -> Self {
        Self { log_output: true }
    }
}

/// Statistics for a completed replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of commands executed successfully.
    pub executed: usize,
}

/// Converts a snapshot into the commands that rebuild it.
///
/// Books come first, then accounts, then checkouts, so every checkout
/// refers to records created earlier in the sequence.
pub fn snapshot_commands(snapshot: LibrarySnapshot) -> impl Iterator<Item = Command> + Send {
    let books = snapshot
        .books
        .into_iter()
        .map(|book| Command::AddBook(AddBook::new(book.id, book.name, book.count)));
    let accounts = snapshot
        .accounts
        .into_iter()
        .map(|account| Command::CreateAccount(CreateAccount::new(account.id, account.name)));
    let checkouts = snapshot.checkouts.into_iter().map(|checkout| {
        Command::CheckoutBook(CheckoutBook::new(checkout.account_id, checkout.book_id))
    });

    books.chain(accounts).chain(checkouts)
}

/// Streams the commands that rebuild the store's current contents.
///
/// The store is read once, under a single lock, before the stream is
/// returned.
pub async fn export_stream<S: LibraryStore>(store: &S) -> CommandStream {
    let snapshot = store.snapshot().await;
    tracing::debug!(records = snapshot.record_count(), "library snapshot taken");
    Box::pin(stream::iter(snapshot_commands(snapshot)))
}

/// Writes the store's current contents as a command log.
///
/// Returns the number of records written.
#[tracing::instrument(skip_all)]
pub async fn export<S, W>(store: &S, writer: &mut W) -> Result<usize>
where
    S: LibraryStore,
    W: AsyncWrite + Unpin,
{
    let mut commands = export_stream(store).await;
    let mut written = 0;

    while let Some(command) = commands.next().await {
        let mut record = command.encode()?;
        record.push('\n');
        writer
            .write_all(record.as_bytes())
            .await
            .map_err(CommandError::Write)?;
        written += 1;
    }

    writer.flush().await.map_err(CommandError::Write)?;

    tracing::debug!(records = written, "library state exported");
    Ok(written)
}

/// Replays a command log against the store, narrating to stdout.
pub async fn import<S, R>(store: &S, reader: R, options: ImportOptions) -> Result<ImportSummary>
where
    S: LibraryStore,
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    import_with_output(store, reader, options, &mut stdout).await
}

/// Replays a command log against the store, narrating to `output`.
///
/// Commands run in order. Replay stops at the first record that fails to
/// decode or execute and returns that error; commands before it stay
/// applied. A failing command is still narrated before the error is
/// returned. Blank lines are skipped.
#[tracing::instrument(skip_all, fields(log_output = options.log_output))]
pub async fn import_with_output<S, R, W>(
    store: &S,
    reader: R,
    options: ImportOptions,
    output: &mut W,
) -> Result<ImportSummary>
where
    S: LibraryStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = ImportSummary::default();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await.map_err(CommandError::Read)? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let command = Command::decode(&line).map_err(|err| err.at_line(line_number))?;
        let result = command.execute(store).await;

        if options.log_output {
            let narration = match &result {
                Ok(narration) => narration,
                Err(err) => &err.narration,
            };
            output
                .write_all(narration.as_bytes())
                .await
                .map_err(CommandError::Write)?;
            output.write_all(b"\n").await.map_err(CommandError::Write)?;
        }

        if let Err(err) = result {
            tracing::warn!(line = line_number, command = %command.name(), error = %err.source, "replay halted");
            output.flush().await.map_err(CommandError::Write)?;
            return Err(err.into());
        }

        summary.executed += 1;
    }

    output.flush().await.map_err(CommandError::Write)?;

    tracing::debug!(commands = summary.executed, "replay complete");
    Ok(summary)
}
