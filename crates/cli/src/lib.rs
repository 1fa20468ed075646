//! Driver for the library ledger.
//!
//! One run loads the persisted state from the DB file, replays a batch of
//! user commands against it while narrating each outcome, then writes the
//! resulting state back to the DB file. The DB file is a command log in the
//! same format as the user batch.
//!
//! The DB file is replaced atomically: the new state is written to a
//! temporary file beside it, synced, and renamed over the old file. A run
//! that fails at any earlier step leaves the DB file as it was.

pub mod config;
pub mod error;

use std::path::{Path, PathBuf};

use catalog_store::InMemoryLibrary;
use commands::{ImportOptions, ImportSummary, export, import_with_output};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use config::{CommandSource, Config};
pub use error::CliError;

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records replayed from the DB file.
    pub loaded: usize,
    /// User commands executed.
    pub executed: usize,
    /// Records written back to the DB file.
    pub saved: usize,
}

/// Runs the configured command batch, narrating to `output`.
#[tracing::instrument(skip_all, fields(db = %config.db_path.display(), commands = %config.commands))]
pub async fn run<W>(config: &Config, output: &mut W) -> Result<RunSummary, CliError>
where
    W: AsyncWrite + Unpin,
{
    let library = InMemoryLibrary::new();
    let loaded = load_db(&library, &config.db_path).await?;

    let executed = match &config.commands {
        CommandSource::Stdin => {
            execute_commands(&library, tokio::io::stdin(), "stdin", output).await?
        }
        CommandSource::File(path) => {
            let file = File::open(path)
                .await
                .map_err(|source| CliError::OpenCommands {
                    path: path.clone(),
                    source,
                })?;
            execute_commands(&library, file, &path.display().to_string(), output).await?
        }
    };

    let saved = save_db(&library, &config.db_path).await?;

    let summary = RunSummary {
        loaded,
        executed: executed.executed,
        saved,
    };
    tracing::info!(
        loaded = summary.loaded,
        executed = summary.executed,
        saved = summary.saved,
        "run complete"
    );
    Ok(summary)
}

/// Replays the DB file into the library without narration.
///
/// A missing DB file is created empty.
async fn load_db(library: &InMemoryLibrary, path: &Path) -> Result<usize, CliError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .map_err(|source| CliError::OpenDb {
            path: path.to_path_buf(),
            source,
        })?;

    let mut sink = tokio::io::sink();
    let summary = import_with_output(
        library,
        BufReader::new(file),
        ImportOptions::default(),
        &mut sink,
    )
    .await
    .map_err(|source| CliError::LoadDb {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(records = summary.executed, "library state loaded");
    Ok(summary.executed)
}

async fn execute_commands<R, W>(
    library: &InMemoryLibrary,
    reader: R,
    origin: &str,
    output: &mut W,
) -> Result<ImportSummary, CliError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    import_with_output(
        library,
        BufReader::new(reader),
        ImportOptions::with_output(),
        output,
    )
    .await
    .map_err(|source| CliError::Execute {
        origin: origin.to_string(),
        source,
    })
}

/// Writes the library over the DB file.
async fn save_db(library: &InMemoryLibrary, path: &Path) -> Result<usize, CliError> {
    let mut buffer = Vec::new();
    let written = export(library, &mut buffer).await.map_err(CliError::Export)?;

    let target = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || replace_file(&target, &buffer))
        .await
        .unwrap_or_else(|join_err| Err(std::io::Error::other(join_err)));

    result.map_err(|source| CliError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(records = written, "library state saved");
    Ok(written)
}

/// Atomically replaces `path` with `contents`.
///
/// The temporary file lives in the same directory as `path` so the final
/// rename never crosses a filesystem boundary.
fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let dir = parent_dir(path);
    let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
