//! `library` entry point.

use std::process::ExitCode;

use cli::config::Config;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_args();

    // Narration owns stdout; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut stdout = tokio::io::stdout();
    match cli::run(&config, &mut stdout).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = %err.kind(), db_unchanged = err.db_unchanged(), "run failed");
            eprintln!("{err}");
            err.exit_code()
        }
    }
}
