pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod db;
pub mod engine;
pub mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use cli::{Cli, Commands};
use commands::{MessageSink, Outcome, Policy};
use engine::StoreEngine;
use error::PolicyError;

/// Exit code when the filtering engine rejected the requested policy.
pub const EXIT_ENGINE_FAILURE: u8 = 1;

/// Exit code for invocation errors (bad subcommand, missing or malformed arguments, store errors).
pub const EXIT_INVOCATION_ERROR: u8 = 2;

pub fn run() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC in guardctl: {info}");
        default_hook(info);
    }));

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(match cli.log_filter() {
            Some(filter) => tracing_subscriber::EnvFilter::new(filter),
            None => tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()),
        })
        .init();

    let sink: MessageSink = Arc::new(|msg: &str| println!("{msg}"));

    match execute(cli, sink) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failure) => ExitCode::from(EXIT_ENGINE_FAILURE),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("[ERROR] {e:#}");
            ExitCode::from(EXIT_INVOCATION_ERROR)
        }
    }
}

/// Run one parsed invocation against the policy store.
///
/// `policy` requests open the store only when an engine operation runs, so an
/// unusable store is reported as a failed policy rather than an invocation error.
pub fn execute(cli: Cli, sink: MessageSink) -> anyhow::Result<Outcome> {
    let db_path = config::resolve_state_db_path(cli.state_db);

    match cli.command {
        Commands::Policy { arguments } => {
            let engine = Arc::new(StoreEngine::open_lazily(db_path));
            let policy = Policy::new(engine, sink);
            tracing::debug!(
                "Dispatching '{}' request: {arguments:?}",
                policy.name()
            );
            policy.handle_request(&arguments).map_err(|e| {
                tracing::debug!(kind = e.kind(), "Rejected policy request: {e}");
                match e {
                    PolicyError::MissingSubcommand | PolicyError::UnknownSubcommand(_) => {
                        let expected = policy.subcommands().join(", ");
                        anyhow::Error::new(e).context(format!(
                            "invalid policy request (expected one of: {expected})"
                        ))
                    }
                    other => other.into(),
                }
            })
        }
        Commands::Status { json } => {
            let database = db::open_store(&db_path)?;
            commands::status::show_status(&database, &sink, json)?;
            Ok(Outcome::Success)
        }
        Commands::History { limit, json } => {
            let database = db::open_store(&db_path)?;
            commands::status::show_history(&database, &sink, limit, json)?;
            Ok(Outcome::Success)
        }
    }
}
