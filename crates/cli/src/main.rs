//! backup-rs - Command-line entry point
//! Syncs local directories into S3 and batch-requests Glacier restores

mod args;
mod commands;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use args::{Cli, Commands};
use backup_core::application::StorageClassFilter;
use backup_core::port::SystemTimeProvider;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("{} {:#}", "warning:".yellow(), e);
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when the command completed but some items failed
async fn run(cli: Cli) -> Result<bool> {
    info!(
        version = VERSION,
        backend = ?cli.connection.backend,
        region = %cli.connection.region,
        bucket = %cli.command.bucket(),
        "backup-rs starting"
    );

    let store = commands::build_store(
        &cli.connection,
        cli.command.bucket(),
        Arc::new(SystemTimeProvider),
    )
    .await;

    match cli.command {
        Commands::Backup {
            path,
            storage_class,
            encryption,
            prefix,
            dry_run,
            ..
        } => {
            commands::backup(
                store,
                commands::BackupArgs {
                    path,
                    storage_class,
                    encryption,
                    prefix,
                    dry_run,
                },
            )
            .await
        }

        Commands::List {
            prefix,
            archived,
            storage_class,
            output,
            ..
        } => {
            let filter = match (archived, storage_class) {
                (true, _) => StorageClassFilter::Archived,
                (false, Some(class)) => StorageClassFilter::Exactly(class),
                (false, None) => StorageClassFilter::All,
            };
            commands::list(store, &prefix, filter, &output).await?;
            Ok(true)
        }

        Commands::Restore {
            input,
            days,
            tier,
            dry_run,
            ..
        } => commands::restore(store, &input, days, tier, dry_run).await,
    }
}
