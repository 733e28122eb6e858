//! Reviewbox CLI - star ratings and reviews from the command line
//!
//! Reviews are stored on this device first and relayed to a form inbox when
//! one is configured.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, SyncCommands};
use crate::commands::add::run_add;
use crate::commands::admin::run_admin;
use crate::commands::clear::run_clear;
use crate::commands::common::{resolve_config_path, resolve_db_path};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::sync::{run_sync, run_sync_watch};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reviewbox=info,reviewbox_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path)?;
    let config_path = resolve_config_path(cli.config)?;

    match cli.command {
        Commands::Add {
            name,
            service,
            rating,
            text,
        } => {
            run_add(
                name.as_deref(),
                service.as_deref(),
                rating,
                &text,
                &db_path,
                &config_path,
            )
            .await?;
        }
        Commands::List { limit, json } => run_list(limit, json, &db_path, &config_path).await?,
        Commands::Edit {
            id,
            name,
            service,
            rating,
            text,
        } => {
            run_edit(&id, name, service, rating, text, &db_path, &config_path).await?;
        }
        Commands::Delete { id } => {
            run_delete(&id, &db_path, &config_path).await?;
        }
        Commands::Clear { yes } => {
            run_clear(yes, &db_path, &config_path).await?;
        }
        Commands::Export { format, output } => {
            run_export(format, output.as_deref(), &db_path, &config_path).await?;
        }
        Commands::Admin { command } => {
            run_admin(command, &db_path, &config_path).await?;
        }
        Commands::Sync { command: None } => {
            run_sync(&db_path, &config_path).await?;
        }
        Commands::Sync {
            command: Some(SyncCommands::Watch),
        } => run_sync_watch(&db_path, &config_path).await?,
        Commands::Config { command } => run_config(command, &config_path)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
