use anyhow::Context;
use clap::Parser;
use services::{AppServices, Clock};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod db_url;

use cli::{Cli, Command};
use db_url::{normalize_sqlite_url, prepare_sqlite_file};

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    // Pure projection needs no storage.
    if let Command::Calc {
        attended,
        total,
        target,
    } = cli.command
    {
        return commands::calc(attended, total, target);
    }

    let settings = cli.advisor.into_settings()?;
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    debug!(%db_url, "opening database");

    let services = AppServices::new_sqlite(&db_url, Clock::system(), &settings)
        .await
        .with_context(|| format!("opening {db_url}"))?;
    let session = services.auth().restore().await?;

    match cli.command {
        Command::Calc { .. } => Ok(()),
        Command::Login { email, password } => {
            commands::login(&services, &email, password.as_deref()).await
        }
        Command::Logout => commands::logout(&services).await,
        Command::Whoami => {
            commands::whoami(&session);
            Ok(())
        }
        Command::Subjects { command } => commands::subjects(&services, &session, command).await,
        Command::Dashboard { json } => commands::dashboard(&services, &session, json).await,
        Command::Tips => commands::tips(&services, &session, &settings).await,
        Command::Seed { email } => commands::seed(&services, session, email.as_deref()).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
