use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use claimflow::config::load_or_default;
use claimflow::{workflow, AppConfig, Database};

use crate::error::ServerError;
use crate::{server, telemetry};

#[derive(Parser, Debug)]
#[command(
    name = "claimflow-server",
    about = "Invoice claim workflow service",
    version
)]
struct Cli {
    /// Path to the JSON configuration file (defaults to ~/.claimflow/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Apply pending database migrations and exit
    Migrate,
    /// Install the default stage catalog if no stages exist
    Seed,
    /// Report invoices whose cached status disagrees with their stage
    Check,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub async fn run() -> Result<(), ServerError> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    telemetry::init(&config.logging)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Migrate => migrate(&config).await,
        Command::Seed => seed(&config).await,
        Command::Check => check(&config).await,
    }
}

async fn open(config: &AppConfig) -> Result<Database, ServerError> {
    let url = config.resolved_database_url()?;
    Ok(Database::connect(&url).await?)
}

async fn migrate(config: &AppConfig) -> Result<(), ServerError> {
    // Connecting applies every pending migration.
    let db = open(config).await?;
    log::info!("Migrations applied");
    db.close().await?;
    Ok(())
}

async fn seed(config: &AppConfig) -> Result<(), ServerError> {
    let db = open(config).await?;
    let created = workflow::seed_default_stages(&db).await?;
    println!("{} stage(s) created", created);
    db.close().await?;
    Ok(())
}

async fn check(config: &AppConfig) -> Result<(), ServerError> {
    let db = open(config).await?;
    let drift = workflow::verify_status_cache(&db).await?;
    db.close().await?;

    if drift.is_empty() {
        println!("Status cache consistent");
        return Ok(());
    }

    for entry in &drift {
        let expected = entry
            .stage_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "<missing stage>".to_string());
        println!(
            "invoice {}: cached {} but stage {} is {}",
            entry.invoice_id, entry.cached_status, entry.stage_id, expected
        );
    }
    Err(ServerError::InconsistentStatus { count: drift.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["claimflow-server"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from([
            "claimflow-server",
            "--config",
            "/etc/claimflow.json",
            "serve",
            "--port",
            "9000",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/claimflow.json")));
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_maintenance_commands() {
        assert!(matches!(
            Cli::parse_from(["claimflow-server", "check"]).command,
            Some(Command::Check)
        ));
        assert!(matches!(
            Cli::parse_from(["claimflow-server", "seed", "--config", "c.json"]).command,
            Some(Command::Seed)
        ));
    }
}
