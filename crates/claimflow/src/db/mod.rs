//! Database module for persistent storage.
//!
//! Uses SeaORM over SQLite (default) or PostgreSQL. Repository functions are
//! generic over [`ConnectionTrait`] so the same code runs against the pool or
//! inside a transaction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

pub mod document_repo;
pub mod entities;
pub mod error;
pub mod history_repo;
pub mod invoice_repo;
pub mod migrations;
pub mod stage_repo;
pub mod stats_repo;

pub use error::DatabaseError;
pub use migrations::Migrator;
pub use sea_orm::DbErr;

/// Cloneable handle around the SeaORM connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    conn: DatabaseConnection,
}

impl Database {
    /// Connects to `url` and runs all pending migrations.
    pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
        if let Some(path) = sqlite_file_path(url) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut options = ConnectOptions::new(url.to_owned());
        options
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = sea_orm::Database::connect(options).await?;
        Migrator::up(&conn, None)
            .await
            .map_err(|e| DatabaseError::Migration {
                reason: e.to_string(),
            })?;

        log::info!("Database opened at {}", redact_url(url));

        Ok(Self { conn })
    }

    /// Opens a fresh in-memory SQLite database for testing. Runs all migrations.
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        // A single pooled connection keeps the in-memory database alive and shared
        let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(3600))
            .sqlx_logging(false);

        let conn = sea_orm::Database::connect(options).await?;
        Migrator::up(&conn, None)
            .await
            .map_err(|e| DatabaseError::Migration {
                reason: e.to_string(),
            })?;

        Ok(Self { conn })
    }

    /// The underlying pool, usable wherever a [`ConnectionTrait`] is expected.
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Starts a unit of work. Dropping the transaction without committing
    /// rolls it back.
    pub async fn begin(&self) -> Result<DatabaseTransaction, sea_orm::DbErr> {
        self.conn.begin().await
    }

    /// Round-trips a trivial query to check the connection.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.conn.ping().await?;
        Ok(())
    }

    pub async fn close(self) -> Result<(), DatabaseError> {
        self.conn.close().await?;
        Ok(())
    }
}

/// Returns the canonical database path: `~/.claimflow/data/claimflow.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claimflow").join("data").join("claimflow.db"))
}

/// Builds a SQLite URL that creates the file on first use.
pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

/// Extracts the file path from a `sqlite://` URL, if it points at a file.
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Hides credentials in connection URLs before logging them.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

/// Reports the backend in use, for diagnostics.
pub fn backend_name<C: ConnectionTrait>(conn: &C) -> &'static str {
    match conn.get_database_backend() {
        sea_orm::DatabaseBackend::Sqlite => "sqlite",
        sea_orm::DatabaseBackend::Postgres => "postgres",
        sea_orm::DatabaseBackend::MySql => "mysql",
    }
}
