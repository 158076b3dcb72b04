//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from opening or maintaining the database.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error reported by SeaORM or the underlying driver.
    #[error("Database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// IO error when creating directories or files.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed: {reason}")]
    Migration { reason: String },
}
