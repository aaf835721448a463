//! # storage-adapters
//!
//! Persistence and media implementations of the `domains` ports.
//!
//! The database backend is picked at runtime from the URL scheme:
//! `postgres://…` for Postgres, `sqlite:…` for an embedded SQLite file (or
//! `sqlite::memory:` in tests). Both run the same repository code and the
//! same schema, kept in per-dialect migration folders.

use std::sync::Arc;
use std::time::Duration;

use domains::{ItemRepository, RequestRepository, UserRepository};
use thiserror::Error;

#[cfg(feature = "media-local")]
pub mod media;
#[cfg(any(feature = "db-postgres", feature = "db-sqlite"))]
pub mod sql;
#[cfg(feature = "db-postgres")]
pub mod postgres;
#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "media-local")]
pub use media::LocalMediaStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("unsupported database url scheme: {0}")]
    UnsupportedUrl(String),

    #[cfg(any(feature = "db-postgres", feature = "db-sqlite"))]
    #[error("database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    #[cfg(any(feature = "db-postgres", feature = "db-sqlite"))]
    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pool tuning shared by both backends. SQLite ignores `max_connections`
/// and always serializes through one connection.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// The three repositories over one shared pool.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub requests: Arc<dyn RequestRepository>,
}

/// Connects to the store named by `url`, applies pending migrations and
/// returns the repositories.
pub async fn connect(url: &str, options: &DatabaseOptions) -> Result<Repositories, StorageError> {
    #[cfg(feature = "db-postgres")]
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let pool = postgres::connect(url, options).await?;
        tracing::info!(backend = "postgres", "database ready");
        return Ok(postgres::repositories(pool));
    }

    #[cfg(feature = "db-sqlite")]
    if url.starts_with("sqlite:") {
        let pool = sqlite::connect(url, options).await?;
        tracing::info!(backend = "sqlite", "database ready");
        return Ok(sqlite::repositories(pool));
    }

    let _ = options;
    let scheme = url.split(':').next().unwrap_or_default();
    Err(StorageError::UnsupportedUrl(scheme.to_string()))
}
