//! SQLite backend.
//!
//! The pool holds exactly one connection, so every statement and
//! transaction is serialized. That is what makes the conditional
//! `available → borrowed` update safe without row locks. The connection is
//! never recycled, which keeps `sqlite::memory:` databases alive for the
//! lifetime of the pool.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;

use crate::sql::{
    impl_item_repository, impl_request_repository, impl_user_repository, SqlItemRepository,
    SqlRequestRepository, SqlUserRepository,
};
use crate::{DatabaseOptions, Repositories, StorageError};

pub type SqliteUserRepository = SqlUserRepository<Sqlite>;
pub type SqliteItemRepository = SqlItemRepository<Sqlite>;
pub type SqliteRequestRepository = SqlRequestRepository<Sqlite>;

impl_user_repository!(Sqlite, "");
impl_item_repository!(Sqlite);
impl_request_repository!(Sqlite, "");

pub async fn connect(url: &str, options: &DatabaseOptions) -> Result<SqlitePool, StorageError> {
    let connect_options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let file = connect_options.get_filename();
    if file != Path::new(":memory:") {
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(options.acquire_timeout)
        .connect_with(connect_options)
        .await?;
    sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
    Ok(pool)
}

pub fn repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        users: Arc::new(SqliteUserRepository::new(pool.clone())),
        items: Arc::new(SqliteItemRepository::new(pool.clone())),
        requests: Arc::new(SqliteRequestRepository::new(pool)),
    }
}
