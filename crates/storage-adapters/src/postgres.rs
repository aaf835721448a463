//! Postgres backend. Rows touched by a multi-step transition are locked with
//! `SELECT … FOR UPDATE` inside the transaction.

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Postgres;

use crate::sql::{
    impl_item_repository, impl_request_repository, impl_user_repository, SqlItemRepository,
    SqlRequestRepository, SqlUserRepository,
};
use crate::{DatabaseOptions, Repositories, StorageError};

pub type PgUserRepository = SqlUserRepository<Postgres>;
pub type PgItemRepository = SqlItemRepository<Postgres>;
pub type PgRequestRepository = SqlRequestRepository<Postgres>;

impl_user_repository!(Postgres, " FOR UPDATE");
impl_item_repository!(Postgres);
impl_request_repository!(Postgres, " FOR UPDATE");

pub async fn connect(url: &str, options: &DatabaseOptions) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(options.acquire_timeout)
        .connect(url)
        .await?;
    sqlx::migrate!("./migrations/postgres").run(&pool).await?;
    Ok(pool)
}

pub fn repositories(pool: PgPool) -> Repositories {
    Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        items: Arc::new(PgItemRepository::new(pool.clone())),
        requests: Arc::new(PgRequestRepository::new(pool)),
    }
}
