//! SQL repositories shared by the Postgres and SQLite backends.
//!
//! Every statement uses `$N` placeholders, which both drivers understand, so
//! each repository body is written once as a macro and instantiated per
//! backend in `postgres.rs` and `sqlite.rs`. The only dialect knob is the
//! row-lock suffix used inside transactions (`FOR UPDATE` on Postgres,
//! nothing on SQLite where the single pooled connection already serializes
//! writers).

use domains::DomainError;
use sqlx::{Database, Pool};

mod items;
mod requests;
pub(crate) mod rows;
mod users;

pub(crate) use items::impl_item_repository;
pub(crate) use requests::impl_request_repository;
pub(crate) use users::impl_user_repository;

macro_rules! repository_struct {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<DB: Database> {
            pub(crate) pool: Pool<DB>,
        }

        impl<DB: Database> $name<DB> {
            pub fn new(pool: Pool<DB>) -> Self {
                Self { pool }
            }
        }

        impl<DB: Database> Clone for $name<DB> {
            fn clone(&self) -> Self {
                Self {
                    pool: self.pool.clone(),
                }
            }
        }
    };
}

repository_struct!(
    /// Accounts and the verification audit trail.
    SqlUserRepository
);
repository_struct!(
    /// Item catalog.
    SqlItemRepository
);
repository_struct!(
    /// Borrow/receive requests.
    SqlRequestRepository
);

/// Logs the driver error and hides it behind a generic internal error.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "database error");
    DomainError::internal("database error")
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
