//! Applies migrations and makes sure the configured default admin exists.
//! Safe to run repeatedly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth_adapters::{Argon2Hasher, JwtTokenService};
use configs::Settings;
use secrecy::ExposeSecret;
use services::{AccountService, DefaultAdmin};
use storage_adapters::{DatabaseOptions, LocalMediaStorage};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info,sqlx=warn"))
        .init();

    let settings = Settings::load().context("loading configuration")?;
    let database = DatabaseOptions {
        max_connections: 1,
        acquire_timeout: Duration::from_secs(settings.database.acquire_timeout_secs),
    };
    let repos = storage_adapters::connect(settings.database.url.expose_secret(), &database)
        .await
        .context("connecting to the database")?;

    let media = LocalMediaStorage::new(settings.media.root.clone());
    media.prepare().await.context("creating upload directories")?;

    let accounts = AccountService::new(
        repos.users.clone(),
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtTokenService::new(
            &settings.auth.jwt_secret,
            chrono::Duration::hours(settings.auth.token_ttl_hours),
        )),
        Arc::new(media),
    );

    let admin = DefaultAdmin {
        username: settings.admin.username.clone(),
        full_name: settings.admin.full_name.clone(),
        email: settings.admin.email.clone(),
        password: settings.admin.password.expose_secret().to_string(),
    };
    match accounts.ensure_default_admin(&admin).await? {
        Some(created) => info!(id = created.id, username = %created.username, "admin account created"),
        None => {
            for existing in repos.users.list_admins().await? {
                info!(id = existing.id, username = %existing.username, email = %existing.email, "admin account already exists");
            }
        }
    }
    Ok(())
}
