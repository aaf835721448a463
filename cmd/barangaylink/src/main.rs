//! # BarangayLink server
//!
//! Assembles the application from settings: store, media, auth, services and
//! the HTTP router. Feature flags pick the compiled-in store backends.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::{AppState, HttpOptions, Ports};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use configs::{LogSettings, Settings};
use secrecy::ExposeSecret;
use services::DefaultAdmin;
use storage_adapters::{DatabaseOptions, LocalMediaStorage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    // 1. Store
    let database = DatabaseOptions {
        max_connections: settings.database.max_connections,
        acquire_timeout: Duration::from_secs(settings.database.acquire_timeout_secs),
    };
    let repos = storage_adapters::connect(settings.database.url.expose_secret(), &database)
        .await
        .context("connecting to the database")?;

    // 2. Media
    let media = LocalMediaStorage::new(settings.media.root.clone());
    media
        .prepare()
        .await
        .with_context(|| format!("creating upload directories under {}", settings.media.root.display()))?;

    // 3. Auth
    let hasher = Arc::new(Argon2Hasher::new());
    let tokens = Arc::new(JwtTokenService::new(
        &settings.auth.jwt_secret,
        chrono::Duration::hours(settings.auth.token_ttl_hours),
    ));

    // 4. Services
    let state = AppState::new(
        Ports {
            users: repos.users,
            items: repos.items,
            requests: repos.requests,
            hasher,
            tokens,
            media: Arc::new(media),
        },
        &settings.admin.username,
    );

    let default_admin = DefaultAdmin {
        username: settings.admin.username.clone(),
        full_name: settings.admin.full_name.clone(),
        email: settings.admin.email.clone(),
        password: settings.admin.password.expose_secret().to_string(),
    };
    if let Some(admin) = state
        .accounts
        .ensure_default_admin(&default_admin)
        .await
        .context("creating the default admin")?
    {
        info!(username = %admin.username, "no admin found, default admin created");
    }

    // 5. HTTP
    let options = HttpOptions {
        cors_origins: settings.server.cors_origins.clone(),
        body_limit_bytes: settings.server.body_limit_bytes,
        media_root: settings.media.root.clone(),
        uploads_prefix: settings.media.url_prefix.clone(),
    };
    let app = api_adapters::router(state, &options);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "BarangayLink listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    info!("shut down cleanly");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
