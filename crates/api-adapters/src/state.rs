use std::path::PathBuf;
use std::sync::Arc;

use domains::{
    ItemRepository, MediaStorage, PasswordHasher, RequestRepository, TokenService, UserRepository,
};
use services::{AccountService, AdminService, ItemService, RequestService, VerificationService};

/// State shared by every handler. Services hold their ports behind `Arc`,
/// so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub verification: VerificationService,
    pub admin: AdminService,
    pub items: ItemService,
    pub requests: RequestService,
}

/// The adapters every service is built from.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub media: Arc<dyn MediaStorage>,
}

impl AppState {
    /// Wires every service over the same ports. `default_admin` names the
    /// account that can never be deleted.
    pub fn new(ports: Ports, default_admin: &str) -> Self {
        let Ports {
            users,
            items,
            requests,
            hasher,
            tokens,
            media,
        } = ports;
        Self {
            accounts: AccountService::new(users.clone(), hasher.clone(), tokens, media.clone()),
            verification: VerificationService::new(users.clone()),
            admin: AdminService::new(users.clone(), hasher, default_admin),
            items: ItemService::new(users.clone(), items.clone(), media),
            requests: RequestService::new(users, items, requests),
        }
    }
}

/// Router-level knobs taken from the server settings.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Allowed CORS origins; empty allows any.
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
    /// Directory served under [`HttpOptions::uploads_prefix`].
    pub media_root: PathBuf,
    pub uploads_prefix: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            body_limit_bytes: 25 * 1024 * 1024,
            media_root: PathBuf::from("./data/uploads"),
            uploads_prefix: "/uploads".into(),
        }
    }
}
