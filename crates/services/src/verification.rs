//! Admin review of resident accounts: `pending → approved | denied`.

use std::sync::Arc;

use domains::{DomainError, DomainResult, Identity, Role, User, UserRejection, UserRepository};
use tracing::info;

use crate::access::require_admin;

#[derive(Clone)]
pub struct VerificationService {
    users: Arc<dyn UserRepository>,
}

impl VerificationService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Residents awaiting review, oldest first.
    pub async fn list_pending(&self, admin: &Identity) -> DomainResult<Vec<User>> {
        require_admin(admin)?;
        self.users.list_pending_residents().await
    }

    pub async fn detail(&self, admin: &Identity, user_id: i64) -> DomainResult<User> {
        require_admin(admin)?;
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.role == Role::Resident => Ok(user),
            _ => Err(DomainError::NotFound("user")),
        }
    }

    pub async fn approve(&self, admin: &Identity, user_id: i64) -> DomainResult<User> {
        require_admin(admin)?;
        let user = self.users.approve_resident(user_id).await?;
        info!(user_id, admin_id = admin.id, "resident approved");
        Ok(user)
    }

    pub async fn reject(&self, admin: &Identity, user_id: i64, reason: Option<String>) -> DomainResult<User> {
        require_admin(admin)?;
        let reason = reason.as_deref().map(str::trim).unwrap_or_default();
        if reason.is_empty() {
            return Err(DomainError::field("reason", "Rejection reason is required"));
        }
        let user = self.users.reject_resident(user_id, reason).await?;
        info!(user_id, admin_id = admin.id, "resident rejected");
        Ok(user)
    }

    /// Audit trail of rejections and resubmissions, newest first.
    pub async fn history(&self, admin: &Identity, user_id: i64) -> DomainResult<Vec<UserRejection>> {
        require_admin(admin)?;
        self.users.rejection_history(user_id).await
    }
}
