//! Role and verification gates shared by every service.

use domains::{DomainError, DomainResult, Identity, User, UserRepository};

pub fn require_admin(identity: &Identity) -> DomainResult<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden("Insufficient permissions".into()))
    }
}

pub fn require_resident(identity: &Identity) -> DomainResult<()> {
    if identity.is_admin() {
        Err(DomainError::Forbidden("Insufficient permissions".into()))
    } else {
        Ok(())
    }
}

/// Loads the caller's account. A token whose account has since been deleted
/// is treated as unauthenticated.
pub async fn current_user(users: &dyn UserRepository, identity: &Identity) -> DomainResult<User> {
    users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| DomainError::Unauthenticated("User not found".into()))
}

/// A resident whose stored account is verified. The token alone is not
/// trusted for this: verification can change after it was issued.
pub async fn require_verified_resident(
    users: &dyn UserRepository,
    identity: &Identity,
) -> DomainResult<User> {
    require_resident(identity)?;
    let user = current_user(users, identity).await?;
    if !user.is_verified {
        return Err(DomainError::VerificationRequired);
    }
    Ok(user)
}
