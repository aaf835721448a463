//! Account self-service: registration (and resubmission after denial),
//! login, token checks, profile maintenance and the bootstrap admin.

use std::sync::Arc;

use domains::{
    DomainError, DomainResult, Identity, MediaStorage, NewUser, PasswordHasher, ProfileUpdate,
    ResidentProfile, Role, TokenService, Upload, UploadCategory, User, UserRepository, UserStatus,
};
use tracing::{info, warn};

use crate::access;
use crate::validation::{
    validate, ChangePasswordInput, LoginInput, ProfileInput, RegisterResidentInput,
};

const BAD_CREDENTIALS: &str = "Invalid username/email or password";

/// Identity documents attached to a registration. Both are optional; on
/// resubmission a missing file keeps the one already on record.
#[derive(Debug, Clone, Default)]
pub struct ResidentDocuments {
    pub valid_id: Option<Upload>,
    pub selfie_with_id: Option<Upload>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub token: String,
    /// `true` when a denied account was reopened instead of a new one created.
    pub resubmitted: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// The admin account created when the store has none.
#[derive(Debug, Clone)]
pub struct DefaultAdmin {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    media: Arc<dyn MediaStorage>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            media,
        }
    }

    /// Verifies a bearer token.
    pub fn authenticate(&self, token: &str) -> DomainResult<Identity> {
        self.tokens.verify(token)
    }

    /// Registers a new resident, or reopens a denied one with the same email
    /// or username. Any other existing match is a duplicate.
    pub async fn register_resident(
        &self,
        input: RegisterResidentInput,
        documents: ResidentDocuments,
    ) -> DomainResult<Registration> {
        let input = input.normalized();
        validate(&input)?;
        for (category, upload) in [
            (UploadCategory::ValidId, &documents.valid_id),
            (UploadCategory::SelfieWithId, &documents.selfie_with_id),
        ] {
            if let Some(upload) = upload {
                category.check(upload)?;
            }
        }

        let reopen = match self
            .users
            .find_by_email_or_username(&input.email, &input.username)
            .await?
        {
            None => None,
            Some(existing)
                if existing.role == Role::Resident && existing.status == UserStatus::Denied =>
            {
                Some(existing.id)
            }
            Some(_) => return Err(DomainError::duplicate_account()),
        };

        let password_hash = self.hasher.hash(&input.password)?;
        let valid_id = self.store(UploadCategory::ValidId, documents.valid_id).await?;
        let selfie_with_id = self
            .store(UploadCategory::SelfieWithId, documents.selfie_with_id)
            .await?;

        let profile = ResidentProfile {
            username: input.username,
            full_name: input.full_name,
            password_hash,
            email: input.email,
            contact_number: input.contact_number,
            barangay: input.barangay,
            municipality: input.municipality,
            province: input.province,
            valid_id,
            selfie_with_id,
        };

        let (user, resubmitted) = match reopen {
            Some(id) => (self.users.resubmit(id, profile).await?, true),
            None => (self.users.create(NewUser::resident(profile)).await?, false),
        };
        info!(user_id = user.id, resubmitted, "resident registration recorded");

        let token = self.tokens.issue(&user.identity())?;
        Ok(Registration {
            user,
            token,
            resubmitted,
        })
    }

    /// Admin accounts are only ever provisioned by another admin.
    pub fn register_admin(&self) -> DomainResult<()> {
        Err(DomainError::Forbidden(
            "Admin accounts cannot be self-registered. Contact the system administrator to be provisioned."
                .into(),
        ))
    }

    /// Account status decides first: pending and denied accounts are refused
    /// whatever the password. Only then do credentials matter.
    pub async fn login(&self, input: LoginInput) -> DomainResult<Session> {
        let identifier = input.identifier()?;
        validate(&input)?;

        let Some(user) = self.users.find_by_login(&identifier).await? else {
            return Err(DomainError::Unauthenticated(BAD_CREDENTIALS.into()));
        };
        let password_ok = self.hasher.verify(&input.password, &user.password_hash);

        match user.status {
            UserStatus::Denied => {
                return Err(DomainError::Forbidden(
                    "Your account was rejected. Please resubmit your registration.".into(),
                ))
            }
            UserStatus::Pending => {
                return Err(DomainError::Forbidden("Your account is pending approval.".into()))
            }
            UserStatus::Approved => {}
        }
        if !password_ok {
            warn!(user_id = user.id, "login with wrong password");
            return Err(DomainError::Unauthenticated(BAD_CREDENTIALS.into()));
        }

        let token = self.tokens.issue(&user.identity())?;
        info!(user_id = user.id, role = %user.role, "login");
        Ok(Session { user, token })
    }

    pub async fn current_user(&self, identity: &Identity) -> DomainResult<User> {
        access::current_user(self.users.as_ref(), identity).await
    }

    pub async fn update_profile(&self, identity: &Identity, input: ProfileInput) -> DomainResult<User> {
        let input = input.normalized();
        validate(&input)?;
        let update = ProfileUpdate {
            full_name: input.full_name,
            barangay: input.barangay,
            contact_number: input.contact_number,
        };
        if update.is_empty() {
            return Err(DomainError::fields("No fields to update", Default::default()));
        }
        self.users
            .update_profile(identity.id, update)
            .await?
            .ok_or(DomainError::NotFound("user"))
    }

    pub async fn set_profile_picture(
        &self,
        identity: &Identity,
        picture: Option<Upload>,
    ) -> DomainResult<User> {
        let category = UploadCategory::ProfilePicture;
        let Some(picture) = picture else {
            return Err(DomainError::field(category.field_name(), "Profile picture is required"));
        };
        category.check(&picture)?;
        let reference = self.media.store(category, picture).await?;
        self.users
            .set_profile_picture(identity.id, &reference)
            .await?
            .ok_or(DomainError::NotFound("user"))
    }

    pub async fn change_password(&self, identity: &Identity, input: ChangePasswordInput) -> DomainResult<()> {
        input.check()?;
        let user = self.current_user(identity).await?;
        if !self.hasher.verify(&input.current_password, &user.password_hash) {
            return Err(DomainError::field(
                ChangePasswordInput::CURRENT_FIELD,
                "Current password is incorrect",
            ));
        }
        let password_hash = self.hasher.hash(&input.new_password)?;
        if !self.users.set_password_hash(user.id, &password_hash).await? {
            return Err(DomainError::NotFound("user"));
        }
        info!(user_id = user.id, "password changed");
        Ok(())
    }

    /// Creates the bootstrap admin when no admin exists yet. Returns the new
    /// account, or `None` when there was nothing to do.
    pub async fn ensure_default_admin(&self, admin: &DefaultAdmin) -> DomainResult<Option<User>> {
        if self.users.count_admins().await? > 0 {
            return Ok(None);
        }
        let password_hash = self.hasher.hash(&admin.password)?;
        let user = self
            .users
            .create(NewUser::admin(
                admin.username.clone(),
                admin.full_name.clone(),
                password_hash,
                admin.email.clone(),
                None,
            ))
            .await?;
        info!(user_id = user.id, username = %user.username, "default admin created");
        Ok(Some(user))
    }

    async fn store(&self, category: UploadCategory, upload: Option<Upload>) -> DomainResult<Option<String>> {
        match upload {
            Some(upload) => self.media.store(category, upload).await.map(Some),
            None => Ok(None),
        }
    }
}
