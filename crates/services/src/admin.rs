//! Admin console: dashboard counters, user listing and admin provisioning.

use std::sync::Arc;

use domains::{
    DashboardStats, DomainError, DomainResult, Identity, NewUser, PageRequest, Paginated,
    PasswordHasher, User, UserFilter, UserRepository,
};
use tracing::info;

use crate::access::require_admin;
use crate::validation::{validate, CreateAdminInput};

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    /// Username of the bootstrap admin, which can never be deleted.
    protected_username: String,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        protected_username: impl Into<String>,
    ) -> Self {
        Self {
            users,
            hasher,
            protected_username: protected_username.into(),
        }
    }

    pub async fn dashboard(&self, admin: &Identity) -> DomainResult<DashboardStats> {
        require_admin(admin)?;
        self.users.dashboard_stats().await
    }

    pub async fn list_users(
        &self,
        admin: &Identity,
        filter: UserFilter,
        page: PageRequest,
    ) -> DomainResult<Paginated<User>> {
        require_admin(admin)?;
        self.users.list_users(filter, page).await
    }

    pub async fn create_admin(&self, admin: &Identity, input: CreateAdminInput) -> DomainResult<User> {
        require_admin(admin)?;
        let input = input.normalized();
        validate(&input)?;
        if self
            .users
            .find_by_email_or_username(&input.email, &input.username)
            .await?
            .is_some()
        {
            return Err(DomainError::duplicate_account());
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let created = self
            .users
            .create(NewUser::admin(
                input.username,
                input.full_name,
                password_hash,
                input.email,
                Some(input.contact_number),
            ))
            .await?;
        info!(user_id = created.id, created_by = admin.id, "admin account created");
        Ok(created)
    }

    pub async fn list_admins(&self, admin: &Identity) -> DomainResult<Vec<User>> {
        require_admin(admin)?;
        self.users.list_admins().await
    }

    pub async fn delete_admin(&self, admin: &Identity, admin_id: i64) -> DomainResult<()> {
        require_admin(admin)?;
        let target = match self.users.find_by_id(admin_id).await? {
            Some(user) if user.is_admin() => user,
            _ => return Err(DomainError::NotFound("admin user")),
        };
        if target.username == self.protected_username {
            return Err(DomainError::Forbidden("Cannot delete the default admin user".into()));
        }
        if !self.users.delete_admin(admin_id).await? {
            return Err(DomainError::NotFound("admin user"));
        }
        info!(user_id = admin_id, deleted_by = admin.id, "admin account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{admin, admin_identity, resident, resident_identity};
    use domains::{MockPasswordHasher, MockUserRepository, Role, UserStatus};

    fn service(users: MockUserRepository, hasher: MockPasswordHasher) -> AdminService {
        AdminService::new(Arc::new(users), Arc::new(hasher), "Admin")
    }

    fn new_admin() -> CreateAdminInput {
        CreateAdminInput {
            username: "clerk".into(),
            full_name: "Barangay Clerk".into(),
            email: "clerk@example.com".into(),
            password: "Clerk1234".into(),
            contact_number: "09181234567".into(),
        }
    }

    #[tokio::test]
    async fn created_admin_is_verified_from_the_start() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email_or_username().returning(|_, _| Ok(None));
        users
            .expect_create()
            .withf(|user| {
                user.role == Role::Admin
                    && user.status == UserStatus::Approved
                    && user.is_verified
                    && user.contact_number.as_deref() == Some("09181234567")
            })
            .returning(|_| Ok(admin(8, "clerk")));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().returning(|_| Ok("argon".into()));

        let created = service(users, hasher)
            .create_admin(&admin_identity(), new_admin())
            .await
            .unwrap();
        assert_eq!(created.username, "clerk");
    }

    #[tokio::test]
    async fn missing_contact_number_is_refused() {
        let service = service(MockUserRepository::new(), MockPasswordHasher::new());
        let input = CreateAdminInput {
            contact_number: String::new(),
            ..new_admin()
        };
        let err = service.create_admin(&admin_identity(), input).await.unwrap_err();
        assert_eq!(err, DomainError::field("contact_number", "Contact number is required"));
    }

    #[tokio::test]
    async fn duplicate_admin_is_a_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email_or_username()
            .returning(|_, _| Ok(Some(resident(3, UserStatus::Approved))));
        users.expect_create().never();

        let err = service(users, MockPasswordHasher::new())
            .create_admin(&admin_identity(), new_admin())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::duplicate_account());
    }

    #[tokio::test]
    async fn default_admin_cannot_be_deleted() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(admin(id, "Admin"))));
        users.expect_delete_admin().never();

        let err = service(users, MockPasswordHasher::new())
            .delete_admin(&admin_identity(), 1)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Forbidden("Cannot delete the default admin user".into()));
    }

    #[tokio::test]
    async fn deleting_a_resident_id_is_not_found() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(resident(id, UserStatus::Approved))));
        users.expect_delete_admin().never();

        let err = service(users, MockPasswordHasher::new())
            .delete_admin(&admin_identity(), 5)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound("admin user"));
    }

    #[tokio::test]
    async fn other_admins_can_be_deleted() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(admin(id, "clerk"))));
        users.expect_delete_admin().withf(|id| *id == 8).returning(|_| Ok(true));

        service(users, MockPasswordHasher::new())
            .delete_admin(&admin_identity(), 8)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn residents_see_no_dashboard() {
        let mut users = MockUserRepository::new();
        users.expect_dashboard_stats().never();
        let err = service(users, MockPasswordHasher::new())
            .dashboard(&resident_identity(2))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
