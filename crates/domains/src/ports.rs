//! # Ports
//!
//! Every adapter implements these traits; services only ever see
//! `Arc<dyn Port>`. Store-backed ports run each multi-row effect inside a
//! single transaction so callers never observe a half-applied transition.

use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::{
    DashboardStats, Identity, Item, ItemDecision, ItemFilter, ItemListing, LoginIdentifier,
    NewItem, NewRequest, NewUser, PageRequest, Paginated, ProfileUpdate, Request, RequestDetail,
    RequestFilter, ResidentProfile, Upload, UploadCategory, User, UserFilter, UserRejection,
};

/// Persistence contract for accounts and the verification audit trail.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>>;
    async fn find_by_login(&self, login: &LoginIdentifier) -> DomainResult<Option<User>>;
    /// First account whose email or username matches either value.
    async fn find_by_email_or_username(&self, email: &str, username: &str) -> DomainResult<Option<User>>;

    /// Inserts the account. Duplicate username/email → `Conflict`.
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    /// Reopens a `denied` resident: snapshots the prior profile into the audit
    /// table, overwrites it and resets to `pending`. Documents left as `None`
    /// keep the previously stored reference.
    async fn resubmit(&self, user_id: i64, profile: ResidentProfile) -> DomainResult<User>;

    /// `pending → approved` for residents only.
    async fn approve_resident(&self, user_id: i64) -> DomainResult<User>;

    /// `pending → denied` with an audit snapshot written in the same transaction.
    async fn reject_resident(&self, user_id: i64, reason: &str) -> DomainResult<User>;

    /// Audit rows for a user, newest first.
    async fn rejection_history(&self, user_id: i64) -> DomainResult<Vec<UserRejection>>;

    /// Residents awaiting review, oldest first.
    async fn list_pending_residents(&self) -> DomainResult<Vec<User>>;
    async fn list_users(&self, filter: UserFilter, page: PageRequest) -> DomainResult<Paginated<User>>;
    async fn list_admins(&self) -> DomainResult<Vec<User>>;
    async fn count_admins(&self) -> DomainResult<i64>;
    /// Returns `false` when no admin with that id existed.
    async fn delete_admin(&self, admin_id: i64) -> DomainResult<bool>;

    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> DomainResult<Option<User>>;
    async fn set_profile_picture(&self, user_id: i64, reference: &str) -> DomainResult<Option<User>>;
    async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> DomainResult<bool>;

    async fn dashboard_stats(&self) -> DomainResult<DashboardStats>;
}

/// Persistence contract for the item catalog.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Inserts with status `pending`, whatever the caller intends.
    async fn create(&self, item: NewItem) -> DomainResult<Item>;
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Item>>;
    /// `available` items only, newest first.
    async fn list_available(&self, filter: ItemFilter) -> DomainResult<Vec<ItemListing>>;
    async fn list_by_owner(&self, owner_id: i64) -> DomainResult<Vec<Item>>;
    /// `pending` items, oldest first, with owner email.
    async fn list_pending(&self) -> DomainResult<Vec<ItemListing>>;
    /// Conditional `pending → available | rejected`.
    async fn review(&self, id: i64, decision: ItemDecision) -> DomainResult<Item>;
}

/// Persistence contract for borrow/receive requests.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn has_pending(&self, item_id: i64, requester_id: i64) -> DomainResult<bool>;
    /// Inserts a `pending` request. A concurrent duplicate → `Conflict`.
    async fn create(&self, request: NewRequest) -> DomainResult<Request>;
    async fn find_detail(&self, id: i64) -> DomainResult<Option<RequestDetail>>;
    async fn list_for_requester(&self, requester_id: i64) -> DomainResult<Vec<RequestDetail>>;
    async fn list(&self, filter: RequestFilter, page: PageRequest) -> DomainResult<Paginated<RequestDetail>>;

    /// Approves a pending request and marks its item `borrowed` atomically.
    /// Fails with `InvalidState` when the item is no longer `available`,
    /// leaving both rows untouched.
    async fn approve(&self, id: i64, remarks: Option<String>) -> DomainResult<Request>;
    async fn deny(&self, id: i64, remarks: String) -> DomainResult<Request>;
}

/// One-way password hashing with constant-time verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> DomainResult<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Signed bearer tokens carrying an [`Identity`].
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, identity: &Identity) -> DomainResult<String>;
    /// Tampered or expired tokens → `InvalidToken`.
    fn verify(&self, token: &str) -> DomainResult<Identity>;
}

/// Storage for uploaded documents and photos.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persists the upload and returns a stable reference to store on the row.
    /// The reference is a path relative to the public uploads prefix.
    async fn store(&self, category: UploadCategory, upload: Upload) -> DomainResult<String>;
}
