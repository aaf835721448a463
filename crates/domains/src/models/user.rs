use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Account role. Admins never pass through the verification workflow.
    Role ("role") {
        Resident => "resident",
        Admin => "admin",
    }
}

string_enum! {
    /// Verification lifecycle: `pending → approved` or `pending → denied`.
    /// A denied account can be reopened by resubmitting the registration.
    UserStatus ("user status") {
        Pending => "pending",
        Approved => "approved",
        Denied => "denied",
    }
}

/// A person account, resident or admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub barangay: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    /// Media reference of the uploaded government ID.
    pub valid_id: Option<String>,
    /// Media reference of the selfie holding the ID.
    pub selfie_with_id: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    /// Kept in lockstep with `status` by every transition.
    pub is_verified: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            name: self.full_name.clone(),
        }
    }
}

/// The authenticated caller, as embedded in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Row to insert for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub barangay: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub valid_id: Option<String>,
    pub selfie_with_id: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub is_verified: bool,
}

/// Profile and document fields shared by registration and resubmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentProfile {
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub email: String,
    pub contact_number: String,
    pub barangay: String,
    pub municipality: String,
    pub province: String,
    pub valid_id: Option<String>,
    pub selfie_with_id: Option<String>,
}

impl NewUser {
    /// Self-registered resident: always starts `pending` and unverified.
    pub fn resident(profile: ResidentProfile) -> Self {
        NewUser {
            username: profile.username,
            full_name: profile.full_name,
            password_hash: profile.password_hash,
            email: profile.email,
            contact_number: Some(profile.contact_number),
            barangay: Some(profile.barangay),
            municipality: Some(profile.municipality),
            province: Some(profile.province),
            valid_id: profile.valid_id,
            selfie_with_id: profile.selfie_with_id,
            role: Role::Resident,
            status: UserStatus::Pending,
            is_verified: false,
        }
    }

    /// Admin-provisioned account: approved and verified from the start.
    pub fn admin(
        username: String,
        full_name: String,
        password_hash: String,
        email: String,
        contact_number: Option<String>,
    ) -> Self {
        NewUser {
            username,
            full_name,
            password_hash,
            email,
            contact_number,
            barangay: None,
            municipality: None,
            province: None,
            valid_id: None,
            selfie_with_id: None,
            role: Role::Admin,
            status: UserStatus::Approved,
            is_verified: true,
        }
    }
}

/// Append-only audit snapshot taken on rejection or resubmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRejection {
    pub id: i64,
    pub user_id: i64,
    pub reason: String,
    pub snapshot_full_name: Option<String>,
    pub snapshot_email: Option<String>,
    pub snapshot_barangay: Option<String>,
    pub snapshot_municipality: Option<String>,
    pub snapshot_province: Option<String>,
    pub snapshot_contact_number: Option<String>,
    pub snapshot_valid_id: Option<String>,
    pub snapshot_selfie_with_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// How a caller identifies themselves at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Username(String),
}

/// Partial self-service profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub barangay: Option<String>,
    pub contact_number: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.barangay.is_none() && self.contact_number.is_none()
    }
}

/// Admin user listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub pending_verifications: i64,
    pub approved_residents: i64,
    pub rejected_residents: i64,
    pub total_residents: i64,
    pub total_admins: i64,
}
