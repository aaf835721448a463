//! Row shapes shared by both backends and their conversion into domain
//! models. Enum columns come back as text and are parsed here; a value the
//! domain does not know is an internal error, never a silent default.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use domains::{
    DashboardStats, DomainError, DomainResult, Item, ItemListing, Request, RequestDetail, User,
    UserRejection,
};

fn parse<T>(value: &str) -> DomainResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err: T::Err| {
        tracing::error!(error = %err, "corrupt enum column");
        DomainError::internal(err)
    })
}

fn parse_opt<T>(value: Option<&str>) -> DomainResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map(parse).transpose()
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
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
    pub profile_picture: Option<String>,
    pub role: String,
    pub status: String,
    pub is_verified: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> DomainResult<Self> {
        Ok(User {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            password_hash: row.password_hash,
            email: row.email,
            contact_number: row.contact_number,
            barangay: row.barangay,
            municipality: row.municipality,
            province: row.province,
            valid_id: row.valid_id,
            selfie_with_id: row.selfie_with_id,
            profile_picture: row.profile_picture,
            role: parse(&row.role)?,
            status: parse(&row.status)?,
            is_verified: row.is_verified,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRejectionRow {
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

impl From<UserRejectionRow> for UserRejection {
    fn from(row: UserRejectionRow) -> Self {
        UserRejection {
            id: row.id,
            user_id: row.user_id,
            reason: row.reason,
            snapshot_full_name: row.snapshot_full_name,
            snapshot_email: row.snapshot_email,
            snapshot_barangay: row.snapshot_barangay,
            snapshot_municipality: row.snapshot_municipality,
            snapshot_province: row.snapshot_province,
            snapshot_contact_number: row.snapshot_contact_number,
            snapshot_valid_id: row.snapshot_valid_id,
            snapshot_selfie_with_id: row.snapshot_selfie_with_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StatsRow {
    pub pending_verifications: i64,
    pub approved_residents: i64,
    pub rejected_residents: i64,
    pub total_residents: i64,
    pub total_admins: i64,
}

impl From<StatsRow> for DashboardStats {
    fn from(row: StatsRow) -> Self {
        DashboardStats {
            pending_verifications: row.pending_verifications,
            approved_residents: row.approved_residents,
            rejected_residents: row.rejected_residents,
            total_residents: row.total_residents,
            total_admins: row.total_admins,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub id: i64,
    pub owner_id: i64,
    pub item_type: String,
    pub name: String,
    pub description: String,
    pub item_condition: String,
    pub photo: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = DomainError;

    fn try_from(row: ItemRow) -> DomainResult<Self> {
        Ok(Item {
            id: row.id,
            owner_id: row.owner_id,
            item_type: parse(&row.item_type)?,
            name: row.name,
            description: row.description,
            condition: parse(&row.item_condition)?,
            photo: row.photo,
            status: parse(&row.status)?,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemListingRow {
    #[sqlx(flatten)]
    pub item: ItemRow,
    pub owner_username: Option<String>,
    pub owner_name: Option<String>,
    pub owner_barangay: Option<String>,
    pub owner_email: Option<String>,
}

impl TryFrom<ItemListingRow> for ItemListing {
    type Error = DomainError;

    fn try_from(row: ItemListingRow) -> DomainResult<Self> {
        Ok(ItemListing {
            item: row.item.try_into()?,
            owner_username: row.owner_username,
            owner_name: row.owner_name,
            owner_barangay: row.owner_barangay,
            owner_email: row.owner_email,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RequestRow {
    pub id: i64,
    pub item_id: i64,
    pub requester_id: i64,
    pub purpose: String,
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for Request {
    type Error = DomainError;

    fn try_from(row: RequestRow) -> DomainResult<Self> {
        Ok(Request {
            id: row.id,
            item_id: row.item_id,
            requester_id: row.requester_id,
            purpose: row.purpose,
            status: parse(&row.status)?,
            remarks: row.remarks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RequestDetailRow {
    #[sqlx(flatten)]
    pub request: RequestRow,
    pub item_name: Option<String>,
    pub item_type: Option<String>,
    pub item_condition: Option<String>,
    pub item_photo: Option<String>,
    pub requester_username: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub requester_barangay: Option<String>,
}

impl TryFrom<RequestDetailRow> for RequestDetail {
    type Error = DomainError;

    fn try_from(row: RequestDetailRow) -> DomainResult<Self> {
        Ok(RequestDetail {
            request: row.request.try_into()?,
            item_name: row.item_name,
            item_type: parse_opt(row.item_type.as_deref())?,
            item_condition: parse_opt(row.item_condition.as_deref())?,
            item_photo: row.item_photo,
            requester_username: row.requester_username,
            requester_name: row.requester_name,
            requester_email: row.requester_email,
            requester_barangay: row.requester_barangay,
        })
    }
}

/// Converts a batch of rows, failing on the first corrupt one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> DomainResult<Vec<T>>
where
    T: TryFrom<R, Error = DomainError>,
{
    rows.into_iter().map(T::try_from).collect()
}
