use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemCondition, ItemType};

string_enum! {
    /// `pending → approved | denied`, both terminal.
    RequestStatus ("request status") {
        Pending => "pending",
        Approved => "approved",
        Denied => "denied",
    }
}

/// A resident's ask to receive or borrow a specific item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: i64,
    pub item_id: i64,
    pub requester_id: i64,
    pub purpose: String,
    pub status: RequestStatus,
    /// Admin note; required on denial, optional on approval.
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub item_id: i64,
    pub requester_id: i64,
    pub purpose: String,
}

/// Request joined with item and requester details for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: Request,
    pub item_name: Option<String>,
    pub item_type: Option<ItemType>,
    pub item_condition: Option<ItemCondition>,
    pub item_photo: Option<String>,
    pub requester_username: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub requester_barangay: Option<String>,
}

/// Admin request listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    /// Case-insensitive substring over item name, requester name and email.
    pub search: Option<String>,
}

impl RequestFilter {
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()))
    }
}
