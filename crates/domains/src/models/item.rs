use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    ItemType ("item type") {
        Donation => "donation",
        Lending => "lending",
    }
}

string_enum! {
    ItemCondition ("item condition") {
        New => "new",
        LikeNew => "like_new",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
    }
}

string_enum! {
    /// `pending → available | rejected` by an admin, `available → borrowed`
    /// only as a side effect of an approved request.
    ItemStatus ("item status") {
        Pending => "pending",
        Available => "available",
        Rejected => "rejected",
        Borrowed => "borrowed",
    }
}

/// A donate-or-lend offer posted by a resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub owner_id: i64,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub description: String,
    pub condition: ItemCondition,
    pub photo: Option<String>,
    pub status: ItemStatus,
    /// Only meaningful for lending items.
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new item. The store always inserts it as `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub owner_id: i64,
    pub item_type: ItemType,
    pub name: String,
    pub description: String,
    pub condition: ItemCondition,
    pub photo: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Item joined with the owner fields the listings display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemListing {
    #[serde(flatten)]
    pub item: Item,
    pub owner_username: Option<String>,
    pub owner_name: Option<String>,
    pub owner_barangay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

/// Catalog search over available items. Every field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub item_type: Option<ItemType>,
    pub condition: Option<ItemCondition>,
    pub barangay: Option<String>,
    /// Case-insensitive substring over name and description.
    pub q: Option<String>,
}

impl ItemFilter {
    /// The `LIKE` pattern for `q`, already lowercased; `None` when no search.
    pub fn search_pattern(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q.to_lowercase()))
    }
}

/// Admin verdict on a pending item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDecision {
    Approve,
    Reject,
}

impl ItemDecision {
    pub fn target_status(self) -> ItemStatus {
        match self {
            ItemDecision::Approve => ItemStatus::Available,
            ItemDecision::Reject => ItemStatus::Rejected,
        }
    }
}
