//! Builders shared by the service unit tests.

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use domains::{
    Identity, Item, ItemCondition, ItemStatus, ItemType, Request, RequestStatus, Role, Upload, User,
    UserStatus,
};

pub fn resident(id: i64, status: UserStatus) -> User {
    let now = Utc::now();
    User {
        id,
        username: format!("res{id}"),
        full_name: format!("Resident {id}"),
        password_hash: "stored-hash".into(),
        email: format!("res{id}@example.com"),
        contact_number: Some("09171234567".into()),
        barangay: Some("San Isidro".into()),
        municipality: Some("Tanay".into()),
        province: Some("Rizal".into()),
        valid_id: Some("ids/old.png".into()),
        selfie_with_id: Some("selfies/old.png".into()),
        profile_picture: None,
        role: Role::Resident,
        status,
        is_verified: status == UserStatus::Approved,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn admin(id: i64, username: &str) -> User {
    User {
        username: username.to_string(),
        role: Role::Admin,
        status: UserStatus::Approved,
        is_verified: true,
        barangay: None,
        municipality: None,
        province: None,
        valid_id: None,
        selfie_with_id: None,
        ..resident(id, UserStatus::Approved)
    }
}

pub fn resident_identity(id: i64) -> Identity {
    resident(id, UserStatus::Approved).identity()
}

pub fn admin_identity() -> Identity {
    admin(1, "Admin").identity()
}

pub fn item(id: i64, owner_id: i64, status: ItemStatus) -> Item {
    let now = Utc::now();
    Item {
        id,
        owner_id,
        item_type: ItemType::Lending,
        name: "Ladder".into(),
        description: "Aluminium, 6 ft".into(),
        condition: ItemCondition::Good,
        photo: None,
        status,
        due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        created_at: now,
        updated_at: now,
    }
}

pub fn request(id: i64, item_id: i64, requester_id: i64, status: RequestStatus) -> Request {
    let now = Utc::now();
    Request {
        id,
        item_id,
        requester_id,
        purpose: "Fixing the roof gutter".into(),
        status,
        remarks: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn png() -> Upload {
    Upload {
        file_name: Some("photo.png".into()),
        content_type: mime::IMAGE_PNG,
        bytes: Bytes::from_static(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
    }
}
