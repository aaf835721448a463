//! Item catalog: residents offer, admins review, everyone browses.

use std::sync::Arc;

use chrono::NaiveDate;
use domains::{
    DomainError, DomainResult, FieldErrors, Identity, Item, ItemCondition, ItemDecision,
    ItemFilter, ItemListing, ItemRepository, ItemType, MediaStorage, NewItem, Upload,
    UploadCategory, UserRepository,
};
use tracing::info;

use crate::access::{self, require_admin, require_resident};
use crate::validation::{trimmed, NewItemInput};

#[derive(Clone)]
pub struct ItemService {
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
    media: Arc<dyn MediaStorage>,
}

impl ItemService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        items: Arc<dyn ItemRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self { users, items, media }
    }

    /// Posts an offer from a verified resident. It always enters the catalog
    /// as `pending`; lending needs a due date, donations drop it.
    pub async fn create(
        &self,
        identity: &Identity,
        input: NewItemInput,
        photo: Option<Upload>,
    ) -> DomainResult<Item> {
        let owner = access::require_verified_resident(self.users.as_ref(), identity).await?;
        let mut item = parse_new_item(owner.id, input)?;

        if let Some(photo) = photo {
            UploadCategory::ItemPhoto.check(&photo)?;
            item.photo = Some(self.media.store(UploadCategory::ItemPhoto, photo).await?);
        }

        let item = self.items.create(item).await?;
        info!(item_id = item.id, owner_id = owner.id, item_type = %item.item_type, "item submitted");
        Ok(item)
    }

    /// Available items matching every filter, newest first.
    pub async fn list_available(&self, _caller: &Identity, filter: ItemFilter) -> DomainResult<Vec<ItemListing>> {
        self.items.list_available(filter).await
    }

    pub async fn list_mine(&self, identity: &Identity) -> DomainResult<Vec<Item>> {
        require_resident(identity)?;
        self.items.list_by_owner(identity.id).await
    }

    pub async fn list_pending(&self, admin: &Identity) -> DomainResult<Vec<ItemListing>> {
        require_admin(admin)?;
        self.items.list_pending().await
    }

    pub async fn approve(&self, admin: &Identity, item_id: i64) -> DomainResult<Item> {
        self.review(admin, item_id, ItemDecision::Approve).await
    }

    pub async fn reject(&self, admin: &Identity, item_id: i64) -> DomainResult<Item> {
        self.review(admin, item_id, ItemDecision::Reject).await
    }

    async fn review(&self, admin: &Identity, item_id: i64, decision: ItemDecision) -> DomainResult<Item> {
        require_admin(admin)?;
        let item = self.items.review(item_id, decision).await?;
        info!(item_id, admin_id = admin.id, status = %item.status, "item reviewed");
        Ok(item)
    }
}

fn parse_new_item(owner_id: i64, input: NewItemInput) -> DomainResult<NewItem> {
    let raw_type = trimmed(input.item_type);
    let name = trimmed(input.name);
    let raw_condition = trimmed(input.condition);

    let mut missing = FieldErrors::new();
    if raw_type.is_none() {
        missing.insert("type".into(), "Type is required".into());
    }
    if name.is_none() {
        missing.insert("name".into(), "Item name is required".into());
    }
    if raw_condition.is_none() {
        missing.insert("condition".into(), "Condition is required".into());
    }
    let (Some(raw_type), Some(name), Some(raw_condition)) = (raw_type, name, raw_condition) else {
        return Err(DomainError::fields("type, name and condition are required", missing));
    };

    let item_type: ItemType = raw_type
        .parse()
        .map_err(|_| DomainError::field("type", "Type must be donation or lending"))?;
    let condition: ItemCondition = raw_condition.parse().map_err(|_| {
        DomainError::field("condition", "Condition must be one of new, like_new, good, fair, poor")
    })?;

    let due_date = match item_type {
        ItemType::Donation => None,
        ItemType::Lending => {
            let Some(raw) = trimmed(input.due_date) else {
                return Err(DomainError::field("due_date", "Due date is required for lending items"));
            };
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                DomainError::field("due_date", "Due date must be a valid date (YYYY-MM-DD)")
            })?;
            Some(date)
        }
    };

    Ok(NewItem {
        owner_id,
        item_type,
        name,
        description: input.description.map(|d| d.trim().to_string()).unwrap_or_default(),
        condition,
        photo: None,
        due_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{admin_identity, item, png, resident, resident_identity};
    use domains::{ItemStatus, MockItemRepository, MockMediaStorage, MockUserRepository, UserStatus};

    fn verified_users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(resident(id, UserStatus::Approved))));
        users
    }

    fn service(users: MockUserRepository, items: MockItemRepository, media: MockMediaStorage) -> ItemService {
        ItemService::new(Arc::new(users), Arc::new(items), Arc::new(media))
    }

    fn lending() -> NewItemInput {
        NewItemInput {
            item_type: Some("lending".into()),
            name: Some("Ladder".into()),
            description: None,
            condition: Some("good".into()),
            due_date: Some("2025-06-30".into()),
        }
    }

    #[test]
    fn missing_basics_are_reported_together() {
        let err = parse_new_item(2, NewItemInput::default()).unwrap_err();
        match err {
            DomainError::Validation { message, fields } => {
                assert_eq!(message, "type, name and condition are required");
                assert_eq!(fields.len(), 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lending_without_due_date_is_refused() {
        let input = NewItemInput {
            due_date: None,
            ..lending()
        };
        assert_eq!(
            parse_new_item(2, input).unwrap_err(),
            DomainError::field("due_date", "Due date is required for lending items")
        );
    }

    #[test]
    fn donation_discards_due_date() {
        let input = NewItemInput {
            item_type: Some("donation".into()),
            ..lending()
        };
        let item = parse_new_item(2, input).unwrap();
        assert_eq!(item.item_type, ItemType::Donation);
        assert_eq!(item.due_date, None);
        assert_eq!(item.description, "");
    }

    #[test]
    fn unknown_condition_names_the_field() {
        let input = NewItemInput {
            condition: Some("broken".into()),
            ..lending()
        };
        assert!(matches!(
            parse_new_item(2, input).unwrap_err(),
            DomainError::Validation { fields, .. } if fields.contains_key("condition")
        ));
    }

    #[tokio::test]
    async fn unverified_resident_cannot_post() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(resident(id, UserStatus::Pending))));
        let mut items = MockItemRepository::new();
        items.expect_create().never();

        let err = service(users, items, MockMediaStorage::new())
            .create(&resident_identity(2), lending(), None)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::VerificationRequired);
    }

    #[tokio::test]
    async fn admins_cannot_post_items() {
        let err = service(MockUserRepository::new(), MockItemRepository::new(), MockMediaStorage::new())
            .create(&admin_identity(), lending(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn photo_is_stored_and_item_starts_pending() {
        let mut media = MockMediaStorage::new();
        media
            .expect_store()
            .withf(|category, _| *category == UploadCategory::ItemPhoto)
            .returning(|_, _| Ok("items/abc.png".into()));
        let mut items = MockItemRepository::new();
        items
            .expect_create()
            .withf(|new| new.owner_id == 2 && new.photo.as_deref() == Some("items/abc.png"))
            .returning(|new| {
                let mut created = item(11, new.owner_id, ItemStatus::Pending);
                created.photo = new.photo;
                Ok(created)
            });

        let created = service(verified_users(), items, media)
            .create(&resident_identity(2), lending(), Some(png()))
            .await
            .unwrap();
        assert_eq!(created.status, ItemStatus::Pending);
        assert_eq!(created.photo.as_deref(), Some("items/abc.png"));
    }

    #[tokio::test]
    async fn review_requires_admin() {
        let mut items = MockItemRepository::new();
        items.expect_review().never();
        let err = service(MockUserRepository::new(), items, MockMediaStorage::new())
            .approve(&resident_identity(2), 11)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn reject_maps_to_rejected_decision() {
        let mut items = MockItemRepository::new();
        items
            .expect_review()
            .withf(|id, decision| *id == 11 && *decision == ItemDecision::Reject)
            .returning(|id, _| Ok(item(id, 2, ItemStatus::Rejected)));

        let reviewed = service(MockUserRepository::new(), items, MockMediaStorage::new())
            .reject(&admin_identity(), 11)
            .await
            .unwrap();
        assert_eq!(reviewed.status, ItemStatus::Rejected);
    }
}
