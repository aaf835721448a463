//! Borrow/receive requests: residents ask, admins decide. Approval borrows
//! the item in the same store transaction.

use std::sync::Arc;

use domains::{
    DomainError, DomainResult, FieldErrors, Identity, ItemRepository, ItemStatus, NewRequest,
    PageRequest, Paginated, Request, RequestDetail, RequestFilter, RequestRepository,
    UserRepository,
};
use tracing::info;

use crate::access::{self, require_admin, require_resident};
use crate::validation::{validate, NewRequestInput};

#[derive(Clone)]
pub struct RequestService {
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
    requests: Arc<dyn RequestRepository>,
}

impl RequestService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        items: Arc<dyn ItemRepository>,
        requests: Arc<dyn RequestRepository>,
    ) -> Self {
        Self {
            users,
            items,
            requests,
        }
    }

    pub async fn create(&self, identity: &Identity, input: NewRequestInput) -> DomainResult<Request> {
        let requester = access::require_verified_resident(self.users.as_ref(), identity).await?;

        let purpose_missing = input.purpose.trim().is_empty();
        let Some(item_id) = input.item_id.filter(|_| !purpose_missing) else {
            let mut fields = FieldErrors::new();
            if input.item_id.is_none() {
                fields.insert("item_id".into(), "Item ID is required".into());
            }
            if purpose_missing {
                fields.insert("purpose".into(), "Purpose is required".into());
            }
            return Err(DomainError::fields("Item ID and purpose are required", fields));
        };
        validate(&input)?;

        let available = self
            .items
            .find_by_id(item_id)
            .await?
            .is_some_and(|item| item.status == ItemStatus::Available);
        if !available {
            return Err(DomainError::field("item_id", "Item not found or not available"));
        }
        if self.requests.has_pending(item_id, requester.id).await? {
            return Err(DomainError::duplicate_request());
        }

        let request = self
            .requests
            .create(NewRequest {
                item_id,
                requester_id: requester.id,
                purpose: input.purpose.trim().to_string(),
            })
            .await?;
        info!(request_id = request.id, item_id, requester_id = requester.id, "request submitted");
        Ok(request)
    }

    pub async fn list_admin(
        &self,
        admin: &Identity,
        filter: RequestFilter,
        page: PageRequest,
    ) -> DomainResult<Paginated<RequestDetail>> {
        require_admin(admin)?;
        self.requests.list(filter, page).await
    }

    pub async fn list_mine(&self, identity: &Identity) -> DomainResult<Vec<RequestDetail>> {
        require_resident(identity)?;
        self.requests.list_for_requester(identity.id).await
    }

    /// Visible to the requester and to admins only.
    pub async fn detail(&self, identity: &Identity, request_id: i64) -> DomainResult<RequestDetail> {
        let detail = self
            .requests
            .find_detail(request_id)
            .await?
            .ok_or(DomainError::NotFound("request"))?;
        if !identity.is_admin() && detail.request.requester_id != identity.id {
            return Err(DomainError::Forbidden("Access denied".into()));
        }
        Ok(detail)
    }

    pub async fn approve(&self, admin: &Identity, request_id: i64, remarks: Option<String>) -> DomainResult<Request> {
        require_admin(admin)?;
        let remarks = remarks
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let request = self.requests.approve(request_id, remarks).await?;
        info!(request_id, item_id = request.item_id, admin_id = admin.id, "request approved, item borrowed");
        Ok(request)
    }

    pub async fn deny(&self, admin: &Identity, request_id: i64, remarks: Option<String>) -> DomainResult<Request> {
        require_admin(admin)?;
        let remarks = remarks.as_deref().map(str::trim).unwrap_or_default();
        if remarks.is_empty() {
            return Err(DomainError::field("remarks", "Rejection remarks are required"));
        }
        let request = self.requests.deny(request_id, remarks.to_string()).await?;
        info!(request_id, admin_id = admin.id, "request denied");
        Ok(request)
    }
}
