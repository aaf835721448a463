//! # services
//!
//! The three status workflows (account verification, items, requests) and
//! the account self-service around them. Every service holds its ports as
//! `Arc<dyn …>` and is backend-agnostic; the HTTP layer only translates
//! requests into these calls.

pub mod access;
pub mod accounts;
pub mod admin;
pub mod items;
pub mod requests;
pub mod validation;
pub mod verification;

pub use accounts::{AccountService, DefaultAdmin, Registration, ResidentDocuments, Session};
pub use admin::AdminService;
pub use items::ItemService;
pub use requests::RequestService;
pub use validation::{
    ChangePasswordInput, CreateAdminInput, LoginInput, NewItemInput, NewRequestInput, ProfileInput,
    RegisterResidentInput,
};
pub use verification::VerificationService;

#[cfg(test)]
pub(crate) mod fixtures;
