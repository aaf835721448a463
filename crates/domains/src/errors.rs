//! # DomainError
//!
//! Centralized error handling for BarangayLink.
//! Every port and service returns [`DomainResult`]; the HTTP layer maps each
//! variant to a status code and a JSON body.

use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → human readable message, reported back to the caller as-is.
pub type FieldErrors = BTreeMap<String, String>;

/// The primary error type for all domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input. Never mutates state.
    #[error("validation error: {message}")]
    Validation { message: String, fields: FieldErrors },

    /// No usable credentials were supplied, or they did not match.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The bearer token was tampered with or has expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Authenticated, but the role or account state does not allow the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A resident tried a verified-only action before admin approval.
    #[error("account verification required")]
    VerificationRequired,

    /// The entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The entity exists but is not in the state the transition requires.
    #[error("{entity} is not {expected}")]
    InvalidState {
        entity: &'static str,
        expected: &'static str,
    },

    /// A uniqueness rule was violated (duplicate username, pending request, ...).
    #[error("conflict: {message}")]
    Conflict { message: String, fields: FieldErrors },

    /// Infrastructure failure (store, filesystem, hashing). Details stay in logs.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Single-field validation failure; the field message doubles as the summary.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.clone());
        DomainError::Validation { message, fields }
    }

    /// Validation failure over several fields with an explicit summary.
    pub fn fields(message: impl Into<String>, fields: FieldErrors) -> Self {
        DomainError::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        DomainError::Internal(err.to_string())
    }

    /// Duplicate username/email on registration or admin creation.
    pub fn duplicate_account() -> Self {
        let mut fields = FieldErrors::new();
        fields.insert("email".into(), "Email already exists".into());
        fields.insert("username".into(), "Username already exists".into());
        DomainError::Conflict {
            message: "Email or username already exists".into(),
            fields,
        }
    }

    /// The requester already has an open request on the item.
    pub fn duplicate_request() -> Self {
        let message = "You already have a pending request for this item";
        let mut fields = FieldErrors::new();
        fields.insert("item_id".into(), message.into());
        DomainError::Conflict {
            message: message.into(),
            fields,
        }
    }
}

/// A specialized Result type for BarangayLink logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
