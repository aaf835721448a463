//! # domains
//!
//! Core entities, error taxonomy and port traits for BarangayLink.
//!
//! Nothing in this crate performs I/O. Adapters implement [`ports`] and
//! services drive the workflows through them.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, FieldErrors};
pub use models::*;
pub use ports::*;
