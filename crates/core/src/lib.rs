//! `stockscan-core` — shared domain building blocks.
//!
//! Identifiers and the domain error model. No IO lives here.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{SessionId, UserId};
