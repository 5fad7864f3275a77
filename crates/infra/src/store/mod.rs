//! Per-user inventory record storage.
//!
//! The store is a plain keyed CRUD boundary: no multi-key transactions, no
//! merge logic. Keys are canonical item names; callers normalize first.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockscan_core::UserId;
use stockscan_inventory::InventoryItem;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// User-isolated key/value store for inventory records.
///
/// Every call is independent; last writer wins.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All records of `user`, ordered by name.
    async fn list(&self, user: UserId) -> Result<Vec<InventoryItem>, StoreError>;

    async fn get(&self, user: UserId, name: &str) -> Result<Option<u64>, StoreError>;

    /// Create or overwrite. `quantity` must be > 0.
    async fn set(&self, user: UserId, name: &str, quantity: u64) -> Result<(), StoreError>;

    /// Remove the record; deleting a missing record is not an error.
    async fn delete(&self, user: UserId, name: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn list(&self, user: UserId) -> Result<Vec<InventoryItem>, StoreError> {
        (**self).list(user).await
    }

    async fn get(&self, user: UserId, name: &str) -> Result<Option<u64>, StoreError> {
        (**self).get(user, name).await
    }

    async fn set(&self, user: UserId, name: &str, quantity: u64) -> Result<(), StoreError> {
        (**self).set(user, name, quantity).await
    }

    async fn delete(&self, user: UserId, name: &str) -> Result<(), StoreError> {
        (**self).delete(user, name).await
    }
}

pub(crate) fn ensure_positive(name: &str, quantity: u64) -> Result<(), StoreError> {
    if quantity == 0 {
        return Err(StoreError::InvalidRecord(format!(
            "refusing to persist '{name}' with quantity 0"
        )));
    }
    Ok(())
}
