use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockscan_core::UserId;
use stockscan_inventory::InventoryItem;

use super::{InventoryStore, StoreError, ensure_positive};

/// In-memory user-isolated store for tests/dev.
///
/// Keyed by `(user, name)` in a `BTreeMap`, so listing a user's records is a
/// range scan that comes back ordered by name.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<BTreeMap<(UserId, String), u64>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn list(&self, user: UserId) -> Result<Vec<InventoryItem>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .range((user, String::new())..)
            .take_while(|((owner, _), _)| *owner == user)
            .map(|((_, name), quantity)| InventoryItem::new(name.clone(), *quantity))
            .collect())
    }

    async fn get(&self, user: UserId, name: &str) -> Result<Option<u64>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&(user, name.to_string())).copied())
    }

    async fn set(&self, user: UserId, name: &str, quantity: u64) -> Result<(), StoreError> {
        ensure_positive(name, quantity)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert((user, name.to_string()), quantity);
        Ok(())
    }

    async fn delete(&self, user: UserId, name: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&(user, name.to_string()));
        Ok(())
    }
}
