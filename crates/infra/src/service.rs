//! Inventory service: the write paths of the application.
//!
//! Every mutation runs normalize → merge → write-back → reload, and returns
//! the freshly reloaded inventory so callers never apply optimistic updates.

use std::sync::Arc;

use thiserror::Error;

use stockscan_core::{DomainError, UserId};
use stockscan_inventory::{
    InventoryItem, ItemName, ScanSelection, WriteOp, adjust_one, merge, selected_deltas,
    write_back_plan,
};

use crate::store::{InventoryStore, StoreError};
use crate::writeback::{WriteBackReport, apply_write_back};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reloaded inventory plus what happened during write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub inventory: Vec<InventoryItem>,
    pub report: WriteBackReport,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        &self.store
    }

    pub async fn load(&self, user: UserId) -> Result<Vec<InventoryItem>, ServiceError> {
        self.store.list(user).await.map_err(|err| {
            tracing::warn!(user_id = %user, error = %err, "failed to load inventory");
            ServiceError::Store(err)
        })
    }

    /// Increment `name` by one, creating it at 1 when absent.
    pub async fn add_one(&self, user: UserId, name: &str) -> Result<MutationOutcome, ServiceError> {
        self.adjust(user, name, 1).await
    }

    /// Decrement `name` by one, deleting it when it reaches 0.
    pub async fn remove_one(&self, user: UserId, name: &str) -> Result<MutationOutcome, ServiceError> {
        self.adjust(user, name, -1).await
    }

    /// Remove the record outright. Deleting an unknown name is a no-op.
    pub async fn delete(&self, user: UserId, name: &str) -> Result<MutationOutcome, ServiceError> {
        let name = ItemName::try_from(name)?;
        let plan = [WriteOp::Delete {
            name: name.into_inner(),
        }];
        self.write_single(user, &plan).await
    }

    /// Merge the selected scan entries into the stored inventory.
    ///
    /// The current inventory is read fresh from the store. Individual write
    /// failures are collected in the report; the rest are still applied.
    pub async fn import(
        &self,
        user: UserId,
        selections: &[ScanSelection],
    ) -> Result<MutationOutcome, ServiceError> {
        let incoming = selected_deltas(selections);
        if incoming.is_empty() {
            return Ok(MutationOutcome {
                inventory: self.load(user).await?,
                report: WriteBackReport::default(),
            });
        }

        let current = self.load(user).await?;
        let merged = merge(&current, &incoming);
        let plan = write_back_plan(&merged);

        let report = apply_write_back(self.store.as_ref(), user, &plan).await;
        tracing::info!(
            user_id = %user,
            imported = incoming.len(),
            applied = report.applied,
            failed = report.failures.len(),
            "scan import applied"
        );

        Ok(MutationOutcome {
            inventory: self.load(user).await?,
            report,
        })
    }

    async fn adjust(&self, user: UserId, name: &str, delta: i64) -> Result<MutationOutcome, ServiceError> {
        let name = ItemName::try_from(name)?;
        let stored = self.store.get(user, name.as_str()).await.map_err(|err| {
            tracing::warn!(user_id = %user, item = %name, error = %err, "failed to read item");
            ServiceError::Store(err)
        })?;

        match adjust_one(name.as_str(), stored, delta) {
            Some(op) => self.write_single(user, &[op]).await,
            None => Ok(MutationOutcome {
                inventory: self.load(user).await?,
                report: WriteBackReport::default(),
            }),
        }
    }

    /// Single-record writes surface their failure as an error.
    async fn write_single(&self, user: UserId, plan: &[WriteOp]) -> Result<MutationOutcome, ServiceError> {
        let report = apply_write_back(self.store.as_ref(), user, plan).await;
        if let Some(failure) = report.failures.first() {
            return Err(ServiceError::Store(StoreError::Backend(failure.error.clone())));
        }
        Ok(MutationOutcome {
            inventory: self.load(user).await?,
            report,
        })
    }
}
