//! Write-back execution.
//!
//! A write-back plan is a list of independent store operations. Each one is
//! issued on its own: a failure is recorded and logged, and the remaining
//! operations still run. There is no rollback.

use serde::Serialize;

use stockscan_core::UserId;
use stockscan_inventory::WriteOp;

use crate::store::{InventoryStore, StoreError};

/// One operation that the store rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub name: String,
    pub op: WriteOp,
    pub error: String,
}

/// Outcome of applying a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteBackReport {
    pub applied: usize,
    pub failures: Vec<WriteFailure>,
}

impl WriteBackReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

async fn apply_op<S>(store: &S, user: UserId, op: &WriteOp) -> Result<(), StoreError>
where
    S: InventoryStore + ?Sized,
{
    match op {
        WriteOp::Set { name, quantity } => store.set(user, name, *quantity).await,
        WriteOp::Delete { name } => store.delete(user, name).await,
    }
}

/// Apply every operation of `plan` for `user`, in order.
pub async fn apply_write_back<S>(store: &S, user: UserId, plan: &[WriteOp]) -> WriteBackReport
where
    S: InventoryStore + ?Sized,
{
    let mut report = WriteBackReport::default();

    for op in plan {
        match apply_op(store, user, op).await {
            Ok(()) => report.applied += 1,
            Err(err) => {
                tracing::warn!(
                    user_id = %user,
                    item = op.name(),
                    error = %err,
                    "inventory write failed"
                );
                report.failures.push(WriteFailure {
                    name: op.name().to_string(),
                    op: op.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    report
}
