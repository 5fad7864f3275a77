//! Quantity reconciliation.
//!
//! Merging is a pure reduction over two lists into an ordered accumulator;
//! persisting the result is a separate step driven by [`write_back_plan`].
//! Every write path (single add/remove, bulk import) goes through the same
//! pair so the "no record at quantity 0" rule holds everywhere.

use std::collections::HashMap;

use serde::Serialize;

use crate::item::{InventoryItem, ItemDelta};
use crate::name::normalize;

/// One independent store operation produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    /// Overwrite the record with an absolute quantity (always > 0).
    Set { name: String, quantity: u64 },
    /// Remove the record.
    Delete { name: String },
}

impl WriteOp {
    pub fn name(&self) -> &str {
        match self {
            WriteOp::Set { name, .. } | WriteOp::Delete { name } => name,
        }
    }
}

/// Merge `incoming` into `current`, keyed by canonical name.
///
/// - `current` is accumulated first, then `incoming`, both in order; the first
///   occurrence of a name fixes its position in the result.
/// - Matching names add up; totals below zero clamp to zero.
/// - Names that are empty after normalization are skipped.
///
/// The result can contain zero quantities; [`write_back_plan`] turns those
/// into deletes.
pub fn merge(current: &[InventoryItem], incoming: &[ItemDelta]) -> Vec<InventoryItem> {
    let mut order: Vec<(String, i128)> = Vec::with_capacity(current.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    let seed = current
        .iter()
        .map(|item| (item.name.as_str(), i128::from(item.quantity)));
    let deltas = incoming
        .iter()
        .map(|delta| (delta.name.as_str(), i128::from(delta.delta)));

    for (raw, amount) in seed.chain(deltas) {
        let name = normalize(raw);
        if name.is_empty() {
            tracing::debug!(raw_name = raw, "skipping item with empty canonical name");
            continue;
        }
        match index.get(&name) {
            Some(&pos) => order[pos].1 += amount,
            None => {
                index.insert(name.clone(), order.len());
                order.push((name, amount));
            }
        }
    }

    order
        .into_iter()
        .map(|(name, total)| InventoryItem {
            name,
            quantity: u64::try_from(total.max(0)).unwrap_or(u64::MAX),
        })
        .collect()
}

/// Translate reconciled totals into store operations (delete-on-zero).
pub fn write_back_plan(merged: &[InventoryItem]) -> Vec<WriteOp> {
    merged
        .iter()
        .map(|item| {
            if item.quantity == 0 {
                WriteOp::Delete {
                    name: item.name.clone(),
                }
            } else {
                WriteOp::Set {
                    name: item.name.clone(),
                    quantity: item.quantity,
                }
            }
        })
        .collect()
}

/// Reconcile a single-record adjustment (`+1` / `-1`) against the stored
/// quantity (`None` when the record does not exist).
///
/// Returns `None` when nothing needs writing: the name is blank, or a
/// decrement targets a record that does not exist.
pub fn adjust_one(name: &str, stored: Option<u64>, delta: i64) -> Option<WriteOp> {
    let canonical = normalize(name);
    if canonical.is_empty() {
        return None;
    }
    if stored.is_none() && delta <= 0 {
        return None;
    }

    let current: Vec<InventoryItem> = stored
        .map(|quantity| InventoryItem::new(canonical.clone(), quantity))
        .into_iter()
        .collect();
    let merged = merge(&current, &[ItemDelta::new(canonical, delta)]);
    write_back_plan(&merged).into_iter().next()
}
