use serde::{Deserialize, Serialize};

/// One inventory record as stored: canonical name + quantity.
///
/// Persisted records always have `quantity > 0`; zero means "delete".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: u64,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// A signed quantity change for one (possibly non-canonical) name.
///
/// Incoming sides of a merge are deltas: a scan contributes its counts, a
/// single "+" contributes `1`, a single "-" contributes `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDelta {
    pub name: String,
    pub delta: i64,
}

impl ItemDelta {
    pub fn new(name: impl Into<String>, delta: i64) -> Self {
        Self {
            name: name.into(),
            delta,
        }
    }
}

impl From<InventoryItem> for ItemDelta {
    fn from(value: InventoryItem) -> Self {
        Self {
            name: value.name,
            delta: i64::try_from(value.quantity).unwrap_or(i64::MAX),
        }
    }
}

impl From<&InventoryItem> for ItemDelta {
    fn from(value: &InventoryItem) -> Self {
        Self {
            name: value.name.clone(),
            delta: i64::try_from(value.quantity).unwrap_or(i64::MAX),
        }
    }
}
