//! CSV export.
//!
//! Output matches what `json2csv` produces for `{name, quantity}` records:
//! a quoted header row, quoted string fields with embedded quotes doubled,
//! bare numbers, and `\n` between rows.

use serde_json::Value;
use thiserror::Error;

use stockscan_inventory::InventoryItem;

const HEADER: &str = "\"name\",\"quantity\"";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Invalid inventory data")]
    NotAnArray,

    #[error("invalid inventory record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Parse an export payload. Any record with the wrong shape fails the whole
/// export.
pub fn records_from_json(payload: &Value) -> Result<Vec<InventoryItem>, ExportError> {
    let Value::Array(records) = payload else {
        return Err(ExportError::NotAnArray);
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| record_from_json(index, record))
        .collect()
}

fn record_from_json(index: usize, record: &Value) -> Result<InventoryItem, ExportError> {
    let invalid = |reason: &str| ExportError::InvalidRecord {
        index,
        reason: reason.to_string(),
    };

    let Value::Object(fields) = record else {
        return Err(invalid("expected an object"));
    };
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("`name` must be a string"))?;
    let quantity = fields
        .get("quantity")
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid("`quantity` must be a non-negative integer"))?;

    Ok(InventoryItem::new(name, quantity))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render records as CSV. An empty list yields the header alone.
pub fn to_csv(items: &[InventoryItem]) -> String {
    let mut out = String::from(HEADER);
    for item in items {
        out.push('\n');
        out.push_str(&quote(&item.name));
        out.push(',');
        out.push_str(&item.quantity.to_string());
    }
    out
}
