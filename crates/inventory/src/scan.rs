//! Scanned items awaiting confirmation.
//!
//! A scan result is untrusted: names are normalized and quantities clamped
//! before anything reaches the merge.

use serde::{Deserialize, Deserializer, Serialize};

use crate::item::ItemDelta;
use crate::name::normalize;

/// Clamp an externally reported count to a non-negative quantity.
pub fn clamp_quantity(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// One item reported by the vision model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedItem {
    pub name: String,
    /// Client-edited counts come back signed; negatives clamp to zero.
    #[serde(deserialize_with = "clamped_quantity")]
    pub quantity: u64,
}

fn clamped_quantity<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_quantity)
}

impl ScannedItem {
    /// Build from raw model output (normalizes the name, clamps the count).
    pub fn from_raw(name: &str, quantity: i64) -> Self {
        Self {
            name: normalize(name),
            quantity: clamp_quantity(quantity),
        }
    }
}

/// A scanned item together with the user's include/exclude choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSelection {
    #[serde(flatten)]
    pub item: ScannedItem,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

fn default_selected() -> bool {
    true
}

impl ScanSelection {
    pub fn new(item: ScannedItem, selected: bool) -> Self {
        Self { item, selected }
    }

    /// Fresh scan results start out fully selected.
    pub fn all_selected(items: impl IntoIterator<Item = ScannedItem>) -> Vec<Self> {
        items
            .into_iter()
            .map(|item| Self {
                item,
                selected: true,
            })
            .collect()
    }
}

/// Deltas for the merge: selected entries only, names normalized.
pub fn selected_deltas(selections: &[ScanSelection]) -> Vec<ItemDelta> {
    selections
        .iter()
        .filter(|s| s.selected)
        .map(|s| ItemDelta::new(normalize(&s.item.name), i64::try_from(s.item.quantity).unwrap_or(i64::MAX)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_scan_values_are_sanitized() {
        let item = ScannedItem::from_raw("  Oranges", -4);
        assert_eq!(item.name, "oranges");
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn unselected_entries_are_excluded() {
        let selections = vec![
            ScanSelection::new(ScannedItem::from_raw("Apples", 1), true),
            ScanSelection::new(ScannedItem::from_raw("Kiwis", 9), false),
            ScanSelection::new(ScannedItem::from_raw("Oranges", 3), true),
        ];

        assert_eq!(
            selected_deltas(&selections),
            vec![ItemDelta::new("apples", 1), ItemDelta::new("oranges", 3)]
        );
    }

    #[test]
    fn user_edited_names_are_normalized_again() {
        let mut selection = ScanSelection::new(ScannedItem::from_raw("apples", 2), true);
        selection.item.name = " Green Apples ".to_string();

        assert_eq!(
            selected_deltas(&[selection]),
            vec![ItemDelta::new("green apples", 2)]
        );
    }

    #[test]
    fn selection_defaults_to_selected_on_the_wire() {
        let parsed: ScanSelection =
            serde_json::from_str(r#"{"name":"apples","quantity":2}"#).unwrap();
        assert!(parsed.selected);
        assert_eq!(parsed.item.quantity, 2);

        let parsed: ScanSelection =
            serde_json::from_str(r#"{"name":"apples","quantity":2,"selected":false}"#).unwrap();
        assert!(!parsed.selected);
    }

    #[test]
    fn negative_wire_quantities_are_clamped() {
        let parsed: ScanSelection =
            serde_json::from_str(r#"{"name":"apples","quantity":-2,"selected":true}"#).unwrap();
        assert_eq!(parsed.item.quantity, 0);
        assert!(parsed.selected);

        let parsed: ScannedItem = serde_json::from_str(r#"{"name":"pears","quantity":-7}"#).unwrap();
        assert_eq!(parsed.quantity, 0);
    }
}
