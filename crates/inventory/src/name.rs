//! Item name canonicalization.

use serde::{Deserialize, Serialize};

use stockscan_core::DomainError;

/// Canonicalize a raw item name: trim surrounding whitespace, lower-case.
///
/// Total and idempotent. Two names that differ only by case or surrounding
/// whitespace map to the same key.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A canonical, non-empty item name (the identity key of an inventory record).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    /// Normalize `raw`; `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let canonical = normalize(raw);
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ItemName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| DomainError::validation("item name cannot be empty"))
    }
}

impl TryFrom<&str> for ItemName {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value).ok_or_else(|| DomainError::validation("item name cannot be empty"))
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
