//! Strongly-typed transaction identifiers
//!
//! Imported transactions get a content-derived id (UUIDv5 of a stable key) so
//! that importing the same statement twice yields the same ids. Transactions
//! entered by hand get a random id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace for content-derived transaction ids
const TRANSACTION_NAMESPACE: Uuid = Uuid::from_u128(0x6c65_6467_6572_4000_8000_7478_6e2d_6964);

/// Prefix used when displaying a transaction id
const DISPLAY_PREFIX: &str = "txn-";

/// Identifier of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive an ID deterministically from a stable key
    pub fn from_key(key: &str) -> Self {
        Self(Uuid::new_v5(&TRANSACTION_NAMESPACE, key.as_bytes()))
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether the hyphenated form of this id starts with `prefix`
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.strip_prefix(DISPLAY_PREFIX).unwrap_or(prefix);
        !prefix.is_empty() && self.0.to_string().starts_with(&prefix.to_lowercase())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DISPLAY_PREFIX, &self.0.to_string()[..8])
    }
}

impl From<Uuid> for TransactionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(DISPLAY_PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = TransactionId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("txn-"));
        assert_eq!(display.len(), 12); // "txn-" + 8 chars
    }

    #[test]
    fn test_key_derived_ids_are_stable() {
        let a = TransactionId::from_key("03/01/2019 REF123");
        let b = TransactionId::from_key("03/01/2019 REF123");
        let c = TransactionId::from_key("03/01/2019 REF124");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_id_parse_with_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: TransactionId = uuid_str.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);

        let prefixed: TransactionId = format!("txn-{}", uuid_str).parse().unwrap();
        assert_eq!(id, prefixed);
    }

    #[test]
    fn test_matches_prefix() {
        let id: TransactionId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert!(id.matches_prefix("550e84"));
        assert!(id.matches_prefix("txn-550E8400"));
        assert!(!id.matches_prefix("txn-"));
        assert!(!id.matches_prefix("660e"));
    }

    #[test]
    fn test_id_serialization() {
        let id = TransactionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
