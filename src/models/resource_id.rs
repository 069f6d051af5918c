//! Resource identifiers for stored todo items.
//!
//! Identifiers are 16 random bytes. The store keeps the raw bytes; clients
//! see them as 32 lowercase hex digits.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Length of the hex encoding.
pub const HEX_LEN: usize = 32;

/// Errors that can occur with resource identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceIdError {
    #[error("Invalid identifier length: expected {HEX_LEN} hex digits, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid binary identifier: expected 16 bytes, got {0}")]
    InvalidBytes(usize),
}

/// An opaque, immutable identifier assigned when an item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId([u8; 16]);

impl ResourceId {
    /// Generate a new random identifier
    pub fn new() -> Self {
        Self(*Uuid::new_v4().as_bytes())
    }

    /// Create an identifier from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create an identifier from the binary form kept by the store
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ResourceIdError> {
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| ResourceIdError::InvalidBytes(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Encode as lowercase hex
    pub fn to_hex(&self) -> String {
        Uuid::from_bytes(self.0).simple().to_string()
    }

    /// Parse the hex encoding. Upper and lower case digits are accepted.
    pub fn parse(s: &str) -> Result<Self, ResourceIdError> {
        if s.len() != HEX_LEN {
            return Err(ResourceIdError::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ResourceIdError::InvalidEncoding(s.to_string()));
        }

        let uuid =
            Uuid::try_parse(s).map_err(|e| ResourceIdError::InvalidEncoding(e.to_string()))?;
        Ok(Self(*uuid.as_bytes()))
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for ResourceId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_differ() {
        let id1 = ResourceId::new();
        let id2 = ResourceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_hex_roundtrip() {
        let id = ResourceId::new();
        let encoded = id.to_hex();
        assert_eq!(encoded.len(), HEX_LEN);
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

        let decoded = ResourceId::parse(&encoded).unwrap();
        assert_eq!(id, decoded);
    }

    #[test]
    fn test_binary_roundtrip() {
        let id = ResourceId::new();
        let back = ResourceId::from_slice(id.as_bytes()).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_uppercase_accepted() {
        let id = ResourceId::from_bytes([0xab; 16]);
        let upper = id.to_hex().to_uppercase();
        assert_eq!(ResourceId::parse(&upper).unwrap(), id);
    }

    #[test]
    fn test_invalid_length() {
        assert_eq!(
            ResourceId::parse("not-a-valid-id"),
            Err(ResourceIdError::InvalidLength(14))
        );
        assert!(ResourceId::parse("").is_err());
    }

    #[test]
    fn test_hyphenated_uuid_rejected() {
        let hyphenated = Uuid::new_v4().hyphenated().to_string();
        assert!(ResourceId::parse(&hyphenated).is_err());
    }

    #[test]
    fn test_non_hex_rejected() {
        let s = "zz".repeat(16);
        assert!(matches!(
            ResourceId::parse(&s),
            Err(ResourceIdError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_from_slice_wrong_length() {
        assert_eq!(
            ResourceId::from_slice(&[1, 2, 3]),
            Err(ResourceIdError::InvalidBytes(3))
        );
    }

    #[test]
    fn test_display_matches_hex() {
        let id = ResourceId::new();
        assert_eq!(format!("{}", id), id.to_hex());
    }

    #[test]
    fn test_serialization() {
        let id = ResourceId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let deserialized: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
