use serde::{Deserialize, Serialize};
use std::fmt;

use super::resource_id::ResourceId;

/// Create/update payload as sent by clients.
///
/// Missing fields default to empty strings. Unknown fields (including any
/// client-supplied `id`) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl TodoPayload {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A stored todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    pub id: ResourceId,
    pub title: String,
    pub description: String,
}

impl TodoItem {
    /// Attach an identifier to a payload.
    pub fn from_payload(id: ResourceId, payload: TodoPayload) -> Self {
        Self {
            id,
            title: payload.title,
            description: payload.description,
        }
    }
}

impl fmt::Display for TodoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "ID: {}", self.id)?;
        if !self.description.is_empty() {
            writeln!(f, "\n{}", self.description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_defaults_missing_fields() {
        let payload: TodoPayload = serde_json::from_str(r#"{"title":"milk"}"#).unwrap();
        assert_eq!(payload, TodoPayload::new("milk", ""));
    }

    #[test]
    fn test_item_serializes_hex_id() {
        let id = ResourceId::from_bytes([0x01; 16]);
        let item = TodoItem::from_payload(id, TodoPayload::new("a", "b"));
        let json: serde_json::Value = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "01010101010101010101010101010101");
        assert_eq!(json["title"], "a");
        assert_eq!(json["description"], "b");
    }

    #[test]
    fn test_display() {
        let item = TodoItem::from_payload(ResourceId::new(), TodoPayload::new("Buy milk", "2%"));
        let out = item.to_string();
        assert!(out.starts_with("Buy milk\n========\n"));
        assert!(out.contains(&item.id.to_hex()));
        assert!(out.contains("2%"));
    }
}
