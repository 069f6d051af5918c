//! Conversions between the wire form of a todo item and the store's
//! document form.
//!
//! The codec is purely structural: it checks shapes and types, never
//! business rules.

use serde_json::Value;
use thiserror::Error;

use crate::models::{ResourceId, ResourceIdError, TodoItem, TodoPayload};
use crate::store::Document;

/// Document field holding the title.
pub const FIELD_TITLE: &str = "title";
/// Document field holding the description.
pub const FIELD_DESCRIPTION: &str = "description";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ResourceIdError),

    #[error("Stored document {id} is malformed: {reason}")]
    CorruptDocument { id: ResourceId, reason: String },

    #[error("Failed to encode item: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Parse a create/update request body.
///
/// The body must be a JSON object. `title` and `description` must be strings
/// when present and default to empty strings when absent.
pub fn decode_create_payload(body: &[u8]) -> Result<TodoPayload, CodecError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| CodecError::MalformedPayload(e.to_string()))?;

    if !value.is_object() {
        return Err(CodecError::MalformedPayload(
            "expected a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| CodecError::MalformedPayload(e.to_string()))
}

/// Serialize a stored item, identifier included.
pub fn encode_item(item: &TodoItem) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(item).map_err(CodecError::Encode)
}

/// Parse the external string form of an identifier.
pub fn parse_identifier(s: &str) -> Result<ResourceId, CodecError> {
    Ok(ResourceId::parse(s)?)
}

/// Build the "set these fields" document used by Replace.
///
/// Every mutable field is included, so applying it overwrites the whole
/// item. The identifier is the lookup key and never part of the update.
pub fn build_update_document(payload: &TodoPayload) -> Document {
    to_document(payload)
}

/// Convert a payload to the document inserted into the store.
pub fn to_document(payload: &TodoPayload) -> Document {
    let mut doc = Document::new();
    doc.insert(FIELD_TITLE.to_string(), Value::from(payload.title.as_str()));
    doc.insert(
        FIELD_DESCRIPTION.to_string(),
        Value::from(payload.description.as_str()),
    );
    doc
}

/// Rebuild a stored item from its identifier and document.
pub fn from_document(id: ResourceId, doc: Document) -> Result<TodoItem, CodecError> {
    let payload: TodoPayload =
        serde_json::from_value(Value::Object(doc)).map_err(|e| CodecError::CorruptDocument {
            id,
            reason: e.to_string(),
        })?;
    Ok(TodoItem::from_payload(id, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let payload =
            decode_create_payload(br#"{"title":"Buy milk","description":"2 litres"}"#).unwrap();
        assert_eq!(payload, TodoPayload::new("Buy milk", "2 litres"));
    }

    #[test]
    fn test_decode_missing_fields_default_to_empty() {
        let payload = decode_create_payload(b"{}").unwrap();
        assert_eq!(payload, TodoPayload::default());

        let payload = decode_create_payload(br#"{"description":"later"}"#).unwrap();
        assert_eq!(payload, TodoPayload::new("", "later"));
    }

    #[test]
    fn test_decode_ignores_client_id() {
        let payload =
            decode_create_payload(br#"{"id":"ffffffffffffffffffffffffffffffff","title":"x"}"#)
                .unwrap();
        assert_eq!(payload, TodoPayload::new("x", ""));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let result = decode_create_payload(b"title=milk");
        assert!(matches!(result, Err(CodecError::MalformedPayload(_))));

        let result = decode_create_payload(b"");
        assert!(matches!(result, Err(CodecError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let result = decode_create_payload(br#"{"title":42}"#);
        assert!(matches!(result, Err(CodecError::MalformedPayload(_))));

        let result = decode_create_payload(br#"{"title":"a","description":null}"#);
        assert!(matches!(result, Err(CodecError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        for body in [&b"null"[..], b"[\"a\",\"b\"]", b"\"title\"", b"7"] {
            let result = decode_create_payload(body);
            assert!(
                matches!(result, Err(CodecError::MalformedPayload(_))),
                "body {:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_encode_item_includes_id() {
        let id = ResourceId::new();
        let item = TodoItem::from_payload(id, TodoPayload::new("t", "d"));
        let bytes = encode_item(&item).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["id"], id.to_hex());
        assert_eq!(value["title"], "t");
        assert_eq!(value["description"], "d");
    }

    #[test]
    fn test_encode_distinguishes_items() {
        let a = TodoItem::from_payload(ResourceId::new(), TodoPayload::new("t", "d"));
        let b = TodoItem::from_payload(ResourceId::new(), TodoPayload::new("t", "d"));
        assert_ne!(encode_item(&a).unwrap(), encode_item(&b).unwrap());
    }

    #[test]
    fn test_parse_identifier() {
        let id = ResourceId::new();
        assert_eq!(parse_identifier(&id.to_hex()).unwrap(), id);
        assert!(matches!(
            parse_identifier("not-a-valid-id"),
            Err(CodecError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_update_document_has_exactly_mutable_fields() {
        let doc = build_update_document(&TodoPayload::new("new title", ""));
        assert_eq!(doc.len(), 2);
        assert_eq!(doc[FIELD_TITLE], "new title");
        assert_eq!(doc[FIELD_DESCRIPTION], "");
        assert!(!doc.contains_key("id"));
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn test_from_document() {
        let id = ResourceId::new();
        let item = from_document(id, to_document(&TodoPayload::new("a", "b"))).unwrap();
        assert_eq!(item, TodoItem::from_payload(id, TodoPayload::new("a", "b")));
    }

    #[test]
    fn test_from_document_wrong_type_is_corrupt() {
        let mut doc = Document::new();
        doc.insert(FIELD_TITLE.to_string(), Value::from(12));
        let result = from_document(ResourceId::new(), doc);
        assert!(matches!(result, Err(CodecError::CorruptDocument { .. })));
    }
}
