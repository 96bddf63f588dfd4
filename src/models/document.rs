//! Helpers for working with schemaless documents
//!
//! Documents are plain JSON values. The only structure this crate relies on
//! is an identifier under `_id` (or `id`).

use serde_json::Value;

use crate::error::{AuditError, AuditResult};

/// Primary identifier field of a document
pub const ID_FIELD: &str = "_id";

/// Fallback identifier field
const ALT_ID_FIELD: &str = "id";

/// Extract the identifier of a document
///
/// Strings are returned verbatim and numbers in decimal form. Any other
/// shape, a blank string, or a missing identifier is a validation failure.
pub fn document_id(doc: &Value) -> AuditResult<String> {
    let id = doc
        .get(ID_FIELD)
        .or_else(|| doc.get(ALT_ID_FIELD))
        .ok_or_else(|| AuditError::Validation("Document has no identifier".into()))?;

    match id {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(AuditError::Validation(format!(
            "Unsupported document identifier: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_underscore_id() {
        assert_eq!(document_id(&json!({"_id": "o1"})).unwrap(), "o1");
    }

    #[test]
    fn test_plain_id_fallback() {
        assert_eq!(document_id(&json!({"id": "o2", "total": 1})).unwrap(), "o2");
    }

    #[test]
    fn test_underscore_id_wins() {
        assert_eq!(document_id(&json!({"_id": "a", "id": "b"})).unwrap(), "a");
    }

    #[test]
    fn test_numeric_id() {
        assert_eq!(document_id(&json!({"_id": 42})).unwrap(), "42");
    }

    #[test]
    fn test_missing_id() {
        let err = document_id(&json!({"total": 10})).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_unsupported_id_shape() {
        assert!(document_id(&json!({"_id": {"oid": "x"}})).is_err());
        assert!(document_id(&json!({"_id": ""})).is_err());
    }

    #[test]
    fn test_whitespace_id_rejected() {
        let err = document_id(&json!({"_id": "   "})).unwrap_err();
        assert!(err.is_validation());
    }
}
