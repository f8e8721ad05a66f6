//! Wire types for the invoicing API envelope.
//!
//! Every endpoint wraps its payload as `{ "data": ..., "meta": ... }`;
//! list endpoints additionally carry pagination metadata under
//! `meta.pagination`.

use serde::{Deserialize, Serialize};

/// Generic response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Payload.
    pub data: T,
    /// Response metadata (present on list endpoints).
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Response metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    /// Pagination block, when the endpoint paginates.
    #[serde(default)]
    pub pagination: Option<PageMeta>,
}

/// Pagination metadata carried by list responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Whether another page follows the current one.
    pub has_next_page: bool,
    /// Total number of records in the collection, when reported.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

/// Login response payload. The token is optional on the wire so a 200
/// with a malformed body maps to a missing-field error instead of a
/// decode failure.
#[derive(Debug, Deserialize)]
pub struct LoginData {
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Creation response payload.
#[derive(Debug, Deserialize)]
pub struct CreatedData {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: Option<String>,
}

/// Loosely-typed record as returned by fetch and list endpoints.
///
/// Only the fields the lifecycle tooling acts on are modeled; the rest
/// of the server payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name (contacts, catalog items) or reference (invoices).
    #[serde(default)]
    pub name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Landline phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Mobile phone.
    #[serde(default)]
    pub cell_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_decodes_pagination() {
        let body = serde_json::json!({
            "data": [{"id": "c-1", "name": "Ana", "phone": "+34 600 000 001"}],
            "meta": {"pagination": {"hasNextPage": true, "total": 42}}
        });
        let envelope: Envelope<Vec<Record>> = serde_json::from_value(body).expect("decode");
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].id, "c-1");
        let page = envelope
            .meta
            .and_then(|meta| meta.pagination)
            .expect("pagination");
        assert!(page.has_next_page);
        assert_eq!(page.total, Some(42));
    }

    #[test]
    fn record_tolerates_missing_optional_fields() {
        let record: Record = serde_json::from_value(serde_json::json!({"id": "x"})).expect("decode");
        assert_eq!(record.id, "x");
        assert!(record.name.is_none());
        assert!(record.cell_phone.is_none());
    }

    #[test]
    fn login_data_tolerates_missing_token() {
        let data: LoginData = serde_json::from_value(serde_json::json!({})).expect("decode");
        assert!(data.token.is_none());
    }
}
