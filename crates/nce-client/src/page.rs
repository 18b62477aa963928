//! Upstream list payload shapes
//!
//! List endpoints answer with either a bare JSON array or a wrapper object
//! `{"items": [...], "totalItems": n}` depending on the endpoint. Both are
//! decoded here at the boundary into one type so the rest of the crate
//! never re-checks the shape.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// One fetched batch of list items, in either upstream shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload {
    /// `{"items": [...], "totalItems": n}` — items defaults to empty so a
    /// wrapper missing the array still decodes as an empty page
    Wrapped {
        #[serde(default)]
        items: Vec<Value>,
        #[serde(rename = "totalItems")]
        total_items: Option<u64>,
    },
    /// A bare JSON array
    Bare(Vec<Value>),
}

impl ListPayload {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::Decode(format!("unrecognized list payload: {e}")))
    }

    /// Advertised total item count. Bare arrays carry no total; callers
    /// fall back to the item count. Advisory only — pagination never
    /// trusts it for termination.
    pub fn total_items(&self) -> Option<u64> {
        match self {
            ListPayload::Wrapped { total_items, .. } => *total_items,
            ListPayload::Bare(_) => None,
        }
    }

    pub fn items(&self) -> &[Value] {
        match self {
            ListPayload::Wrapped { items, .. } => items,
            ListPayload::Bare(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            ListPayload::Wrapped { items, .. } => items,
            ListPayload::Bare(items) => items,
        }
    }
}

/// Result of walking a list endpoint to exhaustion.
///
/// `truncated` is set when the walk stopped at the page cap rather than at
/// an upstream end-of-data signal — the accumulated items may then be an
/// incomplete view of the fleet.
#[derive(Debug, Clone)]
pub struct PagedFetch {
    /// All accumulated items, in upstream order
    pub items: Vec<Value>,
    /// Number of upstream calls made
    pub pages_fetched: usize,
    /// Whether the page cap cut the walk short
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_decodes() {
        let payload = ListPayload::from_value(json!([{"iccid": "89"}, {"iccid": "90"}])).unwrap();
        assert_eq!(payload.items().len(), 2);
        assert_eq!(payload.total_items(), None);
    }

    #[test]
    fn wrapped_object_decodes_with_total() {
        let payload =
            ListPayload::from_value(json!({"items": [{"iccid": "89"}], "totalItems": 57})).unwrap();
        assert_eq!(payload.items().len(), 1);
        assert_eq!(payload.total_items(), Some(57));
    }

    #[test]
    fn bare_and_wrapped_yield_identical_items() {
        let rows = json!([{"iccid": "89", "status": "Enabled"}, {"iccid": "90"}]);
        let bare = ListPayload::from_value(rows.clone()).unwrap();
        let wrapped =
            ListPayload::from_value(json!({"items": rows, "totalItems": 2})).unwrap();
        assert_eq!(bare.into_items(), wrapped.into_items());
    }

    #[test]
    fn wrapper_without_items_is_an_empty_page() {
        let payload = ListPayload::from_value(json!({"totalItems": 0})).unwrap();
        assert!(payload.items().is_empty());
        assert_eq!(payload.total_items(), Some(0));
    }

    #[test]
    fn scalar_payload_is_a_decode_error() {
        let err = ListPayload::from_value(json!("not a list")).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
