//! SIM record normalization
//!
//! Upstream SIM objects are heterogeneous: `status` arrives either as a
//! flat string or nested as `{"status": "..."}`, and any field may be
//! absent. Items are normalized into `SimRecord` immediately after
//! parsing; downstream code works with the canonical shape only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status assigned when the upstream value is missing or malformed
pub const UNKNOWN_STATUS: &str = "unknown";

/// The two status encodings observed in upstream payloads.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusField {
    /// `"status": "Enabled"`
    Flat(String),
    /// `"status": {"status": "Enabled", ...}`
    Nested { status: String },
}

/// Canonical tabular row for one SIM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimRecord {
    pub iccid: String,
    pub status: String,
    pub imsi: Option<String>,
    pub ip_address: Option<String>,
    pub imei: Option<String>,
}

impl SimRecord {
    /// Build a record from one opaque upstream item, tolerating absent or
    /// oddly-typed fields.
    pub fn from_item(item: &Value) -> Self {
        Self {
            iccid: string_field(item, "iccid").unwrap_or_default(),
            status: normalize_status(item.get("status")),
            imsi: string_field(item, "imsi"),
            ip_address: string_field(item, "ip_address"),
            imei: string_field(item, "imei"),
        }
    }
}

fn string_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Collapse the two observed status shapes into one string.
pub fn normalize_status(status: Option<&Value>) -> String {
    status
        .and_then(|value| serde_json::from_value::<StatusField>(value.clone()).ok())
        .map(|field| match field {
            StatusField::Flat(s) | StatusField::Nested { status: s } => s,
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string())
}

/// Count items per normalized status.
pub fn status_summary<'a, I>(items: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts
            .entry(normalize_status(item.get("status")))
            .or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_status_is_taken_verbatim() {
        let item = json!({"iccid": "8988", "status": "Enabled"});
        let record = SimRecord::from_item(&item);
        assert_eq!(record.status, "Enabled");
    }

    #[test]
    fn nested_status_is_unwrapped() {
        let item = json!({"iccid": "8988", "status": {"status": "Disabled", "id": 2}});
        let record = SimRecord::from_item(&item);
        assert_eq!(record.status, "Disabled");
    }

    #[test]
    fn missing_status_normalizes_to_unknown() {
        assert_eq!(SimRecord::from_item(&json!({"iccid": "8988"})).status, "unknown");
        assert_eq!(
            SimRecord::from_item(&json!({"iccid": "8988", "status": null})).status,
            "unknown"
        );
        assert_eq!(
            SimRecord::from_item(&json!({"iccid": "8988", "status": {"id": 7}})).status,
            "unknown"
        );
    }

    #[test]
    fn optional_fields_survive_absence() {
        let record = SimRecord::from_item(&json!({"iccid": "8988"}));
        assert_eq!(record.iccid, "8988");
        assert_eq!(record.imsi, None);
        assert_eq!(record.ip_address, None);
        assert_eq!(record.imei, None);
    }

    #[test]
    fn numeric_fields_are_stringified() {
        let record = SimRecord::from_item(&json!({"iccid": 8988, "imsi": 262011234567890u64}));
        assert_eq!(record.iccid, "8988");
        assert_eq!(record.imsi, Some("262011234567890".into()));
    }

    #[test]
    fn status_summary_counts_mixed_shapes() {
        let items = vec![
            json!({"status": "Enabled"}),
            json!({"status": {"status": "Enabled"}}),
            json!({"status": "Disabled"}),
            json!({}),
        ];
        let summary = status_summary(items.iter());
        assert_eq!(summary.get("Enabled"), Some(&2));
        assert_eq!(summary.get("Disabled"), Some(&1));
        assert_eq!(summary.get("unknown"), Some(&1));
    }
}
