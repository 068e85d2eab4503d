//! Lookup types: the `_lookups` registry row and its per-type values table.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod ddl;
pub mod service;

pub use service::{LookupConfig, LookupService};

/// Data columns of the registry table, in the order they are written.
pub const DATA_COLUMNS: [&str; 3] = ["lookup_type", "meaning", "description"];

/// A registry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LookupRow {
    pub uuid: Uuid,
    pub lookup_type: String,
    pub meaning: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLookup {
    /// Caller-supplied primary key; only accepted when the service allows it.
    #[serde(default)]
    pub uuid: Option<Uuid>,
    pub lookup_type: String,
    pub meaning: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateLookup {
    pub fn new(lookup_type: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            uuid: None,
            lookup_type: lookup_type.into(),
            meaning: meaning.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    pub(crate) fn to_columns(&self) -> Map<String, JsonValue> {
        let mut out = Map::new();
        out.insert("lookup_type".into(), JsonValue::from(self.lookup_type.clone()));
        out.insert("meaning".into(), JsonValue::from(self.meaning.clone()));
        out.insert(
            "description".into(),
            self.description.clone().map_or(JsonValue::Null, JsonValue::from),
        );
        out
    }
}

/// Partial update. `description: Some(None)` clears the description, `None` leaves it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLookup {
    #[serde(default)]
    pub lookup_type: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpdateLookup {
    /// Fields that are present and differ from `current`.
    pub fn effective_changes(&self, current: &LookupRow) -> LookupChanges {
        LookupChanges {
            lookup_type: self
                .lookup_type
                .clone()
                .filter(|v| *v != current.lookup_type),
            meaning: self.meaning.clone().filter(|v| *v != current.meaning),
            description: self
                .description
                .clone()
                .filter(|v| *v != current.description),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupChanges {
    pub lookup_type: Option<String>,
    pub meaning: Option<String>,
    pub description: Option<Option<String>>,
}

impl LookupChanges {
    pub fn is_empty(&self) -> bool {
        self.lookup_type.is_none() && self.meaning.is_none() && self.description.is_none()
    }

    pub(crate) fn to_columns(&self) -> Map<String, JsonValue> {
        let mut out = Map::new();
        if let Some(v) = &self.lookup_type {
            out.insert("lookup_type".into(), JsonValue::from(v.clone()));
        }
        if let Some(v) = &self.meaning {
            out.insert("meaning".into(), JsonValue::from(v.clone()));
        }
        if let Some(v) = &self.description {
            out.insert(
                "description".into(),
                v.clone().map_or(JsonValue::Null, JsonValue::from),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> LookupRow {
        LookupRow {
            uuid: Uuid::nil(),
            lookup_type: "status".into(),
            meaning: "Status Codes".into(),
            description: Some("order status".into()),
        }
    }

    #[test]
    fn unchanged_values_are_not_changes() {
        let update = UpdateLookup {
            lookup_type: Some("status".into()),
            meaning: Some("Status Codes".into()),
            description: Some(Some("order status".into())),
        };
        assert!(update.effective_changes(&row()).is_empty());
        assert!(UpdateLookup::default().effective_changes(&row()).is_empty());
    }

    #[test]
    fn only_differing_fields_survive() {
        let update = UpdateLookup {
            lookup_type: Some("state".into()),
            meaning: Some("Status Codes".into()),
            description: None,
        };
        let changes = update.effective_changes(&row());
        assert_eq!(changes.lookup_type.as_deref(), Some("state"));
        assert_eq!(changes.meaning, None);
        assert_eq!(
            JsonValue::Object(changes.to_columns()),
            json!({ "lookup_type": "state" })
        );
    }

    #[test]
    fn explicit_null_clears_description() {
        let update: UpdateLookup = serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(update.description, Some(None));

        let changes = update.effective_changes(&row());
        assert_eq!(
            JsonValue::Object(changes.to_columns()),
            json!({ "description": null })
        );

        let absent: UpdateLookup = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.description, None);
    }

    #[test]
    fn create_payload_defaults() {
        let create: CreateLookup =
            serde_json::from_value(json!({ "lookup_type": "status", "meaning": "Status Codes" }))
                .unwrap();
        assert_eq!(create.uuid, None);
        assert_eq!(create.description, None);
        assert_eq!(
            JsonValue::Object(create.to_columns()),
            json!({ "lookup_type": "status", "meaning": "Status Codes", "description": null })
        );
    }
}
