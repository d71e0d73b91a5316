//! Row shapes exchanged with the hosted database.
//!
//! Every field is optional so that a missing value reaches the mapper as
//! `None` instead of failing deserialization. Values of the wrong JSON type
//! are rejected when the record is decoded.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use yardline_core::{AppError, AppResult};

/// Raw `system_users` row with its embedded relations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUserRecord {
    /// Primary key.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Login name.
    pub username: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Role storage value.
    pub role: Option<String>,
    /// Shift label.
    pub shift: Option<String>,
    /// Status storage value.
    pub status: Option<String>,
    /// Foreign key into `units`.
    pub unit_id: Option<String>,
    /// Embedded `units` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<RawUnitRelation>,
    /// Embedded `system_user_permissions` rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_user_permissions: Option<Vec<RawPermissionsRecord>>,
}

impl RawUserRecord {
    /// Decodes a JSON value returned by the backend.
    pub fn from_value(value: Value) -> AppResult<Self> {
        serde_json::from_value(value).map_err(|error| {
            AppError::MalformedRecord(format!(
                "user record does not match the expected shape: {error}"
            ))
        })
    }
}

/// Embedded unit relation; only the name is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUnitRelation {
    /// Unit display name.
    pub name: Option<String>,
}

/// Raw `system_user_permissions` row. Unset fields are omitted on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPermissionsRecord {
    /// Owning user, set by adapters when writing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Column `can_view_vehicles` (view vehicles).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_view_vehicles: Option<bool>,
    /// Column `can_edit_vehicles` (edit vehicles).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit_vehicles: Option<bool>,
    /// Column `can_view_units` (view units).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_view_units: Option<bool>,
    /// Column `can_edit_units` (edit units).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit_units: Option<bool>,
    /// Column `can_view_users` (view users).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_view_users: Option<bool>,
    /// Column `can_edit_users` (edit users).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit_users: Option<bool>,
    /// Column `can_view_movements` (view movements).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_view_movements: Option<bool>,
    /// Column `can_edit_movements` (edit movements).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit_movements: Option<bool>,
    /// Column `can_switch_units` (switch units).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_switch_units: Option<bool>,
}

impl RawPermissionsRecord {
    /// Overwrites every field that is set in `patch`.
    pub fn merge(&mut self, patch: &RawPermissionsRecord) {
        fn apply(target: &mut Option<bool>, value: Option<bool>) {
            if value.is_some() {
                *target = value;
            }
        }

        apply(&mut self.can_view_vehicles, patch.can_view_vehicles);
        apply(&mut self.can_edit_vehicles, patch.can_edit_vehicles);
        apply(&mut self.can_view_units, patch.can_view_units);
        apply(&mut self.can_edit_units, patch.can_edit_units);
        apply(&mut self.can_view_users, patch.can_view_users);
        apply(&mut self.can_edit_users, patch.can_edit_users);
        apply(&mut self.can_view_movements, patch.can_view_movements);
        apply(&mut self.can_edit_movements, patch.can_edit_movements);
        apply(&mut self.can_switch_units, patch.can_switch_units);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_decode_as_absent() {
        let record = RawUserRecord::from_value(json!({ "id": "u-1", "unit_id": null }));
        let record = record.unwrap_or_else(|_| panic!("test"));
        assert_eq!(record.id.as_deref(), Some("u-1"));
        assert_eq!(record.unit_id, None);
        assert_eq!(record.units, None);
        assert_eq!(record.system_user_permissions, None);
    }

    #[test]
    fn unrelated_columns_are_ignored() {
        let record = RawUserRecord::from_value(json!({
            "id": "u-1",
            "created_at": "2024-02-01T08:00:00Z",
            "password_hash": "$argon2id$..."
        }));
        assert!(record.is_ok());
    }

    #[test]
    fn wrong_value_type_is_malformed() {
        let result = RawUserRecord::from_value(json!({
            "id": "u-1",
            "system_user_permissions": [{ "can_view_vehicles": "yes" }]
        }));
        assert!(matches!(result, Err(AppError::MalformedRecord(_))));
    }

    #[test]
    fn patch_serialization_omits_unset_fields() {
        let patch = RawPermissionsRecord {
            can_edit_units: Some(false),
            ..RawPermissionsRecord::default()
        };
        let encoded = serde_json::to_value(&patch).unwrap_or_else(|_| panic!("test"));
        assert_eq!(encoded, json!({ "can_edit_units": false }));
    }

    #[test]
    fn merge_keeps_fields_missing_from_patch() {
        let mut row = RawPermissionsRecord {
            can_view_units: Some(true),
            can_edit_units: Some(true),
            ..RawPermissionsRecord::default()
        };
        row.merge(&RawPermissionsRecord {
            can_edit_units: Some(false),
            ..RawPermissionsRecord::default()
        });
        assert_eq!(row.can_view_units, Some(true));
        assert_eq!(row.can_edit_units, Some(false));
    }
}
