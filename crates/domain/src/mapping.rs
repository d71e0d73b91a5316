//! Translation from backend rows into domain snapshots.

use std::fmt::{Display, Formatter};

use yardline_core::{AppError, AppResult};

use crate::{
    RawPermissionsRecord, RawUserRecord, SystemUser, SystemUserId, SystemUserProfile,
    UserPermissions, UserRole, UserStatus,
};

/// Non-fatal observation made while mapping a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingWarning {
    /// More than one permission row was embedded; only the first was used.
    AmbiguousPermissions {
        /// User owning the rows.
        user_id: SystemUserId,
        /// Number of rows found.
        row_count: usize,
    },
}

impl Display for MappingWarning {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmbiguousPermissions { user_id, row_count } => write!(
                formatter,
                "user '{user_id}' has {row_count} permission rows, using the first"
            ),
        }
    }
}

/// Mapped user together with any warnings raised on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMapping {
    /// The mapped snapshot.
    pub user: SystemUser,
    /// Warnings for the caller to surface.
    pub warnings: Vec<MappingWarning>,
}

impl UserMapping {
    /// Discards the warnings.
    #[must_use]
    pub fn into_user(self) -> SystemUser {
        self.user
    }
}

/// Maps a raw row into a user snapshot, ignoring embedded permissions.
///
/// Only the identifier is required. Every other missing column maps to an
/// absent value.
pub fn map_user(raw: RawUserRecord) -> AppResult<SystemUser> {
    let id = raw
        .id
        .ok_or_else(|| AppError::MalformedRecord("user record is missing 'id'".to_owned()))
        .and_then(|value| {
            SystemUserId::new(value).map_err(|_| {
                AppError::MalformedRecord("user record has a blank 'id'".to_owned())
            })
        })?;

    Ok(SystemUser::new(
        id,
        SystemUserProfile {
            name: raw.name,
            username: raw.username,
            email: raw.email,
            role: raw.role.map(UserRole::from),
            shift: raw.shift,
            status: raw.status.map(UserStatus::from),
            unit_id: raw.unit_id,
            unit_name: raw.units.and_then(|unit| unit.name),
        },
    ))
}

/// Maps a raw row and attaches the first embedded permission row, if any.
pub fn map_user_with_permissions(mut raw: RawUserRecord) -> AppResult<UserMapping> {
    let permission_rows = raw.system_user_permissions.take().unwrap_or_default();
    let user = map_user(raw)?;

    let mut warnings = Vec::new();
    if permission_rows.len() > 1 {
        warnings.push(MappingWarning::AmbiguousPermissions {
            user_id: user.id().clone(),
            row_count: permission_rows.len(),
        });
    }

    let user = match permission_rows.first() {
        Some(row) => user.with_permissions(map_permissions(row)),
        None => user,
    };

    Ok(UserMapping { user, warnings })
}

/// Renames a permission row into an override set without defaulting.
#[must_use]
pub fn map_permissions(raw: &RawPermissionsRecord) -> UserPermissions {
    UserPermissions {
        can_view_vehicles: raw.can_view_vehicles,
        can_edit_vehicles: raw.can_edit_vehicles,
        can_view_units: raw.can_view_units,
        can_edit_units: raw.can_edit_units,
        can_view_users: raw.can_view_users,
        can_edit_users: raw.can_edit_users,
        can_view_movements: raw.can_view_movements,
        can_edit_movements: raw.can_edit_movements,
        can_switch_units: raw.can_switch_units,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::RawUnitRelation;

    fn driver_record() -> RawUserRecord {
        RawUserRecord {
            id: Some("1".to_owned()),
            name: Some("A".to_owned()),
            username: Some("a".to_owned()),
            email: Some("a@x.com".to_owned()),
            role: Some("driver".to_owned()),
            shift: Some("day".to_owned()),
            status: Some("active".to_owned()),
            unit_id: None,
            units: None,
            system_user_permissions: None,
        }
    }

    #[test]
    fn user_without_unit_has_no_unit_fields() -> AppResult<()> {
        let user = map_user(driver_record())?;
        assert_eq!(user.id().as_str(), "1");
        assert_eq!(user.name(), Some("A"));
        assert_eq!(user.username(), Some("a"));
        assert_eq!(user.email(), Some("a@x.com"));
        assert_eq!(user.role(), Some(&UserRole::Other("driver".to_owned())));
        assert_eq!(user.shift(), Some("day"));
        assert_eq!(user.status(), Some(&UserStatus::Active));
        assert_eq!(user.unit_id(), None);
        assert_eq!(user.unit_name(), None);
        assert_eq!(user.permissions(), None);
        Ok(())
    }

    #[test]
    fn unit_name_comes_from_relation() -> AppResult<()> {
        let user = map_user(RawUserRecord {
            unit_id: Some("unit-3".to_owned()),
            units: Some(RawUnitRelation {
                name: Some("North Gate".to_owned()),
            }),
            ..driver_record()
        })?;
        assert_eq!(user.unit_id(), Some("unit-3"));
        assert_eq!(user.unit_name(), Some("North Gate"));
        Ok(())
    }

    #[test]
    fn missing_optional_fields_stay_absent() -> AppResult<()> {
        let raw = RawUserRecord::from_value(json!({ "id": "7" }))?;
        let user = map_user(raw)?;
        assert_eq!(user.name(), None);
        assert_eq!(user.role(), None);
        assert_eq!(user.status(), None);
        assert!(!user.is_admin());
        Ok(())
    }

    #[test]
    fn missing_identifier_is_malformed() {
        let result = map_user(RawUserRecord {
            id: None,
            ..driver_record()
        });
        assert!(matches!(result, Err(AppError::MalformedRecord(_))));
    }

    #[test]
    fn blank_identifier_is_malformed() {
        let result = map_user(RawUserRecord {
            id: Some("  ".to_owned()),
            ..driver_record()
        });
        assert!(matches!(result, Err(AppError::MalformedRecord(_))));
    }

    #[test]
    fn unknown_status_is_kept_verbatim() -> AppResult<()> {
        let user = map_user(RawUserRecord {
            status: Some("on_leave".to_owned()),
            ..driver_record()
        })?;
        assert_eq!(user.status(), Some(&UserStatus::Other("on_leave".to_owned())));
        assert!(!user.is_inactive());
        Ok(())
    }

    #[test]
    fn email_is_passed_through_unvalidated() -> AppResult<()> {
        let user = map_user(RawUserRecord {
            email: Some("not-an-email".to_owned()),
            ..driver_record()
        })?;
        assert_eq!(user.email(), Some("not-an-email"));
        Ok(())
    }

    #[test]
    fn without_permission_rows_overrides_stay_unset() -> AppResult<()> {
        let mapping = map_user_with_permissions(RawUserRecord {
            system_user_permissions: Some(Vec::new()),
            ..driver_record()
        })?;
        assert_eq!(mapping.user.permissions(), None);
        assert!(mapping.warnings.is_empty());
        Ok(())
    }

    #[test]
    fn first_permission_row_wins() -> AppResult<()> {
        let mapping = map_user_with_permissions(RawUserRecord {
            system_user_permissions: Some(vec![
                RawPermissionsRecord {
                    can_view_vehicles: Some(true),
                    ..RawPermissionsRecord::default()
                },
                RawPermissionsRecord {
                    can_view_vehicles: Some(false),
                    can_edit_units: Some(true),
                    ..RawPermissionsRecord::default()
                },
            ]),
            ..driver_record()
        })?;

        let permissions = mapping.user.permissions().copied().unwrap_or_default();
        assert_eq!(permissions.can_view_vehicles, Some(true));
        assert_eq!(permissions.can_edit_units, None);
        assert_eq!(
            mapping.warnings,
            vec![MappingWarning::AmbiguousPermissions {
                user_id: SystemUserId::new("1")?,
                row_count: 2,
            }]
        );
        Ok(())
    }

    #[test]
    fn permission_fields_are_renamed_one_to_one() {
        let raw = RawPermissionsRecord {
            user_id: Some("1".to_owned()),
            can_view_vehicles: Some(true),
            can_edit_vehicles: Some(false),
            can_view_units: None,
            can_edit_units: Some(true),
            can_view_users: Some(false),
            can_edit_users: None,
            can_view_movements: Some(true),
            can_edit_movements: Some(false),
            can_switch_units: Some(true),
        };

        let mapped = map_permissions(&raw);
        let mut written_back = mapped.to_raw();
        written_back.user_id = raw.user_id.clone();
        assert_eq!(written_back, raw);
    }

    #[test]
    fn warning_message_names_user_and_row_count() -> AppResult<()> {
        let warning = MappingWarning::AmbiguousPermissions {
            user_id: SystemUserId::new("u-9")?,
            row_count: 3,
        };
        assert_eq!(
            warning.to_string(),
            "user 'u-9' has 3 permission rows, using the first"
        );
        Ok(())
    }
}
