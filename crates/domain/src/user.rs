//! Operator accounts as seen by the dashboard.

use serde::{Deserialize, Serialize};
use yardline_core::{AppResult, NonEmptyString};

use crate::UserPermissions;

/// Opaque identifier of a system user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemUserId(NonEmptyString);

impl SystemUserId {
    /// Creates a validated user identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?))
    }

    /// Returns the identifier as stored by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for SystemUserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Coarse-grained operator classification.
///
/// Only `admin` carries meaning for permission fallback. Every other value is
/// kept verbatim so it can be displayed and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Any non-admin role, such as `driver` or `gatekeeper`.
    Other(String),
}

impl UserRole {
    /// Storage value of the administrative role.
    pub const ADMIN: &'static str = "admin";

    /// Parses a storage value. Matching is exact and case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::from(value.to_owned())
    }

    /// Returns the storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => Self::ADMIN,
            Self::Other(value) => value.as_str(),
        }
    }

    /// Returns whether this is the administrative role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        if value == Self::ADMIN {
            Self::Admin
        } else {
            Self::Other(value)
        }
    }
}

impl From<UserRole> for String {
    fn from(value: UserRole) -> Self {
        match value {
            UserRole::Admin => UserRole::ADMIN.to_owned(),
            UserRole::Other(value) => value,
        }
    }
}

/// Account status of an operator.
///
/// Only `inactive` blocks sign-in. Unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    /// The operator may sign in.
    Active,
    /// The operator has been deactivated.
    Inactive,
    /// Any other backend value, such as `suspended`.
    Other(String),
}

impl UserStatus {
    /// Parses a storage value. Matching is exact and case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::from(value.to_owned())
    }

    /// Returns the storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for UserStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            _ => Self::Other(value),
        }
    }
}

impl From<UserStatus> for String {
    fn from(value: UserStatus) -> Self {
        match value {
            UserStatus::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

/// Descriptive attributes of a system user. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemUserProfile {
    /// Display name.
    pub name: Option<String>,
    /// Login name.
    pub username: Option<String>,
    /// Email address, not validated.
    pub email: Option<String>,
    /// Role used as permission fallback.
    pub role: Option<UserRole>,
    /// Shift label such as `day` or `night`.
    pub shift: Option<String>,
    /// Account status.
    pub status: Option<UserStatus>,
    /// Assigned unit, absent until the operator is placed at a unit.
    pub unit_id: Option<String>,
    /// Display name of the assigned unit.
    pub unit_name: Option<String>,
}

/// Immutable snapshot of an authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemUser {
    id: SystemUserId,
    name: Option<String>,
    username: Option<String>,
    email: Option<String>,
    role: Option<UserRole>,
    shift: Option<String>,
    status: Option<UserStatus>,
    unit_id: Option<String>,
    unit_name: Option<String>,
    permissions: Option<UserPermissions>,
}

impl SystemUser {
    /// Creates a user snapshot without explicit permission overrides.
    #[must_use]
    pub fn new(id: SystemUserId, profile: SystemUserProfile) -> Self {
        Self {
            id,
            name: profile.name,
            username: profile.username,
            email: profile.email,
            role: profile.role,
            shift: profile.shift,
            status: profile.status,
            unit_id: profile.unit_id,
            unit_name: profile.unit_name,
            permissions: None,
        }
    }

    /// Returns the snapshot with an explicit override set attached.
    #[must_use]
    pub fn with_permissions(mut self, permissions: UserPermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> &SystemUserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the role, if the backend supplied one.
    #[must_use]
    pub fn role(&self) -> Option<&UserRole> {
        self.role.as_ref()
    }

    /// Returns the shift label.
    #[must_use]
    pub fn shift(&self) -> Option<&str> {
        self.shift.as_deref()
    }

    /// Returns the account status.
    #[must_use]
    pub fn status(&self) -> Option<&UserStatus> {
        self.status.as_ref()
    }

    /// Returns the assigned unit identifier.
    #[must_use]
    pub fn unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref()
    }

    /// Returns the assigned unit display name.
    #[must_use]
    pub fn unit_name(&self) -> Option<&str> {
        self.unit_name.as_deref()
    }

    /// Returns the explicit override set.
    #[must_use]
    pub fn permissions(&self) -> Option<&UserPermissions> {
        self.permissions.as_ref()
    }

    /// Returns whether the user holds the administrative role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(UserRole::is_admin)
    }

    /// Returns whether the account is marked inactive.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self.status, Some(UserStatus::Inactive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_is_matched_exactly() {
        assert!(UserRole::parse("admin").is_admin());
        assert!(!UserRole::parse("Admin").is_admin());
        assert_eq!(UserRole::parse("driver").as_str(), "driver");
    }

    #[test]
    fn role_serializes_as_plain_string() {
        let encoded = serde_json::to_value(UserRole::Other("gatekeeper".to_owned()));
        assert_eq!(
            encoded.unwrap_or_else(|_| panic!("test")),
            serde_json::json!("gatekeeper")
        );
    }

    #[test]
    fn role_parse_matches_string_conversion() {
        for value in ["admin", "Admin", "driver", ""] {
            assert_eq!(UserRole::parse(value), UserRole::from(value.to_owned()));
        }
    }

    #[test]
    fn unknown_status_passes_through() {
        let status = UserStatus::parse("suspended");
        assert_eq!(status, UserStatus::Other("suspended".to_owned()));
        assert_eq!(status.as_str(), "suspended");
        assert_eq!(UserStatus::parse("inactive"), UserStatus::Inactive);
        assert_eq!(String::from(UserStatus::Active), "active");
    }

    #[test]
    fn only_exact_inactive_status_blocks() -> AppResult<()> {
        let with_status = |status: &str| -> AppResult<SystemUser> {
            Ok(SystemUser::new(
                SystemUserId::new("u-1")?,
                SystemUserProfile {
                    status: Some(UserStatus::parse(status)),
                    ..SystemUserProfile::default()
                },
            ))
        };

        assert!(with_status("inactive")?.is_inactive());
        assert!(!with_status("Inactive")?.is_inactive());
        assert!(!with_status("suspended")?.is_inactive());
        Ok(())
    }

    #[test]
    fn user_without_role_is_not_admin() -> AppResult<()> {
        let user = SystemUser::new(SystemUserId::new("u-1")?, SystemUserProfile::default());
        assert!(!user.is_admin());
        assert!(!user.is_inactive());
        Ok(())
    }

    #[test]
    fn blank_identifier_is_rejected() {
        assert!(SystemUserId::new(" ").is_err());
    }
}
