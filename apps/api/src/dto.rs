use serde::{Deserialize, Serialize};
use ts_rs::TS;
use yardline_application::PermissionSnapshot;
use yardline_domain::{EffectivePermissions, SystemUser, UserPermissions, can_switch_units};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for username/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub username: String,
    pub password: String,
}

/// Auth status response for login.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-response.ts"
)]
pub struct AuthLoginResponse {
    pub status: String,
}

/// API representation of an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/system-user-response.ts"
)]
pub struct SystemUserResponse {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub shift: Option<String>,
    pub status: Option<String>,
    pub unit_id: Option<String>,
    pub unit_name: Option<String>,
}

impl From<&SystemUser> for SystemUserResponse {
    fn from(user: &SystemUser) -> Self {
        Self {
            id: user.id().as_str().to_owned(),
            name: user.name().map(ToOwned::to_owned),
            username: user.username().map(ToOwned::to_owned),
            email: user.email().map(ToOwned::to_owned),
            role: user.role().map(|role| role.as_str().to_owned()),
            shift: user.shift().map(ToOwned::to_owned),
            status: user.status().map(|status| status.as_str().to_owned()),
            unit_id: user.unit_id().map(ToOwned::to_owned),
            unit_name: user.unit_name().map(ToOwned::to_owned),
        }
    }
}

/// Resolved capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub can_view_vehicles: bool,
    pub can_edit_vehicles: bool,
    pub can_view_movements: bool,
    pub can_edit_movements: bool,
    pub can_create_movements: bool,
    pub can_view_users: bool,
    pub can_edit_users: bool,
    pub can_view_units: bool,
    pub can_edit_units: bool,
}

impl From<EffectivePermissions> for EffectivePermissionsResponse {
    fn from(permissions: EffectivePermissions) -> Self {
        Self {
            can_view_vehicles: permissions.can_view_vehicles(),
            can_edit_vehicles: permissions.can_edit_vehicles(),
            can_view_movements: permissions.can_view_movements(),
            can_edit_movements: permissions.can_edit_movements(),
            can_create_movements: permissions.can_create_movements(),
            can_view_users: permissions.can_view_users(),
            can_edit_users: permissions.can_edit_users(),
            can_view_units: permissions.can_view_units(),
            can_edit_units: permissions.can_edit_units(),
        }
    }
}

/// Per-user overrides. Used both as a response and as the update payload;
/// omitted or null fields are left untouched on update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-overrides.ts"
)]
pub struct PermissionOverridesPayload {
    #[serde(default)]
    pub can_view_vehicles: Option<bool>,
    #[serde(default)]
    pub can_edit_vehicles: Option<bool>,
    #[serde(default)]
    pub can_view_units: Option<bool>,
    #[serde(default)]
    pub can_edit_units: Option<bool>,
    #[serde(default)]
    pub can_view_users: Option<bool>,
    #[serde(default)]
    pub can_edit_users: Option<bool>,
    #[serde(default)]
    pub can_view_movements: Option<bool>,
    #[serde(default)]
    pub can_edit_movements: Option<bool>,
    #[serde(default)]
    pub can_switch_units: Option<bool>,
}

impl From<UserPermissions> for PermissionOverridesPayload {
    fn from(permissions: UserPermissions) -> Self {
        Self {
            can_view_vehicles: permissions.can_view_vehicles,
            can_edit_vehicles: permissions.can_edit_vehicles,
            can_view_units: permissions.can_view_units,
            can_edit_units: permissions.can_edit_units,
            can_view_users: permissions.can_view_users,
            can_edit_users: permissions.can_edit_users,
            can_view_movements: permissions.can_view_movements,
            can_edit_movements: permissions.can_edit_movements,
            can_switch_units: permissions.can_switch_units,
        }
    }
}

impl From<PermissionOverridesPayload> for UserPermissions {
    fn from(payload: PermissionOverridesPayload) -> Self {
        Self {
            can_view_vehicles: payload.can_view_vehicles,
            can_edit_vehicles: payload.can_edit_vehicles,
            can_view_units: payload.can_view_units,
            can_edit_units: payload.can_edit_units,
            can_view_users: payload.can_view_users,
            can_edit_users: payload.can_edit_users,
            can_view_movements: payload.can_view_movements,
            can_edit_movements: payload.can_edit_movements,
            can_switch_units: payload.can_switch_units,
        }
    }
}

/// Stored overrides and resolved capabilities of one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-permissions-response.ts"
)]
pub struct UserPermissionsResponse {
    pub user_id: String,
    pub overrides: PermissionOverridesPayload,
    pub effective: EffectivePermissionsResponse,
    pub can_switch_units: bool,
}

impl From<PermissionSnapshot> for UserPermissionsResponse {
    fn from(snapshot: PermissionSnapshot) -> Self {
        Self {
            user_id: snapshot.user.id().as_str().to_owned(),
            overrides: snapshot
                .user
                .permissions()
                .copied()
                .unwrap_or_default()
                .into(),
            effective: snapshot.effective.into(),
            can_switch_units: snapshot.can_switch_units,
        }
    }
}

/// API representation of the authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/current-user-response.ts"
)]
pub struct CurrentUserResponse {
    pub user: SystemUserResponse,
    pub permissions: EffectivePermissionsResponse,
    pub can_switch_units: bool,
}

impl From<&SystemUser> for CurrentUserResponse {
    fn from(user: &SystemUser) -> Self {
        Self {
            user: user.into(),
            permissions: EffectivePermissions::for_user(user).into(),
            can_switch_units: can_switch_units(user),
        }
    }
}
