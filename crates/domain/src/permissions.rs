//! Capability overrides and their resolution into an effective set.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use yardline_core::AppError;

use crate::{RawPermissionsRecord, SystemUser};

/// Capabilities the dashboard gates its screens and actions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// List and inspect vehicles.
    ViewVehicles,
    /// Create, update and delete vehicles.
    EditVehicles,
    /// List recorded movements.
    ViewMovements,
    /// Correct or delete recorded movements.
    EditMovements,
    /// Register a new entry or exit.
    CreateMovements,
    /// List operator accounts.
    ViewUsers,
    /// Manage operator accounts and their permissions.
    EditUsers,
    /// List units.
    ViewUnits,
    /// Create, update and delete units.
    EditUnits,
}

impl Capability {
    /// Returns a stable storage value for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewVehicles => "vehicles.view",
            Self::EditVehicles => "vehicles.edit",
            Self::ViewMovements => "movements.view",
            Self::EditMovements => "movements.edit",
            Self::CreateMovements => "movements.create",
            Self::ViewUsers => "users.view",
            Self::EditUsers => "users.edit",
            Self::ViewUnits => "units.view",
            Self::EditUnits => "units.edit",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::ViewVehicles,
            Capability::EditVehicles,
            Capability::ViewMovements,
            Capability::EditMovements,
            Capability::CreateMovements,
            Capability::ViewUsers,
            Capability::EditUsers,
            Capability::ViewUnits,
            Capability::EditUnits,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|capability| capability.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown capability '{value}'")))
    }
}

/// Explicit per-user overrides. `None` means "fall back to the role".
///
/// Also used as the write-back patch: only the fields that are set are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    /// Override for viewing vehicles.
    pub can_view_vehicles: Option<bool>,
    /// Override for editing vehicles.
    pub can_edit_vehicles: Option<bool>,
    /// Override for viewing units.
    pub can_view_units: Option<bool>,
    /// Override for editing units.
    pub can_edit_units: Option<bool>,
    /// Override for viewing users.
    pub can_view_users: Option<bool>,
    /// Override for editing users.
    pub can_edit_users: Option<bool>,
    /// Override for viewing movements. Stored, but never consulted.
    pub can_view_movements: Option<bool>,
    /// Override for editing movements.
    pub can_edit_movements: Option<bool>,
    /// Override for switching the active unit.
    pub can_switch_units: Option<bool>,
}

impl UserPermissions {
    /// Returns the stored override for a capability.
    ///
    /// Movement creation has no override field and always yields `None`.
    #[must_use]
    pub fn override_for(&self, capability: Capability) -> Option<bool> {
        match capability {
            Capability::ViewVehicles => self.can_view_vehicles,
            Capability::EditVehicles => self.can_edit_vehicles,
            Capability::ViewMovements => self.can_view_movements,
            Capability::EditMovements => self.can_edit_movements,
            Capability::CreateMovements => None,
            Capability::ViewUsers => self.can_view_users,
            Capability::EditUsers => self.can_edit_users,
            Capability::ViewUnits => self.can_view_units,
            Capability::EditUnits => self.can_edit_units,
        }
    }

    /// Returns whether no override is set at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Converts the overrides into the backend row shape for write-back.
    #[must_use]
    pub fn to_raw(&self) -> RawPermissionsRecord {
        RawPermissionsRecord {
            user_id: None,
            can_view_vehicles: self.can_view_vehicles,
            can_edit_vehicles: self.can_edit_vehicles,
            can_view_units: self.can_view_units,
            can_edit_units: self.can_edit_units,
            can_view_users: self.can_view_users,
            can_edit_users: self.can_edit_users,
            can_view_movements: self.can_view_movements,
            can_edit_movements: self.can_edit_movements,
            can_switch_units: self.can_switch_units,
        }
    }
}

/// Fully resolved capability set. Every field is a plain boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissions {
    can_view_vehicles: bool,
    can_edit_vehicles: bool,
    can_view_movements: bool,
    can_edit_movements: bool,
    can_create_movements: bool,
    can_view_users: bool,
    can_edit_users: bool,
    can_view_units: bool,
    can_edit_units: bool,
}

impl EffectivePermissions {
    /// Resolves the capability set of a user.
    #[must_use]
    pub fn for_user(user: &SystemUser) -> Self {
        Self {
            can_view_vehicles: resolve_capability(user, Capability::ViewVehicles),
            can_edit_vehicles: resolve_capability(user, Capability::EditVehicles),
            can_view_movements: resolve_capability(user, Capability::ViewMovements),
            can_edit_movements: resolve_capability(user, Capability::EditMovements),
            can_create_movements: resolve_capability(user, Capability::CreateMovements),
            can_view_users: resolve_capability(user, Capability::ViewUsers),
            can_edit_users: resolve_capability(user, Capability::EditUsers),
            can_view_units: resolve_capability(user, Capability::ViewUnits),
            can_edit_units: resolve_capability(user, Capability::EditUnits),
        }
    }

    /// Returns whether the capability is granted.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewVehicles => self.can_view_vehicles,
            Capability::EditVehicles => self.can_edit_vehicles,
            Capability::ViewMovements => self.can_view_movements,
            Capability::EditMovements => self.can_edit_movements,
            Capability::CreateMovements => self.can_create_movements,
            Capability::ViewUsers => self.can_view_users,
            Capability::EditUsers => self.can_edit_users,
            Capability::ViewUnits => self.can_view_units,
            Capability::EditUnits => self.can_edit_units,
        }
    }

    /// Returns the granted capabilities in declaration order.
    #[must_use]
    pub fn granted(&self) -> Vec<Capability> {
        Capability::all()
            .iter()
            .copied()
            .filter(|capability| self.allows(*capability))
            .collect()
    }

    /// Vehicle listing.
    #[must_use]
    pub fn can_view_vehicles(&self) -> bool {
        self.can_view_vehicles
    }

    /// Vehicle maintenance.
    #[must_use]
    pub fn can_edit_vehicles(&self) -> bool {
        self.can_edit_vehicles
    }

    /// Movement listing. Always granted.
    #[must_use]
    pub fn can_view_movements(&self) -> bool {
        self.can_view_movements
    }

    /// Movement corrections.
    #[must_use]
    pub fn can_edit_movements(&self) -> bool {
        self.can_edit_movements
    }

    /// Movement registration. Always granted.
    #[must_use]
    pub fn can_create_movements(&self) -> bool {
        self.can_create_movements
    }

    /// Operator listing.
    #[must_use]
    pub fn can_view_users(&self) -> bool {
        self.can_view_users
    }

    /// Operator administration.
    #[must_use]
    pub fn can_edit_users(&self) -> bool {
        self.can_edit_users
    }

    /// Unit listing.
    #[must_use]
    pub fn can_view_units(&self) -> bool {
        self.can_view_units
    }

    /// Unit maintenance.
    #[must_use]
    pub fn can_edit_units(&self) -> bool {
        self.can_edit_units
    }
}

/// Resolves the effective capability set for an optional user.
///
/// An absent user has no capability set at all, not an all-denied one.
#[must_use]
pub fn resolve_permissions(user: Option<&SystemUser>) -> Option<EffectivePermissions> {
    user.map(EffectivePermissions::for_user)
}

/// Returns whether the user may switch the active unit in the dashboard.
#[must_use]
pub fn can_switch_units(user: &SystemUser) -> bool {
    override_or_role(user, user.permissions().and_then(|set| set.can_switch_units))
}

fn resolve_capability(user: &SystemUser, capability: Capability) -> bool {
    match capability {
        Capability::CreateMovements => true,
        // The stored override is ignored; every operator sees movements.
        Capability::ViewMovements => true,
        _ => override_or_role(
            user,
            user.permissions()
                .and_then(|set| set.override_for(capability)),
        ),
    }
}

fn override_or_role(user: &SystemUser, explicit: Option<bool>) -> bool {
    explicit.unwrap_or_else(|| user.is_admin())
}
