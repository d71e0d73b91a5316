//! Access control for dashboard operators.
//!
//! Loads operator snapshots from the user directory, resolves their
//! effective permissions and enforces capability checks. The acting user is
//! always passed in explicitly; nothing here keeps a "current user".

use std::sync::Arc;

use tracing::warn;

use yardline_core::{AppError, AppResult};
use yardline_domain::{
    Capability, EffectivePermissions, RawUserRecord, SystemUser, can_switch_units,
    map_user_with_permissions, resolve_permissions,
};

use crate::{AuthenticationGateway, UserDirectory};

mod login;
mod users;


/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials were accepted. Carries a freshly loaded snapshot.
    Authenticated(SystemUser),
    /// Authentication failed. Generic outcome prevents enumeration.
    Failed,
}

/// An operator together with its resolved capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSnapshot {
    /// The operator, including its stored overrides.
    pub user: SystemUser,
    /// Capabilities after applying overrides and the role fallback.
    pub effective: EffectivePermissions,
    /// Whether the operator may switch between units.
    pub can_switch_units: bool,
}

impl PermissionSnapshot {
    /// Resolves the capabilities of `user`.
    #[must_use]
    pub fn new(user: SystemUser) -> Self {
        Self {
            effective: EffectivePermissions::for_user(&user),
            can_switch_units: can_switch_units(&user),
            user,
        }
    }
}

/// Application service for operator lookup and permission administration.
#[derive(Clone)]
pub struct AccessService {
    directory: Arc<dyn UserDirectory>,
    gateway: Arc<dyn AuthenticationGateway>,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>, gateway: Arc<dyn AuthenticationGateway>) -> Self {
        Self { directory, gateway }
    }

    /// Loads and maps a user by identifier.
    pub async fn find_user(&self, user_id: &str) -> AppResult<SystemUser> {
        let record = self
            .directory
            .find_user_record(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        map_record(record)
    }

    /// Resolves the capability set of an optional actor.
    #[must_use]
    pub fn effective_permissions(&self, actor: Option<&SystemUser>) -> Option<EffectivePermissions> {
        resolve_permissions(actor)
    }

    /// Ensures the actor holds a capability.
    pub fn require_capability(&self, actor: &SystemUser, capability: Capability) -> AppResult<()> {
        if EffectivePermissions::for_user(actor).allows(capability) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing capability '{}'",
            actor.id(),
            capability.as_str()
        )))
    }
}

fn map_record(record: RawUserRecord) -> AppResult<SystemUser> {
    let mapping = map_user_with_permissions(record)?;
    for warning in &mapping.warnings {
        warn!(warning = %warning, "user record mapped with warnings");
    }

    Ok(mapping.into_user())
}
