//! Domain entities and invariants.
//!
//! Raw backend rows enter through [`RawUserRecord`], are mapped into
//! [`SystemUser`] snapshots and resolved into [`EffectivePermissions`].

#![forbid(unsafe_code)]

mod mapping;
mod permissions;
mod record;
mod user;

pub use mapping::{
    MappingWarning, UserMapping, map_permissions, map_user, map_user_with_permissions,
};
pub use permissions::{
    Capability, EffectivePermissions, UserPermissions, can_switch_units, resolve_permissions,
};
pub use record::{RawPermissionsRecord, RawUnitRelation, RawUserRecord};
pub use user::{SystemUser, SystemUserId, SystemUserProfile, UserRole, UserStatus};
