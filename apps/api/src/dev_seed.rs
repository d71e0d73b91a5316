use tracing::info;
use yardline_core::AppResult;
use yardline_domain::{RawPermissionsRecord, RawUnitRelation, RawUserRecord};
use yardline_infrastructure::InMemoryUserDirectory;

pub const DEV_SEED_ADMIN_ID: &str = "7c1d2a4e-0b6f-4f7e-9a51-2f3b8c9d0e11";
const DEV_SEED_ADMIN_USERNAME: &str = "admin";
const DEV_SEED_ADMIN_PASSWORD: &str = "admin";

pub const DEV_SEED_DRIVER_ID: &str = "3e9f6b20-5d4c-4a1b-8e72-6c0d1f2a3b44";
const DEV_SEED_DRIVER_USERNAME: &str = "driver";
const DEV_SEED_DRIVER_PASSWORD: &str = "driver";

pub const DEV_SEED_RESTRICTED_ID: &str = "b8a7c6d5-e4f3-4210-9fed-cba987654321";
const DEV_SEED_RESTRICTED_USERNAME: &str = "supervisor";
const DEV_SEED_RESTRICTED_PASSWORD: &str = "supervisor";

const DEV_SEED_UNIT_ID: &str = "unit-main-yard";
const DEV_SEED_UNIT_NAME: &str = "Main Yard";

/// Loads development operators into the in-memory directory.
///
/// The supervisor is an admin whose overrides take away user editing and
/// unit editing, which exercises the override-before-role rule.
pub async fn seed(directory: &InMemoryUserDirectory) -> AppResult<()> {
    directory
        .insert_user(seed_user(
            DEV_SEED_ADMIN_ID,
            "Yard Admin",
            DEV_SEED_ADMIN_USERNAME,
            "admin",
            None,
        ))
        .await?;
    directory
        .insert_user(seed_user(
            DEV_SEED_DRIVER_ID,
            "Dock Driver",
            DEV_SEED_DRIVER_USERNAME,
            "driver",
            Some(RawPermissionsRecord {
                can_view_vehicles: Some(true),
                ..RawPermissionsRecord::default()
            }),
        ))
        .await?;
    directory
        .insert_user(seed_user(
            DEV_SEED_RESTRICTED_ID,
            "Shift Supervisor",
            DEV_SEED_RESTRICTED_USERNAME,
            "admin",
            Some(RawPermissionsRecord {
                can_edit_users: Some(false),
                can_edit_units: Some(false),
                can_switch_units: Some(false),
                ..RawPermissionsRecord::default()
            }),
        ))
        .await?;

    directory
        .register_credentials(
            DEV_SEED_ADMIN_USERNAME,
            DEV_SEED_ADMIN_PASSWORD,
            DEV_SEED_ADMIN_ID,
        )
        .await?;
    directory
        .register_credentials(
            DEV_SEED_DRIVER_USERNAME,
            DEV_SEED_DRIVER_PASSWORD,
            DEV_SEED_DRIVER_ID,
        )
        .await?;
    directory
        .register_credentials(
            DEV_SEED_RESTRICTED_USERNAME,
            DEV_SEED_RESTRICTED_PASSWORD,
            DEV_SEED_RESTRICTED_ID,
        )
        .await?;

    info!(users = 3, "development seed loaded");
    Ok(())
}

fn seed_user(
    id: &str,
    name: &str,
    username: &str,
    role: &str,
    permissions: Option<RawPermissionsRecord>,
) -> RawUserRecord {
    RawUserRecord {
        id: Some(id.to_owned()),
        name: Some(name.to_owned()),
        username: Some(username.to_owned()),
        email: Some(format!("{username}@yardline.local")),
        role: Some(role.to_owned()),
        shift: Some("day".to_owned()),
        status: Some("active".to_owned()),
        unit_id: Some(DEV_SEED_UNIT_ID.to_owned()),
        units: Some(RawUnitRelation {
            name: Some(DEV_SEED_UNIT_NAME.to_owned()),
        }),
        system_user_permissions: permissions.map(|row| {
            vec![RawPermissionsRecord {
                user_id: Some(id.to_owned()),
                ..row
            }]
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use yardline_application::{AccessService, AuthOutcome};
    use yardline_core::LoginCredentials;
    use yardline_domain::{Capability, EffectivePermissions, can_switch_units};
    use yardline_infrastructure::Argon2PasswordHasher;

    use super::*;

    async fn seeded_service() -> AppResult<AccessService> {
        let directory = Arc::new(InMemoryUserDirectory::new(Arc::new(
            Argon2PasswordHasher::with_costs(1_024, 1),
        )));
        seed(&directory).await?;
        Ok(AccessService::new(directory.clone(), directory))
    }

    #[tokio::test]
    async fn seeded_operators_can_log_in() -> AppResult<()> {
        let service = seeded_service().await?;

        for (username, password, id) in [
            (DEV_SEED_ADMIN_USERNAME, DEV_SEED_ADMIN_PASSWORD, DEV_SEED_ADMIN_ID),
            (DEV_SEED_DRIVER_USERNAME, DEV_SEED_DRIVER_PASSWORD, DEV_SEED_DRIVER_ID),
            (
                DEV_SEED_RESTRICTED_USERNAME,
                DEV_SEED_RESTRICTED_PASSWORD,
                DEV_SEED_RESTRICTED_ID,
            ),
        ] {
            let outcome = service
                .login(&LoginCredentials::new(username, password)?)
                .await?;
            let AuthOutcome::Authenticated(user) = outcome else {
                panic!("seeded login for '{username}' failed");
            };
            assert_eq!(user.id().as_str(), id);
            assert_eq!(user.unit_name(), Some(DEV_SEED_UNIT_NAME));
        }
        Ok(())
    }

    #[tokio::test]
    async fn supervisor_overrides_narrow_the_admin_role() -> AppResult<()> {
        let service = seeded_service().await?;
        let supervisor = service.find_user(DEV_SEED_RESTRICTED_ID).await?;
        let effective = EffectivePermissions::for_user(&supervisor);

        assert!(supervisor.is_admin());
        assert!(effective.allows(Capability::ViewUsers));
        assert!(!effective.allows(Capability::EditUsers));
        assert!(!effective.allows(Capability::EditUnits));
        assert!(!can_switch_units(&supervisor));
        Ok(())
    }
}
