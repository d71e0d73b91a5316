use tracing::{info, warn};

use yardline_domain::UserPermissions;

use super::*;

impl AccessService {
    /// Lists every operator, sorted by display name.
    ///
    /// Rows that cannot be mapped are skipped and logged rather than failing
    /// the whole listing.
    pub async fn list_users(&self, actor: &SystemUser) -> AppResult<Vec<SystemUser>> {
        self.require_capability(actor, Capability::ViewUsers)?;

        let mut users = Vec::new();
        for record in self.directory.list_user_records().await? {
            match map_record(record) {
                Ok(user) => users.push(user),
                Err(error) => warn!(error = %error, "skipping malformed user record"),
            }
        }

        users.sort_by(|left, right| {
            left.name()
                .cmp(&right.name())
                .then_with(|| left.id().cmp(right.id()))
        });

        Ok(users)
    }

    /// Returns one operator. Reading oneself needs no capability.
    pub async fn view_user(&self, actor: &SystemUser, user_id: &str) -> AppResult<SystemUser> {
        if actor.id().as_str() != user_id {
            self.require_capability(actor, Capability::ViewUsers)?;
        }

        self.find_user(user_id).await
    }

    /// Returns an operator with its stored overrides and resolved capabilities.
    pub async fn user_permissions(
        &self,
        actor: &SystemUser,
        user_id: &str,
    ) -> AppResult<PermissionSnapshot> {
        let user = self.view_user(actor, user_id).await?;
        Ok(PermissionSnapshot::new(user))
    }

    /// Writes permission overrides for an operator and returns the refreshed snapshot.
    pub async fn update_user_permissions(
        &self,
        actor: &SystemUser,
        user_id: &str,
        patch: UserPermissions,
    ) -> AppResult<SystemUser> {
        self.require_capability(actor, Capability::EditUsers)?;

        if patch.is_empty() {
            return Err(AppError::Validation(
                "permissions patch must set at least one field".to_owned(),
            ));
        }

        let target = self.find_user(user_id).await?;
        let applied = self
            .directory
            .update_user_permissions(target.id().as_str(), &patch.to_raw())
            .await?;

        if !applied {
            warn!(
                actor = %actor.id(),
                user_id = %target.id(),
                "backend rejected permissions update"
            );
            return Err(AppError::Internal(format!(
                "backend rejected the permissions update for user '{}'",
                target.id()
            )));
        }

        info!(
            actor = %actor.id(),
            user_id = %target.id(),
            "user permissions updated"
        );

        self.find_user(target.id().as_str()).await
    }
}
