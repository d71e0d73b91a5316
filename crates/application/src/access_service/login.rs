use tracing::info;

use yardline_core::LoginCredentials;
use yardline_domain::map_user;

use super::*;

impl AccessService {
    /// Authenticates an operator through the backend credential check.
    ///
    /// The row returned by the check is only used for its identifier; the
    /// full record with unit and permission relations is loaded afterwards.
    /// Inactive operators fail with the same generic outcome as bad
    /// credentials.
    pub async fn login(&self, credentials: &LoginCredentials) -> AppResult<AuthOutcome> {
        let Some(record) = self.gateway.authenticate(credentials).await? else {
            info!(
                username = %credentials.username(),
                outcome = "invalid_credentials",
                "login attempt"
            );
            return Ok(AuthOutcome::Failed);
        };

        let authenticated = map_user(record)?;
        let Some(full_record) = self
            .directory
            .find_user_record(authenticated.id().as_str())
            .await?
        else {
            return Err(AppError::Internal(format!(
                "authenticated user '{}' is missing from the user directory",
                authenticated.id()
            )));
        };

        let user = map_record(full_record)?;
        if user.is_inactive() {
            info!(
                user_id = %user.id(),
                outcome = "inactive",
                "login attempt"
            );
            return Ok(AuthOutcome::Failed);
        }

        info!(user_id = %user.id(), outcome = "success", "login attempt");
        Ok(AuthOutcome::Authenticated(user))
    }
}
