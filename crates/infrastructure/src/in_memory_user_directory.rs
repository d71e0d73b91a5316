use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use yardline_application::{AuthenticationGateway, PasswordHasher, UserDirectory};
use yardline_core::{AppError, AppResult, LoginCredentials};
use yardline_domain::{RawPermissionsRecord, RawUserRecord};

#[derive(Debug, Clone)]
struct StoredCredential {
    user_id: String,
    password_hash: String,
}

/// In-memory user directory and credential check for development and tests.
pub struct InMemoryUserDirectory {
    records: RwLock<HashMap<String, RawUserRecord>>,
    credentials: RwLock<HashMap<String, StoredCredential>>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new(password_hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            credentials: RwLock::new(HashMap::new()),
            password_hasher,
        }
    }

    /// Stores or replaces a raw user record.
    pub async fn insert_user(&self, record: RawUserRecord) -> AppResult<()> {
        let user_id = record
            .id
            .clone()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation("user record requires a non-empty 'id'".to_owned())
            })?;

        self.records.write().await.insert(user_id, record);
        Ok(())
    }

    /// Registers a login for an existing user.
    pub async fn register_credentials(
        &self,
        username: &str,
        password: &str,
        user_id: &str,
    ) -> AppResult<()> {
        if !self.records.read().await.contains_key(user_id) {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        let password_hash = self.password_hasher.hash_password(password)?;
        self.credentials.write().await.insert(
            username.to_owned(),
            StoredCredential {
                user_id: user_id.to_owned(),
                password_hash,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user_record(&self, user_id: &str) -> AppResult<Option<RawUserRecord>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn list_user_records(&self) -> AppResult<Vec<RawUserRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn update_user_permissions(
        &self,
        user_id: &str,
        patch: &RawPermissionsRecord,
    ) -> AppResult<bool> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(user_id) else {
            debug!(user_id, "permissions update for unknown user");
            return Ok(false);
        };

        let rows = record.system_user_permissions.get_or_insert_with(Vec::new);
        match rows.first_mut() {
            Some(row) => row.merge(patch),
            None => {
                let mut row = RawPermissionsRecord {
                    user_id: Some(user_id.to_owned()),
                    ..RawPermissionsRecord::default()
                };
                row.merge(patch);
                rows.push(row);
            }
        }

        Ok(true)
    }
}

#[async_trait]
impl AuthenticationGateway for InMemoryUserDirectory {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> AppResult<Option<RawUserRecord>> {
        let stored = self
            .credentials
            .read()
            .await
            .get(credentials.username())
            .cloned();

        let Some(stored) = stored else {
            // Hash anyway so unknown usernames cost the same as bad passwords.
            if let Err(error) = self.password_hasher.hash_password(credentials.password()) {
                debug!(error = %error, "dummy hash for unknown username failed");
            }
            return Ok(None);
        };

        if !self
            .password_hasher
            .verify_password(credentials.password(), &stored.password_hash)?
        {
            return Ok(None);
        }

        Ok(self.records.read().await.get(&stored.user_id).cloned())
    }
}
