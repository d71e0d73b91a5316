//! Ports towards the hosted user backend.

use async_trait::async_trait;

use yardline_core::{AppResult, LoginCredentials};
use yardline_domain::{RawPermissionsRecord, RawUserRecord};

/// Repository port for operator accounts and their permission rows.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds the raw record of a user, including the unit and permission relations.
    async fn find_user_record(&self, user_id: &str) -> AppResult<Option<RawUserRecord>>;

    /// Lists the raw records of every user.
    async fn list_user_records(&self) -> AppResult<Vec<RawUserRecord>>;

    /// Writes a permissions patch for a user.
    ///
    /// Returns `false` when the backend refused the write.
    async fn update_user_permissions(
        &self,
        user_id: &str,
        patch: &RawPermissionsRecord,
    ) -> AppResult<bool>;
}

/// Port for the remote credential check.
///
/// Password verification happens on the backend; the returned row is the
/// authenticated user, or `None` when the credentials were rejected.
#[async_trait]
pub trait AuthenticationGateway: Send + Sync {
    /// Verifies credentials and returns the matching user row.
    async fn authenticate(&self, credentials: &LoginCredentials)
    -> AppResult<Option<RawUserRecord>>;
}

/// Port for password hashing operations. Keeps application code free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
