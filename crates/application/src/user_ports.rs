//! Ports for principal lookup and credential verification.

use async_trait::async_trait;

use panelist_core::AppResult;
use panelist_domain::{EmailAddress, Principal, Role, UserId};

/// Principal together with its stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    /// Principal the credentials belong to.
    pub principal: Principal,
    /// Argon2id password hash, or `None` when password login is disabled.
    pub password_hash: Option<String>,
}

/// Repository port for principal persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Resolves a principal with its role record.
    ///
    /// Returns `None` when the user row does not exist. A user without a
    /// role record is returned with `role() == None`.
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>>;

    /// Finds credentials by canonical email.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>>;

    /// Creates or replaces the role record of an existing user.
    async fn update_role(&self, user_id: UserId, role: Role) -> AppResult<()>;
}

/// Port for password verification. Keeps application code free of direct
/// cryptographic library coupling.
pub trait PasswordVerifier: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
