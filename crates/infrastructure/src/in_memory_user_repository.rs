use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use panelist_application::{UserCredentials, UserRepository};
use panelist_core::{AppError, AppResult};
use panelist_domain::{EmailAddress, Principal, Role, UserId};

/// In-memory principal store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserCredentials>>,
}

impl InMemoryUserRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub async fn insert_user(&self, principal: Principal, password_hash: Option<String>) {
        self.users.write().await.insert(
            principal.user_id(),
            UserCredentials {
                principal,
                password_hash,
            },
        );
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .map(|credentials| credentials.principal.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|credentials| {
                credentials
                    .principal
                    .email()
                    .eq_ignore_ascii_case(email.as_str())
            })
            .cloned())
    }

    async fn update_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        let mut users = self.users.write().await;
        let credentials = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        let principal = &credentials.principal;
        credentials.principal = Principal::new(
            principal.user_id(),
            principal.email(),
            Some(role),
            principal.is_superuser(),
        );
        Ok(())
    }
}
