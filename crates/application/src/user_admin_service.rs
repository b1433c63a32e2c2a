//! Administrative user management.

use std::sync::Arc;

use panelist_core::{AppError, AppResult};
use panelist_domain::{ADMIN_ROLES, Auditable, ExtraData, Principal, Role, UserId};

use crate::{AuditSignal, EventBus, UserRepository, check_role};

/// Application service for admin-only user operations.
#[derive(Clone)]
pub struct UserAdminService {
    user_repository: Arc<dyn UserRepository>,
    event_bus: EventBus,
}

impl UserAdminService {
    /// Creates a new user administration service.
    #[must_use]
    pub fn new(user_repository: Arc<dyn UserRepository>, event_bus: EventBus) -> Self {
        Self {
            user_repository,
            event_bus,
        }
    }

    /// Assigns `role` to `target`.
    ///
    /// Assigning the role a user already holds changes nothing and records
    /// nothing.
    pub async fn change_role(
        &self,
        actor: &Principal,
        target: UserId,
        role: Role,
    ) -> AppResult<Principal> {
        check_role(actor, ADMIN_ROLES)?;

        let existing = self
            .user_repository
            .find_principal(target)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{target}' does not exist")))?;

        if existing.role() == Some(role) {
            return Ok(existing);
        }

        self.user_repository.update_role(target, role).await?;

        let updated = Principal::new(
            existing.user_id(),
            existing.email(),
            Some(role),
            existing.is_superuser(),
        );
        self.event_bus
            .dispatch(AuditSignal::AdminUpdated {
                actor: actor.clone(),
                resource: updated.audit_resource(),
                changes: ExtraData::field_change(
                    "role",
                    existing.role().map(|previous| previous.as_str()),
                    role.as_str(),
                ),
            })
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests;
