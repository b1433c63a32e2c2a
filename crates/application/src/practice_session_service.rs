//! Practice session ports and application service.
//!
//! Creation, renaming and deletion are privileged administrative actions
//! and are audited. Reads are open to the owning candidate and to
//! privileged roles.

use std::sync::Arc;

use async_trait::async_trait;

use panelist_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use panelist_domain::{
    Auditable, ExtraData, PRIVILEGED_ROLES, PracticeSession, PracticeSessionId, Principal, UserId,
};

use crate::{
    AccessService, AuditSignal, EventBus, UserRepository, check_object_permission, check_role,
};

/// Repository port for practice session persistence.
#[async_trait]
pub trait PracticeSessionRepository: Send + Sync {
    /// Creates a session and returns it with its assigned identifier.
    async fn create_session(
        &self,
        owner_id: UserId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession>;

    /// Finds one session.
    async fn find_session(&self, id: PracticeSessionId) -> AppResult<Option<PracticeSession>>;

    /// Lists sessions ordered by identifier, optionally for one owner.
    async fn list_sessions(&self, owner_id: Option<UserId>) -> AppResult<Vec<PracticeSession>>;

    /// Replaces the title of an existing session.
    async fn rename_session(
        &self,
        id: PracticeSessionId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession>;

    /// Deletes a session. Returns whether a row was removed.
    async fn delete_session(&self, id: PracticeSessionId) -> AppResult<bool>;
}

/// Application service for practice sessions.
#[derive(Clone)]
pub struct PracticeSessionService {
    access_service: AccessService,
    user_repository: Arc<dyn UserRepository>,
    repository: Arc<dyn PracticeSessionRepository>,
    event_bus: EventBus,
}

impl PracticeSessionService {
    /// Creates a new practice session service.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        user_repository: Arc<dyn UserRepository>,
        repository: Arc<dyn PracticeSessionRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            access_service,
            user_repository,
            repository,
            event_bus,
        }
    }

    /// Creates a session on behalf of `owner_id`.
    pub async fn create_session(
        &self,
        actor: &Principal,
        owner_id: UserId,
        title: &str,
    ) -> AppResult<PracticeSession> {
        check_role(actor, PRIVILEGED_ROLES)?;
        let title = NonEmptyString::new(title)?;

        if self.user_repository.find_principal(owner_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "user '{owner_id}' does not exist"
            )));
        }

        let session = self.repository.create_session(owner_id, title).await?;
        self.event_bus
            .dispatch(AuditSignal::AdminCreated {
                actor: actor.clone(),
                resource: session.audit_resource(),
            })
            .await;

        Ok(session)
    }

    /// Replaces the title of a session.
    pub async fn rename_session(
        &self,
        actor: &Principal,
        id: PracticeSessionId,
        title: &str,
    ) -> AppResult<PracticeSession> {
        check_role(actor, PRIVILEGED_ROLES)?;
        let title = NonEmptyString::new(title)?;
        let existing = self.require_session(id).await?;

        if existing.title() == &title {
            return Ok(existing);
        }

        let renamed = self.repository.rename_session(id, title).await?;
        self.event_bus
            .dispatch(AuditSignal::AdminUpdated {
                actor: actor.clone(),
                resource: renamed.audit_resource(),
                changes: ExtraData::field_change(
                    "title",
                    existing.title().as_str(),
                    renamed.title().as_str(),
                ),
            })
            .await;

        Ok(renamed)
    }

    /// Deletes a session.
    pub async fn delete_session(&self, actor: &Principal, id: PracticeSessionId) -> AppResult<()> {
        check_role(actor, PRIVILEGED_ROLES)?;
        let existing = self.require_session(id).await?;

        if !self.repository.delete_session(id).await? {
            return Err(AppError::NotFound(format!(
                "practice session '{id}' does not exist"
            )));
        }

        self.event_bus
            .dispatch(AuditSignal::AdminDeleted {
                actor: actor.clone(),
                resource: existing.audit_resource(),
            })
            .await;

        Ok(())
    }

    /// Returns one session to its owner or a privileged caller.
    pub async fn get_session(
        &self,
        identity: Option<&UserIdentity>,
        id: PracticeSessionId,
    ) -> AppResult<PracticeSession> {
        self.access_service
            .owner_or_privileged_required(
                identity,
                || self.repository.find_session(id),
                |_, session| async move { Ok(session) },
            )
            .await
    }

    /// Lists the sessions `principal` may read.
    pub async fn list_visible_sessions(
        &self,
        principal: &Principal,
    ) -> AppResult<Vec<PracticeSession>> {
        let owner_filter = if principal.role_decision(PRIVILEGED_ROLES).is_allowed() {
            None
        } else {
            Some(principal.user_id())
        };

        let sessions = self.repository.list_sessions(owner_filter).await?;
        Ok(sessions
            .into_iter()
            .filter(|session| check_object_permission(principal, session).is_ok())
            .collect())
    }

    async fn require_session(&self, id: PracticeSessionId) -> AppResult<PracticeSession> {
        self.repository
            .find_session(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("practice session '{id}' does not exist")))
    }
}
