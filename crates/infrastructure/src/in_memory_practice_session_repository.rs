use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use panelist_application::PracticeSessionRepository;
use panelist_core::{AppError, AppResult, NonEmptyString};
use panelist_domain::{PracticeSession, PracticeSessionId, UserId};

/// In-memory practice session store.
#[derive(Debug, Default)]
pub struct InMemoryPracticeSessionRepository {
    sessions: RwLock<BTreeMap<PracticeSessionId, PracticeSession>>,
}

impl InMemoryPracticeSessionRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a session under a fixed identifier.
    pub async fn insert_session(&self, session: PracticeSession) {
        self.sessions.write().await.insert(session.id(), session);
    }
}

#[async_trait]
impl PracticeSessionRepository for InMemoryPracticeSessionRepository {
    async fn create_session(
        &self,
        owner_id: UserId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession> {
        let mut sessions = self.sessions.write().await;
        let next_id = sessions
            .keys()
            .next_back()
            .map_or(1, |last| last.as_i64() + 1);
        let session =
            PracticeSession::new(PracticeSessionId::new(next_id), owner_id, title, Utc::now());
        sessions.insert(session.id(), session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: PracticeSessionId) -> AppResult<Option<PracticeSession>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn list_sessions(&self, owner_id: Option<UserId>) -> AppResult<Vec<PracticeSession>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|session| owner_id.is_none_or(|owner_id| session.owner() == owner_id))
            .cloned()
            .collect())
    }

    async fn rename_session(
        &self,
        id: PracticeSessionId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession> {
        let mut sessions = self.sessions.write().await;
        let existing = sessions
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("practice session '{id}' does not exist")))?;
        let renamed = PracticeSession::new(id, existing.owner(), title, existing.created_at());
        sessions.insert(id, renamed.clone());
        Ok(renamed)
    }

    async fn delete_session(&self, id: PracticeSessionId) -> AppResult<bool> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use panelist_application::PracticeSessionRepository;
    use panelist_core::NonEmptyString;
    use panelist_domain::UserId;

    use super::InMemoryPracticeSessionRepository;

    #[tokio::test]
    async fn identifiers_increase_and_deletes_report_presence() {
        let repository = InMemoryPracticeSessionRepository::new();
        let owner = UserId::new();
        let title = NonEmptyString::new("Loop").unwrap_or_else(|_| panic!("test"));

        let first = repository.create_session(owner, title.clone()).await;
        let second = repository.create_session(owner, title).await;
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("create should succeed");
        };

        assert!(second.id() > first.id());
        assert_eq!(repository.delete_session(first.id()).await.ok(), Some(true));
        assert_eq!(repository.delete_session(first.id()).await.ok(), Some(false));
        assert_eq!(
            repository.list_sessions(Some(owner)).await.unwrap_or_default().len(),
            1
        );
    }
}
