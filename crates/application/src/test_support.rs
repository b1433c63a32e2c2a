use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use panelist_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use panelist_domain::{
    AuditLogEntry, AuditRecord, EmailAddress, PracticeSession, PracticeSessionId, Principal, Role,
    UserId,
};

use crate::{
    AuditLogQuery, AuditLogRepository, PasswordVerifier, PracticeSessionRepository,
    UserCredentials, UserRepository,
};

pub fn principal(role: Option<Role>) -> Principal {
    let user_id = UserId::new();
    Principal::new(user_id, format!("{user_id}@example.com"), role, false)
}

pub fn identity(principal: &Principal) -> UserIdentity {
    UserIdentity::new(principal.user_id().as_uuid(), principal.email())
}

#[derive(Default)]
pub struct FakeUserRepository {
    principals: Mutex<HashMap<UserId, Principal>>,
    password_hashes: Mutex<HashMap<UserId, String>>,
}

impl FakeUserRepository {
    pub async fn insert(&self, principal: Principal, password_hash: Option<&str>) {
        if let Some(hash) = password_hash {
            self.password_hashes
                .lock()
                .await
                .insert(principal.user_id(), hash.to_owned());
        }
        self.principals
            .lock()
            .await
            .insert(principal.user_id(), principal);
    }

    pub async fn role_of(&self, user_id: UserId) -> Option<Role> {
        self.principals
            .lock()
            .await
            .get(&user_id)
            .and_then(Principal::role)
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.principals.lock().await.get(&user_id).cloned())
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let principal = self
            .principals
            .lock()
            .await
            .values()
            .find(|principal| principal.email() == email.as_str())
            .cloned();

        let Some(principal) = principal else {
            return Ok(None);
        };
        let password_hash = self
            .password_hashes
            .lock()
            .await
            .get(&principal.user_id())
            .cloned();

        Ok(Some(UserCredentials {
            principal,
            password_hash,
        }))
    }

    async fn update_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        let mut principals = self.principals.lock().await;
        let existing = principals
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        principals.insert(
            user_id,
            Principal::new(
                user_id,
                existing.email(),
                Some(role),
                existing.is_superuser(),
            ),
        );
        Ok(())
    }
}

pub struct PlaintextPasswordVerifier;

impl PasswordVerifier for PlaintextPasswordVerifier {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let Some(stored) = hash.strip_prefix("plain:") else {
            return Err(AppError::Internal(format!("unrecognized hash '{hash}'")));
        };
        Ok(stored == password)
    }
}

#[derive(Default)]
pub struct RecordingAuditLogRepository {
    entries: Mutex<Vec<AuditLogEntry>>,
    fail_appends: bool,
}

impl RecordingAuditLogRepository {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail_appends: true,
        }
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|entry| entry.record().clone())
            .collect()
    }
}

#[async_trait]
impl AuditLogRepository for RecordingAuditLogRepository {
    async fn append_entry(&self, record: AuditRecord) -> AppResult<AuditLogEntry> {
        if self.fail_appends {
            return Err(AppError::Internal("audit store unavailable".to_owned()));
        }

        let entry = AuditLogEntry::from_storage(Uuid::new_v4(), Utc::now(), record);
        self.entries.lock().await.push(entry.clone());
        Ok(entry)
    }

    async fn list_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .rev()
            .filter(|entry| query.action.is_none_or(|action| entry.action() == action))
            .filter(|entry| query.actor_id.is_none_or(|actor| entry.actor_id() == Some(actor)))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn update_entry(&self, _entry: &AuditLogEntry) -> AppResult<()> {
        Err(AppError::ImmutabilityViolation(
            "audit log entries cannot be modified".to_owned(),
        ))
    }

    async fn delete_entry(&self, _entry_id: Uuid) -> AppResult<()> {
        Err(AppError::ImmutabilityViolation(
            "audit log entries cannot be deleted".to_owned(),
        ))
    }
}

#[derive(Default)]
pub struct FakePracticeSessionRepository {
    sessions: Mutex<HashMap<PracticeSessionId, PracticeSession>>,
    next_id: AtomicI64,
}

impl FakePracticeSessionRepository {
    pub async fn seed(&self, id: i64, owner_id: UserId, title: &str) -> PracticeSession {
        let session = PracticeSession::new(
            PracticeSessionId::new(id),
            owner_id,
            NonEmptyString::new(title).unwrap_or_else(|_| panic!("test")),
            Utc::now(),
        );
        self.sessions
            .lock()
            .await
            .insert(session.id(), session.clone());
        session
    }

    pub async fn contains(&self, id: i64) -> bool {
        self.sessions
            .lock()
            .await
            .contains_key(&PracticeSessionId::new(id))
    }
}

#[async_trait]
impl PracticeSessionRepository for FakePracticeSessionRepository {
    async fn create_session(
        &self,
        owner_id: UserId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession> {
        let id = PracticeSessionId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1000);
        let session = PracticeSession::new(id, owner_id, title, Utc::now());
        self.sessions.lock().await.insert(id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: PracticeSessionId) -> AppResult<Option<PracticeSession>> {
        Ok(self.sessions.lock().await.get(&id).cloned())
    }

    async fn list_sessions(&self, owner_id: Option<UserId>) -> AppResult<Vec<PracticeSession>> {
        let mut sessions: Vec<PracticeSession> = self
            .sessions
            .lock()
            .await
            .values()
            .filter(|session| owner_id.is_none_or(|owner| session.owner() == owner))
            .cloned()
            .collect();
        sessions.sort_by_key(PracticeSession::id);
        Ok(sessions)
    }

    async fn rename_session(
        &self,
        id: PracticeSessionId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession> {
        let mut sessions = self.sessions.lock().await;
        let existing = sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("practice session '{id}' does not exist")))?;
        let renamed = PracticeSession::new(id, existing.owner(), title, existing.created_at());
        sessions.insert(id, renamed.clone());
        Ok(renamed)
    }

    async fn delete_session(&self, id: PracticeSessionId) -> AppResult<bool> {
        Ok(self.sessions.lock().await.remove(&id).is_some())
    }
}
