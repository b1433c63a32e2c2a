use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use panelist_core::{AppError, NonEmptyString};

use crate::{AuditResource, Auditable, OwnedResource, UserId};

/// Resource type tag used in audit entries for practice sessions.
pub const PRACTICE_SESSION_RESOURCE_TYPE: &str = "practice_session";

/// Identifier of a practice session row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PracticeSessionId(i64);

impl PracticeSessionId {
    /// Wraps a storage identifier.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the storage identifier.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PracticeSessionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for PracticeSessionId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<i64>().map(Self).map_err(|error| {
            AppError::Validation(format!("invalid practice session id '{value}': {error}"))
        })
    }
}

/// Candidate-owned interview practice session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSession {
    id: PracticeSessionId,
    owner_id: UserId,
    title: NonEmptyString,
    created_at: DateTime<Utc>,
}

impl PracticeSession {
    /// Creates a practice session value.
    #[must_use]
    pub fn new(
        id: PracticeSessionId,
        owner_id: UserId,
        title: NonEmptyString,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title,
            created_at,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> PracticeSessionId {
        self.id
    }

    /// Returns the owning candidate.
    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner_id
    }

    /// Returns the session title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl OwnedResource for PracticeSession {
    fn owner_id(&self) -> Option<UserId> {
        Some(self.owner_id)
    }
}

impl Auditable for PracticeSession {
    fn audit_resource(&self) -> AuditResource {
        AuditResource::new(PRACTICE_SESSION_RESOURCE_TYPE, self.id.to_string())
    }
}
