//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod practice_session;
mod role;
mod user;

pub use audit::{
    AuditAction, AuditLogEntry, AuditRecord, AuditResource, AuditScalar, Auditable, ExtraData,
    SENSITIVE_KEY_FRAGMENTS,
};
pub use practice_session::{PRACTICE_SESSION_RESOURCE_TYPE, PracticeSession, PracticeSessionId};
pub use role::{
    ADMIN_ROLES, AccessDecision, OwnedResource, PRIVILEGED_ROLES, Principal, Role,
    USER_RESOURCE_TYPE,
};
pub use user::{EmailAddress, UserId};
