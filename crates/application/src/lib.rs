//! Application services and ports.

#![forbid(unsafe_code)]

mod access_service;
mod audit_event_handler;
mod audit_ports;
mod audit_service;
mod auth_service;
mod event_bus;
mod practice_session_service;
mod request_context;
mod user_admin_service;
mod user_ports;

#[cfg(test)]
mod test_support;

pub use access_service::{AccessService, check_object_permission, check_role};
pub use audit_event_handler::{ATTEMPTED_IDENTIFIER_KEY, AuditEventHandler, audit_input_for};
pub use audit_ports::{
    AUDIT_LOG_MAX_LIMIT, AUDIT_LOG_MAX_OFFSET, AuditLogQuery, AuditLogRepository,
};
pub use audit_service::{AuditEventInput, AuditService, AuditWriteFailure};
pub use auth_service::{AuthService, LoginOutcome};
pub use event_bus::{AuditSignal, EventBus, EventBusBuilder, EventHandler};
pub use practice_session_service::{PracticeSessionRepository, PracticeSessionService};
pub use request_context::{CLIENT_ID_MAX_CHARS, RequestContext};
pub use user_admin_service::UserAdminService;
pub use user_ports::{PasswordVerifier, UserCredentials, UserRepository};
