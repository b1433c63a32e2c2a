//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_verifier;
mod in_memory_audit_log_repository;
mod in_memory_practice_session_repository;
mod in_memory_user_repository;
mod postgres_audit_log_repository;
mod postgres_practice_session_repository;
mod postgres_user_repository;

#[cfg(test)]
mod postgres_test_support;

pub use argon2_password_verifier::Argon2PasswordVerifier;
pub use in_memory_audit_log_repository::InMemoryAuditLogRepository;
pub use in_memory_practice_session_repository::InMemoryPracticeSessionRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_practice_session_repository::PostgresPracticeSessionRepository;
pub use postgres_user_repository::PostgresUserRepository;
