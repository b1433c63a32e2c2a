//! Password login and logout.
//!
//! Every outcome is reported as a generic success or failure so callers
//! cannot enumerate accounts. Both outcomes emit an audit signal.

use std::sync::Arc;

use panelist_core::AppResult;
use panelist_domain::{EmailAddress, Principal};
use tracing::warn;

use crate::{AuditSignal, EventBus, PasswordVerifier, UserCredentials, UserRepository};

/// Longest attempted identifier kept in a failed-login signal.
const ATTEMPTED_IDENTIFIER_MAX_CHARS: usize = 254;

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched. A session can be established.
    Authenticated(Principal),
    /// Credentials were rejected.
    Failed,
}

/// Application service for authentication flows.
#[derive(Clone)]
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    password_verifier: Arc<dyn PasswordVerifier>,
    event_bus: EventBus,
}

impl AuthService {
    /// Creates a new auth service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_verifier: Arc<dyn PasswordVerifier>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            user_repository,
            password_verifier,
            event_bus,
        }
    }

    /// Authenticates a user with email and password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let credentials = match EmailAddress::new(email) {
            Ok(address) => {
                self.user_repository
                    .find_credentials_by_email(&address)
                    .await?
            }
            Err(_) => None,
        };

        let authenticated = match credentials {
            Some(UserCredentials {
                principal,
                password_hash: Some(stored_hash),
            }) => match self.password_verifier.verify_password(password, &stored_hash) {
                Ok(matches) => matches.then_some(principal),
                Err(error) => {
                    warn!(
                        user_id = %principal.user_id(),
                        %error,
                        "stored password hash could not be verified"
                    );
                    None
                }
            },
            Some(UserCredentials {
                password_hash: None,
                ..
            })
            | None => {
                // Hash anyway so unknown accounts take as long as wrong passwords.
                let _ = self.password_verifier.hash_password(password);
                None
            }
        };

        match authenticated {
            Some(principal) => {
                self.event_bus
                    .dispatch(AuditSignal::LoggedIn {
                        principal: principal.clone(),
                    })
                    .await;
                Ok(LoginOutcome::Authenticated(principal))
            }
            None => {
                self.event_bus
                    .dispatch(AuditSignal::LoginFailed {
                        attempted_identifier: attempted_identifier(email),
                    })
                    .await;
                Ok(LoginOutcome::Failed)
            }
        }
    }

    /// Records the end of an authenticated session.
    pub async fn logout(&self, principal: Principal) {
        self.event_bus
            .dispatch(AuditSignal::LoggedOut { principal })
            .await;
    }
}

fn attempted_identifier(email: &str) -> String {
    email
        .trim()
        .chars()
        .take(ATTEMPTED_IDENTIFIER_MAX_CHARS)
        .collect()
}
