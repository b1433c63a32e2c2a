//! In-process dispatch of security-relevant signals.
//!
//! Handlers are registered once at startup. Each dispatch runs every handler
//! in its own task inside the caller's request context; a failing or
//! panicking handler is logged and never reaches the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use panelist_core::AppResult;
use panelist_domain::{AuditResource, ExtraData, Principal};

use crate::RequestContext;

/// Authentication or administrative occurrence worth recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditSignal {
    /// A principal authenticated successfully.
    LoggedIn {
        /// Authenticated principal.
        principal: Principal,
    },
    /// A principal ended their session.
    LoggedOut {
        /// Principal that logged out.
        principal: Principal,
    },
    /// An authentication attempt was rejected.
    LoginFailed {
        /// Identifier the caller tried to log in with.
        attempted_identifier: String,
    },
    /// A privileged user created a tracked resource.
    AdminCreated {
        /// Acting principal.
        actor: Principal,
        /// Created resource.
        resource: AuditResource,
    },
    /// A privileged user changed a tracked resource.
    AdminUpdated {
        /// Acting principal.
        actor: Principal,
        /// Changed resource.
        resource: AuditResource,
        /// Change summary.
        changes: ExtraData,
    },
    /// A privileged user deleted a tracked resource.
    AdminDeleted {
        /// Acting principal.
        actor: Principal,
        /// Deleted resource.
        resource: AuditResource,
    },
}

impl AuditSignal {
    /// Returns a stable label for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoggedIn { .. } => "logged_in",
            Self::LoggedOut { .. } => "logged_out",
            Self::LoginFailed { .. } => "login_failed",
            Self::AdminCreated { .. } => "admin_created",
            Self::AdminUpdated { .. } => "admin_updated",
            Self::AdminDeleted { .. } => "admin_deleted",
        }
    }
}

/// Subscriber to audit signals.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns a stable handler label for logging.
    fn name(&self) -> &'static str;

    /// Handles one signal.
    async fn handle(&self, signal: &AuditSignal) -> AppResult<()>;
}

/// Immutable set of signal handlers.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<[Arc<dyn EventHandler>]>,
}

/// Builder collecting handlers before the bus is frozen.
#[derive(Default)]
pub struct EventBusBuilder {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventBusBuilder {
    /// Registers a handler. Handlers run in registration order.
    #[must_use]
    pub fn subscribe(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Freezes the handler set.
    #[must_use]
    pub fn build(self) -> EventBus {
        EventBus {
            handlers: self.handlers.into(),
        }
    }
}

impl EventBus {
    /// Starts building a bus.
    #[must_use]
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::default()
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Delivers `signal` to every handler.
    pub async fn dispatch(&self, signal: AuditSignal) {
        let context = RequestContext::current();
        let signal_name = signal.name();

        for handler in self.handlers.iter() {
            let handler = Arc::clone(handler);
            let handler_name = handler.name();
            let signal = signal.clone();
            let context = context.clone();

            let task = tokio::spawn(async move {
                let handled = async { handler.handle(&signal).await };
                match context {
                    Some(context) => context.scope(handled).await,
                    None => handled.await,
                }
            });

            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(
                        handler = handler_name,
                        signal = signal_name,
                        %error,
                        "audit signal handler failed"
                    );
                }
                Err(join_error) if join_error.is_panic() => {
                    error!(
                        handler = handler_name,
                        signal = signal_name,
                        "audit signal handler panicked"
                    );
                }
                Err(join_error) => {
                    warn!(
                        handler = handler_name,
                        signal = signal_name,
                        error = %join_error,
                        "audit signal handler was cancelled"
                    );
                }
            }
        }
    }
}
