//! Bridges audit signals into audit log entries.

use async_trait::async_trait;

use panelist_core::AppResult;
use panelist_domain::{AuditAction, ExtraData};

use crate::{AuditEventInput, AuditService, AuditSignal, EventHandler};

/// Extra-data key holding the identifier of a rejected login.
pub const ATTEMPTED_IDENTIFIER_KEY: &str = "attempted_identifier";

/// Event handler writing one audit entry per signal.
#[derive(Clone)]
pub struct AuditEventHandler {
    audit_service: AuditService,
}

impl AuditEventHandler {
    /// Creates a handler backed by the audit writer.
    #[must_use]
    pub fn new(audit_service: AuditService) -> Self {
        Self { audit_service }
    }
}

#[async_trait]
impl EventHandler for AuditEventHandler {
    fn name(&self) -> &'static str {
        "audit_log"
    }

    async fn handle(&self, signal: &AuditSignal) -> AppResult<()> {
        self.audit_service.record_event(audit_input_for(signal)).await;
        Ok(())
    }
}

/// Maps a signal onto the audit entry it produces.
#[must_use]
pub fn audit_input_for(signal: &AuditSignal) -> AuditEventInput {
    match signal {
        AuditSignal::LoggedIn { principal } => {
            AuditEventInput::new(AuditAction::Login).with_actor(principal.user_id())
        }
        AuditSignal::LoggedOut { principal } => {
            AuditEventInput::new(AuditAction::Logout).with_actor(principal.user_id())
        }
        AuditSignal::LoginFailed {
            attempted_identifier,
        } => AuditEventInput::new(AuditAction::LoginFailed).with_extra_data(
            ExtraData::new().with(ATTEMPTED_IDENTIFIER_KEY, attempted_identifier.as_str()),
        ),
        AuditSignal::AdminCreated { actor, resource } => {
            AuditEventInput::new(AuditAction::AdminCreate)
                .with_actor(actor.user_id())
                .with_resource(resource)
        }
        AuditSignal::AdminUpdated {
            actor,
            resource,
            changes,
        } => AuditEventInput::new(AuditAction::AdminUpdate)
            .with_actor(actor.user_id())
            .with_resource(resource)
            .with_extra_data(changes.clone()),
        AuditSignal::AdminDeleted { actor, resource } => {
            AuditEventInput::new(AuditAction::AdminDelete)
                .with_actor(actor.user_id())
                .with_resource(resource)
        }
    }
}
