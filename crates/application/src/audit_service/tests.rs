use std::sync::Arc;

use panelist_core::AppError;
use panelist_domain::{AuditAction, AuditResource, ExtraData, Role};

use crate::test_support::{RecordingAuditLogRepository, principal};
use crate::{AuditLogQuery, AuditLogRepository, RequestContext};

use super::{AuditEventInput, AuditService};

fn service() -> (AuditService, Arc<RecordingAuditLogRepository>) {
    let repository = Arc::new(RecordingAuditLogRepository::default());
    (AuditService::new(repository.clone()), repository)
}

#[tokio::test]
async fn record_event_captures_request_context() {
    let (service, repository) = service();
    let admin = principal(Some(Role::Admin));
    let context = RequestContext::new(
        Some("198.51.100.20".to_owned()),
        Some("Mozilla/5.0".to_owned()),
    );

    context
        .scope(service.record_event(
            AuditEventInput::new(AuditAction::AdminDelete)
                .with_actor(admin.user_id())
                .with_resource(&AuditResource::new("practice_session", "42")),
        ))
        .await;

    let records = repository.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actor_id, Some(admin.user_id()));
    assert_eq!(records[0].resource_type, "practice_session");
    assert_eq!(records[0].resource_id, "42");
    assert_eq!(records[0].ip_address.as_deref(), Some("198.51.100.20"));
    assert_eq!(records[0].client_id.as_deref(), Some("Mozilla/5.0"));
}

#[tokio::test]
async fn record_event_outside_request_omits_network_fields() {
    let (service, repository) = service();

    service
        .record_event(AuditEventInput::new(AuditAction::LoginFailed))
        .await;

    let records = repository.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actor_id, None);
    assert_eq!(records[0].ip_address, None);
    assert_eq!(records[0].client_id, None);
    assert!(records[0].resource_type.is_empty());
}

#[tokio::test]
async fn record_event_drops_secret_like_keys() {
    let (service, repository) = service();

    service
        .record_event(
            AuditEventInput::new(AuditAction::LoginFailed).with_extra_data(
                ExtraData::new()
                    .with("attempted_identifier", "eve@example.com")
                    .with("password", "hunter2"),
            ),
        )
        .await;

    let records = repository.records().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].extra_data.get("password").is_none());
    assert!(records[0].extra_data.get("attempted_identifier").is_some());
}

#[tokio::test]
async fn record_event_swallows_storage_failure() {
    let repository = Arc::new(RecordingAuditLogRepository::failing());
    let service = AuditService::new(repository.clone());

    service
        .record_event(AuditEventInput::new(AuditAction::Login))
        .await;

    assert!(repository.records().await.is_empty());
}

#[tokio::test]
async fn persisted_entries_cannot_be_changed() {
    let (service, repository) = service();
    let admin = principal(Some(Role::Admin));
    service
        .record_event(AuditEventInput::new(AuditAction::Logout).with_actor(admin.user_id()))
        .await;

    let entries = service
        .list_entries(&admin, AuditLogQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 1);

    let update = repository.update_entry(&entries[0]).await;
    let delete = repository.delete_entry(entries[0].id()).await;

    assert!(matches!(update, Err(AppError::ImmutabilityViolation(_))));
    assert!(matches!(delete, Err(AppError::ImmutabilityViolation(_))));
}

#[tokio::test]
async fn list_entries_is_admin_only_and_newest_first() {
    let (service, _) = service();
    let admin = principal(Some(Role::Admin));
    let interviewer = principal(Some(Role::Interviewer));

    for action in [AuditAction::Login, AuditAction::Logout] {
        service
            .record_event(AuditEventInput::new(action).with_actor(admin.user_id()))
            .await;
    }

    let denied = service
        .list_entries(&interviewer, AuditLogQuery::default())
        .await;
    let entries = service
        .list_entries(&admin, AuditLogQuery::default())
        .await
        .unwrap_or_default();

    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    let actions: Vec<AuditAction> = entries.iter().map(|entry| entry.action()).collect();
    assert_eq!(actions, vec![AuditAction::Logout, AuditAction::Login]);
}

#[tokio::test]
async fn list_entries_filters_by_action() {
    let (service, _) = service();
    let admin = principal(Some(Role::Admin));

    service
        .record_event(AuditEventInput::new(AuditAction::Login).with_actor(admin.user_id()))
        .await;
    service
        .record_event(AuditEventInput::new(AuditAction::LoginFailed))
        .await;

    let entries = service
        .list_entries(
            &admin,
            AuditLogQuery {
                action: Some(AuditAction::LoginFailed),
                ..AuditLogQuery::default()
            },
        )
        .await
        .unwrap_or_default();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor_id(), None);
}
