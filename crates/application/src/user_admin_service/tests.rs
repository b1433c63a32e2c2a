use std::sync::Arc;

use panelist_core::AppError;
use panelist_domain::{AuditAction, AuditScalar, Principal, Role, UserId};

use crate::test_support::{FakeUserRepository, RecordingAuditLogRepository, principal};
use crate::{AuditEventHandler, AuditService, EventBus};

use super::UserAdminService;

struct Harness {
    service: UserAdminService,
    users: Arc<FakeUserRepository>,
    audit: Arc<RecordingAuditLogRepository>,
}

async fn harness(principals: &[Principal]) -> Harness {
    let users = Arc::new(FakeUserRepository::default());
    for principal in principals {
        users.insert(principal.clone(), None).await;
    }
    let audit = Arc::new(RecordingAuditLogRepository::default());
    let bus = EventBus::builder()
        .subscribe(Arc::new(AuditEventHandler::new(AuditService::new(
            audit.clone(),
        ))))
        .build();

    Harness {
        service: UserAdminService::new(users.clone(), bus),
        users,
        audit,
    }
}

#[tokio::test]
async fn admin_changes_role_and_records_change_summary() {
    let admin = principal(Some(Role::Admin));
    let target = principal(Some(Role::Candidate));
    let harness = harness(&[admin.clone(), target.clone()]).await;

    let updated = harness
        .service
        .change_role(&admin, target.user_id(), Role::Interviewer)
        .await;

    assert_eq!(
        updated.ok().and_then(|principal| principal.role()),
        Some(Role::Interviewer)
    );
    assert_eq!(
        harness.users.role_of(target.user_id()).await,
        Some(Role::Interviewer)
    );

    let records = harness.audit.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, AuditAction::AdminUpdate);
    assert_eq!(records[0].actor_id, Some(admin.user_id()));
    assert_eq!(records[0].resource_type, "user");
    assert_eq!(records[0].resource_id, target.user_id().to_string());
    assert_eq!(
        records[0].extra_data.get("from"),
        Some(&AuditScalar::from("candidate"))
    );
    assert_eq!(
        records[0].extra_data.get("to"),
        Some(&AuditScalar::from("interviewer"))
    );
}

#[tokio::test]
async fn candidate_cannot_change_roles() {
    let candidate = principal(Some(Role::Candidate));
    let target = principal(Some(Role::Candidate));
    let harness = harness(&[candidate.clone(), target.clone()]).await;

    let result = harness
        .service
        .change_role(&candidate, target.user_id(), Role::Admin)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(
        harness.users.role_of(target.user_id()).await,
        Some(Role::Candidate)
    );
    assert!(harness.audit.records().await.is_empty());
}

#[tokio::test]
async fn interviewer_cannot_change_roles() {
    let interviewer = principal(Some(Role::Interviewer));
    let target = principal(Some(Role::Candidate));
    let harness = harness(&[interviewer.clone(), target.clone()]).await;

    let result = harness
        .service
        .change_role(&interviewer, target.user_id(), Role::Interviewer)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn missing_target_is_not_found() {
    let admin = principal(Some(Role::Admin));
    let harness = harness(&[admin.clone()]).await;

    let result = harness
        .service
        .change_role(&admin, UserId::new(), Role::Candidate)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn assigning_first_role_records_null_previous_value() {
    let admin = principal(Some(Role::Admin));
    let target = principal(None);
    let harness = harness(&[admin.clone(), target.clone()]).await;

    let result = harness
        .service
        .change_role(&admin, target.user_id(), Role::Candidate)
        .await;

    assert!(result.is_ok());
    let records = harness.audit.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].extra_data.get("from"), Some(&AuditScalar::Null));
}

#[tokio::test]
async fn unchanged_role_records_nothing() {
    let admin = principal(Some(Role::Admin));
    let target = principal(Some(Role::Candidate));
    let harness = harness(&[admin.clone(), target.clone()]).await;

    let result = harness
        .service
        .change_role(&admin, target.user_id(), Role::Candidate)
        .await;

    assert!(result.is_ok());
    assert!(harness.audit.records().await.is_empty());
}
