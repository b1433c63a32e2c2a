use panelist_application::{AuditLogQuery, AuditLogRepository};
use panelist_core::AppError;
use panelist_domain::{AuditAction, AuditRecord, ExtraData, Role, UserId};
use uuid::Uuid;

use crate::postgres_test_support::{insert_user, test_pool};

use super::PostgresAuditLogRepository;

fn record(actor_id: Option<UserId>, action: AuditAction) -> AuditRecord {
    AuditRecord {
        actor_id,
        action,
        resource_type: "practice_session".to_owned(),
        resource_id: "42".to_owned(),
        ip_address: Some("203.0.113.7".to_owned()),
        client_id: Some("integration-test".to_owned()),
        extra_data: ExtraData::field_change("title", "before", "after"),
    }
}

#[tokio::test]
async fn append_returns_server_assigned_fields() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditLogRepository::new(pool.clone());
    let admin = insert_user(&pool, Some(Role::Admin), None).await;

    let appended = repository
        .append_entry(record(Some(admin), AuditAction::AdminUpdate))
        .await;

    let Ok(entry) = appended else {
        panic!("append should succeed");
    };
    assert_eq!(entry.record(), &record(Some(admin), AuditAction::AdminUpdate));
}

#[tokio::test]
async fn existing_entries_reject_update_and_delete() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditLogRepository::new(pool.clone());

    let Ok(entry) = repository
        .append_entry(record(None, AuditAction::LoginFailed))
        .await
    else {
        panic!("append should succeed");
    };

    let update = repository.update_entry(&entry).await;
    let delete = repository.delete_entry(entry.id()).await;
    let raw_delete = sqlx::query("DELETE FROM audit_log_entries WHERE id = $1")
        .bind(entry.id())
        .execute(&pool)
        .await;
    let raw_truncate = sqlx::query("TRUNCATE audit_log_entries").execute(&pool).await;

    assert!(matches!(update, Err(AppError::ImmutabilityViolation(_))));
    assert!(matches!(delete, Err(AppError::ImmutabilityViolation(_))));
    assert!(raw_delete.is_err());
    assert!(raw_truncate.is_err());
}

#[tokio::test]
async fn deleting_unknown_entry_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditLogRepository::new(pool);

    let result = repository.delete_entry(Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn actor_with_audit_rows_cannot_be_deleted() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditLogRepository::new(pool.clone());
    let actor = insert_user(&pool, Some(Role::Candidate), None).await;
    assert!(
        repository
            .append_entry(record(Some(actor), AuditAction::Login))
            .await
            .is_ok()
    );

    let delete_user = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(actor.as_uuid())
        .execute(&pool)
        .await;

    assert!(delete_user.is_err());
}

#[tokio::test]
async fn list_filters_by_actor_newest_first() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditLogRepository::new(pool.clone());
    let actor = insert_user(&pool, Some(Role::Candidate), None).await;

    for action in [AuditAction::Login, AuditAction::Logout] {
        assert!(
            repository
                .append_entry(record(Some(actor), action))
                .await
                .is_ok()
        );
    }

    let entries = repository
        .list_entries(AuditLogQuery {
            actor_id: Some(actor),
            ..AuditLogQuery::default()
        })
        .await
        .unwrap_or_default();

    let actions: Vec<AuditAction> = entries.iter().map(|entry| entry.action()).collect();
    assert_eq!(actions, vec![AuditAction::Logout, AuditAction::Login]);
}
