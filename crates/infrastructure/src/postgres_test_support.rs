use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use panelist_domain::{Role, UserId};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connects and migrates when `DATABASE_URL` is set, otherwise `None`.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

/// Inserts a user row, plus a profile row when `role` is set.
pub async fn insert_user(
    pool: &PgPool,
    role: Option<Role>,
    password_hash: Option<&str>,
) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("{}@example.test", Uuid::new_v4()))
    .bind(password_hash)
    .execute(pool)
    .await;
    assert!(insert.is_ok());

    if let Some(role) = role {
        let profile = sqlx::query("INSERT INTO user_profiles (user_id, role) VALUES ($1, $2)")
            .bind(user_id.as_uuid())
            .bind(role.as_str())
            .execute(pool)
            .await;
        assert!(profile.is_ok());
    }

    user_id
}
