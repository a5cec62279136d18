//! Fixtures for database-backed tests

use std::path::Path;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use super::entities::user;
use super::migrator::Migrator;
use super::repositories::user_repository::plan_to_tier;
use crate::domain::billing::PlanType;

/// Fresh in-memory SQLite with every migration applied.
///
/// A single pooled connection keeps the in-memory database alive for the
/// whole test.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// File-backed SQLite with a multi-connection pool, for tests that need
/// real concurrent transactions.
pub async fn setup_file_db(path: &Path, max_connections: u32) -> DatabaseConnection {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options.max_connections(max_connections).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite file");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, plan: PlanType) -> i32 {
    let now = Utc::now();
    let model = user::ActiveModel {
        email: Set(email.to_string()),
        name: Set("Teste".to_string()),
        password_hash: Set("x".to_string()),
        role: Set(user::UserRole::Member),
        plan: Set(plan_to_tier(plan)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user");
    model.id
}
