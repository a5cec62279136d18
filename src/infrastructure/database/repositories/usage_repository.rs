//! SeaORM implementation of UsageRepository
//!
//! [`consume_quota`] is the single place where usage counters move. It takes
//! any connection so metered inserts can run it on their own transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, warn};

use crate::domain::billing::{MonthlyUsage, PlanLimitError, QuotaKind, UsagePeriod, UsageRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{usage_monthly, user};

use super::user_repository::tier_to_plan;

pub struct SeaOrmUsageRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: usage_monthly::Model) -> MonthlyUsage {
    MonthlyUsage {
        user_id: m.user_id,
        year: m.year,
        month: m.month,
        inspections_count: m.inspections_count,
        documents_count: m.documents_count,
        mentor_file_questions_count: m.mentor_file_questions_count,
    }
}

fn counter_column(kind: QuotaKind) -> usage_monthly::Column {
    match kind {
        QuotaKind::Inspection => usage_monthly::Column::InspectionsCount,
        QuotaKind::Document => usage_monthly::Column::DocumentsCount,
        QuotaKind::MentorFileQuestion => usage_monthly::Column::MentorFileQuestionsCount,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── Shared quota primitives ─────────────────────────────────────

/// Inserts the zeroed row for `period` unless it already exists.
async fn ensure_period_row<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    period: UsagePeriod,
) -> DomainResult<()> {
    let now = Utc::now();
    let row = usage_monthly::ActiveModel {
        user_id: Set(user_id),
        year: Set(period.year),
        month: Set(period.month),
        inspections_count: Set(0),
        documents_count: Set(0),
        mentor_file_questions_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    usage_monthly::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                usage_monthly::Column::UserId,
                usage_monthly::Column::Year,
                usage_monthly::Column::Month,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

async fn read_period_row<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    period: UsagePeriod,
) -> DomainResult<MonthlyUsage> {
    let row = usage_monthly::Entity::find()
        .filter(usage_monthly::Column::UserId.eq(user_id))
        .filter(usage_monthly::Column::Year.eq(period.year))
        .filter(usage_monthly::Column::Month.eq(period.month))
        .one(conn)
        .await
        .map_err(db_err)?;
    Ok(row
        .map(model_to_domain)
        .unwrap_or_else(|| MonthlyUsage::empty(user_id, period)))
}

/// Atomic check-and-increment of one monthly counter.
///
/// Must be the first thing a caller runs on its transaction.
///
/// The increment is a single conditional UPDATE guarded by
/// `counter <= limit - amount`, so two concurrent callers can never both
/// take the last unit. When no row is updated the counter is re-read and
/// reported in a [`PlanLimitError`]; nothing is written in that case.
pub async fn consume_quota<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    kind: QuotaKind,
    amount: i32,
) -> DomainResult<MonthlyUsage> {
    // The first statement must write: SQLite then takes the write lock up
    // front and concurrent callers wait on the busy timeout instead of
    // failing a read-to-write upgrade.
    let claimed = user::Entity::update_many()
        .col_expr(user::Column::Id, Expr::col(user::Column::Id).add(0))
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await
        .map_err(db_err)?;
    if claimed.rows_affected == 0 {
        return Err(DomainError::not_found("User", "id", user_id));
    }
    let owner = user::Entity::find_by_id(user_id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("User", "id", user_id))?;
    let limit = kind.limit(&tier_to_plan(&owner.plan).limits());

    let period = UsagePeriod::current();
    ensure_period_row(conn, user_id, period).await?;

    let column = counter_column(kind);
    let result = usage_monthly::Entity::update_many()
        .col_expr(column, Expr::col(column).add(amount))
        .col_expr(usage_monthly::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(usage_monthly::Column::UserId.eq(user_id))
        .filter(usage_monthly::Column::Year.eq(period.year))
        .filter(usage_monthly::Column::Month.eq(period.month))
        .filter(column.lte(limit - amount))
        .exec(conn)
        .await
        .map_err(db_err)?;

    let usage = read_period_row(conn, user_id, period).await?;

    if result.rows_affected == 0 {
        let current = usage.count_for(kind);
        warn!(user_id, kind = %kind, limit, current, "Plan limit reached");
        metrics::counter!("quota_rejected_total", "kind" => kind.as_str()).increment(1);
        return Err(PlanLimitError::new(kind, limit, current).into());
    }

    debug!(user_id, kind = %kind, amount, "Quota consumed");
    metrics::counter!("quota_consumed_total", "kind" => kind.as_str()).increment(amount as u64);
    Ok(usage)
}

// ── UsageRepository impl ────────────────────────────────────────

#[async_trait]
impl UsageRepository for SeaOrmUsageRepository {
    async fn get_or_create(&self, user_id: i32, period: UsagePeriod) -> DomainResult<MonthlyUsage> {
        ensure_period_row(&self.db, user_id, period).await?;
        read_period_row(&self.db, user_id, period).await
    }

    async fn consume(&self, user_id: i32, kind: QuotaKind, amount: i32) -> DomainResult<MonthlyUsage> {
        let txn = self.db.begin().await.map_err(db_err)?;
        match consume_quota(&txn, user_id, kind, amount).await {
            Ok(usage) => {
                txn.commit().await.map_err(db_err)?;
                Ok(usage)
            }
            Err(e) => {
                txn.rollback().await.map_err(db_err)?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanType;
    use crate::infrastructure::database::testing::{seed_user, setup_db, setup_file_db};
    use std::sync::Arc;

    #[tokio::test]
    async fn get_or_create_starts_at_zero() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "zero@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmUsageRepository::new(db);

        let period = UsagePeriod::current();
        let first = repo.get_or_create(user_id, period).await.unwrap();
        let again = repo.get_or_create(user_id, period).await.unwrap();
        assert_eq!(first, MonthlyUsage::empty(user_id, period));
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn inspection_over_limit_is_rejected_without_increment() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "starter@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmUsageRepository::new(db);

        for expected in 1..=5 {
            let usage = repo.consume(user_id, QuotaKind::Inspection, 1).await.unwrap();
            assert_eq!(usage.inspections_count, expected);
        }

        let err = repo.consume(user_id, QuotaKind::Inspection, 1).await.unwrap_err();
        match err {
            DomainError::PlanLimit(e) => {
                assert_eq!(e, PlanLimitError::new(QuotaKind::Inspection, 5, 5));
            }
            other => panic!("unexpected {other:?}"),
        }

        let usage = repo.get_or_create(user_id, UsagePeriod::current()).await.unwrap();
        assert_eq!(usage.inspections_count, 5);
        assert_eq!(usage.documents_count, 0);
    }

    #[tokio::test]
    async fn batch_amount_must_fit_entirely() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "mentor@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmUsageRepository::new(db);

        repo.consume(user_id, QuotaKind::MentorFileQuestion, 3).await.unwrap();
        repo.consume(user_id, QuotaKind::MentorFileQuestion, 10).await.unwrap();

        // 13 used of 15; three more would overshoot.
        let err = repo.consume(user_id, QuotaKind::MentorFileQuestion, 3).await.unwrap_err();
        assert!(matches!(err, DomainError::PlanLimit(ref e) if e.current == 13 && e.limit == 15));

        let usage = repo.consume(user_id, QuotaKind::MentorFileQuestion, 2).await.unwrap();
        assert_eq!(usage.mentor_file_questions_count, 15);
    }

    #[tokio::test]
    async fn higher_tier_gets_more_documents() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "pro@imobi.test", PlanType::Pro).await;
        let repo = SeaOrmUsageRepository::new(db);

        for _ in 0..25 {
            repo.consume(user_id, QuotaKind::Document, 1).await.unwrap();
        }
        let err = repo.consume(user_id, QuotaKind::Document, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::PlanLimit(ref e) if e.limit == 25));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let db = setup_db().await;
        let repo = SeaOrmUsageRepository::new(db);
        let err = repo.consume(999, QuotaKind::Document, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_never_overshoot_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_file_db(&dir.path().join("quota.db"), 8).await;
        let user_id = seed_user(&db, "corrida@imobi.test", PlanType::Starter).await;
        let repo = Arc::new(SeaOrmUsageRepository::new(db));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.consume(user_id, QuotaKind::Inspection, 1).await })
            })
            .collect();

        let (mut succeeded, mut limited) = (0, 0);
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(DomainError::PlanLimit(e)) => {
                    assert_eq!((e.kind, e.limit, e.current), (QuotaKind::Inspection, 5, 5));
                    limited += 1;
                }
                Err(other) => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!((succeeded, limited), (5, 15));

        let usage = repo.get_or_create(user_id, UsagePeriod::current()).await.unwrap();
        assert_eq!(usage.inspections_count, 5);
    }
}
