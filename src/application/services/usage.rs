//! Plan limits and monthly usage as seen by the account owner
//!
//! Metered creates (contracts, notifications, inspections) consume their
//! quota inside the repository transaction that inserts the row. This
//! service covers the standalone operations: usage reports, the mentor
//! pre-check and the mentor increment.

use std::sync::Arc;

use tracing::debug;

use crate::domain::billing::{
    check_attachment_count, check_quota, MentorFileUsage, MonthlyUsage, PlanLimits, PlanType,
    QuotaKind, UsagePeriod,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

#[derive(Debug, Clone)]
pub struct UsageOverview {
    pub plan: PlanType,
    pub limits: PlanLimits,
    pub current: MonthlyUsage,
}

pub struct UsageService {
    repos: Arc<dyn RepositoryProvider>,
}

impl UsageService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn plan_of(&self, user_id: i32) -> DomainResult<PlanType> {
        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .map(|u| u.plan)
            .ok_or_else(|| DomainError::not_found("User", "id", user_id))
    }

    pub async fn get_or_create_current_usage(&self, user_id: i32) -> DomainResult<MonthlyUsage> {
        self.repos.usage().get_or_create(user_id, UsagePeriod::current()).await
    }

    pub async fn overview(&self, user_id: i32) -> DomainResult<UsageOverview> {
        let plan = self.plan_of(user_id).await?;
        let current = self.get_or_create_current_usage(user_id).await?;
        Ok(UsageOverview {
            plan,
            limits: plan.limits(),
            current,
        })
    }

    pub async fn check_and_increment_inspection(&self, user_id: i32) -> DomainResult<MonthlyUsage> {
        self.repos.usage().consume(user_id, QuotaKind::Inspection, 1).await
    }

    pub async fn check_and_increment_document(&self, user_id: i32) -> DomainResult<MonthlyUsage> {
        self.repos.usage().consume(user_id, QuotaKind::Document, 1).await
    }

    /// Read-only: nothing is consumed until the answer is produced.
    pub async fn check_mentor_file_question_limit(&self, user_id: i32, count: usize) -> DomainResult<()> {
        let limits = self.plan_of(user_id).await?.limits();
        check_attachment_count(&limits, count)?;

        let usage = self.get_or_create_current_usage(user_id).await?;
        check_quota(
            QuotaKind::MentorFileQuestion,
            &limits,
            usage.mentor_file_questions_count,
            count as i32,
        )?;
        Ok(())
    }

    pub async fn increment_mentor_file_question_usage(&self, user_id: i32, count: usize) -> DomainResult<()> {
        if count == 0 {
            return Ok(());
        }
        let usage = self
            .repos
            .usage()
            .consume(user_id, QuotaKind::MentorFileQuestion, count as i32)
            .await?;
        debug!(user_id, used = usage.mentor_file_questions_count, "Mentor file usage incremented");
        Ok(())
    }

    pub async fn get_mentor_file_usage(&self, user_id: i32) -> DomainResult<MentorFileUsage> {
        let limits = self.plan_of(user_id).await?.limits();
        let usage = self.get_or_create_current_usage(user_id).await?;
        Ok(MentorFileUsage {
            used: usage.mentor_file_questions_count,
            limit: limits.max_mentor_files_per_month,
            month: usage.month,
            year: usage.year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user};

    #[tokio::test]
    async fn document_limit_rejects_without_incrementing() {
        let (db, repos) = repos().await;
        let uid = user(&db, "doc@imobi.test", PlanType::Starter).await;
        let usage = UsageService::new(repos);

        for _ in 0..15 {
            usage.check_and_increment_document(uid).await.unwrap();
        }
        let err = usage.check_and_increment_document(uid).await.unwrap_err();
        match err {
            DomainError::PlanLimit(e) => {
                assert_eq!(e.kind, QuotaKind::Document);
                assert_eq!((e.limit, e.current), (15, 15));
            }
            other => panic!("unexpected {other:?}"),
        }
        let overview = usage.overview(uid).await.unwrap();
        assert_eq!(overview.current.documents_count, 15);
        assert_eq!(overview.limits.max_documents, 15);
    }

    #[tokio::test]
    async fn inspection_limit_follows_plan() {
        let (db, repos) = repos().await;
        let uid = user(&db, "pro@imobi.test", PlanType::Pro).await;
        let usage = UsageService::new(repos);

        for _ in 0..15 {
            usage.check_and_increment_inspection(uid).await.unwrap();
        }
        assert!(matches!(
            usage.check_and_increment_inspection(uid).await,
            Err(DomainError::PlanLimit(_))
        ));
    }

    #[tokio::test]
    async fn mentor_precheck_is_read_only() {
        let (db, repos) = repos().await;
        let uid = user(&db, "mentor@imobi.test", PlanType::Starter).await;
        let usage = UsageService::new(repos);

        usage.check_mentor_file_question_limit(uid, 3).await.unwrap();
        assert_eq!(usage.get_mentor_file_usage(uid).await.unwrap().used, 0);

        assert!(matches!(
            usage.check_mentor_file_question_limit(uid, 4).await,
            Err(DomainError::Invalid { code: "TOO_MANY_ATTACHMENTS", .. })
        ));

        usage.increment_mentor_file_question_usage(uid, 3).await.unwrap();
        for _ in 0..4 {
            usage.increment_mentor_file_question_usage(uid, 3).await.unwrap();
        }
        let status = usage.get_mentor_file_usage(uid).await.unwrap();
        assert_eq!((status.used, status.limit), (15, 15));
        assert!(matches!(
            usage.check_mentor_file_question_limit(uid, 1).await,
            Err(DomainError::PlanLimit(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (_, repos) = repos().await;
        let usage = UsageService::new(repos);
        assert!(matches!(
            usage.overview(999).await,
            Err(DomainError::NotFound { entity: "User", .. })
        ));
    }
}
