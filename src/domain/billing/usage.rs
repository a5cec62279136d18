//! Monthly usage metering
//!
//! Counters live in one row per (user, year, month). Every metered action
//! goes through [`check_quota`] before the counter moves; the persistence
//! layer repeats the same comparison inside the conditional UPDATE so that
//! concurrent requests cannot push a counter past its limit.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::plan_limits::PlanLimits;
use crate::shared::errors::DomainError;

/// Metered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotaKind {
    Inspection,
    Document,
    MentorFileQuestion,
}

impl QuotaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspection => "INSPECTION",
            Self::Document => "DOCUMENT",
            Self::MentorFileQuestion => "MENTOR_FILE_QUESTION",
        }
    }

    pub fn limit(&self, limits: &PlanLimits) -> i32 {
        match self {
            Self::Inspection => limits.max_inspections,
            Self::Document => limits.max_documents,
            Self::MentorFileQuestion => limits.max_mentor_files_per_month,
        }
    }
}

impl std::fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a metered action would exceed the plan allowance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct PlanLimitError {
    pub kind: QuotaKind,
    pub limit: i32,
    pub current: i32,
}

impl PlanLimitError {
    pub fn new(kind: QuotaKind, limit: i32, current: i32) -> Self {
        Self { kind, limit, current }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            QuotaKind::Inspection => "Limite mensal de vistorias atingido.",
            QuotaKind::Document => "Limite mensal de documentos atingido.",
            QuotaKind::MentorFileQuestion => {
                "Limite mensal de arquivos analisados pelo Mentor foi atingido."
            }
        }
    }
}

/// Calendar month (UTC) under which counters accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsagePeriod {
    pub year: i32,
    /// 1-12
    pub month: i32,
}

impl UsagePeriod {
    pub fn current() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month() as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthlyUsage {
    pub user_id: i32,
    pub year: i32,
    pub month: i32,
    pub inspections_count: i32,
    pub documents_count: i32,
    pub mentor_file_questions_count: i32,
}

impl MonthlyUsage {
    pub fn empty(user_id: i32, period: UsagePeriod) -> Self {
        Self {
            user_id,
            year: period.year,
            month: period.month,
            ..Default::default()
        }
    }

    pub fn count_for(&self, kind: QuotaKind) -> i32 {
        match kind {
            QuotaKind::Inspection => self.inspections_count,
            QuotaKind::Document => self.documents_count,
            QuotaKind::MentorFileQuestion => self.mentor_file_questions_count,
        }
    }
}

/// Fails when `current + amount` would go past the limit of `kind`.
pub fn check_quota(
    kind: QuotaKind,
    limits: &PlanLimits,
    current: i32,
    amount: i32,
) -> Result<(), PlanLimitError> {
    let limit = kind.limit(limits);
    if current + amount > limit {
        return Err(PlanLimitError::new(kind, limit, current));
    }
    Ok(())
}

/// Per-question attachment cap, checked before anything is stored.
pub fn check_attachment_count(limits: &PlanLimits, count: usize) -> Result<(), DomainError> {
    let max = limits.max_attachments_per_question;
    if count > max as usize {
        return Err(DomainError::invalid(
            "TOO_MANY_ATTACHMENTS",
            format!("Máximo de {max} anexos por pergunta. Remova arquivos e tente novamente."),
        ));
    }
    Ok(())
}

/// Mentor file allowance as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MentorFileUsage {
    pub used: i32,
    pub limit: i32,
    pub month: i32,
    pub year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanType;
    use chrono::TimeZone;

    #[test]
    fn nth_plus_one_is_rejected() {
        let limits = PlanType::Starter.limits();
        assert!(check_quota(QuotaKind::Inspection, &limits, 4, 1).is_ok());
        let err = check_quota(QuotaKind::Inspection, &limits, 5, 1).unwrap_err();
        assert_eq!(err, PlanLimitError::new(QuotaKind::Inspection, 5, 5));
        assert_eq!(err.to_string(), "Limite mensal de vistorias atingido.");
    }

    #[test]
    fn mentor_quota_counts_every_file() {
        let limits = PlanType::Starter.limits();
        assert!(check_quota(QuotaKind::MentorFileQuestion, &limits, 12, 3).is_ok());
        let err = check_quota(QuotaKind::MentorFileQuestion, &limits, 13, 3).unwrap_err();
        assert_eq!(err.limit, 15);
        assert_eq!(err.current, 13);
    }

    #[test]
    fn attachment_cap_message() {
        let limits = PlanType::Pro.limits();
        assert!(check_attachment_count(&limits, 3).is_ok());
        let err = check_attachment_count(&limits, 4).unwrap_err();
        assert!(err.to_string().contains("Máximo de 3 anexos por pergunta"));
    }

    #[test]
    fn period_uses_one_based_month() {
        let p = UsagePeriod::at(Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 0).unwrap());
        assert_eq!(p, UsagePeriod { year: 2026, month: 1 });
    }

    #[test]
    fn usage_counter_lookup() {
        let usage = MonthlyUsage {
            documents_count: 7,
            ..MonthlyUsage::empty(1, UsagePeriod { year: 2026, month: 2 })
        };
        assert_eq!(usage.count_for(QuotaKind::Document), 7);
        assert_eq!(usage.count_for(QuotaKind::Inspection), 0);
    }
}
