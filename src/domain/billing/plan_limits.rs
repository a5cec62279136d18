//! Subscription tiers and their monthly allowances

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quota tier attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanType {
    Starter,
    Pro,
    Imobiliaria,
}

impl Default for PlanType {
    fn default() -> Self {
        Self::Starter
    }
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "STARTER",
            Self::Pro => "PRO",
            Self::Imobiliaria => "IMOBILIARIA",
        }
    }

    /// Unknown codes fall back to the entry tier.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "PRO" => Self::Pro,
            "IMOBILIARIA" => Self::Imobiliaria,
            _ => Self::Starter,
        }
    }

    pub fn limits(&self) -> PlanLimits {
        match self {
            Self::Starter => PlanLimits {
                max_inspections: 5,
                max_documents: 15,
                max_mentor_files_per_month: 15,
                max_attachments_per_question: 3,
                max_attachment_size_mb: 10,
            },
            Self::Pro => PlanLimits {
                max_inspections: 15,
                max_documents: 25,
                max_mentor_files_per_month: 40,
                max_attachments_per_question: 3,
                max_attachment_size_mb: 10,
            },
            Self::Imobiliaria => PlanLimits {
                max_inspections: 60,
                max_documents: 120,
                max_mentor_files_per_month: 80,
                max_attachments_per_question: 3,
                max_attachment_size_mb: 10,
            },
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub max_inspections: i32,
    pub max_documents: i32,
    pub max_mentor_files_per_month: i32,
    pub max_attachments_per_question: i32,
    pub max_attachment_size_mb: i32,
}

impl PlanLimits {
    pub fn max_attachment_bytes(&self) -> usize {
        self.max_attachment_size_mb as usize * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plan_is_starter() {
        assert_eq!(PlanType::from_code("enterprise"), PlanType::Starter);
        assert_eq!(PlanType::from_code(""), PlanType::Starter);
        assert_eq!(PlanType::from_code("pro"), PlanType::Pro);
        assert_eq!(PlanType::from_code("IMOBILIARIA"), PlanType::Imobiliaria);
    }

    #[test]
    fn tiers_grow_monotonically() {
        let s = PlanType::Starter.limits();
        let p = PlanType::Pro.limits();
        let i = PlanType::Imobiliaria.limits();
        assert_eq!((s.max_inspections, s.max_documents, s.max_mentor_files_per_month), (5, 15, 15));
        assert_eq!((p.max_inspections, p.max_documents, p.max_mentor_files_per_month), (15, 25, 40));
        assert_eq!((i.max_inspections, i.max_documents, i.max_mentor_files_per_month), (60, 120, 80));
        assert_eq!(s.max_attachment_bytes(), 10 * 1024 * 1024);
    }
}
