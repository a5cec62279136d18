use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

pub const DEFAULT_CONTRACT_TERM_MONTHS: i32 = 30;
pub const DEFAULT_NOTIFY_BEFORE_DUE_DAYS: i32 = 5;
pub const DEFAULT_RENT_INDEX: &str = "IPCA";

/// Account-wide preferences, stored as a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub default_contract_term_months: i32,
    pub notify_before_due_days: i32,
    pub default_rent_index: String,
    pub company_name: Option<String>,
    pub company_creci: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_whatsapp: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub default_contract_term_months: Option<i32>,
    pub notify_before_due_days: Option<i32>,
    pub default_rent_index: Option<String>,
    pub company_name: Option<String>,
    pub company_creci: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_whatsapp: Option<String>,
}

impl SettingsPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if matches!(self.default_contract_term_months, Some(m) if m <= 0) {
            return Err(DomainError::invalid(
                "INVALID_CONTRACT_TERM",
                "Prazo padrão deve ser maior que zero.",
            ));
        }
        if matches!(self.notify_before_due_days, Some(d) if d < 0) {
            return Err(DomainError::invalid(
                "INVALID_NOTIFY_DAYS",
                "Dias para lembrete devem ser zero ou positivos.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_term() {
        let patch = SettingsPatch {
            default_contract_term_months: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            patch.validate(),
            Err(DomainError::Invalid { code: "INVALID_CONTRACT_TERM", .. })
        ));
    }

    #[test]
    fn zero_notify_days_is_allowed() {
        let patch = SettingsPatch {
            notify_before_due_days: Some(0),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());

        let negative = SettingsPatch {
            notify_before_due_days: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(DomainError::Invalid { code: "INVALID_NOTIFY_DAYS", .. })
        ));
    }
}
