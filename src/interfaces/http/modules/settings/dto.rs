use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::settings::{AppSettings, SettingsPatch};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDto {
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

impl From<AppSettings> for SettingsDto {
    fn from(s: AppSettings) -> Self {
        Self {
            default_contract_term_months: s.default_contract_term_months,
            notify_before_due_days: s.notify_before_due_days,
            default_rent_index: s.default_rent_index,
            company_name: s.company_name,
            company_creci: s.company_creci,
            company_phone: s.company_phone,
            company_address: s.company_address,
            company_whatsapp: s.company_whatsapp,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub default_contract_term_months: Option<i32>,
    pub notify_before_due_days: Option<i32>,
    pub default_rent_index: Option<String>,
    pub company_name: Option<String>,
    pub company_creci: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_whatsapp: Option<String>,
}

impl From<UpdateSettingsRequest> for SettingsPatch {
    fn from(r: UpdateSettingsRequest) -> Self {
        Self {
            default_contract_term_months: r.default_contract_term_months,
            notify_before_due_days: r.notify_before_due_days,
            default_rent_index: r.default_rent_index,
            company_name: r.company_name,
            company_creci: r.company_creci,
            company_phone: r.company_phone,
            company_address: r.company_address,
            company_whatsapp: r.company_whatsapp,
        }
    }
}
