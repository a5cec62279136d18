use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::inspection::{parse_report, Inspection};

#[derive(Debug, Deserialize, IntoParams)]
pub struct InspectionQuery {
    pub status: Option<String>,
    pub tipo: Option<String>,
    /// Matches the address
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct StatusRequest {
    pub status: Option<String>,
}

/// Body of addendum and manual-note requests.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TextRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionDto {
    pub id: i32,
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub data: DateTime<Utc>,
    pub created_from_ai: bool,
    pub ai_summary: Option<String>,
    /// Stored report, parsed
    #[schema(value_type = Option<Object>)]
    pub ai_json: Option<Value>,
    pub contract_id: Option<String>,
    pub tenant_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Inspection> for InspectionDto {
    fn from(i: Inspection) -> Self {
        Self {
            ai_json: parse_report(i.ai_json.as_deref()),
            id: i.id,
            endereco: i.endereco,
            tipo: i.tipo,
            status: i.status,
            data: i.data,
            created_from_ai: i.created_from_ai,
            ai_summary: i.ai_summary,
            contract_id: i.contract_id,
            tenant_id: i.tenant_record_id,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}
