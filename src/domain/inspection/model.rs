use chrono::{DateTime, Utc};

pub const STATUS_PENDING: &str = "pendente";

#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub id: i32,
    pub user_id: i32,
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub data: DateTime<Utc>,
    pub created_from_ai: bool,
    pub ai_summary: Option<String>,
    /// Raw report document as stored; see [`super::report`] for reading it.
    pub ai_json: Option<String>,
    pub contract_id: Option<String>,
    pub tenant_record_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInspection {
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub data: DateTime<Utc>,
    pub created_from_ai: bool,
    pub ai_summary: Option<String>,
    pub ai_json: Option<String>,
    pub contract_id: Option<String>,
    pub tenant_record_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InspectionFilter {
    pub status: Option<String>,
    pub tipo: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectionStats {
    pub total: u64,
    pub pending: u64,
}
