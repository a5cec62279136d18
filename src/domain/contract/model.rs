use chrono::{DateTime, Utc};

use crate::domain::party::PartySummary;

pub const STATUS_ACTIVE: &str = "ativo";
pub const STATUS_REVIEWING: &str = "em revisão";

#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: String,
    pub user_id: i32,
    pub titulo: String,
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub criado_em: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Whole reais.
    pub rent_value: i64,
    pub condo_value: Option<i64>,
    pub iptu_value: Option<i64>,
    pub deposit_value: Option<i64>,
    pub due_day: i32,
    pub city: String,
    pub state: String,
    pub full_address: String,
    pub property_description: Option<String>,
    pub generated_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContractWithParties {
    pub contract: Contract,
    pub landlords: Vec<PartySummary>,
    pub tenants: Vec<PartySummary>,
}

#[derive(Debug, Clone)]
pub struct NewContract {
    pub titulo: String,
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent_value: i64,
    pub condo_value: Option<i64>,
    pub iptu_value: Option<i64>,
    pub deposit_value: Option<i64>,
    pub due_day: i32,
    pub city: String,
    pub state: String,
    pub full_address: String,
    pub property_description: Option<String>,
    pub generated_text: String,
    pub landlord_ids: Vec<String>,
    pub tenant_ids: Vec<String>,
}

/// `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ContractFilter {
    pub status: Option<String>,
    pub tipo: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractStats {
    pub total: u64,
    pub active: u64,
    pub reviewing: u64,
}
