use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::contract::{ContractFilter, ContractWithParties};
use crate::interfaces::http::modules::parties::PersonSummaryDto;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ContractQuery {
    /// `todos` or absent disables the filter
    pub status: Option<String>,
    pub tipo: Option<String>,
    /// Matches title, address or full address
    pub q: Option<String>,
}

impl From<ContractQuery> for ContractFilter {
    fn from(q: ContractQuery) -> Self {
        Self {
            status: q.status,
            tipo: q.tipo,
            q: q.q,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractDto {
    pub id: String,
    pub titulo: String,
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub criado_em: DateTime<Utc>,
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
    pub generated_text: Option<String>,
    pub landlords: Vec<PersonSummaryDto>,
    pub tenants: Vec<PersonSummaryDto>,
}

impl From<ContractWithParties> for ContractDto {
    fn from(item: ContractWithParties) -> Self {
        let c = item.contract;
        Self {
            id: c.id,
            titulo: c.titulo,
            endereco: c.endereco,
            tipo: c.tipo,
            status: c.status,
            criado_em: c.criado_em,
            start_date: c.start_date,
            end_date: c.end_date,
            rent_value: c.rent_value,
            condo_value: c.condo_value,
            iptu_value: c.iptu_value,
            deposit_value: c.deposit_value,
            due_day: c.due_day,
            city: c.city,
            state: c.state,
            full_address: c.full_address,
            property_description: c.property_description,
            generated_text: c.generated_text,
            landlords: item.landlords.into_iter().map(Into::into).collect(),
            tenants: item.tenants.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedContractResponse {
    pub contract: ContractDto,
    pub generated_text: String,
}
