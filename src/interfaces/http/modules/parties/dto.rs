//! Person DTOs shared by tenants and landlords

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::party::{LinkedContract, Party, PartySummary, PartyWithContracts, PersonFields};

/// Create/update body. Validation happens in the service so missing
/// fields can be reported together.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRequest {
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub rg_issuer: Option<String>,
    pub nationality: Option<String>,
    pub profession: Option<String>,
    pub marital_status: Option<String>,
    pub marital_regime: Option<String>,
    pub spouse_name: Option<String>,
    pub spouse_cpf: Option<String>,
    pub spouse_rg: Option<String>,
    pub is_union_stable: Option<bool>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<PersonRequest> for PersonFields {
    fn from(r: PersonRequest) -> Self {
        Self {
            full_name: r.full_name,
            cpf: r.cpf,
            rg: r.rg,
            rg_issuer: r.rg_issuer,
            nationality: r.nationality,
            profession: r.profession,
            marital_status: r.marital_status,
            marital_regime: r.marital_regime,
            spouse_name: r.spouse_name,
            spouse_cpf: r.spouse_cpf,
            spouse_rg: r.spouse_rg,
            is_union_stable: r.is_union_stable,
            email: r.email,
            phone: r.phone,
            address: r.address,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PartyQuery {
    /// Matches name, email or CPF
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkedContractDto {
    pub id: String,
    pub titulo: String,
    pub endereco: String,
    pub status: String,
    pub tipo: String,
    pub criado_em: DateTime<Utc>,
}

impl From<LinkedContract> for LinkedContractDto {
    fn from(c: LinkedContract) -> Self {
        Self {
            id: c.id,
            titulo: c.titulo,
            endereco: c.endereco,
            status: c.status,
            tipo: c.tipo,
            criado_em: c.criado_em,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartyDto {
    pub id: String,
    pub full_name: String,
    /// Same as `fullName`
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub rg_issuer: String,
    pub nationality: String,
    pub profession: String,
    pub marital_status: String,
    pub marital_regime: Option<String>,
    pub spouse_name: Option<String>,
    pub spouse_cpf: Option<String>,
    pub spouse_rg: Option<String>,
    pub is_union_stable: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contracts: Option<Vec<LinkedContractDto>>,
}

impl From<Party> for PartyDto {
    fn from(p: Party) -> Self {
        Self {
            id: p.id,
            name: p.full_name.clone(),
            full_name: p.full_name,
            cpf: p.cpf,
            rg: p.rg,
            rg_issuer: p.rg_issuer,
            nationality: p.nationality,
            profession: p.profession,
            marital_status: p.marital_status.as_str().to_string(),
            marital_regime: p.marital_regime.map(|r| r.as_str().to_string()),
            spouse_name: p.spouse_name,
            spouse_cpf: p.spouse_cpf,
            spouse_rg: p.spouse_rg,
            is_union_stable: p.is_union_stable,
            email: p.email,
            phone: p.phone,
            address: p.address,
            created_at: p.created_at,
            updated_at: p.updated_at,
            contracts: None,
        }
    }
}

impl From<PartyWithContracts> for PartyDto {
    fn from(item: PartyWithContracts) -> Self {
        let mut dto = PartyDto::from(item.party);
        dto.contracts = Some(item.contracts.into_iter().map(Into::into).collect());
        dto
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummaryDto {
    pub id: String,
    pub full_name: String,
    pub cpf: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<PartySummary> for PersonSummaryDto {
    fn from(s: PartySummary) -> Self {
        Self {
            id: s.id,
            full_name: s.full_name,
            cpf: s.cpf,
            email: s.email,
            phone: s.phone,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub ok: bool,
    pub soft_deleted: bool,
}
