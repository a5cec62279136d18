//! Tenants and landlords share one table, told apart by `role`

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PartyRole {
    #[sea_orm(string_value = "TENANT")]
    Tenant,
    #[sea_orm(string_value = "LANDLORD")]
    Landlord,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: i32,
    pub role: PartyRole,
    pub full_name: String,
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
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contract_party::Entity")]
    ContractParties,
}

impl Related<super::contract_party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractParties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
