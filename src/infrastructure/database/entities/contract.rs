//! Lease contracts generated from the legal template

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: i32,
    pub titulo: String,
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub criado_em: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Whole reais
    pub rent_value: i64,
    pub condo_value: Option<i64>,
    pub iptu_value: Option<i64>,
    pub deposit_value: Option<i64>,
    pub due_day: i32,
    pub city: String,
    pub state: String,
    pub full_address: String,
    pub property_description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub generated_text: Option<String>,
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
