//! Inspection entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inspections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub endereco: String,
    pub tipo: String,
    pub status: String,
    pub data: DateTime<Utc>,
    pub created_from_ai: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_summary: Option<String>,
    /// Serialized report document
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_json: Option<String>,
    pub contract_id: Option<String>,
    pub tenant_record_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
