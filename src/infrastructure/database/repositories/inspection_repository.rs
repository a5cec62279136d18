//! SeaORM implementation of InspectionRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::billing::QuotaKind;
use crate::domain::inspection::{
    Inspection, InspectionFilter, InspectionRepository, InspectionStats, NewInspection,
    STATUS_PENDING,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::inspection;
use crate::shared::validations::contains_ci;

use super::usage_repository::consume_quota;

pub struct SeaOrmInspectionRepository {
    db: DatabaseConnection,
}

impl SeaOrmInspectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, user_id: i32, id: i32) -> DomainResult<Option<inspection::Model>> {
        inspection::Entity::find_by_id(id)
            .filter(inspection::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: inspection::Model) -> Inspection {
    Inspection {
        id: m.id,
        user_id: m.user_id,
        endereco: m.endereco,
        tipo: m.tipo,
        status: m.status,
        data: m.data,
        created_from_ai: m.created_from_ai,
        ai_summary: m.ai_summary,
        ai_json: m.ai_json,
        contract_id: m.contract_id,
        tenant_record_id: m.tenant_record_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── InspectionRepository impl ───────────────────────────────────

#[async_trait]
impl InspectionRepository for SeaOrmInspectionRepository {
    async fn list(&self, user_id: i32, filter: InspectionFilter) -> DomainResult<Vec<Inspection>> {
        let mut query = inspection::Entity::find().filter(inspection::Column::UserId.eq(user_id));
        if let Some(status) = filter.status.as_deref() {
            query = query.filter(inspection::Column::Status.eq(status));
        }
        if let Some(tipo) = filter.tipo.as_deref() {
            query = query.filter(inspection::Column::Tipo.eq(tipo));
        }

        let models = query
            .order_by_desc(inspection::Column::Data)
            .order_by_desc(inspection::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models
            .into_iter()
            .map(model_to_domain)
            .filter(|i| filter.q.as_deref().map_or(true, |q| contains_ci(&i.endereco, q)))
            .collect())
    }

    async fn find(&self, user_id: i32, id: i32) -> DomainResult<Option<Inspection>> {
        Ok(self.find_model(user_id, id).await?.map(model_to_domain))
    }

    async fn create_metered(&self, user_id: i32, new: NewInspection) -> DomainResult<Inspection> {
        let now = Utc::now();
        let active = inspection::ActiveModel {
            user_id: Set(user_id),
            endereco: Set(new.endereco),
            tipo: Set(new.tipo),
            status: Set(new.status),
            data: Set(new.data),
            created_from_ai: Set(new.created_from_ai),
            ai_summary: Set(new.ai_summary),
            ai_json: Set(new.ai_json),
            contract_id: Set(new.contract_id),
            tenant_record_id: Set(new.tenant_record_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let txn = self.db.begin().await.map_err(db_err)?;
        let written = match consume_quota(&txn, user_id, QuotaKind::Inspection, 1).await {
            Ok(_) => active.insert(&txn).await.map_err(db_err),
            Err(e) => Err(e),
        };
        match written {
            Ok(model) => {
                txn.commit().await.map_err(db_err)?;
                info!(user_id, inspection_id = model.id, "Inspection created");
                Ok(model_to_domain(model))
            }
            Err(e) => {
                txn.rollback().await.map_err(db_err)?;
                Err(e)
            }
        }
    }

    async fn update_status(&self, user_id: i32, id: i32, status: &str) -> DomainResult<Option<Inspection>> {
        let Some(existing) = self.find_model(user_id, id).await? else {
            return Ok(None);
        };
        let mut active: inspection::ActiveModel = existing.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn update_ai_json(&self, user_id: i32, id: i32, ai_json: String) -> DomainResult<Option<Inspection>> {
        let Some(existing) = self.find_model(user_id, id).await? else {
            return Ok(None);
        };
        let mut active: inspection::ActiveModel = existing.into();
        active.ai_json = Set(Some(ai_json));
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn stats(&self, user_id: i32) -> DomainResult<InspectionStats> {
        let total = inspection::Entity::find()
            .filter(inspection::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let pending = inspection::Entity::find()
            .filter(inspection::Column::UserId.eq(user_id))
            .filter(inspection::Column::Status.eq(STATUS_PENDING))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(InspectionStats { total, pending })
    }
}
