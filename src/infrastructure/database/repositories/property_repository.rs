//! SeaORM implementation of PropertyRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::property::{Property, PropertyDraft, PropertyPatch, PropertyRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::property;

pub struct SeaOrmPropertyRepository {
    db: DatabaseConnection,
}

impl SeaOrmPropertyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, user_id: i32, id: i32) -> DomainResult<Option<property::Model>> {
        property::Entity::find_by_id(id)
            .filter(property::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: property::Model) -> Property {
    Property {
        id: m.id,
        user_id: m.user_id,
        title: m.title,
        address: m.address,
        city: m.city,
        state: m.state,
        zip_code: m.zip_code,
        property_type: m.property_type,
        status: m.status,
        landlord_name: m.landlord_name,
        landlord_contact: m.landlord_contact,
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── PropertyRepository impl ─────────────────────────────────────

#[async_trait]
impl PropertyRepository for SeaOrmPropertyRepository {
    async fn list(&self, user_id: i32) -> DomainResult<Vec<Property>> {
        let models = property::Entity::find()
            .filter(property::Column::UserId.eq(user_id))
            .order_by_desc(property::Column::CreatedAt)
            .order_by_desc(property::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find(&self, user_id: i32, id: i32) -> DomainResult<Option<Property>> {
        Ok(self.find_model(user_id, id).await?.map(model_to_domain))
    }

    async fn create(&self, user_id: i32, draft: PropertyDraft) -> DomainResult<Property> {
        let now = Utc::now();
        let model = property::ActiveModel {
            user_id: Set(user_id),
            title: Set(draft.title),
            address: Set(draft.address),
            city: Set(draft.city),
            state: Set(draft.state),
            zip_code: Set(draft.zip_code),
            property_type: Set(draft.property_type),
            status: Set(draft.status),
            landlord_name: Set(draft.landlord_name),
            landlord_contact: Set(draft.landlord_contact),
            notes: Set(draft.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(created))
    }

    async fn update(&self, user_id: i32, id: i32, patch: PropertyPatch) -> DomainResult<Option<Property>> {
        let Some(existing) = self.find_model(user_id, id).await? else {
            return Ok(None);
        };

        let mut active: property::ActiveModel = existing.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(address) = patch.address {
            active.address = Set(address);
        }
        if let Some(city) = patch.city {
            active.city = Set(city);
        }
        if patch.state.is_some() {
            active.state = Set(patch.state);
        }
        if patch.zip_code.is_some() {
            active.zip_code = Set(patch.zip_code);
        }
        if patch.property_type.is_some() {
            active.property_type = Set(patch.property_type);
        }
        if patch.status.is_some() {
            active.status = Set(patch.status);
        }
        if patch.landlord_name.is_some() {
            active.landlord_name = Set(patch.landlord_name);
        }
        if patch.landlord_contact.is_some() {
            active.landlord_contact = Set(patch.landlord_contact);
        }
        if patch.notes.is_some() {
            active.notes = Set(patch.notes);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn delete(&self, user_id: i32, id: i32) -> DomainResult<bool> {
        let result = property::Entity::delete_many()
            .filter(property::Column::Id.eq(id))
            .filter(property::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self, user_id: i32) -> DomainResult<u64> {
        property::Entity::find()
            .filter(property::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
