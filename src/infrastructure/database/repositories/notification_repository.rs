//! SeaORM implementation of NotificationRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::billing::QuotaKind;
use crate::domain::notification::{
    Notification, NotificationDraft, NotificationFilter, NotificationRepository,
    NotificationStatus, NotificationType, NotificationView,
};
use crate::domain::party::PartySummary;
use crate::domain::property::PropertySummary;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{notification, party, property};
use crate::shared::validations::contains_ci;

use super::party_repository::model_to_domain as party_to_domain;
use super::property_repository::model_to_domain as property_to_domain;
use super::usage_repository::consume_quota;

pub struct SeaOrmNotificationRepository {
    db: DatabaseConnection,
}

impl SeaOrmNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, user_id: i32, id: i32) -> DomainResult<Option<notification::Model>> {
        notification::Entity::find_by_id(id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Attaches property and party summaries in two batched lookups.
    async fn into_views(&self, items: Vec<Notification>) -> DomainResult<Vec<NotificationView>> {
        let property_ids: Vec<i32> = items.iter().filter_map(|n| n.property_id).collect();
        let party_ids: Vec<String> = items
            .iter()
            .flat_map(|n| [n.landlord_id.clone(), n.tenant_id.clone()])
            .flatten()
            .collect();

        let properties: HashMap<i32, PropertySummary> = if property_ids.is_empty() {
            HashMap::new()
        } else {
            property::Entity::find()
                .filter(property::Column::Id.is_in(property_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|m| {
                    let p = property_to_domain(m);
                    (p.id, PropertySummary::from(&p))
                })
                .collect()
        };

        let parties: HashMap<String, PartySummary> = if party_ids.is_empty() {
            HashMap::new()
        } else {
            party::Entity::find()
                .filter(party::Column::Id.is_in(party_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|m| {
                    let p = party_to_domain(m);
                    (p.id.clone(), PartySummary::from(&p))
                })
                .collect()
        };

        Ok(items
            .into_iter()
            .map(|n| NotificationView {
                property: n.property_id.and_then(|id| properties.get(&id).cloned()),
                landlord: n.landlord_id.as_ref().and_then(|id| parties.get(id).cloned()),
                tenant: n.tenant_id.as_ref().and_then(|id| parties.get(id).cloned()),
                notification: n,
            })
            .collect())
    }

    async fn view_of(&self, model: notification::Model) -> DomainResult<NotificationView> {
        self.into_views(vec![model_to_domain(model)])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("notification view lost".to_string()))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn status_to_entity(status: NotificationStatus) -> notification::NotificationStatus {
    match status {
        NotificationStatus::Pendente => notification::NotificationStatus::Pendente,
        NotificationStatus::Enviada => notification::NotificationStatus::Enviada,
        NotificationStatus::Arquivada => notification::NotificationStatus::Arquivada,
    }
}

fn status_to_domain(status: notification::NotificationStatus) -> NotificationStatus {
    match status {
        notification::NotificationStatus::Pendente => NotificationStatus::Pendente,
        notification::NotificationStatus::Enviada => NotificationStatus::Enviada,
        notification::NotificationStatus::Arquivada => NotificationStatus::Arquivada,
    }
}

fn model_to_domain(m: notification::Model) -> Notification {
    Notification {
        id: m.id,
        user_id: m.user_id,
        title: m.title,
        body: m.body,
        // Only catalogued types are ever written.
        notification_type: NotificationType::parse(&m.notification_type)
            .unwrap_or(NotificationType::AdvertenciaFormal),
        status: status_to_domain(m.status),
        property_id: m.property_id,
        landlord_id: m.landlord_id,
        tenant_id: m.tenant_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn apply_draft(active: &mut notification::ActiveModel, draft: NotificationDraft) {
    active.title = Set(draft.title);
    active.body = Set(draft.body);
    active.notification_type = Set(draft.notification_type.as_str().to_string());
    active.status = Set(status_to_entity(draft.status));
    active.property_id = Set(draft.property_id);
    active.landlord_id = Set(draft.landlord_id);
    active.tenant_id = Set(draft.tenant_id);
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── NotificationRepository impl ─────────────────────────────────

#[async_trait]
impl NotificationRepository for SeaOrmNotificationRepository {
    async fn list(&self, user_id: i32, filter: NotificationFilter) -> DomainResult<Vec<NotificationView>> {
        let mut query = notification::Entity::find().filter(notification::Column::UserId.eq(user_id));
        if let Some(status) = filter.status {
            query = query.filter(notification::Column::Status.eq(status_to_entity(status)));
        }
        if let Some(kind) = filter.notification_type {
            query = query.filter(notification::Column::NotificationType.eq(kind.as_str()));
        }
        if let Some(property_id) = filter.property_id {
            query = query.filter(notification::Column::PropertyId.eq(property_id));
        }

        let models = query
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models
            .into_iter()
            .map(model_to_domain)
            .filter(|n| match filter.q.as_deref() {
                None => true,
                Some(q) => contains_ci(&n.title, q) || contains_ci(&n.body, q),
            })
            .collect();

        self.into_views(items).await
    }

    async fn find(&self, user_id: i32, id: i32) -> DomainResult<Option<NotificationView>> {
        match self.find_model(user_id, id).await? {
            Some(model) => Ok(Some(self.view_of(model).await?)),
            None => Ok(None),
        }
    }

    async fn create_metered(&self, user_id: i32, draft: NotificationDraft) -> DomainResult<NotificationView> {
        let now = Utc::now();
        let mut active = notification::ActiveModel {
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        apply_draft(&mut active, draft);

        let txn = self.db.begin().await.map_err(db_err)?;
        let written = match consume_quota(&txn, user_id, QuotaKind::Document, 1).await {
            Ok(_) => active.insert(&txn).await.map_err(db_err),
            Err(e) => Err(e),
        };
        let model = match written {
            Ok(model) => {
                txn.commit().await.map_err(db_err)?;
                model
            }
            Err(e) => {
                txn.rollback().await.map_err(db_err)?;
                return Err(e);
            }
        };

        info!(user_id, notification_id = model.id, kind = %model.notification_type, "Notification created");
        self.view_of(model).await
    }

    async fn update(&self, user_id: i32, id: i32, draft: NotificationDraft) -> DomainResult<Option<NotificationView>> {
        let Some(existing) = self.find_model(user_id, id).await? else {
            return Ok(None);
        };
        let mut active: notification::ActiveModel = existing.into();
        apply_draft(&mut active, draft);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(self.view_of(updated).await?))
    }

    async fn count(&self, user_id: i32) -> DomainResult<u64> {
        notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn count_pending(&self, user_id: i32) -> DomainResult<u64> {
        notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Status.eq(notification::NotificationStatus::Pendente))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanType;
    use crate::domain::property::{PropertyDraft, PropertyRepository};
    use crate::infrastructure::database::repositories::property_repository::SeaOrmPropertyRepository;
    use crate::infrastructure::database::testing::{seed_user, setup_db, setup_file_db};
    use std::sync::Arc;

    fn draft(title: &str, property_id: Option<i32>) -> NotificationDraft {
        NotificationDraft {
            title: title.into(),
            body: "Prezado(a), segue aviso.".into(),
            notification_type: NotificationType::AvisoFimContrato,
            status: NotificationStatus::Pendente,
            property_id,
            landlord_id: None,
            tenant_id: None,
        }
    }

    #[tokio::test]
    async fn created_notification_carries_property_summary() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "n@imobi.test", PlanType::Starter).await;
        let property = SeaOrmPropertyRepository::new(db.clone())
            .create(
                user_id,
                PropertyDraft {
                    title: "Sala 3".into(),
                    address: "Rua D, 4".into(),
                    city: "Recife".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let repo = SeaOrmNotificationRepository::new(db);
        let view = repo.create_metered(user_id, draft("Fim", Some(property.id))).await.unwrap();
        assert_eq!(view.property.map(|p| p.title), Some("Sala 3".to_string()));
        assert_eq!(repo.count_pending(user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn notifications_share_document_allowance() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "quota@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmNotificationRepository::new(db);

        for i in 0..15 {
            repo.create_metered(user_id, draft(&format!("N{i}"), None)).await.unwrap();
        }
        let err = repo.create_metered(user_id, draft("extra", None)).await.unwrap_err();
        assert!(matches!(err, DomainError::PlanLimit(ref e) if e.kind == QuotaKind::Document));
        assert_eq!(repo.count(user_id).await.unwrap(), 15);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creations_stop_at_the_document_limit() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_file_db(&dir.path().join("avisos.db"), 8).await;
        let user_id = seed_user(&db, "paralelo@imobi.test", PlanType::Starter).await;
        let repo = Arc::new(SeaOrmNotificationRepository::new(db));

        let tasks: Vec<_> = (0..24)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create_metered(user_id, draft(&format!("N{i}"), None)).await })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::PlanLimit(e)) => assert_eq!(e.kind, QuotaKind::Document),
                Err(other) => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(created, 15);
        assert_eq!(repo.count(user_id).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn filters_and_update() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "u@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmNotificationRepository::new(db);

        let first = repo.create_metered(user_id, draft("Atraso março", None)).await.unwrap();
        repo.create_metered(user_id, draft("Outro", None)).await.unwrap();

        let mut sent = draft("Atraso março", None);
        sent.status = NotificationStatus::Enviada;
        repo.update(user_id, first.notification.id, sent).await.unwrap().unwrap();

        let filter = NotificationFilter {
            status: Some(NotificationStatus::Enviada),
            ..Default::default()
        };
        let found = repo.list(user_id, filter).await.unwrap();
        assert_eq!(found.len(), 1);

        let by_text = NotificationFilter {
            q: Some("MARÇO".into()),
            ..Default::default()
        };
        assert_eq!(repo.list(user_id, by_text).await.unwrap().len(), 1);
        assert!(repo.update(user_id, 9999, draft("x", None)).await.unwrap().is_none());
    }
}
