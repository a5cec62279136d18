//! SeaORM implementation of SubscriptionRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;

use crate::domain::billing::{
    NewPendingSubscription, PaymentActivation, Subscription, SubscriptionRepository,
    SubscriptionStatus,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::subscription;

pub struct SeaOrmSubscriptionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> DomainResult<Option<Subscription>> {
        let model = subscription::Entity::find()
            .filter(subscription::Column::MpPaymentId.eq(payment_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn status_to_entity(status: SubscriptionStatus) -> subscription::SubscriptionStatus {
    match status {
        SubscriptionStatus::Pending => subscription::SubscriptionStatus::Pending,
        SubscriptionStatus::Active => subscription::SubscriptionStatus::Active,
        SubscriptionStatus::Rejected => subscription::SubscriptionStatus::Rejected,
        SubscriptionStatus::Cancelled => subscription::SubscriptionStatus::Cancelled,
    }
}

fn status_to_domain(status: subscription::SubscriptionStatus) -> SubscriptionStatus {
    match status {
        subscription::SubscriptionStatus::Pending => SubscriptionStatus::Pending,
        subscription::SubscriptionStatus::Active => SubscriptionStatus::Active,
        subscription::SubscriptionStatus::Rejected => SubscriptionStatus::Rejected,
        subscription::SubscriptionStatus::Cancelled => SubscriptionStatus::Cancelled,
    }
}

fn model_to_domain(m: subscription::Model) -> Subscription {
    Subscription {
        id: m.id,
        email: m.email,
        plan_id: m.plan_id,
        status: status_to_domain(m.status),
        price_cents: m.price_cents,
        currency: m.currency,
        mp_pref_id: m.mp_pref_id,
        mp_payment_id: m.mp_payment_id,
        valid_until: m.valid_until,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string();
    msg.contains("UNIQUE") || msg.contains("duplicate")
}

// ── SubscriptionRepository impl ─────────────────────────────────

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create_pending(&self, new: NewPendingSubscription) -> DomainResult<Subscription> {
        let now = Utc::now();
        let model = subscription::ActiveModel {
            email: Set(new.email),
            plan_id: Set(new.plan_id),
            status: Set(subscription::SubscriptionStatus::Pending),
            price_cents: Set(new.price_cents),
            currency: Set(new.currency),
            mp_pref_id: Set(new.mp_pref_id),
            mp_payment_id: Set(None),
            valid_until: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(created))
    }

    async fn find_by_pref_id(&self, pref_id: &str) -> DomainResult<Option<Subscription>> {
        let model = subscription::Entity::find()
            .filter(subscription::Column::MpPrefId.eq(pref_id))
            .order_by_desc(subscription::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn activate_by_payment(&self, activation: PaymentActivation) -> DomainResult<Subscription> {
        if let Some(existing) = self.find_by_payment_id(&activation.payment_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let txn = self.db.begin().await.map_err(db_err)?;

        let pending = subscription::Entity::find()
            .filter(subscription::Column::Email.eq(activation.email.as_str()))
            .filter(subscription::Column::PlanId.eq(activation.plan_id.as_str()))
            .filter(subscription::Column::Status.eq(subscription::SubscriptionStatus::Pending))
            .order_by_desc(subscription::Column::CreatedAt)
            .one(&txn)
            .await
            .map_err(db_err)?;

        let written = match pending {
            Some(row) => {
                let mut active: subscription::ActiveModel = row.into();
                active.status = Set(subscription::SubscriptionStatus::Active);
                active.mp_payment_id = Set(Some(activation.payment_id.clone()));
                active.valid_until = Set(Some(activation.valid_until));
                active.updated_at = Set(now);
                active.update(&txn).await
            }
            None => {
                subscription::ActiveModel {
                    email: Set(activation.email.clone()),
                    plan_id: Set(activation.plan_id.clone()),
                    status: Set(subscription::SubscriptionStatus::Active),
                    price_cents: Set(activation.price_cents),
                    currency: Set(activation.currency.clone()),
                    mp_pref_id: Set(None),
                    mp_payment_id: Set(Some(activation.payment_id.clone())),
                    valid_until: Set(Some(activation.valid_until)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
            }
        };

        match written {
            Ok(model) => {
                txn.commit().await.map_err(db_err)?;
                info!(
                    email = %activation.email,
                    plan_id = %activation.plan_id,
                    payment_id = %activation.payment_id,
                    "Subscription activated"
                );
                Ok(model_to_domain(model))
            }
            // A concurrent delivery of the same payment won the race.
            Err(e) if is_unique_violation(&e) => {
                txn.rollback().await.map_err(db_err)?;
                self.find_by_payment_id(&activation.payment_id)
                    .await?
                    .ok_or_else(|| db_err(e))
            }
            Err(e) => {
                txn.rollback().await.map_err(db_err)?;
                Err(db_err(e))
            }
        }
    }

    async fn set_status(
        &self,
        payment_id: &str,
        pref_id: Option<&str>,
        status: SubscriptionStatus,
    ) -> DomainResult<u64> {
        let mut matching = Condition::any().add(subscription::Column::MpPaymentId.eq(payment_id));
        if let Some(pref_id) = pref_id {
            matching = matching.add(subscription::Column::MpPrefId.eq(pref_id));
        }

        let result = subscription::Entity::update_many()
            .col_expr(subscription::Column::Status, Expr::value(status_to_entity(status)))
            .col_expr(subscription::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(matching)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn find_active_by_email(&self, email: &str) -> DomainResult<Option<Subscription>> {
        let model = subscription::Entity::find()
            .filter(subscription::Column::Email.eq(email))
            .filter(subscription::Column::Status.eq(subscription::SubscriptionStatus::Active))
            .order_by_desc(subscription::Column::ValidUntil)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::testing::setup_db;
    use chrono::Duration;

    fn activation(payment_id: &str) -> PaymentActivation {
        PaymentActivation {
            payment_id: payment_id.into(),
            email: "cliente@imobi.test".into(),
            plan_id: "pro_monthly".into(),
            price_cents: 9700,
            currency: "BRL".into(),
            valid_until: Utc::now() + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn activation_promotes_pending_row_once() {
        let repo = SeaOrmSubscriptionRepository::new(setup_db().await);
        let pending = repo
            .create_pending(NewPendingSubscription {
                email: "cliente@imobi.test".into(),
                plan_id: "pro_monthly".into(),
                price_cents: 9700,
                currency: "BRL".into(),
                mp_pref_id: Some("pref-1".into()),
            })
            .await
            .unwrap();

        let first = repo.activate_by_payment(activation("pay-1")).await.unwrap();
        let second = repo.activate_by_payment(activation("pay-1")).await.unwrap();
        assert_eq!(first.id, pending.id);
        assert_eq!(second.id, pending.id);
        assert_eq!(first.status, SubscriptionStatus::Active);

        let active = repo.find_active_by_email("cliente@imobi.test").await.unwrap().unwrap();
        assert_eq!(active.mp_payment_id.as_deref(), Some("pay-1"));
    }

    #[tokio::test]
    async fn activation_without_pending_creates_row() {
        let repo = SeaOrmSubscriptionRepository::new(setup_db().await);
        let created = repo.activate_by_payment(activation("pay-9")).await.unwrap();
        assert_eq!(created.mp_pref_id, None);
        assert_eq!(created.price_cents, 9700);
    }

    #[tokio::test]
    async fn rejection_matches_preference() {
        let repo = SeaOrmSubscriptionRepository::new(setup_db().await);
        repo.create_pending(NewPendingSubscription {
            email: "x@imobi.test".into(),
            plan_id: "basic_monthly".into(),
            price_cents: 4990,
            currency: "BRL".into(),
            mp_pref_id: Some("pref-7".into()),
        })
        .await
        .unwrap();

        let touched = repo
            .set_status("pay-7", Some("pref-7"), SubscriptionStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(touched, 1);
        let row = repo.find_by_pref_id("pref-7").await.unwrap().unwrap();
        assert_eq!(row.status, SubscriptionStatus::Rejected);
        assert!(repo.find_active_by_email("x@imobi.test").await.unwrap().is_none());
    }
}
