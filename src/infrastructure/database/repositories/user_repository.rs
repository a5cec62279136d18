//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sea_orm::sea_query::Expr;

use crate::domain::billing::PlanType;
use crate::domain::user::{NewUser, User, UserRepository, UserRole};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Member => UserRole::Member,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Member => user::UserRole::Member,
    }
}

pub(crate) fn tier_to_plan(tier: &user::PlanTier) -> PlanType {
    match tier {
        user::PlanTier::Starter => PlanType::Starter,
        user::PlanTier::Pro => PlanType::Pro,
        user::PlanTier::Imobiliaria => PlanType::Imobiliaria,
    }
}

pub(crate) fn plan_to_tier(plan: PlanType) -> user::PlanTier {
    match plan {
        PlanType::Starter => user::PlanTier::Starter,
        PlanType::Pro => user::PlanTier::Pro,
        PlanType::Imobiliaria => user::PlanTier::Imobiliaria,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        password_hash: model.password_hash,
        role: entity_role_to_domain(model.role),
        plan: tier_to_plan(&model.plan),
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_login_at: model.last_login_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new: NewUser) -> DomainResult<User> {
        let now = Utc::now();
        let model = user::ActiveModel {
            email: Set(new.email),
            name: Set(new.name),
            password_hash: Set(new.password_hash),
            role: Set(domain_role_to_entity(new.role)),
            plan: Set(plan_to_tier(new.plan)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
            ..Default::default()
        };

        let created = model.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
                DomainError::Conflict("Email already registered".to_string())
            } else {
                db_err(e)
            }
        })?;

        Ok(user_model_to_domain(created))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_model_to_domain))
    }

    async fn touch_login(&self, id: i32) -> DomainResult<()> {
        user::Entity::update_many()
            .col_expr(user::Column::LastLoginAt, Expr::value(Some(Utc::now())))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_plan_by_email(&self, email: &str, plan: PlanType) -> DomainResult<bool> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::Plan, Expr::value(plan_to_tier(plan)))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}
