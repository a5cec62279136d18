//! SeaORM implementation of SettingsRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::settings::{
    AppSettings, SettingsPatch, SettingsRepository, DEFAULT_CONTRACT_TERM_MONTHS,
    DEFAULT_NOTIFY_BEFORE_DUE_DAYS, DEFAULT_RENT_INDEX,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::app_settings;

const SINGLETON_ID: i32 = 1;

pub struct SeaOrmSettingsRepository {
    db: DatabaseConnection,
}

impl SeaOrmSettingsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_or_create(&self) -> DomainResult<app_settings::Model> {
        let now = Utc::now();
        let defaults = app_settings::ActiveModel {
            id: Set(SINGLETON_ID),
            default_contract_term_months: Set(DEFAULT_CONTRACT_TERM_MONTHS),
            notify_before_due_days: Set(DEFAULT_NOTIFY_BEFORE_DUE_DAYS),
            default_rent_index: Set(DEFAULT_RENT_INDEX.to_string()),
            company_name: Set(None),
            company_creci: Set(None),
            company_phone: Set(None),
            company_address: Set(None),
            company_whatsapp: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        app_settings::Entity::insert(defaults)
            .on_conflict(
                OnConflict::column(app_settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        app_settings::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::Internal("settings row missing".to_string()))
    }
}

fn model_to_domain(m: app_settings::Model) -> AppSettings {
    AppSettings {
        default_contract_term_months: m.default_contract_term_months,
        notify_before_due_days: m.notify_before_due_days,
        default_rent_index: m.default_rent_index,
        company_name: m.company_name,
        company_creci: m.company_creci,
        company_phone: m.company_phone,
        company_address: m.company_address,
        company_whatsapp: m.company_whatsapp,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn get(&self) -> DomainResult<AppSettings> {
        Ok(model_to_domain(self.load_or_create().await?))
    }

    async fn update(&self, patch: SettingsPatch) -> DomainResult<AppSettings> {
        let mut active: app_settings::ActiveModel = self.load_or_create().await?.into();
        if let Some(months) = patch.default_contract_term_months {
            active.default_contract_term_months = Set(months);
        }
        if let Some(days) = patch.notify_before_due_days {
            active.notify_before_due_days = Set(days);
        }
        if let Some(index) = patch.default_rent_index {
            active.default_rent_index = Set(index);
        }
        if patch.company_name.is_some() {
            active.company_name = Set(patch.company_name);
        }
        if patch.company_creci.is_some() {
            active.company_creci = Set(patch.company_creci);
        }
        if patch.company_phone.is_some() {
            active.company_phone = Set(patch.company_phone);
        }
        if patch.company_address.is_some() {
            active.company_address = Set(patch.company_address);
        }
        if patch.company_whatsapp.is_some() {
            active.company_whatsapp = Set(patch.company_whatsapp);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::testing::setup_db;

    #[tokio::test]
    async fn first_read_creates_defaults() {
        let repo = SeaOrmSettingsRepository::new(setup_db().await);
        let settings = repo.get().await.unwrap();
        assert_eq!(settings.default_contract_term_months, 30);
        assert_eq!(settings.notify_before_due_days, 5);
        assert_eq!(settings.default_rent_index, "IPCA");
        assert_eq!(repo.get().await.unwrap().created_at, settings.created_at);
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let repo = SeaOrmSettingsRepository::new(setup_db().await);
        let updated = repo
            .update(SettingsPatch {
                company_name: Some("Imobiliária Sol".into()),
                notify_before_due_days: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.company_name.as_deref(), Some("Imobiliária Sol"));
        assert_eq!(updated.notify_before_due_days, 0);
        assert_eq!(updated.default_contract_term_months, 30);
    }
}
