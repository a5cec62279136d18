//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::billing::{SubscriptionRepository, UsageRepository};
use crate::domain::contract::ContractRepository;
use crate::domain::inspection::InspectionRepository;
use crate::domain::mentor::MentorAttachmentRepository;
use crate::domain::notification::NotificationRepository;
use crate::domain::party::PartyRepository;
use crate::domain::property::PropertyRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::settings::SettingsRepository;
use crate::domain::user::UserRepository;
use crate::domain::whatsapp::WhatsappRepository;

use super::contract_repository::SeaOrmContractRepository;
use super::inspection_repository::SeaOrmInspectionRepository;
use super::mentor_attachment_repository::SeaOrmMentorAttachmentRepository;
use super::notification_repository::SeaOrmNotificationRepository;
use super::party_repository::SeaOrmPartyRepository;
use super::property_repository::SeaOrmPropertyRepository;
use super::settings_repository::SeaOrmSettingsRepository;
use super::subscription_repository::SeaOrmSubscriptionRepository;
use super::usage_repository::SeaOrmUsageRepository;
use super::user_repository::SeaOrmUserRepository;
use super::whatsapp_repository::SeaOrmWhatsappRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let user = repos.users().find_by_email("ana@example.com").await?;
/// let usage = repos.usage().consume(user.id, QuotaKind::Inspection, 1).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    users: SeaOrmUserRepository,
    usage: SeaOrmUsageRepository,
    subscriptions: SeaOrmSubscriptionRepository,
    parties: SeaOrmPartyRepository,
    properties: SeaOrmPropertyRepository,
    contracts: SeaOrmContractRepository,
    notifications: SeaOrmNotificationRepository,
    inspections: SeaOrmInspectionRepository,
    mentor_attachments: SeaOrmMentorAttachmentRepository,
    whatsapp: SeaOrmWhatsappRepository,
    settings: SeaOrmSettingsRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            usage: SeaOrmUsageRepository::new(db.clone()),
            subscriptions: SeaOrmSubscriptionRepository::new(db.clone()),
            parties: SeaOrmPartyRepository::new(db.clone()),
            properties: SeaOrmPropertyRepository::new(db.clone()),
            contracts: SeaOrmContractRepository::new(db.clone()),
            notifications: SeaOrmNotificationRepository::new(db.clone()),
            inspections: SeaOrmInspectionRepository::new(db.clone()),
            mentor_attachments: SeaOrmMentorAttachmentRepository::new(db.clone()),
            whatsapp: SeaOrmWhatsappRepository::new(db.clone()),
            settings: SeaOrmSettingsRepository::new(db.clone()),
            db,
        }
    }

    /// Underlying pool, used by the health probe.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn usage(&self) -> &dyn UsageRepository {
        &self.usage
    }

    fn subscriptions(&self) -> &dyn SubscriptionRepository {
        &self.subscriptions
    }

    fn parties(&self) -> &dyn PartyRepository {
        &self.parties
    }

    fn properties(&self) -> &dyn PropertyRepository {
        &self.properties
    }

    fn contracts(&self) -> &dyn ContractRepository {
        &self.contracts
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.notifications
    }

    fn inspections(&self) -> &dyn InspectionRepository {
        &self.inspections
    }

    fn mentor_attachments(&self) -> &dyn MentorAttachmentRepository {
        &self.mentor_attachments
    }

    fn whatsapp(&self) -> &dyn WhatsappRepository {
        &self.whatsapp
    }

    fn settings(&self) -> &dyn SettingsRepository {
        &self.settings
    }
}
