//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_usage_monthly;
mod m20250101_000003_create_parties;
mod m20250101_000004_create_contracts;
mod m20250101_000005_create_properties;
mod m20250101_000006_create_notifications;
mod m20250101_000007_create_inspections;
mod m20250101_000008_create_subscriptions;
mod m20250101_000009_create_mentor_attachments;
mod m20250101_000010_create_whatsapp;
mod m20250101_000011_create_app_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_usage_monthly::Migration),
            Box::new(m20250101_000003_create_parties::Migration),
            Box::new(m20250101_000004_create_contracts::Migration),
            Box::new(m20250101_000005_create_properties::Migration),
            Box::new(m20250101_000006_create_notifications::Migration),
            Box::new(m20250101_000007_create_inspections::Migration),
            Box::new(m20250101_000008_create_subscriptions::Migration),
            Box::new(m20250101_000009_create_mentor_attachments::Migration),
            Box::new(m20250101_000010_create_whatsapp::Migration),
            Box::new(m20250101_000011_create_app_settings::Migration),
        ]
    }
}
